use clap::Args;
use decimal_percentage::Percentage;
use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use tote::{
    coupons::{CouponKind, CouponRule},
    money::{parse_amount, to_minor},
};

use crate::cli::{Session, print_summary};

#[derive(Debug, Args)]
pub(crate) struct ApplyCouponArgs {
    /// Coupon code
    code: String,

    /// Fixed discount in major units, capped at the subtotal
    #[arg(long, conflicts_with = "percent", required_unless_present = "percent")]
    discount: Option<String>,

    /// Percentage of the subtotal, e.g. 10 for 10%
    #[arg(long)]
    percent: Option<f64>,

    /// Minimum subtotal, in major units, the coupon requires
    #[arg(long)]
    min_purchase: Option<String>,

    /// Moment the coupon stops working (RFC 3339)
    #[arg(long)]
    expires_at: Option<Timestamp>,
}

pub(crate) fn run(session: &mut Session, args: ApplyCouponArgs) -> Result<(), String> {
    let ApplyCouponArgs {
        code,
        discount,
        percent,
        min_purchase,
        expires_at,
    } = args;

    let currency = session.cart().currency();

    let kind = match (discount, percent) {
        (Some(discount), _) => CouponKind::Fixed(amount(&discount, currency)?),
        (None, Some(points)) if (0.0..=100.0).contains(&points) => {
            CouponKind::Percentage(Percentage::from(points / 100.0))
        }
        (None, Some(points)) => return Err(format!("percent must be between 0 and 100: {points}")),
        (None, None) => return Err("either --discount or --percent is required".to_string()),
    };

    let min_purchase = min_purchase
        .map(|min| amount(&min, currency))
        .transpose()?;

    let rule = CouponRule {
        code: code.clone(),
        kind,
        min_purchase,
        expires_at,
        active: true,
    };

    let validation = rule
        .validate(&code, session.totals().subtotal(), Timestamp::now())
        .map_err(|error| error.to_string())?;

    if !validation.valid {
        return Err(format!("coupon {code} rejected: {}", validation.message));
    }

    session
        .apply_coupon(validation.code, validation.discount)
        .map_err(|error| format!("coupon not applied: {error}"))?;

    print_summary(session)
}

fn amount(text: &str, currency: &'static Currency) -> Result<Money<'static, Currency>, String> {
    let value = parse_amount(text)
        .filter(|value| !value.is_sign_negative())
        .ok_or_else(|| format!("invalid amount: {text}"))?;

    let minor = to_minor(value, currency).map_err(|error| error.to_string())?;

    Ok(Money::from_minor(minor, currency))
}
