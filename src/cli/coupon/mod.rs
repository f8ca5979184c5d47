use clap::{Args, Subcommand};

use super::Session;

mod apply;
mod remove;

#[derive(Debug, Args)]
pub(crate) struct CouponCommand {
    #[command(subcommand)]
    command: CouponSubcommand,
}

#[derive(Debug, Subcommand)]
enum CouponSubcommand {
    /// Validate a coupon against the subtotal and attach it
    Apply(apply::ApplyCouponArgs),
    /// Detach the current coupon
    Remove,
}

pub(crate) fn run(session: &mut Session, command: CouponCommand) -> Result<(), String> {
    match command.command {
        CouponSubcommand::Apply(args) => apply::run(session, args),
        CouponSubcommand::Remove => remove::run(session),
    }
}
