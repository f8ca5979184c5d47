use clap::Args;

use super::{LineKeyArgs, Session, print_summary};

#[derive(Debug, Args)]
pub(crate) struct UpdateArgs {
    #[command(flatten)]
    line: LineKeyArgs,

    /// Quantity change, e.g. 2 or -1; the line never drops below one unit
    #[arg(long, allow_negative_numbers = true)]
    delta: i64,
}

pub(crate) fn run(session: &mut Session, args: &UpdateArgs) -> Result<(), String> {
    let key = args.line.key();

    if session.cart().ledger().get(&key).is_none() {
        return Err(format!("{key} is not in the cart"));
    }

    session
        .update_quantity(&key, args.delta)
        .map_err(|error| format!("quantity not changed: {error}"))?;

    print_summary(session)
}
