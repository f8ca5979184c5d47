use clap::Args;

use super::{LineKeyArgs, Session, print_summary};

#[derive(Debug, Args)]
pub(crate) struct RemoveArgs {
    #[command(flatten)]
    line: LineKeyArgs,
}

pub(crate) fn run(session: &mut Session, args: &RemoveArgs) -> Result<(), String> {
    let key = args.line.key();

    if session.remove(&key).is_none() {
        return Err(format!("{key} is not in the cart"));
    }

    print_summary(session)
}
