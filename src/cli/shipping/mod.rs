use clap::{Args, Subcommand};

use super::Session;

mod remove;
mod set;

#[derive(Debug, Args)]
pub(crate) struct ShippingCommand {
    #[command(subcommand)]
    command: ShippingSubcommand,
}

#[derive(Debug, Subcommand)]
enum ShippingSubcommand {
    /// Select a shipping quote
    Set(set::SetShippingArgs),
    /// Clear the shipping selection
    Remove,
}

pub(crate) fn run(session: &mut Session, command: ShippingCommand) -> Result<(), String> {
    match command.command {
        ShippingSubcommand::Set(args) => set::run(session, args),
        ShippingSubcommand::Remove => remove::run(session),
    }
}
