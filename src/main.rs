//! Tote CLI

use std::process;

use clap::Parser;

use crate::{cli::Cli, observability::init_logging};

mod cli;
mod config;
mod observability;

#[tokio::main]
pub async fn main() {
    _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if let Err(error) = init_logging(&cli.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialise, stderr is all that is left"
        )]
        {
            eprintln!("{error}");
        }

        process::exit(1);
    }

    if let Err(error) = cli.run().await {
        #[expect(clippy::print_stderr, reason = "command errors go to the terminal")]
        {
            eprintln!("error: {error}");
        }

        process::exit(1);
    }
}
