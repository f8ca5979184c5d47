use std::io::{self, Write};

use tote::checkout::CheckoutRequest;

use super::Session;

pub(crate) fn run(session: &Session) -> Result<(), String> {
    let request = CheckoutRequest::from_cart(session.cart()).map_err(|error| error.to_string())?;

    let mut out = io::stdout().lock();

    serde_json::to_writer_pretty(&mut out, &request)
        .map_err(|error| format!("failed to encode checkout request: {error}"))?;

    writeln!(out).map_err(|error| error.to_string())
}
