//! Get command implementation.

use super::StoreArgs;
use std::io::{self, Write};

pub fn run(args: &StoreArgs, id: u64) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.open()?;
    let event = store.get_event(id)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(event.as_bytes())?;
    stdout.flush()?;
    Ok(())
}
