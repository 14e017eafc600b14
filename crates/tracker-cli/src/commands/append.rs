//! Append command implementation.

use super::{CliError, StoreArgs};
use serde_json::json;
use std::io::{self, Read};
use std::path::PathBuf;
use tracker_store::Event;

pub fn run(
    args: &StoreArgs,
    user: i64,
    event_type: i32,
    input: Option<PathBuf>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Read payload from file or stdin
    let payload = match input {
        Some(path) => std::fs::read(&path).map_err(|source| CliError::Input {
            path: path.display().to_string(),
            source,
        })?,
        None => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .map_err(|source| CliError::Input {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            buffer
        }
    };

    let store = args.open()?;
    let id = store.add_event(&Event::new(payload), user, event_type)?;
    store.close()?;

    if json {
        println!("{}", json!({ "id": id }));
    } else {
        println!("{}", id);
    }
    Ok(())
}
