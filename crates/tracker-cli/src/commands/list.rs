//! List command implementation.

use super::StoreArgs;
use crate::output;
use tracker_store::StoreError;

pub fn run(
    args: &StoreArgs,
    max_events: Option<u64>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.open()?;

    let count = match max_events {
        Some(max) => store.len().min(max),
        None => store.len(),
    };

    // Output header if table format
    if !json {
        output::print_table_header();
    }

    for id in 0..count {
        match store.get_event_metadata(id) {
            Ok(meta) => {
                if json {
                    println!("{}", output::metadata_json(id, &meta));
                } else {
                    println!("{}", output::format_table_row(id, &meta));
                }
            }
            Err(StoreError::Abandoned { .. }) => {
                if json {
                    println!("{}", output::abandoned_json(id));
                } else {
                    println!("{}", output::format_abandoned_row(id));
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
