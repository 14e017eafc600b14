//! Stats command implementation.

use super::StoreArgs;

pub fn run(args: &StoreArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.open()?;
    let stats = store.stats()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("events:            {}", stats.events);
        println!("index capacity:    {}", stats.index_capacity);
        println!("payload segments:  {}", stats.payload_segments);
        println!("metadata segments: {}", stats.metadata_segments);
    }
    Ok(())
}
