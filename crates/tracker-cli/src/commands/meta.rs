//! Meta command implementation.

use super::StoreArgs;
use crate::output;

pub fn run(args: &StoreArgs, id: u64, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.open()?;
    let meta = store.get_event_metadata(id)?;

    if json {
        println!("{}", output::format_json(&output::metadata_json(id, &meta)));
    } else {
        println!("id:         {}", id);
        println!("user:       {}", meta.user_id);
        println!("event type: {}", meta.event_type_id);
        println!("location:   {}", meta.location);
    }
    Ok(())
}
