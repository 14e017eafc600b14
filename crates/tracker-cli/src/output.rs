//! Output formatting utilities.

use serde_json::{json, Value};
use tracker_store::MetaData;

/// Formats a value as pretty JSON.
pub fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// JSON object describing event `id`.
pub fn metadata_json(id: u64, meta: &MetaData) -> Value {
    json!({
        "id": id,
        "user_id": meta.user_id,
        "event_type_id": meta.event_type_id,
        "location": meta.location,
    })
}

/// JSON object for an identifier whose append failed.
pub fn abandoned_json(id: u64) -> Value {
    json!({ "id": id, "abandoned": true })
}

/// Formats event metadata as a simple table row.
pub fn format_table_row(id: u64, meta: &MetaData) -> String {
    format!(
        "{:<12} {:<20} {:<12} {}",
        id,
        meta.user_id,
        meta.event_type_id,
        meta.location
    )
}

/// Formats an abandoned identifier as a table row.
pub fn format_abandoned_row(id: u64) -> String {
    format!("{:<12} {:<20} {:<12} {}", id, "-", "-", "abandoned")
}

/// Prints table header.
#[allow(clippy::print_literal)]
pub fn print_table_header() {
    println!(
        "{:<12} {:<20} {:<12} {}",
        "ID", "USER", "TYPE", "LOCATION"
    );
    println!("{}", "-".repeat(64));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracker_store::Location;

    fn sample() -> MetaData {
        MetaData::new(
            7,
            -3,
            Location {
                segment: 1,
                offset: 28,
                len: 5,
            },
        )
    }

    #[test]
    fn table_row_has_all_columns() {
        let row = format_table_row(4, &sample());
        let columns: Vec<&str> = row.split_whitespace().collect();
        assert_eq!(columns, vec!["4", "7", "-3", "1:28+5"]);
    }

    #[test]
    fn metadata_json_carries_location() {
        let value = metadata_json(4, &sample());
        assert_eq!(value["id"], 4);
        assert_eq!(value["user_id"], 7);
        assert_eq!(value["event_type_id"], -3);
        assert_eq!(value["location"]["segment"], 1);
        assert_eq!(value["location"]["offset"], 28);
        assert_eq!(value["location"]["len"], 5);
    }
}
