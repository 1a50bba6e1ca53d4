//! Printable implementation for ConfigDiff.

use std::io::Write;

use crate::config::ConfigDiff;
use crate::output::{OutputOptions, Printable};

impl Printable for ConfigDiff {
    fn print_text<W: Write>(&self, w: &mut W, _opts: &OutputOptions) -> std::io::Result<()> {
        writeln!(w, "{}", self.summary())
    }

    fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::to_value(self).unwrap_or_default();
        obj["change_count"] = serde_json::json!(self.change_count());
        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_json() {
        let diff = ConfigDiff {
            addresses_to_add: vec!["10.0.0.2/24".parse().unwrap()],
            routes_to_remove: vec!["0.0.0.0/0 via 10.0.0.1 metric 5".parse().unwrap()],
            ..Default::default()
        };
        let json = diff.to_json();
        assert_eq!(json["change_count"], 2);
        assert_eq!(json["addresses_to_add"][0], "10.0.0.2/24");
        assert_eq!(json["routes_to_remove"][0]["next_hop"], "10.0.0.1");
        assert!(json.get("dns_to_set").is_none());
    }

    #[test]
    fn test_print_text() {
        let mut out = Vec::new();
        ConfigDiff::default()
            .print_text(&mut out, &OutputOptions::default())
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No changes needed\n");
    }
}
