//! Printable implementation for RouteRow.

use std::io::Write;

use crate::helper::RouteRow;
use crate::output::{OutputOptions, Printable};
use crate::types::RouteProtocol;

impl Printable for RouteRow {
    fn print_text<W: Write>(&self, w: &mut W, opts: &OutputOptions) -> std::io::Result<()> {
        // Destination
        write!(w, "{}", self.destination)?;

        // Next hop
        if !self.next_hop.is_unspecified() {
            write!(w, " via {}", self.next_hop)?;
        }

        write!(w, " dev {}", self.interface_index)?;

        // Protocol
        if self.protocol != RouteProtocol::NetMgmt {
            write!(w, " proto {}", self.protocol)?;
        }

        write!(w, " metric {}", self.metric)?;

        if opts.details {
            write!(w, " origin {} age {}", self.origin, self.age)?;
        }

        writeln!(w)?;

        Ok(())
    }

    fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "dst": self.destination.to_string(),
            "dev": self.interface_index,
            "luid": self.interface_luid.0,
            "metric": self.metric,
            "protocol": self.protocol.to_string(),
            "origin": self.origin.to_string(),
        });

        if !self.next_hop.is_unspecified() {
            obj["gateway"] = serde_json::json!(self.next_hop.to_string());
        }

        obj
    }
}
