//! Printable implementation for Interface.

use std::io::Write;

use crate::interface::Interface;
use crate::output::{OutputOptions, Printable, format_duration_secs, format_rate_bps};
use crate::types::OperStatus;

impl Printable for Interface {
    fn print_text<W: Write>(&self, w: &mut W, opts: &OutputOptions) -> std::io::Result<()> {
        // Header line, in the style of `ip addr`
        let state = if self.oper_status == OperStatus::Up { "UP" } else { "DOWN" };
        write!(w, "{}: {}: <{}", self.index, self.friendly_name, state)?;
        if self.is_dhcp_enabled() {
            write!(w, ",DHCP")?;
        }
        writeln!(w, "> mtu {} type {} state {}", self.mtu, self.if_type, self.oper_status)?;

        write!(w, "    link {}", self.mac_address())?;
        if self.transmit_link_speed != 0 {
            write!(w, " speed {}", format_rate_bps(self.transmit_link_speed))?;
        }
        writeln!(w, " luid {}", self.luid)?;

        for addr in &self.unicast_addresses {
            let family = if addr.address.is_ipv4() { "inet" } else { "inet6" };
            write!(w, "    {} {}", family, addr.ip_net())?;
            if addr.ip_net().is_ipv6_link_local() {
                write!(w, " scope link")?;
            }
            writeln!(w)?;
            if opts.details {
                writeln!(
                    w,
                    "       valid_lft {} preferred_lft {} {}",
                    format_duration_secs(addr.valid_lifetime),
                    format_duration_secs(addr.preferred_lifetime),
                    addr.dad_state
                )?;
            }
        }

        for gw in self.gateways() {
            writeln!(w, "    gateway {}", gw)?;
        }
        for dns in self.dns_servers() {
            writeln!(w, "    dns {}", dns)?;
        }

        if opts.details {
            writeln!(w, "    description {}", self.description)?;
            writeln!(w, "    adapter {}", self.adapter_name)?;
            if !self.dns_suffix.is_empty() {
                writeln!(w, "    suffix {}", self.dns_suffix)?;
            }
            writeln!(
                w,
                "    metric ipv4 {} ipv6 {} ipv6-index {}",
                self.ipv4_metric, self.ipv6_metric, self.ipv6_if_index
            )?;
        }

        Ok(())
    }

    fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::to_value(self).unwrap_or_default();
        obj["mac_address"] = serde_json::json!(self.mac_address());
        obj
    }
}
