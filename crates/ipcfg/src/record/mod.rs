//! Decoding of the linked adapter records returned by enumeration.
//!
//! The host fills a caller-supplied buffer with a chain of adapter entries,
//! each pointing at further chains (unicast, anycast, multicast, DNS server,
//! WINS server, gateway, prefix, DNS suffix). All of those live inside the
//! same buffer, so decoding never dereferences a raw pointer: every link is
//! translated into an offset through [`RecordBuffer`] and bounds-checked.
//!
//! The mirror structs in [`raw`] must match the host layout exactly;
//! [`layout::ensure_verified`] checks this once before the first decode.

pub mod buffer;
pub mod entry;
pub mod layout;
pub mod raw;
pub mod sockaddr;

pub use buffer::{AdapterBuffer, RecordBuffer};
pub use entry::{AdapterAddress, Chain, IpPrefix, LinkedRecord, UnicastAddress};
pub use raw::Ptr;

use raw::IpAdapterAddresses;

use crate::error::Result;

/// Walk the adapter chain, which starts at the first byte of the buffer.
pub fn adapters<'b, 'a>(buf: &'b RecordBuffer<'a>) -> Chain<'b, 'a, IpAdapterAddresses> {
    let head = if buf.is_empty() { 0 } else { buf.base() };
    Chain::new(buf, head as Ptr)
}

/// Decode every adapter in the buffer into an [`Interface`](crate::Interface).
pub fn decode_interfaces(buf: &RecordBuffer<'_>) -> Result<Vec<crate::Interface>> {
    layout::ensure_verified()?;

    let mut out = Vec::new();
    for item in adapters(buf) {
        let (at, record) = item?;
        let interface = crate::Interface::from_record(buf, &record)?;
        tracing::debug!(
            at,
            index = interface.index,
            name = %interface.friendly_name,
            unicast = interface.unicast_addresses.len(),
            "decoded adapter"
        );
        out.push(interface);
    }
    Ok(out)
}
