//! Socket addresses embedded in adapter records.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use zerocopy::IntoBytes;

use super::buffer::RecordBuffer;
use super::raw::{SockaddrHeader, SockaddrIn, SockaddrIn6, SocketAddress};
use crate::error::{Error, Result};

/// `AF_INET` as stored in `sa_family`.
pub const AF_INET: u16 = 2;
/// `AF_INET6` as stored in `sa_family`.
pub const AF_INET6: u16 = 23;

/// Resolve a socket address slot.
///
/// A null pointer or a non-positive declared length means no address is
/// present and yields `None`.
pub fn decode(buf: &RecordBuffer<'_>, slot: &SocketAddress) -> Result<Option<IpAddr>> {
    if slot.sockaddr == 0 || slot.sockaddr_length <= 0 {
        return Ok(None);
    }
    let ptr = u64::from(slot.sockaddr);
    let header: SockaddrHeader = buf.read(ptr)?;

    match header.family {
        AF_INET => {
            let sa: SockaddrIn = buf.read(ptr)?;
            Ok(Some(IpAddr::V4(Ipv4Addr::from(sa.addr))))
        }
        AF_INET6 => {
            let sa: SockaddrIn6 = buf.read(ptr)?;
            Ok(Some(IpAddr::V6(Ipv6Addr::from(sa.addr))))
        }
        family => Err(Error::MalformedAddress { family }),
    }
}

/// Native socket address bytes for an IP address (port and scope zero).
pub fn encode(addr: &IpAddr) -> Vec<u8> {
    match addr {
        IpAddr::V4(a) => SockaddrIn {
            family: AF_INET,
            addr: a.octets(),
            ..Default::default()
        }
        .as_bytes()
        .to_vec(),
        IpAddr::V6(a) => SockaddrIn6 {
            family: AF_INET6,
            addr: a.octets(),
            ..Default::default()
        }
        .as_bytes()
        .to_vec(),
    }
}
