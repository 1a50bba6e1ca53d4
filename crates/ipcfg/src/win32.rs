//! [`IpHelper`] backed by the running system's `iphlpapi.dll`.

use std::ffi::c_void;
use std::mem;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::ptr;

use windows_sys::Win32::Foundation::{ERROR_BUFFER_OVERFLOW, ERROR_NO_DATA, NO_ERROR};
use windows_sys::Win32::NetworkManagement::IpHelper::{
    ConvertInterfaceGuidToLuid, CreateIpForwardEntry2, CreateUnicastIpAddressEntry,
    DeleteIpForwardEntry2, DeleteUnicastIpAddressEntry, FreeMibTable, GetAdaptersAddresses,
    GetIpForwardEntry2, GetIpForwardTable2, GetUnicastIpAddressEntry, GetUnicastIpAddressTable,
    IP_ADDRESS_PREFIX, InitializeIpForwardEntry, InitializeUnicastIpAddressEntry,
    MIB_IPFORWARD_ROW2, MIB_IPFORWARD_TABLE2, MIB_UNICASTIPADDRESS_ROW,
    MIB_UNICASTIPADDRESS_TABLE,
};
use windows_sys::Win32::NetworkManagement::Ndis::NET_LUID_LH;
use windows_sys::Win32::Networking::WinSock::{
    AF_INET, AF_INET6, IN_ADDR, IN_ADDR_0, IN6_ADDR, IN6_ADDR_0, SOCKADDR_IN, SOCKADDR_IN6,
    SOCKADDR_IN6_0, SOCKADDR_INET,
};
use windows_sys::core::GUID;

use crate::error::{Error, Result};
use crate::helper::{Fill, IpHelper, RouteRow, UnicastRow};
use crate::net::IpNet;
use crate::record::AdapterBuffer;
use crate::types::{AddressFamily, DadState, Guid, Luid, PrefixOrigin, RouteOrigin, RouteProtocol, SuffixOrigin};

/// The host's IP helper service.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemIpHelper {
    _private: (),
}

impl SystemIpHelper {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check(status: u32, operation: &str) -> Result<()> {
    if status == NO_ERROR {
        Ok(())
    } else {
        Err(Error::from_status_with_context(status, operation))
    }
}

fn to_sockaddr(addr: IpAddr) -> SOCKADDR_INET {
    // SAFETY: SOCKADDR_INET is plain old data, all zeroes is a valid value
    let mut sa: SOCKADDR_INET = unsafe { mem::zeroed() };
    match addr {
        IpAddr::V4(v4) => {
            sa.Ipv4 = SOCKADDR_IN {
                sin_family: AF_INET,
                sin_port: 0,
                sin_addr: IN_ADDR {
                    S_un: IN_ADDR_0 {
                        S_addr: u32::from_ne_bytes(v4.octets()),
                    },
                },
                sin_zero: [0; 8],
            };
        }
        IpAddr::V6(v6) => {
            sa.Ipv6 = SOCKADDR_IN6 {
                sin6_family: AF_INET6,
                sin6_port: 0,
                sin6_flowinfo: 0,
                sin6_addr: IN6_ADDR {
                    u: IN6_ADDR_0 { Byte: v6.octets() },
                },
                Anonymous: SOCKADDR_IN6_0 { sin6_scope_id: 0 },
            };
        }
    }
    sa
}

fn from_sockaddr(sa: &SOCKADDR_INET) -> Option<IpAddr> {
    // SAFETY: every variant starts with the family tag
    match unsafe { sa.si_family } {
        AF_INET => {
            // SAFETY: tagged as IPv4
            let raw = unsafe { sa.Ipv4.sin_addr.S_un.S_addr };
            Some(IpAddr::V4(Ipv4Addr::from(raw.to_ne_bytes())))
        }
        AF_INET6 => {
            // SAFETY: tagged as IPv6
            let raw = unsafe { sa.Ipv6.sin6_addr.u.Byte };
            Some(IpAddr::V6(Ipv6Addr::from(raw)))
        }
        _ => None,
    }
}

fn net_luid(luid: Luid) -> NET_LUID_LH {
    NET_LUID_LH { Value: luid.0 }
}

fn luid_of(luid: &NET_LUID_LH) -> Luid {
    // SAFETY: every bit pattern is a valid u64
    Luid(unsafe { luid.Value })
}

/// A table allocated by the IP helper, released on drop.
struct MibTable<T>(*mut T);

impl<T> Drop for MibTable<T> {
    fn drop(&mut self) {
        if !self.0.is_null() {
            // SAFETY: the pointer came from a Get*Table2 call and is freed once
            unsafe { FreeMibTable(self.0 as *const c_void) };
        }
    }
}

fn unicast_from_raw(raw: &MIB_UNICASTIPADDRESS_ROW) -> Option<UnicastRow> {
    let Some(address) = from_sockaddr(&raw.Address) else {
        tracing::debug!("skipping unicast row without an address");
        return None;
    };
    Some(UnicastRow {
        interface_luid: luid_of(&raw.InterfaceLuid),
        interface_index: raw.InterfaceIndex,
        address,
        on_link_prefix_length: raw.OnLinkPrefixLength,
        prefix_origin: PrefixOrigin::from(raw.PrefixOrigin as u32),
        suffix_origin: SuffixOrigin::from(raw.SuffixOrigin as u32),
        valid_lifetime: raw.ValidLifetime,
        preferred_lifetime: raw.PreferredLifetime,
        dad_state: DadState::from(raw.DadState as u32),
        skip_as_source: raw.SkipAsSource != 0,
    })
}

fn unicast_to_raw(row: &UnicastRow) -> MIB_UNICASTIPADDRESS_ROW {
    // SAFETY: plain old data, zeroed before initialization
    let mut raw: MIB_UNICASTIPADDRESS_ROW = unsafe { mem::zeroed() };
    // SAFETY: `raw` is a valid, writable row
    unsafe { InitializeUnicastIpAddressEntry(&mut raw) };
    raw.Address = to_sockaddr(row.address);
    raw.InterfaceLuid = net_luid(row.interface_luid);
    raw.InterfaceIndex = row.interface_index;
    raw.OnLinkPrefixLength = row.on_link_prefix_length;
    raw.PrefixOrigin = row.prefix_origin as i32;
    raw.SuffixOrigin = row.suffix_origin as i32;
    raw.ValidLifetime = row.valid_lifetime;
    raw.PreferredLifetime = row.preferred_lifetime;
    raw.DadState = row.dad_state as i32;
    raw.SkipAsSource = u8::from(row.skip_as_source);
    raw
}

fn route_from_raw(raw: &MIB_IPFORWARD_ROW2) -> Option<RouteRow> {
    let (Some(prefix), Some(next_hop)) = (
        from_sockaddr(&raw.DestinationPrefix.Prefix),
        from_sockaddr(&raw.NextHop),
    ) else {
        tracing::debug!("skipping route row without addresses");
        return None;
    };
    Some(RouteRow {
        interface_luid: luid_of(&raw.InterfaceLuid),
        interface_index: raw.InterfaceIndex,
        destination: IpNet::new_clamped(prefix, raw.DestinationPrefix.PrefixLength),
        next_hop,
        site_prefix_length: raw.SitePrefixLength,
        valid_lifetime: raw.ValidLifetime,
        preferred_lifetime: raw.PreferredLifetime,
        metric: raw.Metric,
        protocol: RouteProtocol::from(raw.Protocol as u32),
        loopback: raw.Loopback != 0,
        autoconfigure: raw.AutoconfigureAddress != 0,
        publish: raw.Publish != 0,
        immortal: raw.Immortal != 0,
        age: raw.Age,
        origin: RouteOrigin::from(raw.Origin as u32),
    })
}

fn route_to_raw(row: &RouteRow) -> MIB_IPFORWARD_ROW2 {
    // SAFETY: plain old data, zeroed before initialization
    let mut raw: MIB_IPFORWARD_ROW2 = unsafe { mem::zeroed() };
    // SAFETY: `raw` is a valid, writable row
    unsafe { InitializeIpForwardEntry(&mut raw) };
    raw.InterfaceLuid = net_luid(row.interface_luid);
    raw.InterfaceIndex = row.interface_index;
    raw.DestinationPrefix = IP_ADDRESS_PREFIX {
        Prefix: to_sockaddr(row.destination.addr()),
        PrefixLength: row.destination.prefix_len(),
    };
    raw.NextHop = to_sockaddr(row.next_hop);
    raw.SitePrefixLength = row.site_prefix_length;
    raw.ValidLifetime = row.valid_lifetime;
    raw.PreferredLifetime = row.preferred_lifetime;
    raw.Metric = row.metric;
    raw.Protocol = row.protocol as i32;
    raw.Loopback = u8::from(row.loopback);
    raw.AutoconfigureAddress = u8::from(row.autoconfigure);
    raw.Publish = u8::from(row.publish);
    raw.Immortal = u8::from(row.immortal);
    raw.Origin = row.origin as i32;
    raw
}

impl IpHelper for SystemIpHelper {
    fn adapter_addresses(&self, family: AddressFamily, flags: u32, buf: &mut AdapterBuffer) -> Result<Fill> {
        let mut size = u32::try_from(buf.len()).unwrap_or(u32::MAX);
        let bytes = buf.as_mut_bytes();
        // SAFETY: `bytes` is writable for `size` bytes and 8-byte aligned
        let status = unsafe {
            GetAdaptersAddresses(
                u32::from(family as u16),
                flags,
                ptr::null(),
                bytes.as_mut_ptr().cast(),
                &mut size,
            )
        };
        match status {
            NO_ERROR => Ok(Fill::Complete),
            ERROR_BUFFER_OVERFLOW => Ok(Fill::Overflow {
                required: size as usize,
            }),
            ERROR_NO_DATA => Ok(Fill::NoData),
            code => Err(Error::from_status_with_context(code, "GetAdaptersAddresses")),
        }
    }

    fn unicast_addresses(&self, family: AddressFamily) -> Result<Vec<UnicastRow>> {
        let mut table: *mut MIB_UNICASTIPADDRESS_TABLE = ptr::null_mut();
        // SAFETY: `table` is valid to be written to
        let status = unsafe { GetUnicastIpAddressTable(family as u16, &mut table) };
        check(status, "GetUnicastIpAddressTable")?;
        let table = MibTable(table);

        // SAFETY: the call succeeded, so the table holds NumEntries rows
        let rows = unsafe {
            std::slice::from_raw_parts((*table.0).Table.as_ptr(), (*table.0).NumEntries as usize)
        };
        Ok(rows.iter().filter_map(unicast_from_raw).collect())
    }

    fn unicast_address(&self, luid: Luid, address: IpAddr) -> Result<UnicastRow> {
        let mut raw = unicast_to_raw(&UnicastRow::new(luid, IpNet::host(address)));
        // SAFETY: `raw` is a valid, writable row keyed by LUID and address
        let status = unsafe { GetUnicastIpAddressEntry(&mut raw) };
        check(status, "GetUnicastIpAddressEntry")?;
        unicast_from_raw(&raw).ok_or_else(|| Error::InvalidRecord("unicast row without an address".into()))
    }

    fn create_unicast_address(&self, row: &UnicastRow) -> Result<()> {
        let raw = unicast_to_raw(row);
        // SAFETY: `raw` is a fully initialized row
        check(unsafe { CreateUnicastIpAddressEntry(&raw) }, "CreateUnicastIpAddressEntry")
    }

    fn delete_unicast_address(&self, row: &UnicastRow) -> Result<()> {
        let raw = unicast_to_raw(row);
        // SAFETY: `raw` is a fully initialized row
        check(unsafe { DeleteUnicastIpAddressEntry(&raw) }, "DeleteUnicastIpAddressEntry")
    }

    fn routes(&self, family: AddressFamily) -> Result<Vec<RouteRow>> {
        let mut table: *mut MIB_IPFORWARD_TABLE2 = ptr::null_mut();
        // SAFETY: `table` is valid to be written to
        let status = unsafe { GetIpForwardTable2(family as u16, &mut table) };
        check(status, "GetIpForwardTable2")?;
        let table = MibTable(table);

        // SAFETY: the call succeeded, so the table holds NumEntries rows
        let rows = unsafe {
            std::slice::from_raw_parts((*table.0).Table.as_ptr(), (*table.0).NumEntries as usize)
        };
        Ok(rows.iter().filter_map(route_from_raw).collect())
    }

    fn route(&self, luid: Luid, destination: IpNet, next_hop: IpAddr) -> Result<RouteRow> {
        let mut raw = route_to_raw(&RouteRow::new(luid, destination, next_hop, 0));
        // SAFETY: `raw` is a valid, writable row keyed by LUID, prefix and next hop
        let status = unsafe { GetIpForwardEntry2(&mut raw) };
        check(status, "GetIpForwardEntry2")?;
        route_from_raw(&raw).ok_or_else(|| Error::InvalidRecord("route row without addresses".into()))
    }

    fn create_route(&self, row: &RouteRow) -> Result<()> {
        let raw = route_to_raw(row);
        // SAFETY: `raw` is a fully initialized row
        check(unsafe { CreateIpForwardEntry2(&raw) }, "CreateIpForwardEntry2")
    }

    fn delete_route(&self, row: &RouteRow) -> Result<()> {
        let raw = route_to_raw(row);
        // SAFETY: `raw` is a fully initialized row
        check(unsafe { DeleteIpForwardEntry2(&raw) }, "DeleteIpForwardEntry2")
    }

    fn luid_from_guid(&self, guid: &Guid) -> Result<Luid> {
        let raw = GUID {
            data1: guid.data1,
            data2: guid.data2,
            data3: guid.data3,
            data4: guid.data4,
        };
        let mut luid = NET_LUID_LH { Value: 0 };
        // SAFETY: both pointers are valid for the duration of the call
        let status = unsafe { ConvertInterfaceGuidToLuid(&raw, &mut luid) };
        check(status, "ConvertInterfaceGuidToLuid")?;
        Ok(luid_of(&luid))
    }
}
