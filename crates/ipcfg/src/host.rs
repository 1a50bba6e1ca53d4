//! Entry point bundling the IP helper and the command runner.

use crate::command::CommandRunner;
use crate::error::{Error, Result, status};
use crate::helper::{EnumerateOptions, Fill, IpHelper};
use crate::interface::Interface;
use crate::record::{self, AdapterBuffer};
use crate::types::{Guid, Luid};

/// Enumeration attempts before giving up on a buffer that keeps growing.
const MAX_ATTEMPTS: usize = 4;

/// Enumerate adapters and decode them into interfaces.
///
/// The buffer starts at 15 KiB and is regrown to the size the host asks for
/// whenever it reports an overflow, up to four attempts in total.
pub fn enumerate_adapters<H: IpHelper + ?Sized>(
    helper: &H,
    opts: &EnumerateOptions,
) -> Result<Vec<Interface>> {
    record::layout::ensure_verified()?;

    let flags = opts.flags.to_raw();
    let mut buf = AdapterBuffer::with_size(AdapterBuffer::INITIAL_SIZE);

    for attempt in 1..=MAX_ATTEMPTS {
        match helper.adapter_addresses(opts.family, flags, &mut buf)? {
            Fill::Complete => return record::decode_interfaces(&buf.records()),
            Fill::NoData => {
                tracing::debug!(family = %opts.family, "no adapters");
                return Ok(Vec::new());
            }
            Fill::Overflow { required } => {
                let size = required.max(buf.len() + 1);
                tracing::debug!(attempt, have = buf.len(), required = size, "growing adapter buffer");
                buf.resize(size);
            }
        }
    }

    Err(Error::from_status_with_context(
        status::ERROR_BUFFER_OVERFLOW,
        "enumerating adapters",
    ))
}

/// All interfaces with the default options.
pub fn interfaces<H: IpHelper + ?Sized>(helper: &H) -> Result<Vec<Interface>> {
    enumerate_adapters(helper, &EnumerateOptions::default())
}

/// All interfaces with the given options.
pub fn interfaces_with<H: IpHelper + ?Sized>(
    helper: &H,
    opts: &EnumerateOptions,
) -> Result<Vec<Interface>> {
    enumerate_adapters(helper, opts)
}

fn find<H: IpHelper + ?Sized>(
    helper: &H,
    opts: &EnumerateOptions,
    key: impl FnOnce() -> String,
    pred: impl Fn(&Interface) -> bool,
) -> Result<Interface> {
    enumerate_adapters(helper, opts)?
        .into_iter()
        .find(|ifc| pred(ifc))
        .ok_or_else(|| Error::InterfaceNotFound { key: key() })
}

/// The interface with the given LUID.
pub fn interface_by_luid<H: IpHelper + ?Sized>(
    helper: &H,
    luid: Luid,
    opts: &EnumerateOptions,
) -> Result<Interface> {
    find(helper, opts, || format!("luid {luid}"), |ifc| ifc.luid == luid)
}

/// The interface with the given index.
///
/// Matches the effective index, which is the IPv6 index for adapters
/// without an IPv4 one.
pub fn interface_by_index<H: IpHelper + ?Sized>(
    helper: &H,
    index: u32,
    opts: &EnumerateOptions,
) -> Result<Interface> {
    find(helper, opts, || format!("index {index}"), |ifc| ifc.index == index)
}

/// The interface with the given friendly name.
///
/// Friendly names are always requested, whatever `opts` says.
pub fn interface_by_friendly_name<H: IpHelper + ?Sized>(
    helper: &H,
    name: &str,
    opts: &EnumerateOptions,
) -> Result<Interface> {
    let opts = opts.skip_friendly_name(false);
    find(helper, &opts, || format!("name {name:?}"), |ifc| ifc.friendly_name == name)
}

/// The interface with the given GUID.
pub fn interface_by_guid<H: IpHelper + ?Sized>(
    helper: &H,
    guid: &Guid,
    opts: &EnumerateOptions,
) -> Result<Interface> {
    let luid = helper.luid_from_guid(guid).map_err(|e| {
        if e.is_not_found() {
            Error::InterfaceNotFound {
                key: format!("guid {guid}"),
            }
        } else {
            e.with_context(format!("resolving {guid}"))
        }
    })?;
    interface_by_luid(helper, luid, opts)
}

/// A host's interface configuration.
///
/// Reads go through the IP helper; writes go through the IP helper for
/// addresses and routes and through the command runner for DNS servers,
/// administrative state and renames.
///
/// A `Host` does no locking. Enumeration may run from many threads at once,
/// but changing the same interface concurrently races.
///
/// # Example
///
/// ```ignore
/// use ipcfg::Host;
///
/// let host = Host::system()?;
/// let mut eth = host.interface_by_friendly_name("Ethernet")?;
/// host.sync_addresses(&mut eth, &["192.168.1.10/24".parse()?])?;
/// host.set_dns(&eth, &["1.1.1.1".parse()?])?;
/// ```
#[derive(Debug, Clone)]
pub struct Host<H, R> {
    helper: H,
    runner: R,
}

#[cfg(windows)]
impl Host<crate::win32::SystemIpHelper, crate::command::Netsh> {
    /// The running system, with `netsh.exe` for tool-driven changes.
    pub fn system() -> Result<Self> {
        Ok(Self::new(
            crate::win32::SystemIpHelper::new(),
            crate::command::Netsh::system()?,
        ))
    }
}

impl<H: IpHelper, R: CommandRunner> Host<H, R> {
    pub fn new(helper: H, runner: R) -> Self {
        Self { helper, runner }
    }

    pub fn helper(&self) -> &H {
        &self.helper
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// All interfaces with the default options.
    pub fn interfaces(&self) -> Result<Vec<Interface>> {
        interfaces(&self.helper)
    }

    /// All interfaces with the given options.
    pub fn interfaces_with(&self, opts: &EnumerateOptions) -> Result<Vec<Interface>> {
        interfaces_with(&self.helper, opts)
    }

    pub fn interface_by_luid(&self, luid: Luid) -> Result<Interface> {
        interface_by_luid(&self.helper, luid, &EnumerateOptions::default())
    }

    pub fn interface_by_index(&self, index: u32) -> Result<Interface> {
        interface_by_index(&self.helper, index, &EnumerateOptions::default())
    }

    pub fn interface_by_friendly_name(&self, name: &str) -> Result<Interface> {
        interface_by_friendly_name(&self.helper, name, &EnumerateOptions::default())
    }

    pub fn interface_by_guid(&self, guid: &Guid) -> Result<Interface> {
        interface_by_guid(&self.helper, guid, &EnumerateOptions::default())
    }
}
