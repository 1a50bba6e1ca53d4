//! Interface configuration for Windows hosts.
//!
//! This crate reads the host's adapter table through the IP helper API,
//! decodes it into [`Interface`] snapshots, and reconciles unicast
//! addresses, routes and DNS servers towards a desired state. Address and
//! route rows are changed through the IP helper directly; DNS servers,
//! administrative state and renames go through `netsh.exe`.
//!
//! The host is reached only through two traits, [`IpHelper`] and
//! [`CommandRunner`], so everything above them runs and is tested on any
//! platform.
//!
//! # Features
//!
//! - `output` - JSON/text output formatting
//! - `lab` - In-memory IP helper and recording command runner
//! - `full` - All features enabled
//!
//! # Example
//!
//! ```ignore
//! use ipcfg::{Host, RouteData};
//!
//! fn main() -> ipcfg::Result<()> {
//!     let host = Host::system()?;
//!
//!     for ifc in host.interfaces()? {
//!         println!("{}: {} {:?}", ifc.index, ifc.friendly_name, ifc.unicast_ip_nets);
//!     }
//!
//!     let mut eth = host.interface_by_friendly_name("Ethernet")?;
//!     host.sync_addresses(&mut eth, &["192.168.1.10/24".parse()?])?;
//!     host.sync_routes(&eth, &["0.0.0.0/0 via 192.168.1.1".parse::<RouteData>()?])?;
//!     host.set_dns(&eth, &["1.1.1.1".parse()?])?;
//!     Ok(())
//! }
//! ```
//!
//! # Declarative configuration
//!
//! ```ignore
//! use ipcfg::config::{ApplyOptions, InterfaceConfig};
//!
//! let config = InterfaceConfig::new()
//!     .address("192.168.1.10/24")?
//!     .route("0.0.0.0/0", |r| r.via("192.168.1.1"))?
//!     .dns("192.168.1.1")?;
//!
//! let result = host.apply_config(&mut eth, &config, ApplyOptions::default())?;
//! println!("{}", result.summary_text());
//! ```

// Core modules (always available)
pub mod address;
pub mod admin;
pub mod codepage;
pub mod command;
pub mod config;
pub mod dns;
pub mod error;
pub mod helper;
pub mod host;
pub mod interface;
pub mod net;
pub mod reconcile;
pub mod record;
pub mod route;
pub mod types;

// Feature-gated modules
#[cfg(feature = "output")]
pub mod output;

#[cfg(any(test, feature = "lab"))]
pub mod lab;

#[cfg(windows)]
mod win32;

// Re-export common types at crate root for convenience
pub use admin::AdminStatus;
pub use command::{CommandRunner, Netsh, Transcript};
pub use error::{BatchError, Error, OperationError, Result};
pub use helper::{AdapterFlags, EnumerateOptions, Fill, IpHelper, RouteRow, UnicastRow};
pub use host::Host;
pub use interface::Interface;
pub use net::IpNet;
pub use route::RouteData;
pub use types::{AddressFamily, Guid, Luid};

#[cfg(windows)]
pub use win32::SystemIpHelper;
