//! Declarative interface configuration.
//!
//! Instead of calling `add_address`, `delete_route` and friends one by one,
//! describe the desired state of an interface and let the library work out
//! the changes:
//!
//! ```ignore
//! use ipcfg::Host;
//! use ipcfg::config::{ApplyOptions, InterfaceConfig};
//!
//! let host = Host::system()?;
//! let mut ifc = host.interface_by_friendly_name("Ethernet")?;
//!
//! let config = InterfaceConfig::new()
//!     .address("192.168.1.10/24")?
//!     .route("0.0.0.0/0", |r| r.via("192.168.1.1").metric(25))?
//!     .dns("192.168.1.1")?;
//!
//! // Preview changes
//! let diff = host.diff_config(&ifc, &config)?;
//! println!("{}", diff.summary());
//!
//! // Apply changes
//! host.apply_config(&mut ifc, &config, ApplyOptions::default())?;
//! ```
//!
//! Applying only touches what differs, so running the same configuration
//! twice makes no changes the second time.

mod apply;
mod diff;
mod types;

pub use apply::{ApplyOptions, ApplyResult};
pub use diff::{ConfigDiff, compute_diff};
pub use types::*;
