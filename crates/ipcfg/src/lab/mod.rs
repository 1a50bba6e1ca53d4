//! In-memory collaborators for exercising the library without a host.
//!
//! [`MemoryIpHelper`] keeps interfaces, unicast address rows and route rows
//! in memory and answers enumeration with a real linked record buffer built
//! by [`Encoder`]. [`RecordingRunner`] stands in for the configuration tool.
//!
//! ```ignore
//! use ipcfg::Host;
//! use ipcfg::lab::{MemoryIpHelper, RecordingRunner};
//!
//! let host = Host::new(MemoryIpHelper::new().with_interface(ethernet), RecordingRunner::new());
//! let mut ifc = host.interface_by_friendly_name("Ethernet")?;
//! host.sync_addresses(&mut ifc, &["10.0.0.9/24".parse()?])?;
//! ```

mod encode;
mod memory;
mod runner;

pub use encode::{Encoder, encode_interfaces};
pub use memory::{MemoryIpHelper, Op};
pub use runner::RecordingRunner;
