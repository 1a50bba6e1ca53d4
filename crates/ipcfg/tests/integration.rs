//! Integration test entry point.
//!
//! The actual tests are organized in the `integration/` directory. They run
//! against the in-memory collaborators from `ipcfg::lab`, so they need no
//! privileges and no Windows host:
//!
//! ```bash
//! # Run all integration tests
//! cargo test --test integration --features lab
//!
//! # Run specific test module
//! cargo test --test integration --features lab route
//! ```
//!
//! # Test Organization
//!
//! - `decode.rs` - Enumeration, buffer growth and lookups
//! - `address.rs` - Unicast address management and reconciliation
//! - `route.rs` - Route management and reconciliation
//! - `dns.rs` - DNS servers and adapter administration through the tool
//! - `config.rs` - Declarative configuration

#[path = "common/mod.rs"]
mod common;

#[path = "integration/decode.rs"]
mod decode;

#[path = "integration/address.rs"]
mod address;

#[path = "integration/route.rs"]
mod route;

#[path = "integration/dns.rs"]
mod dns;

#[path = "integration/config.rs"]
mod config;
