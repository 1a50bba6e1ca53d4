//! Printable implementations for library types.

mod diff;
mod interface;
mod route;
