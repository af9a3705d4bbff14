//! Configuration types for engine adapters.
//!
//! - `ConnectionDescriptor`: where and how to connect
//! - `NetworkDescriptor` / `FileDescriptor`: per-transport settings
//! - `TlsMode`: explicit three-state TLS preference
//!
//! # Security
//! Secrets live only inside `Secret`, which is zeroed on drop and never
//! printed or serialized.

mod connection;

pub use connection::{ConnectionDescriptor, FileDescriptor, NetworkDescriptor, Secret, TlsMode};
