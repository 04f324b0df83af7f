// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # h5rest - HDF5 REST connector core
//!
//! Translates the HDF5 data model (datatypes, dataspaces, selections,
//! references, links) to and from the JSON wire format of an HDF5 REST
//! server (HSDS), and resolves paths, links and attributes against a live
//! server.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use h5rest::{ConnectionConfig, Connector, RestConnector, Result};
//! use h5rest::link::{IndexType, IterOrder, IterParams};
//!
//! fn main() -> Result<()> {
//!     let config = ConnectionConfig::load()?.with_domain("/home/test/data.h5");
//!     let mut conn = Connector::connect(&config)?;
//!     let root = conn.open_domain("/home/test/data.h5")?;
//!
//!     let mut params = IterParams::new(IndexType::Name, IterOrder::Increasing);
//!     conn.iterate_links(&root, &mut params, &mut |name, entry| {
//!         println!("{} ({})", name, entry.info.kind().wire_name());
//!         0
//!     })?;
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |                    Connector (RestConnector trait)                  |
//! +---------------------------------------------------------------------+
//! |  resolver  |  link (table / traverse / ops)  |  attribute  |  visit  |
//! +---------------------------------------------------------------------+
//! |      datatype | dataspace + selection | reference | object | path   |
//! +---------------------------------------------------------------------+
//! |            Session (domain, root, version, response buffer)         |
//! +---------------------------------------------------------------------+
//! |             Transport: HttpTransport | MemoryTransport              |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Key Types
//!
//! | Type | Description |
//! |------|-------------|
//! | [`TypeDescriptor`] | Native datatype, encoded to/decoded from `type` JSON |
//! | [`ShapeDescriptor`] | Dataspace extent (null, scalar, simple) |
//! | [`Selection`] | All / none / points / regular hyperslab |
//! | [`Session`] | Transport, response buffer and current domain |
//! | [`Connector`] | [`RestConnector`] implementation over a session |

/// Attribute tables and iteration.
pub mod attribute;
/// Growable response buffer.
pub mod buffer;
/// Connection settings (TOML, environment, `~/.hscfg`).
pub mod config;
/// Capability trait and its session-backed implementation.
pub mod connector;
/// Shapes and selections.
pub mod dataspace;
/// Datatype descriptors and their JSON codec.
pub mod datatype;
pub mod error;
/// Small helpers over `serde_json::Value`.
pub mod json;
/// Links: tables, traversal and group-level operations.
pub mod link;
/// Remote object kinds and info records.
pub mod object;
/// Path splitting and URL escaping.
pub mod path;
/// Fixed-slot object reference buffers.
pub mod reference;
/// Path resolution against the server.
pub mod resolver;
pub mod session;
/// Request transports.
pub mod transport;
/// Server version gates.
pub mod version;
/// Recursive object visit.
pub mod visit;

pub use buffer::GrowableBuffer;
pub use config::ConnectionConfig;
pub use connector::{Connector, RestConnector};
pub use dataspace::{Extent, Hyperslab, Selection, ShapeDescriptor};
pub use datatype::TypeDescriptor;
pub use error::{Error, Result};
pub use object::{ObjectInfo, ObjectKind, RemoteObject};
pub use resolver::Resolution;
pub use session::Session;
pub use transport::{MemoryTransport, Transport};
pub use version::ServerVersion;

/// Crate version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
