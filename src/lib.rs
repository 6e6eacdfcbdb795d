//! # Etiket - Label Composition Library
//!
//! Etiket models a printable label as three ordered collections of
//! placeable entries (text, icon, barcode) and exchanges that composition
//! with a rendering/printing backend. It provides:
//!
//! - **Entry model**: validated entry types with editor defaults
//! - **Composition store**: ordered CRUD with store-owned ids
//! - **Image ingestion**: image resources to embeddable base64
//! - **Composition client**: load, preview, save and print over HTTP
//!
//! ## Quick Start
//!
//! ```no_run
//! use etiket::{
//!     client::CompositionClient,
//!     config::ClientConfig,
//!     model::EntryKind,
//!     session::Session,
//! };
//!
//! # async fn example() -> Result<(), etiket::EtiketError> {
//! let client = CompositionClient::new(ClientConfig::new("http://127.0.0.1:5000")?)?;
//! let mut session = Session::new();
//!
//! // Seed the session from the backend
//! session.load_all(&client).await?;
//!
//! // Add a barcode and switch it to QR
//! let id = session.add(EntryKind::Barcode);
//! session.update(EntryKind::Barcode, &id, "barcodeFormat", "QR_CODE")?;
//!
//! // Render and print
//! let bitmap = session.preview(&client).await?;
//! println!("preview: {} base64 chars", bitmap.len());
//! session.print(&client).await?;
//!
//! for notice in session.take_notices() {
//!     println!("{}", notice);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`model`] | Entry types, enumerations, settings |
//! | [`store`] | Composition store and snapshots |
//! | [`ingest`] | Image ingestion |
//! | [`client`] | Backend HTTP client |
//! | [`session`] | Editing session with atomic commits |
//! | [`notice`] | User notifications |
//! | [`config`] | Client configuration |
//! | [`error`] | Error types |

pub mod client;
pub mod config;
pub mod error;
pub mod ingest;
pub mod model;
pub mod notice;
pub mod session;
pub mod store;

// Re-exports for convenience
pub use client::CompositionClient;
pub use error::EtiketError;
pub use session::Session;
pub use store::{CompositionStore, Snapshot};
