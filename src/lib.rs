//! Living map of a distributed system.
//!
//! The crate keeps a live [`model::Snapshot`] of four layers (city districts,
//! a space view of planets and satellites, compute nodes and agents) in sync
//! with a snapshot service, lays the active layer out on a 2D canvas and
//! resolves clicks back to entities.
//!
//! The binary `livemap` prints snapshots and layouts, follows the stream and,
//! with the `egui` feature, opens an interactive viewer.

pub mod color;
pub mod config;
pub mod details;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod model;
pub mod render;
pub mod selection;
pub mod stream;

// Optional GUI functionality lives behind the `egui` feature flag.
#[cfg(feature = "egui")]
pub mod egui_app;

pub use error::{Error, Result};
