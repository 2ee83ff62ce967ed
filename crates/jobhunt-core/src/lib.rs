//! Core types and trait definitions for the jobhunt tracker.
//!
//! No HTTP or database code lives here. The SQLite backend implements
//! [`store::TrackerStore`]; the web layer builds pages with [`view`].

pub mod codes;
pub mod error;
pub mod ids;
pub mod model;
pub mod status;
pub mod store;
pub mod view;

pub use error::{Error, Result};
