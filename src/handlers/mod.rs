//! HTTP handlers for entry CRUD and database management.

pub mod databases;
pub mod entries;
pub use databases::*;
pub use entries::*;
