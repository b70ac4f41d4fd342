//! litecrud: per-database SQLite CRUD over REST. Clients name a database,
//! declare an ad-hoc schema, and insert/list/sort/delete rows; every column
//! set is supplied at runtime.

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;
pub mod store;

pub use config::Config;
pub use error::AppError;
pub use routes::api_routes;
pub use service::{DatabaseInfo, EntryService};
pub use state::AppState;
pub use store::{Handle, HandleProvider};
