//! EntryService: generic CRUD using the safe SQL builder.

mod entries;
pub use entries::{DatabaseInfo, EntryService};
