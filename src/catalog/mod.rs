mod query;
mod size;
mod store;

pub use query::QueryEngine;
pub use size::parse_size;
pub use store::{CatalogStore, LoadTicket};
