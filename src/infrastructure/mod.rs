mod clients;

pub use clients::agent::{
    AckResponse, AgentApi, AgentClient, GenreListResponse, MenuResponse, ResultsResponse, TopList,
};
pub use clients::catalog::{CatalogApi, CatalogClient};
