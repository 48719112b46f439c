use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Newest first, by dateAdded.
    #[default]
    Recent,
    Views,
    Downloads,
    Name,
    Size,
}

/// The current filter/sort intent. An empty search text and an unset genre
/// both mean "no filter".
#[derive(Debug, Clone, Default)]
pub struct QuerySpec {
    pub search_text: String,
    pub genre: Option<String>,
    pub sort: SortKey,
}
