use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub username: String,
}

/// A single catalog entry as delivered by the catalog service. The record is
/// immutable for the lifetime of a fetch cycle; a re-fetch replaces the whole
/// collection.
///
/// Metrics and the genre list default to empty when absent so that partially
/// malformed records still load. They get flagged as data-quality warnings
/// when the catalog is loaded, not rejected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    #[serde(default, alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cracker: String,
    #[serde(default)]
    pub genre: Vec<String>,
    #[serde(default)]
    pub views: u64,
    #[serde(default)]
    pub downloads: u64,
    /// Free-form "<number> <unit>" string, e.g. "12.5 GB".
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub version: String,
    /// ISO-8601 timestamp, only used for "recent" ordering.
    #[serde(default)]
    pub date_added: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_urls: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<String>>,
    /// BitTorrent info-hashes, not full magnet URIs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub torrent_links: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steam_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_online: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}
