use crate::domain::Game;
use crate::error::{CoreError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct CatalogEnvelope {
    #[serde(default)]
    success: bool,
    data: Option<CatalogData>,
}

#[derive(Debug, Deserialize)]
struct CatalogData {
    games: Vec<Game>,
}

/// Read-only catalog source. A trait so the store logic can be driven by a
/// fake in tests; the one real implementation talks HTTP.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn fetch_games(&self) -> Result<Vec<Game>>;
}

pub struct CatalogClient {
    client: Client,
    endpoint: String,
}

impl CatalogClient {
    pub fn new(client: Client, endpoint: String) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn fetch_games(&self) -> Result<Vec<Game>> {
        info!("Fetching catalog from {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CoreError::BadStatus(response.status()));
        }

        let body = response.text().await?;
        let envelope: CatalogEnvelope = serde_json::from_str(&body)
            .map_err(|e| CoreError::MalformedResponse(e.to_string()))?;

        if !envelope.success {
            return Err(CoreError::MalformedResponse(
                "catalog service reported failure".to_string(),
            ));
        }
        let data = envelope
            .data
            .ok_or_else(|| CoreError::MalformedResponse("missing data.games".to_string()))?;

        info!("Catalog fetch returned {} games", data.games.len());
        Ok(data.games)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_parses_the_documented_shape() {
        let body = r#"{
            "success": true,
            "data": { "games": [
                { "_id": "1", "name": "Alpha", "genre": ["RPG"], "views": 3,
                  "downloads": 9, "size": "12 GB", "version": "1.0",
                  "dateAdded": "2024-01-01", "description": "d", "cracker": "c" }
            ]}
        }"#;
        let envelope: CatalogEnvelope = serde_json::from_str(body).unwrap();
        assert!(envelope.success);
        let games = envelope.data.unwrap().games;
        assert_eq!(games[0].id, "1");
        assert_eq!(games[0].date_added, "2024-01-01");
    }

    #[test]
    fn partially_malformed_records_still_deserialize() {
        let body = r#"{ "success": true, "data": { "games": [ { "name": "Bare" } ] } }"#;
        let envelope: CatalogEnvelope = serde_json::from_str(body).unwrap();
        let games = envelope.data.unwrap().games;
        assert!(games[0].genre.is_empty());
        assert_eq!(games[0].views, 0);
    }
}
