use crate::domain::{AgentOption, Game, Language, ReportForm, SuggestForm};
use crate::error::{CoreError, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Deserialize)]
pub struct MenuResponse {
    pub greeting: String,
    pub options: Vec<AgentOption>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreListResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResultsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub results: Vec<Game>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AckResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

/// The three leaf lists the menu's "action" options can point at. Option ids
/// coming off the wire are resolved into this enum once, so the rest of the
/// code never dispatches on raw strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopList {
    MostDownloaded,
    MostViewed,
    Recent,
}

impl TopList {
    pub fn from_option_id(id: &str) -> Option<Self> {
        match id {
            "most-downloaded" => Some(Self::MostDownloaded),
            "most-viewed" => Some(Self::MostViewed),
            "recent" => Some(Self::Recent),
            _ => None,
        }
    }

    fn path(&self) -> &'static str {
        match self {
            Self::MostDownloaded => "most-downloaded",
            Self::MostViewed => "most-viewed",
            Self::Recent => "recent",
        }
    }
}

/// One call per interaction; the service itself is stateless.
#[async_trait]
pub trait AgentApi: Send + Sync {
    async fn menu(&self, lang: Language) -> Result<MenuResponse>;
    async fn genres(&self, lang: Language) -> Result<GenreListResponse>;
    async fn top_list(&self, list: TopList, lang: Language) -> Result<ResultsResponse>;
    async fn search(&self, query: &str, lang: Language) -> Result<ResultsResponse>;
    async fn by_genre(&self, genre: &str, lang: Language) -> Result<ResultsResponse>;
    async fn report(&self, form: &ReportForm, lang: Language) -> Result<AckResponse>;
    async fn suggest(&self, form: &SuggestForm, lang: Language) -> Result<AckResponse>;
}

pub struct AgentClient {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct SearchPayload<'a> {
    query: &'a str,
    lang: &'a str,
}

#[derive(Serialize)]
struct GenrePayload<'a> {
    genre: &'a str,
    lang: &'a str,
}

#[derive(Serialize)]
struct FormPayload<'a, F: Serialize> {
    #[serde(flatten)]
    form: &'a F,
    lang: &'a str,
}

impl AgentClient {
    pub fn new(client: Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, lang: Language) -> Result<T> {
        info!("Agent GET /{path} lang={}", lang.code());
        let response = self
            .client
            .get(self.url(path))
            .query(&[("lang", lang.code())])
            .send()
            .await?;
        decode(response).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        info!("Agent POST /{path}");
        let response = self.client.post(self.url(path)).json(body).send().await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    if !response.status().is_success() {
        return Err(CoreError::BadStatus(response.status()));
    }
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| CoreError::MalformedResponse(e.to_string()))
}

/// `success: false` counts as a malformed response carrying the service's
/// own message; the session surfaces it inline like any other failure.
fn ensure(success: bool, message: &str) -> Result<()> {
    if !success {
        return Err(CoreError::MalformedResponse(if message.is_empty() {
            "agent service reported failure".to_string()
        } else {
            message.to_string()
        }));
    }
    Ok(())
}

#[async_trait]
impl AgentApi for AgentClient {
    async fn menu(&self, lang: Language) -> Result<MenuResponse> {
        self.get("options", lang).await
    }

    async fn genres(&self, lang: Language) -> Result<GenreListResponse> {
        let response: GenreListResponse = self.get("genres", lang).await?;
        ensure(response.success, &response.message)?;
        Ok(response)
    }

    async fn top_list(&self, list: TopList, lang: Language) -> Result<ResultsResponse> {
        let response: ResultsResponse = self.get(list.path(), lang).await?;
        ensure(response.success, &response.message)?;
        Ok(response)
    }

    async fn search(&self, query: &str, lang: Language) -> Result<ResultsResponse> {
        let payload = SearchPayload {
            query,
            lang: lang.code(),
        };
        let response: ResultsResponse = self.post("search", &payload).await?;
        ensure(response.success, &response.message)?;
        Ok(response)
    }

    async fn by_genre(&self, genre: &str, lang: Language) -> Result<ResultsResponse> {
        let payload = GenrePayload {
            genre,
            lang: lang.code(),
        };
        let response: ResultsResponse = self.post("genre", &payload).await?;
        ensure(response.success, &response.message)?;
        Ok(response)
    }

    async fn report(&self, form: &ReportForm, lang: Language) -> Result<AckResponse> {
        let payload = FormPayload {
            form,
            lang: lang.code(),
        };
        let response: AckResponse = self.post("report", &payload).await?;
        ensure(response.success, &response.message)?;
        Ok(response)
    }

    async fn suggest(&self, form: &SuggestForm, lang: Language) -> Result<AckResponse> {
        let payload = FormPayload {
            form,
            lang: lang.code(),
        };
        let response: AckResponse = self.post("suggest", &payload).await?;
        ensure(response.success, &response.message)?;
        Ok(response)
    }
}
