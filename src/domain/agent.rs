use crate::error::{CoreError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// The dialogue language. The agent service localizes everything server-side;
/// the only strings the client produces itself are the search prompt shown
/// before the first round-trip and the required-field message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Fr,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Fr => "fr",
        }
    }

    pub fn search_prompt(&self) -> &'static str {
        match self {
            Language::En => "Type the name of the game you are looking for:",
            Language::Fr => "Tapez le nom du jeu que vous recherchez :",
        }
    }

    pub fn required_name_message(&self) -> &'static str {
        match self {
            Language::En => "Please enter the game name.",
            Language::Fr => "Veuillez indiquer le nom du jeu.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Search,
    Genre,
    Action,
    Report,
    Suggest,
}

/// A menu entry as returned by the agent service. Options are never created
/// locally; the menu is whatever the service says it is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentOption {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: OptionKind,
}

/// Broken-link report. Only the game name is mandatory; validation runs
/// before any network call is made.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportForm {
    pub game_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_comment: Option<String>,
}

impl ReportForm {
    pub fn validate(&self, lang: Language) -> Result<()> {
        require_name(&self.game_name, lang)
    }
}

/// Suggestion for a game to add to the catalog.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestForm {
    pub game_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SuggestForm {
    pub fn validate(&self, lang: Language) -> Result<()> {
        require_name(&self.game_name, lang)
    }
}

fn require_name(name: &str, lang: Language) -> Result<()> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(
            lang.required_name_message().to_string(),
        ));
    }
    Ok(())
}
