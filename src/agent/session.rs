use crate::catalog::CatalogStore;
use crate::domain::{AgentOption, Game, Language, OptionKind, ReportForm, SuggestForm};
use crate::error::{CoreError, Result};
use crate::infrastructure::{AckResponse, AgentApi, GenreListResponse, MenuResponse, ResultsResponse, TopList};
use std::sync::Arc;
use tracing::{debug, warn};

/// Where the dialogue currently is, together with everything the UI needs to
/// render that position. The session never renders anything itself.
#[derive(Debug, Clone)]
pub enum SessionState {
    Closed,
    LanguageSelect,
    MenuRoot {
        greeting: String,
        options: Vec<AgentOption>,
        /// Filled in when a genre option was selected; picking one of these
        /// entries runs a genre query.
        genres: Vec<String>,
        /// Inline chat-style notice (service message or failure).
        notice: Option<String>,
    },
    AwaitingSearchText {
        prompt: String,
    },
    ShowingResults {
        message: String,
        results: Vec<Game>,
    },
    FormReport {
        form: ReportForm,
        error: Option<String>,
        confirmation: Option<String>,
    },
    FormSuggest {
        form: SuggestForm,
        error: Option<String>,
        confirmation: Option<String>,
    },
}

/// The conversational agent as a finite-state machine. One live session owns
/// its state exclusively; closing discards everything transient but keeps the
/// chosen language, so a reopened session skips language selection.
///
/// Every network transition is tagged with a monotonically increasing epoch.
/// A response whose epoch no longer matches (the user backed out or closed
/// the session meanwhile) is dropped silently instead of landing on a stale
/// context. That is the whole concurrency story: no locks, just discard.
pub struct AgentSession {
    api: Arc<dyn AgentApi>,
    state: SessionState,
    language: Option<Language>,
    /// Last-selected option id, for diagnostics.
    context: Option<String>,
    epoch: u64,
}

impl AgentSession {
    pub fn new(api: Arc<dyn AgentApi>) -> Self {
        Self {
            api,
            state: SessionState::Closed,
            language: None,
            context: None,
            epoch: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn language(&self) -> Option<Language> {
        self.language
    }

    /// Opens the session: language selection on first use, straight into the
    /// menu once a language is known.
    pub async fn open(&mut self) -> &SessionState {
        match self.language {
            None => {
                self.epoch += 1;
                self.state = SessionState::LanguageSelect;
            }
            Some(lang) => self.enter_menu(lang).await,
        }
        &self.state
    }

    /// Closes the session. Transient dialogue state is discarded and any
    /// in-flight response is stranded; only the language survives.
    pub fn close(&mut self) {
        self.epoch += 1;
        self.context = None;
        self.state = SessionState::Closed;
    }

    pub async fn choose_language(&mut self, lang: Language) -> &SessionState {
        if !matches!(self.state, SessionState::LanguageSelect) {
            warn!("choose_language outside of language selection, ignoring");
            return &self.state;
        }
        self.language = Some(lang);
        self.enter_menu(lang).await;
        &self.state
    }

    /// Acts on a menu option by id. Unknown ids are reported and ignored.
    pub async fn select_option(&mut self, option_id: &str) -> &SessionState {
        let Some(lang) = self.language else {
            return &self.state;
        };
        let SessionState::MenuRoot { options, .. } = &self.state else {
            warn!("Option '{option_id}' selected outside the menu, ignoring");
            return &self.state;
        };
        let Some(option) = options.iter().find(|o| o.id == option_id).cloned() else {
            warn!("Option '{option_id}' is not part of the current menu, ignoring");
            return &self.state;
        };

        self.context = Some(option.id.clone());
        match option.kind {
            OptionKind::Search => {
                self.state = SessionState::AwaitingSearchText {
                    prompt: lang.search_prompt().to_string(),
                };
            }
            OptionKind::Genre => {
                let token = self.begin_request();
                let outcome = self.api.genres(lang).await;
                self.apply_genres(token, outcome);
            }
            OptionKind::Action => match TopList::from_option_id(&option.id) {
                Some(list) => {
                    let token = self.begin_request();
                    let outcome = self.api.top_list(list, lang).await;
                    self.apply_results(token, outcome);
                }
                None => self.fail_inline(CoreError::MalformedResponse(format!(
                    "unknown action option '{}'",
                    option.id
                ))),
            },
            OptionKind::Report => {
                self.state = SessionState::FormReport {
                    form: ReportForm::default(),
                    error: None,
                    confirmation: None,
                };
            }
            OptionKind::Suggest => {
                self.state = SessionState::FormSuggest {
                    form: SuggestForm::default(),
                    error: None,
                    confirmation: None,
                };
            }
        }
        &self.state
    }

    /// Runs a genre query for one of the entries appended to the menu.
    pub async fn pick_genre(&mut self, genre: &str) -> &SessionState {
        let Some(lang) = self.language else {
            return &self.state;
        };
        if !matches!(self.state, SessionState::MenuRoot { .. }) {
            warn!("Genre picked outside the menu, ignoring");
            return &self.state;
        }
        let token = self.begin_request();
        let outcome = self.api.by_genre(genre, lang).await;
        self.apply_results(token, outcome);
        &self.state
    }

    pub async fn submit_search(&mut self, query: &str) -> &SessionState {
        let Some(lang) = self.language else {
            return &self.state;
        };
        if !matches!(self.state, SessionState::AwaitingSearchText { .. }) {
            warn!("Search text submitted outside the search prompt, ignoring");
            return &self.state;
        }
        let token = self.begin_request();
        let outcome = self.api.search(query, lang).await;
        self.apply_results(token, outcome);
        &self.state
    }

    /// Validates and submits a broken-link report. A missing game name keeps
    /// the form on screen with a localized error and no network call.
    pub async fn submit_report(&mut self, form: ReportForm) -> &SessionState {
        let Some(lang) = self.language else {
            return &self.state;
        };
        if !matches!(self.state, SessionState::FormReport { .. }) {
            warn!("Report submitted outside the report form, ignoring");
            return &self.state;
        }
        if let Err(err) = form.validate(lang) {
            self.state = SessionState::FormReport {
                form,
                error: Some(err.to_string()),
                confirmation: None,
            };
            return &self.state;
        }

        let token = self.begin_request();
        let outcome = self.api.report(&form, lang).await;
        self.apply_report(token, form, outcome);
        &self.state
    }

    /// Same contract as [`Self::submit_report`], for game suggestions.
    pub async fn submit_suggest(&mut self, form: SuggestForm) -> &SessionState {
        let Some(lang) = self.language else {
            return &self.state;
        };
        if !matches!(self.state, SessionState::FormSuggest { .. }) {
            warn!("Suggestion submitted outside the suggestion form, ignoring");
            return &self.state;
        }
        if let Err(err) = form.validate(lang) {
            self.state = SessionState::FormSuggest {
                form,
                error: Some(err.to_string()),
                confirmation: None,
            };
            return &self.state;
        }

        let token = self.begin_request();
        let outcome = self.api.suggest(&form, lang).await;
        self.apply_suggest(token, form, outcome);
        &self.state
    }

    /// Re-enters the menu from any leaf, re-fetching the options.
    pub async fn back(&mut self) -> &SessionState {
        match self.state {
            SessionState::Closed | SessionState::LanguageSelect => return &self.state,
            _ => {}
        }
        let Some(lang) = self.language else {
            return &self.state;
        };
        self.context = None;
        self.enter_menu(lang).await;
        &self.state
    }

    /// Resolves a selected result against the authoritative catalog. A miss
    /// is a benign desync between an agent result and a stale catalog
    /// snapshot, so it degrades to a no-op.
    pub fn resolve_selection<'a>(&self, store: &'a CatalogStore, id: &str) -> Option<&'a Game> {
        let found = store.find(id);
        if found.is_none() {
            debug!("Agent result '{id}' not present in the catalog, ignoring selection");
        }
        found
    }

    async fn enter_menu(&mut self, lang: Language) {
        let token = self.begin_request();
        let outcome = self.api.menu(lang).await;
        self.apply_menu(token, outcome);
    }

    fn begin_request(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }

    fn is_current(&self, token: u64) -> bool {
        self.epoch == token
    }

    fn apply_menu(&mut self, token: u64, outcome: Result<MenuResponse>) {
        if !self.is_current(token) {
            debug!("Dropping menu response for a superseded interaction");
            return;
        }
        match outcome {
            Ok(menu) => {
                self.state = SessionState::MenuRoot {
                    greeting: menu.greeting,
                    options: menu.options,
                    genres: Vec::new(),
                    notice: None,
                };
            }
            Err(err) => self.fail_inline(err),
        }
    }

    fn apply_genres(&mut self, token: u64, outcome: Result<GenreListResponse>) {
        if !self.is_current(token) {
            debug!("Dropping genre list response for a superseded interaction");
            return;
        }
        match outcome {
            Ok(response) => {
                if let SessionState::MenuRoot { genres, notice, .. } = &mut self.state {
                    *genres = response.genres;
                    *notice = Some(response.message);
                }
            }
            Err(err) => self.fail_inline(err),
        }
    }

    fn apply_results(&mut self, token: u64, outcome: Result<ResultsResponse>) {
        if !self.is_current(token) {
            debug!("Dropping results response for a superseded interaction");
            return;
        }
        match outcome {
            Ok(response) => {
                debug!(
                    "Showing {} results for context {:?}",
                    response.results.len(),
                    self.context
                );
                self.state = SessionState::ShowingResults {
                    message: response.message,
                    results: response.results,
                };
            }
            Err(err) => self.fail_inline(err),
        }
    }

    fn apply_report(&mut self, token: u64, form: ReportForm, outcome: Result<AckResponse>) {
        if !self.is_current(token) {
            debug!("Dropping report response for a superseded interaction");
            return;
        }
        self.state = match outcome {
            Ok(ack) => SessionState::FormReport {
                form,
                error: None,
                confirmation: Some(ack.message),
            },
            Err(err) => {
                warn!("Report submission failed: {err}");
                SessionState::FormReport {
                    form,
                    error: Some(err.to_string()),
                    confirmation: None,
                }
            }
        };
    }

    fn apply_suggest(&mut self, token: u64, form: SuggestForm, outcome: Result<AckResponse>) {
        if !self.is_current(token) {
            debug!("Dropping suggestion response for a superseded interaction");
            return;
        }
        self.state = match outcome {
            Ok(ack) => SessionState::FormSuggest {
                form,
                error: None,
                confirmation: Some(ack.message),
            },
            Err(err) => {
                warn!("Suggestion submission failed: {err}");
                SessionState::FormSuggest {
                    form,
                    error: Some(err.to_string()),
                    confirmation: None,
                }
            }
        };
    }

    /// Turns a service failure into an inline message on a state the user
    /// can still navigate out of. The menu keeps its options; everywhere
    /// else an empty result list carries the message, and `back` re-enters
    /// the menu.
    fn fail_inline(&mut self, err: CoreError) {
        let message = err.to_string();
        warn!("Agent service call failed: {message}");
        if let SessionState::MenuRoot { notice, .. } = &mut self.state {
            *notice = Some(message);
        } else {
            self.state = SessionState::ShowingResults {
                message,
                results: Vec::new(),
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    struct FakeAgent {
        calls: Mutex<Vec<String>>,
        fail_menu: AtomicBool,
    }

    impl FakeAgent {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail_menu: AtomicBool::new(false),
            })
        }

        fn record(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn result_game(id: &str) -> Game {
            Game {
                id: id.to_string(),
                name: id.to_uppercase(),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl AgentApi for FakeAgent {
        async fn menu(&self, lang: Language) -> Result<MenuResponse> {
            self.record(format!("menu:{}", lang.code()));
            if self.fail_menu.load(Ordering::SeqCst) {
                return Err(CoreError::MalformedResponse("menu unavailable".into()));
            }
            let option = |id: &str, kind: OptionKind| AgentOption {
                id: id.to_string(),
                label: id.to_string(),
                kind,
            };
            Ok(MenuResponse {
                greeting: "Hello!".to_string(),
                options: vec![
                    option("search", OptionKind::Search),
                    option("genres", OptionKind::Genre),
                    option("most-downloaded", OptionKind::Action),
                    option("bogus-action", OptionKind::Action),
                    option("report", OptionKind::Report),
                    option("suggest", OptionKind::Suggest),
                ],
            })
        }

        async fn genres(&self, lang: Language) -> Result<GenreListResponse> {
            self.record(format!("genres:{}", lang.code()));
            Ok(GenreListResponse {
                success: true,
                message: "Pick a genre".to_string(),
                genres: vec!["Action".to_string(), "RPG".to_string()],
            })
        }

        async fn top_list(&self, list: TopList, lang: Language) -> Result<ResultsResponse> {
            self.record(format!("top:{list:?}:{}", lang.code()));
            Ok(ResultsResponse {
                success: true,
                message: "Top list".to_string(),
                results: vec![Self::result_game("alpha")],
            })
        }

        async fn search(&self, query: &str, lang: Language) -> Result<ResultsResponse> {
            self.record(format!("search:{query}:{}", lang.code()));
            Ok(ResultsResponse {
                success: true,
                message: "Found it".to_string(),
                results: vec![Self::result_game("alpha")],
            })
        }

        async fn by_genre(&self, genre: &str, lang: Language) -> Result<ResultsResponse> {
            self.record(format!("by_genre:{genre}:{}", lang.code()));
            Ok(ResultsResponse {
                success: true,
                message: format!("Games in {genre}"),
                results: vec![Self::result_game("beta")],
            })
        }

        async fn report(&self, form: &ReportForm, lang: Language) -> Result<AckResponse> {
            self.record(format!("report:{}:{}", form.game_name, lang.code()));
            Ok(AckResponse {
                success: true,
                message: "Report received".to_string(),
            })
        }

        async fn suggest(&self, form: &SuggestForm, lang: Language) -> Result<AckResponse> {
            self.record(format!("suggest:{}:{}", form.game_name, lang.code()));
            Ok(AckResponse {
                success: true,
                message: "Suggestion received".to_string(),
            })
        }
    }

    async fn open_menu(fake: &Arc<FakeAgent>) -> AgentSession {
        let mut session = AgentSession::new(fake.clone());
        session.open().await;
        session.choose_language(Language::Fr).await;
        session
    }

    #[tokio::test]
    async fn first_open_asks_for_a_language() {
        let fake = FakeAgent::new();
        let mut session = AgentSession::new(fake.clone());
        session.open().await;
        assert!(matches!(session.state(), SessionState::LanguageSelect));
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn language_survives_close_and_reopen() {
        let fake = FakeAgent::new();
        let mut session = open_menu(&fake).await;
        assert!(matches!(session.state(), SessionState::MenuRoot { .. }));

        session.close();
        assert!(matches!(session.state(), SessionState::Closed));
        assert_eq!(session.language(), Some(Language::Fr));

        session.open().await;
        assert!(matches!(session.state(), SessionState::MenuRoot { .. }));
        assert_eq!(fake.calls(), ["menu:fr", "menu:fr"]);
    }

    #[tokio::test]
    async fn search_option_prompts_in_the_chosen_language() {
        let fake = FakeAgent::new();
        let mut session = open_menu(&fake).await;
        session.select_option("search").await;
        match session.state() {
            SessionState::AwaitingSearchText { prompt } => {
                assert_eq!(prompt, Language::Fr.search_prompt());
            }
            other => panic!("expected search prompt, got {other:?}"),
        }

        session.submit_search("hades").await;
        match session.state() {
            SessionState::ShowingResults { results, .. } => assert_eq!(results[0].id, "alpha"),
            other => panic!("expected results, got {other:?}"),
        }
        assert!(fake.calls().contains(&"search:hades:fr".to_string()));
    }

    #[tokio::test]
    async fn genre_option_appends_genres_to_the_menu() {
        let fake = FakeAgent::new();
        let mut session = open_menu(&fake).await;
        session.select_option("genres").await;
        match session.state() {
            SessionState::MenuRoot { genres, notice, .. } => {
                assert_eq!(genres, &["Action", "RPG"]);
                assert_eq!(notice.as_deref(), Some("Pick a genre"));
            }
            other => panic!("expected menu with genres, got {other:?}"),
        }

        session.pick_genre("RPG").await;
        match session.state() {
            SessionState::ShowingResults { message, results } => {
                assert_eq!(message, "Games in RPG");
                assert_eq!(results[0].id, "beta");
            }
            other => panic!("expected genre results, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn action_option_shows_the_named_top_list() {
        let fake = FakeAgent::new();
        let mut session = open_menu(&fake).await;
        session.select_option("most-downloaded").await;
        assert!(matches!(
            session.state(),
            SessionState::ShowingResults { .. }
        ));
        assert!(fake
            .calls()
            .contains(&"top:MostDownloaded:fr".to_string()));
    }

    #[tokio::test]
    async fn unknown_action_id_becomes_an_inline_notice() {
        let fake = FakeAgent::new();
        let mut session = open_menu(&fake).await;
        session.select_option("bogus-action").await;
        match session.state() {
            SessionState::MenuRoot { notice, .. } => assert!(notice.is_some()),
            other => panic!("expected menu with notice, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn report_without_a_name_never_reaches_the_service() {
        let fake = FakeAgent::new();
        let mut session = open_menu(&fake).await;
        session.select_option("report").await;
        session.submit_report(ReportForm::default()).await;

        match session.state() {
            SessionState::FormReport { error, confirmation, .. } => {
                assert_eq!(error.as_deref(), Some(Language::Fr.required_name_message()));
                assert!(confirmation.is_none());
            }
            other => panic!("expected form with validation error, got {other:?}"),
        }
        assert!(!fake.calls().iter().any(|c| c.starts_with("report:")));
    }

    #[tokio::test]
    async fn valid_report_confirms_and_back_reenters_the_menu() {
        let fake = FakeAgent::new();
        let mut session = open_menu(&fake).await;
        session.select_option("report").await;
        session
            .submit_report(ReportForm {
                game_name: "Alpha".to_string(),
                ..Default::default()
            })
            .await;

        match session.state() {
            SessionState::FormReport { confirmation, error, .. } => {
                assert_eq!(confirmation.as_deref(), Some("Report received"));
                assert!(error.is_none());
            }
            other => panic!("expected confirmed form, got {other:?}"),
        }

        session.back().await;
        assert!(matches!(session.state(), SessionState::MenuRoot { .. }));
    }

    #[tokio::test]
    async fn suggestion_flow_mirrors_the_report_flow() {
        let fake = FakeAgent::new();
        let mut session = open_menu(&fake).await;
        session.select_option("suggest").await;
        session
            .submit_suggest(SuggestForm {
                game_name: "Beta".to_string(),
                ..Default::default()
            })
            .await;
        match session.state() {
            SessionState::FormSuggest { confirmation, .. } => {
                assert_eq!(confirmation.as_deref(), Some("Suggestion received"));
            }
            other => panic!("expected confirmed form, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn menu_failure_is_inline_and_recoverable() {
        let fake = FakeAgent::new();
        fake.fail_menu.store(true, Ordering::SeqCst);
        let mut session = open_menu(&fake).await;
        match session.state() {
            SessionState::ShowingResults { message, results } => {
                assert!(message.contains("menu unavailable"));
                assert!(results.is_empty());
            }
            other => panic!("expected inline failure, got {other:?}"),
        }

        fake.fail_menu.store(false, Ordering::SeqCst);
        session.back().await;
        assert!(matches!(session.state(), SessionState::MenuRoot { .. }));
    }

    #[tokio::test]
    async fn responses_landing_after_close_are_dropped() {
        let fake = FakeAgent::new();
        let mut session = open_menu(&fake).await;

        // A request goes out, the session closes before it resolves.
        let token = session.begin_request();
        session.close();
        session.apply_results(
            token,
            Ok(ResultsResponse {
                success: true,
                message: "late".to_string(),
                results: vec![FakeAgent::result_game("alpha")],
            }),
        );
        assert!(matches!(session.state(), SessionState::Closed));
    }

    #[tokio::test]
    async fn responses_landing_after_back_are_dropped() {
        let fake = FakeAgent::new();
        let mut session = open_menu(&fake).await;

        let token = session.begin_request();
        session.back().await;
        session.apply_results(
            token,
            Ok(ResultsResponse {
                success: true,
                message: "late".to_string(),
                results: Vec::new(),
            }),
        );
        assert!(matches!(session.state(), SessionState::MenuRoot { .. }));
    }

    #[tokio::test]
    async fn result_selection_resolves_against_the_catalog() {
        let fake = FakeAgent::new();
        let session = open_menu(&fake).await;

        let mut store = CatalogStore::new();
        store.load(vec![Game {
            id: "alpha".to_string(),
            name: "Alpha".to_string(),
            ..Default::default()
        }]);

        assert!(session.resolve_selection(&store, "alpha").is_some());
        // A desync between agent results and the catalog is a no-op.
        assert!(session.resolve_selection(&store, "ghost").is_none());
    }
}
