use super::query::{parse_date, QueryEngine};
use super::size::parse_size;
use crate::domain::{Game, QuerySpec, SortKey};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Handed out by [`CatalogStore::begin_load`]; a completion is only applied
/// if its ticket still matches the newest load. Overlapping fetches thus
/// resolve to "latest request wins" no matter in which order the responses
/// arrive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// Owns the authoritative catalog and the current filter/sort spec, and keeps
/// a recomputed view of the two in sync. All state lives here; nothing is
/// shared with the agent session.
#[derive(Default)]
pub struct CatalogStore {
    catalog: Vec<Game>,
    spec: QuerySpec,
    view: Vec<Game>,
    genres: Vec<String>,
    generation: u64,
}

impl CatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a catalog load and supersedes any load still in flight.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket(self.generation)
    }

    /// Replaces the catalog wholesale if `ticket` belongs to the newest
    /// load. Returns false (and changes nothing) for a stale completion.
    pub fn complete_load(&mut self, ticket: LoadTicket, games: Vec<Game>) -> bool {
        if ticket.0 != self.generation {
            debug!("Dropping catalog load {} superseded by {}", ticket.0, self.generation);
            return false;
        }

        flag_data_quality(&games);
        self.catalog = games;
        self.genres = collect_genres(&self.catalog);
        self.refresh();
        true
    }

    /// Shorthand for a load with no competing fetches.
    pub fn load(&mut self, games: Vec<Game>) {
        let ticket = self.begin_load();
        self.complete_load(ticket, games);
    }

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.spec.search_text = text.into();
        self.refresh();
    }

    pub fn set_genre(&mut self, genre: Option<String>) {
        self.spec.genre = genre.filter(|g| !g.is_empty());
        self.refresh();
    }

    pub fn set_sort(&mut self, sort: SortKey) {
        self.spec.sort = sort;
        self.refresh();
    }

    pub fn reset_filters(&mut self) {
        self.spec = QuerySpec::default();
        self.refresh();
    }

    pub fn refresh(&mut self) {
        self.view = QueryEngine::apply(&self.catalog, &self.spec);
    }

    pub fn view(&self) -> &[Game] {
        &self.view
    }

    pub fn spec(&self) -> &QuerySpec {
        &self.spec
    }

    /// (view size, total size) for the "N / M games" display.
    pub fn counts(&self) -> (usize, usize) {
        (self.view.len(), self.catalog.len())
    }

    /// Deduplicated, alphabetically sorted genre tags across the full
    /// catalog (not the filtered view). Recomputed on load, not on refresh.
    pub fn available_genres(&self) -> &[String] {
        &self.genres
    }

    /// Identity lookup against the authoritative catalog, used to resolve
    /// agent results back to catalog entries.
    pub fn find(&self, id: &str) -> Option<&Game> {
        self.catalog.iter().find(|g| g.id == id)
    }
}

fn collect_genres(catalog: &[Game]) -> Vec<String> {
    let set: BTreeSet<&String> = catalog.iter().flat_map(|g| g.genre.iter()).collect();
    set.into_iter().cloned().collect()
}

/// Non-fatal data-quality pass over a freshly fetched catalog. Records that
/// cannot participate in some sort orders still load, but get flagged.
fn flag_data_quality(games: &[Game]) {
    for game in games {
        if game.genre.is_empty() {
            warn!("Record '{}' carries no genre tags", game.name);
        }
        if parse_date(&game.date_added) == i64::MIN {
            warn!(
                "Record '{}' has an unparseable dateAdded '{}', sorts as earliest",
                game.name, game.date_added
            );
        }
        if parse_size(&game.size) == 0.0 {
            warn!(
                "Record '{}' has a size '{}' that does not match '<number> <unit>', sorts as zero",
                game.name, game.size
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(name: &str, genres: &[&str], views: u64, date: &str) -> Game {
        Game {
            id: name.to_lowercase(),
            name: name.to_string(),
            genre: genres.iter().map(|g| g.to_string()).collect(),
            views,
            date_added: date.to_string(),
            ..Default::default()
        }
    }

    fn loaded_store() -> CatalogStore {
        let mut store = CatalogStore::new();
        store.load(vec![
            game("Alpha", &["RPG"], 10, "2024-01-01"),
            game("Beta", &["Action", "RPG"], 50, "2024-06-01"),
            game("Gamma", &["Action"], 30, "2024-03-01"),
        ]);
        store
    }

    fn names(view: &[Game]) -> Vec<&str> {
        view.iter().map(|g| g.name.as_str()).collect()
    }

    #[test]
    fn load_recomputes_view_and_genres() {
        let store = loaded_store();
        assert_eq!(names(store.view()), ["Beta", "Gamma", "Alpha"]);
        assert_eq!(store.available_genres(), ["Action", "RPG"]);
    }

    #[test]
    fn filters_refresh_the_view_and_counts() {
        let mut store = loaded_store();
        store.set_genre(Some("Action".to_string()));
        assert_eq!(names(store.view()), ["Beta", "Gamma"]);
        assert_eq!(store.counts(), (2, 3));

        store.set_search("gam");
        assert_eq!(names(store.view()), ["Gamma"]);
    }

    #[test]
    fn reset_filters_restores_full_catalog_in_recent_order() {
        let mut store = loaded_store();
        store.set_search("beta");
        store.set_genre(Some("RPG".to_string()));
        store.set_sort(SortKey::Name);

        store.reset_filters();
        store.refresh();
        assert_eq!(names(store.view()), ["Beta", "Gamma", "Alpha"]);
        assert_eq!(store.counts(), (3, 3));
    }

    #[test]
    fn empty_genre_means_no_filter() {
        let mut store = loaded_store();
        store.set_genre(Some(String::new()));
        assert_eq!(store.counts(), (3, 3));
    }

    #[test]
    fn stale_load_completion_is_dropped() {
        let mut store = CatalogStore::new();
        let first = store.begin_load();
        let second = store.begin_load();

        // The second fetch resolves first and wins.
        assert!(store.complete_load(second, vec![game("Beta", &[], 0, "")]));
        // The first fetch resolves late and must not clobber the catalog.
        assert!(!store.complete_load(first, vec![game("Alpha", &[], 0, "")]));

        assert_eq!(names(store.view()), ["Beta"]);
    }

    #[test]
    fn load_replaces_wholesale() {
        let mut store = loaded_store();
        store.load(vec![game("Delta", &["Indie"], 1, "2024-07-01")]);
        assert_eq!(names(store.view()), ["Delta"]);
        assert_eq!(store.available_genres(), ["Indie"]);
    }

    #[test]
    fn find_resolves_by_identity() {
        let store = loaded_store();
        assert!(store.find("alpha").is_some());
        assert!(store.find("unknown").is_none());
    }
}
