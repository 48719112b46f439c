use super::size::parse_size;
use crate::domain::{Game, QuerySpec, SortKey};
use std::cmp::Reverse;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Pure filter/sort pipeline over the catalog. Never mutates its input and
/// never fails: records with absent fields are treated as empty, not as
/// errors.
pub struct QueryEngine;

impl QueryEngine {
    /// Applies `spec` to `catalog` and returns the resulting view:
    /// search filter, then genre filter, then a stable sort so that ties
    /// keep the catalog's original relative order.
    pub fn apply(catalog: &[Game], spec: &QuerySpec) -> Vec<Game> {
        let needle = spec.search_text.trim().to_lowercase();

        let mut view: Vec<Game> = catalog
            .iter()
            .filter(|game| needle.is_empty() || matches_search(game, &needle))
            .filter(|game| match &spec.genre {
                // Exact tag membership, unlike the substring search above.
                Some(genre) => game.genre.iter().any(|g| g == genre),
                None => true,
            })
            .cloned()
            .collect();

        match spec.sort {
            SortKey::Views => view.sort_by_key(|g| Reverse(g.views)),
            SortKey::Downloads => view.sort_by_key(|g| Reverse(g.downloads)),
            SortKey::Name => view.sort_by_cached_key(|g| collation_key(&g.name)),
            SortKey::Size => view.sort_by(|a, b| {
                parse_size(&b.size)
                    .partial_cmp(&parse_size(&a.size))
                    .unwrap_or(std::cmp::Ordering::Equal)
            }),
            SortKey::Recent => view.sort_by_key(|g| Reverse(parse_date(&g.date_added))),
        }

        view
    }
}

/// Case-insensitive substring match over name, description, cracker and the
/// genre tags. `needle` must already be lowercased.
fn matches_search(game: &Game, needle: &str) -> bool {
    game.name.to_lowercase().contains(needle)
        || game.description.to_lowercase().contains(needle)
        || game.cracker.to_lowercase().contains(needle)
        || game.genre.iter().any(|g| g.to_lowercase().contains(needle))
}

/// Case- and accent-insensitive sort key, so "Élite" files next to "Elite".
fn collation_key(name: &str) -> String {
    name.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Parses a `dateAdded` value into epoch milliseconds. Unparseable dates
/// compare as "earliest" so they sink to the bottom of the recent view.
pub(crate) fn parse_date(raw: &str) -> i64 {
    if let Ok(date_time) = chrono::DateTime::parse_from_rfc3339(raw) {
        return date_time.timestamp_millis();
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_utc().timestamp_millis();
    }
    if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis();
    }
    i64::MIN
}
