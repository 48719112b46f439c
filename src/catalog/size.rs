use once_cell::sync::OnceCell;
use regex::Regex;

static SIZE_PATTERN: OnceCell<Regex> = OnceCell::new();

/// Converts a human-readable size string ("12.5 GB") into a KB-equivalent
/// magnitude used for relative ordering only. The GB factor is 1024*1024 to
/// stay consistent with how the catalog has always been ordered; the numbers
/// are never shown to anyone, so byte accuracy does not matter here.
///
/// Anything that does not contain a `<number> <gb|mb|kb>` token degrades to
/// 0, which sorts last under descending-size order.
pub fn parse_size(text: &str) -> f64 {
    let pattern =
        SIZE_PATTERN.get_or_init(|| Regex::new(r"(?i)(\d+\.?\d*)\s*(gb|mb|kb)").unwrap());

    let Some(caps) = pattern.captures(text) else {
        return 0.0;
    };

    let value: f64 = caps[1].parse().unwrap_or(0.0);
    match caps[2].to_ascii_lowercase().as_str() {
        "gb" => value * 1024.0 * 1024.0,
        "mb" => value * 1024.0,
        _ => value,
    }
}
