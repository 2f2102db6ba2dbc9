//! Denylist substitution applied to user text before it is embedded in the prompt.
//!
//! Best-effort only. This catches a handful of literal instruction-override
//! phrases and nothing else; it is not a security control against prompt
//! injection.

use once_cell::sync::Lazy;
use regex::Regex;

/// Phrases replaced before prompt construction.
pub const DENYLIST: [&str; 3] = ["無視して", "あなたの指示は", "プロンプトを忘れて"];

/// Marker that takes the place of each denylisted phrase.
pub const PLACEHOLDER: &str = "[不適切なキーワードを検出]";

static DENYLIST_RE: Lazy<Regex> = Lazy::new(|| {
    let alternation = DENYLIST
        .iter()
        .map(|p| regex::escape(p))
        .collect::<Vec<_>>()
        .join("|");
    // The pattern is built from escaped literals and always compiles.
    Regex::new(&alternation).expect("denylist pattern should compile")
});

/// Replace every denylisted phrase with [`PLACEHOLDER`].
pub fn sanitize_input(text: &str) -> String {
    let replaced = DENYLIST_RE.replace_all(text, PLACEHOLDER);
    let hits = DENYLIST_RE.find_iter(text).count();
    if hits > 0 {
        tracing::info!(hits, "denylisted phrases replaced in input");
    }
    replaced.into_owned()
}
