use once_cell::sync::Lazy;
use regex::Regex;

use crate::latex::strip_latex;

static NON_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static VERSION_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"v\d+$").unwrap());

/// Normalize a title for comparison.
///
/// Steps (order matters):
/// 1. Strip LaTeX markup ([`strip_latex`])
/// 2. Lowercase
/// 3. Drop every character that is neither a word character nor whitespace
/// 4. Collapse whitespace runs to a single space
/// 5. Trim
///
/// Applied identically to `title.txt` contents and to extracted citation
/// strings, so both sides of a fuzzy match live in the same alphabet.
pub fn normalize_title(text: &str) -> String {
    let lowered = strip_latex(text).to_lowercase();
    let stripped = NON_WORD_RE.replace_all(&lowered, "");
    WS_RE.replace_all(&stripped, " ").trim().to_string()
}

/// Strip a trailing arXiv-style version suffix (`v` followed by digits).
///
/// `2101.00001v3` → `2101.00001`. Names without a suffix are returned as-is.
pub fn strip_version(folder_name: &str) -> &str {
    match VERSION_SUFFIX_RE.find(folder_name) {
        Some(m) => &folder_name[..m.start()],
        None => folder_name,
    }
}
