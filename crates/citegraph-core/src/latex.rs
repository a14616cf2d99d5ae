//! Light LaTeX cleanup, run before normalization on every title.

use once_cell::sync::Lazy;
use regex::Regex;

/// Strip common LaTeX markup from a title.
///
/// Font commands keep their argument, accent commands become the accented
/// letter, escaped specials lose their backslash and leftover grouping braces
/// are dropped.
pub fn strip_latex(text: &str) -> String {
    // \emph{X}, \textbf{X}, ... → X
    static FONT_CMD_RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"\\(?:emph|textbf|textit|textsc|texttt|textrm|mbox)\s*\{([^{}]*)\}").unwrap()
    });
    // {\em X}, {\bf X}, ... → X
    static FONT_DECL_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\{\\(?:em|it|bf|sc|tt|rm|sl)\s+([^{}]*)\}").unwrap());
    static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

    let mut result = FONT_CMD_RE.replace_all(text, "$1").into_owned();
    result = FONT_DECL_RE.replace_all(&result, "$1").into_owned();
    result = expand_latex_accents(&result);

    for (escaped, plain) in [("\\&", "&"), ("\\_", "_"), ("\\#", "#"), ("\\%", "%")] {
        result = result.replace(escaped, plain);
    }
    result = result.replace('~', " ");
    result = result.replace(['{', '}'], "");

    WS_RE.replace_all(&result, " ").trim().to_string()
}

fn expand_latex_accents(text: &str) -> String {
    // {\'e}, {\"{o}}
    static ACCENT_BRACED: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#"\{\\(['"`^~])\{?([a-zA-Z])\}?\}"#).unwrap());
    // \'e, \"o
    static ACCENT_UNBRACED: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#"\\(['"`^~])\{?([a-zA-Z])\}?"#).unwrap());

    let result = ACCENT_BRACED.replace_all(text, apply_accent);
    ACCENT_UNBRACED.replace_all(&result, apply_accent).into_owned()
}

fn apply_accent(caps: &regex::Captures) -> String {
    let (accent, letter) = (&caps[1], &caps[2]);
    let combined = match (accent, letter) {
        ("'", "e") => 'é',
        ("'", "E") => 'É',
        ("'", "a") => 'á',
        ("'", "i") => 'í',
        ("'", "o") => 'ó',
        ("'", "u") => 'ú',
        ("`", "e") => 'è',
        ("`", "a") => 'à',
        ("`", "o") => 'ò',
        ("\"", "o") => 'ö',
        ("\"", "O") => 'Ö',
        ("\"", "u") => 'ü',
        ("\"", "U") => 'Ü',
        ("\"", "a") => 'ä',
        ("\"", "A") => 'Ä',
        ("^", "e") => 'ê',
        ("^", "o") => 'ô',
        ("^", "i") => 'î',
        ("~", "n") => 'ñ',
        ("~", "a") => 'ã',
        ("~", "o") => 'õ',
        _ => return letter.to_string(),
    };
    combined.to_string()
}
