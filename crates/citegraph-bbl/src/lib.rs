//! Bibliography parsing into candidate cited titles.
//!
//! Two source dialects are supported:
//!
//! - `.bib` databases: `@type{key, ...}` records with `title = {...}` and
//!   optional `year = {dddd}` fields.
//! - `.bbl` formatted lists: `\bibitem` entries whose title is the first
//!   `\newblock` block, with an optional `, dddd.` year.
//!
//! Both feed a shared [`CitedTitles`], which normalizes, filters noise and
//! keeps the first occurrence of each title across all of a paper's files.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use citegraph_core::CitedTitles;

#[derive(Error, Debug)]
pub enum BblError {
    #[error("no \\bibitem entries found")]
    NoBibItems,
    #[error("no BibTeX entries found")]
    NoBibEntries,
}

/// The display-block marker that opens each field of a `.bbl` entry.
const NEWBLOCK: &str = "\\newblock";

/// Parse `.bbl` content and offer each entry's title to `cited`.
///
/// Returns the number of candidates that were new to `cited`.
pub fn extract_cited_titles_from_bbl_str(
    content: &str,
    cited: &mut CitedTitles,
) -> Result<usize, BblError> {
    let entries = segment_bibitem_entries(content);
    if entries.is_empty() {
        return Err(BblError::NoBibItems);
    }

    let mut added = 0;
    for entry in entries {
        let Some(title) = bbl_entry_title(entry) else {
            continue;
        };
        if cited.offer(&title, bbl_entry_year(entry)) {
            added += 1;
        }
    }

    tracing::trace!(added, "parsed .bbl content");
    Ok(added)
}

/// Parse `.bib` content and offer each record's title to `cited`.
///
/// Returns the number of candidates that were new to `cited`.
pub fn extract_cited_titles_from_bib_str(
    content: &str,
    cited: &mut CitedTitles,
) -> Result<usize, BblError> {
    let entries = segment_bib_entries(content);
    if entries.is_empty() {
        return Err(BblError::NoBibEntries);
    }

    let mut added = 0;
    for entry in entries {
        let Some(title) = bib_field_title(entry) else {
            continue;
        };
        if cited.offer(title, bib_field_year(entry)) {
            added += 1;
        }
    }

    tracing::trace!(added, "parsed .bib content");
    Ok(added)
}

/// Split `.bbl` content on the `\bibitem` marker.
///
/// Text before the first marker (the `thebibliography` preamble) is dropped.
fn segment_bibitem_entries(content: &str) -> Vec<&str> {
    content.split("\\bibitem").skip(1).collect()
}

/// Reconstruct an entry's title from its first `\newblock` block.
///
/// Collection starts at the first line containing the marker (with every
/// marker removed from that line) and stops before the next line that
/// contains it. Lines are trimmed and joined with single spaces.
fn bbl_entry_title(entry: &str) -> Option<String> {
    let mut lines = entry.lines().skip_while(|line| !line.contains(NEWBLOCK));
    let first = lines.next()?;

    let mut parts = vec![first.replace(NEWBLOCK, "").trim().to_string()];
    parts.extend(
        lines
            .take_while(|line| !line.contains(NEWBLOCK))
            .map(|line| line.trim().to_string()),
    );
    Some(parts.join(" "))
}

/// Year from the first `, dddd.` in the entry.
fn bbl_entry_year(entry: &str) -> Option<u16> {
    static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r",\s*(\d{4})\.").unwrap());
    YEAR_RE.captures(entry).and_then(|c| c[1].parse().ok())
}

/// Split `.bib` content into record bodies, each starting after the
/// `@type{key,` header and running to the next header.
fn segment_bib_entries(content: &str) -> Vec<&str> {
    static ENTRY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"@\w+\s*\{[^,@]+,").unwrap());

    let headers: Vec<_> = ENTRY_RE.find_iter(content).collect();
    headers
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let end = headers.get(i + 1).map_or(content.len(), |next| next.start());
            &content[m.end()..end]
        })
        .collect()
}

/// `title = {...}` (balanced braces) or `title = "..."`; never `booktitle`.
fn bib_field_title(entry: &str) -> Option<&str> {
    static TITLE_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#"(?i)\btitle\s*=\s*([{"])"#).unwrap());

    let caps = TITLE_RE.captures(entry)?;
    let rest = &entry[caps.get(0)?.end()..];
    if &caps[1] == "{" {
        extract_balanced_braces(rest)
    } else {
        rest.find('"').map(|end| &rest[..end])
    }
}

/// Text up to the matching closing brace, handling nesting.
/// Input starts AFTER the opening `{`.
fn extract_balanced_braces(text: &str) -> Option<&str> {
    let mut depth = 1;

    for (i, ch) in text.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[..i]);
                }
            }
            _ => {}
        }
    }

    None
}

fn bib_field_year(entry: &str) -> Option<u16> {
    static YEAR_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#"(?i)\byear\s*=\s*[{"]?(\d{4})[}"]?"#).unwrap());
    YEAR_RE.captures(entry).and_then(|c| c[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(cited: &CitedTitles) -> Vec<&str> {
        cited.iter().map(|c| c.title.as_str()).collect()
    }

    const SAMPLE_BBL: &str = r#"\begin{thebibliography}{10}

\bibitem{kipf2017}
Thomas~N. Kipf and Max Welling.
\newblock Semi-supervised classification with graph convolutional
  networks.
\newblock In {\em International Conference on Learning Representations}, 2017.

\bibitem{zhou2020}
Jie Zhou, Ganqu Cui, and Maosong Sun.
\newblock Graph neural networks: A review of methods and applications.
\newblock {\em AI Open}, 1:57--81, 2020.

\bibitem{short}
A.~Person.
\newblock Notes.
\newblock Unpublished.

\end{thebibliography}
"#;

    #[test]
    fn test_segment_bibitem_entries() {
        let entries = segment_bibitem_entries(SAMPLE_BBL);
        assert_eq!(entries.len(), 3);
        assert!(entries[0].contains("Kipf"));
        assert!(entries[2].contains("Notes."));
    }

    #[test]
    fn test_bbl_title_spans_lines_until_next_block() {
        let entries = segment_bibitem_entries(SAMPLE_BBL);
        assert_eq!(
            bbl_entry_title(entries[0]).unwrap(),
            "Semi-supervised classification with graph convolutional networks."
        );
    }

    #[test]
    fn test_bbl_title_without_newblock_is_none() {
        assert_eq!(bbl_entry_title("{key}\nJust an author line.\n"), None);
    }

    #[test]
    fn test_bbl_year() {
        let entries = segment_bibitem_entries(SAMPLE_BBL);
        assert_eq!(bbl_entry_year(entries[0]), Some(2017));
        assert_eq!(bbl_entry_year(entries[1]), Some(2020));
        assert_eq!(bbl_entry_year(entries[2]), None);
    }

    #[test]
    fn test_extract_from_bbl() {
        let mut cited = CitedTitles::new();
        let added = extract_cited_titles_from_bbl_str(SAMPLE_BBL, &mut cited).unwrap();
        // "notes" is too short to keep.
        assert_eq!(added, 2);
        assert_eq!(
            titles(&cited),
            [
                "semisupervised classification with graph convolutional networks",
                "graph neural networks a review of methods and applications",
            ]
        );
        let zhou = cited
            .get("graph neural networks a review of methods and applications")
            .unwrap();
        assert_eq!(zhou.year, Some(2020));
    }

    #[test]
    fn test_bbl_without_bibitems_errors() {
        let mut cited = CitedTitles::new();
        let err = extract_cited_titles_from_bbl_str("\\begin{thebibliography}{0}", &mut cited);
        assert!(matches!(err, Err(BblError::NoBibItems)));
    }

    #[test]
    fn test_extract_balanced_braces() {
        assert_eq!(extract_balanced_braces("{BERT}: Pre-training} rest"), Some("{BERT}: Pre-training"));
        assert_eq!(extract_balanced_braces("unterminated {nested}"), None);
    }

    #[test]
    fn test_bbl_latex_markup_is_stripped() {
        let content = "\\bibitem{k}\nA.~Author.\n\\newblock {\\em Deep} Learning on Poincar{\\'e} Balls.\n\\newblock Venue, 2019.\n";
        let mut cited = CitedTitles::new();
        extract_cited_titles_from_bbl_str(content, &mut cited).unwrap();
        assert_eq!(titles(&cited), ["deep learning on poincaré balls"]);
    }

    const SAMPLE_BIB: &str = r#"
@inproceedings{kipf2017,
  author    = {Thomas N. Kipf and Max Welling},
  booktitle = {International Conference on Learning Representations},
  title     = {Semi-Supervised Classification with Graph Convolutional Networks},
  year      = {2017}
}

@article{devlin2019,
  Title = {{BERT}: Pre-training of Deep Bidirectional Transformers},
  journal = {arXiv preprint},
  Year = {2019},
}

@misc{tiny,
  title = {Tiny},
  year = {2001}
}

@book{notitle,
  author = {Nobody},
  year = {1999}
}
"#;

    #[test]
    fn test_bib_title_skips_booktitle() {
        let entries = segment_bib_entries(SAMPLE_BIB);
        assert_eq!(entries.len(), 4);
        assert_eq!(
            bib_field_title(entries[0]),
            Some("Semi-Supervised Classification with Graph Convolutional Networks")
        );
    }

    #[test]
    fn test_bib_title_nested_braces_and_case() {
        let entries = segment_bib_entries(SAMPLE_BIB);
        assert_eq!(
            bib_field_title(entries[1]),
            Some("{BERT}: Pre-training of Deep Bidirectional Transformers")
        );
        assert_eq!(bib_field_year(entries[1]), Some(2019));
        assert_eq!(bib_field_title(entries[3]), None);
    }

    #[test]
    fn test_bib_quoted_title() {
        let entry = r#" title = "Attention Is All You Need", year = 2017 "#;
        assert_eq!(bib_field_title(entry), Some("Attention Is All You Need"));
        assert_eq!(bib_field_year(entry), Some(2017));
    }

    #[test]
    fn test_extract_from_bib() {
        let mut cited = CitedTitles::new();
        let added = extract_cited_titles_from_bib_str(SAMPLE_BIB, &mut cited).unwrap();
        assert_eq!(added, 2);
        assert_eq!(
            titles(&cited),
            [
                "semisupervised classification with graph convolutional networks",
                "bert pretraining of deep bidirectional transformers",
            ]
        );
    }

    #[test]
    fn test_bib_without_entries_errors() {
        let mut cited = CitedTitles::new();
        let err = extract_cited_titles_from_bib_str("% empty database\n", &mut cited);
        assert!(matches!(err, Err(BblError::NoBibEntries)));
    }

    #[test]
    fn test_first_occurrence_wins_across_dialects() {
        let mut cited = CitedTitles::new();
        extract_cited_titles_from_bib_str(SAMPLE_BIB, &mut cited).unwrap();
        let added = extract_cited_titles_from_bbl_str(SAMPLE_BBL, &mut cited).unwrap();

        // Kipf is already known from the .bib with year 2017; only Zhou is new.
        assert_eq!(added, 1);
        assert_eq!(cited.len(), 3);
        let kipf = cited
            .get("semisupervised classification with graph convolutional networks")
            .unwrap();
        assert_eq!(kipf.year, Some(2017));
    }

    #[test]
    fn test_duplicate_keeps_first_year() {
        let content = "\\bibitem{a}\nX.\n\\newblock Deep Learning for Graphs.\n\\newblock Venue, 2020.\n\
                       \\bibitem{b}\nY.\n\\newblock Deep learning for graphs\n\\newblock Other, 2018.\n";
        let mut cited = CitedTitles::new();
        let added = extract_cited_titles_from_bbl_str(content, &mut cited).unwrap();
        assert_eq!(added, 1);
        assert_eq!(cited.get("deep learning for graphs").unwrap().year, Some(2020));
    }
}
