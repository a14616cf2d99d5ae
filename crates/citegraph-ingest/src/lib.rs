use std::path::{Path, PathBuf};

use thiserror::Error;

use citegraph_core::{CitationExtractor, CitedTitles};

pub mod decode;

pub use decode::read_bibliography_text;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("BBL/BIB extraction error: {0}")]
    Bbl(#[from] citegraph_bbl::BblError),
}

/// Bibliography source dialect, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BibliographyKind {
    /// `.bib`: `@type{key, ...}` records.
    Bib,
    /// `.bbl`: `\bibitem` formatted list.
    Bbl,
}

impl BibliographyKind {
    /// `None` for files that are not bibliography sources.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "bib" => Some(Self::Bib),
            "bbl" => Some(Self::Bbl),
            _ => None,
        }
    }
}

/// Extract one bibliography file into `cited`.
///
/// Returns the number of candidates that were new to `cited`.
pub fn extract_file(
    path: &Path,
    kind: BibliographyKind,
    cited: &mut CitedTitles,
) -> Result<usize, IngestError> {
    let content = read_bibliography_text(path)?;
    let added = match kind {
        BibliographyKind::Bib => citegraph_bbl::extract_cited_titles_from_bib_str(&content, cited)?,
        BibliographyKind::Bbl => citegraph_bbl::extract_cited_titles_from_bbl_str(&content, cited)?,
    };
    Ok(added)
}

/// Bibliography files directly inside `paper_dir`, sorted by file name.
pub fn bibliography_files(paper_dir: &Path) -> std::io::Result<Vec<(PathBuf, BibliographyKind)>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(paper_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(kind) = BibliographyKind::from_path(&path) {
            files.push((path, kind));
        }
    }
    files.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(files)
}

/// Collect the candidate cited titles of one paper folder.
///
/// Every `.bib` and `.bbl` file is read in file-name order into one shared
/// [`CitedTitles`], so the first occurrence of a title across files wins. A
/// file that cannot be read or parsed is logged and skipped.
pub fn extract_cited_titles(paper_dir: &Path) -> CitedTitles {
    let mut cited = CitedTitles::new();

    let files = match bibliography_files(paper_dir) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!(dir = %paper_dir.display(), error = %e, "cannot list paper folder");
            return cited;
        }
    };

    for (path, kind) in files {
        match extract_file(&path, kind, &mut cited) {
            Ok(added) => {
                tracing::trace!(path = %path.display(), added, "bibliography file extracted");
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping bibliography file");
            }
        }
    }

    cited
}

/// [`CitationExtractor`] over the `.bib` / `.bbl` files of a paper folder.
#[derive(Debug, Clone, Copy, Default)]
pub struct BibliographyExtractor;

impl CitationExtractor for BibliographyExtractor {
    fn cited_titles(&self, paper_dir: &Path) -> CitedTitles {
        extract_cited_titles(paper_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(BibliographyKind::from_path(Path::new("a/refs.bib")), Some(BibliographyKind::Bib));
        assert_eq!(BibliographyKind::from_path(Path::new("a/main.BBL")), Some(BibliographyKind::Bbl));
        assert_eq!(BibliographyKind::from_path(Path::new("a/title.txt")), None);
        assert_eq!(BibliographyKind::from_path(Path::new("a/Makefile")), None);
    }

    #[test]
    fn test_files_sorted_and_filtered() {
        let tmp = tempfile::tempdir().unwrap();
        for name in ["z.bib", "a.bbl", "title.txt", "m.tex"] {
            std::fs::write(tmp.path().join(name), "").unwrap();
        }
        std::fs::create_dir(tmp.path().join("nested.bib")).unwrap();

        let files = bibliography_files(tmp.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|(p, _)| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a.bbl", "z.bib"]);
    }

    #[test]
    fn test_bad_file_does_not_stop_others() {
        let tmp = tempfile::tempdir().unwrap();
        // Parses to nothing.
        std::fs::write(tmp.path().join("a.bbl"), "no items here").unwrap();
        std::fs::write(
            tmp.path().join("b.bib"),
            "@article{k,\n  title = {Deep Learning for Graphs},\n  year = {2020}\n}\n",
        )
        .unwrap();

        let cited = extract_cited_titles(tmp.path());
        assert_eq!(cited.len(), 1);
        assert_eq!(cited.get("deep learning for graphs").unwrap().year, Some(2020));
    }

    #[test]
    fn test_first_file_wins_on_duplicates() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(
            tmp.path().join("a.bbl"),
            "\\bibitem{k}\nA.\n\\newblock Deep Learning for Graphs.\n\\newblock Venue, 2019.\n",
        )
        .unwrap();
        std::fs::write(
            tmp.path().join("b.bib"),
            "@article{k,\n  title = {Deep Learning for Graphs},\n  year = {2020}\n}\n",
        )
        .unwrap();

        let cited = BibliographyExtractor.cited_titles(tmp.path());
        assert_eq!(cited.len(), 1);
        assert_eq!(cited.get("deep learning for graphs").unwrap().year, Some(2019));
    }

    #[test]
    fn test_missing_folder_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(extract_cited_titles(&tmp.path().join("gone")).is_empty());
    }
}
