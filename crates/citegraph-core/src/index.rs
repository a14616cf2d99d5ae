//! Title index: one pass over the corpus mapping identifiers to normalized
//! titles and back.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use crate::CoreError;
use crate::text::{normalize_title, strip_version};

/// File holding a paper's title inside its corpus folder.
pub const TITLE_FILE: &str = "title.txt";

/// Bidirectional identifier ↔ normalized-title maps for a corpus.
///
/// Built once before any matching happens and shared read-only afterwards
/// (wrapped in an `Arc` by the orchestrator).
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    title_to_id: BTreeMap<String, String>,
    id_to_title: BTreeMap<String, String>,
    id_to_raw_title: BTreeMap<String, String>,
    /// Keys of `title_to_id`, sorted. The candidate set for fuzzy matching.
    known_titles: Vec<String>,
}

impl TitleIndex {
    /// Scan `corpus_root` and index every folder that holds a `title.txt`.
    ///
    /// Folders are visited in name order. Identifier or title collisions are
    /// last-write-wins, so the lexicographically last folder wins. An
    /// unreadable title file is logged and the folder left out of the index.
    /// Only failure to list `corpus_root` itself is an error.
    pub fn build(corpus_root: &Path) -> Result<Self, CoreError> {
        let mut index = TitleIndex::default();

        for folder in list_corpus_folders(corpus_root)? {
            let title_path = corpus_root.join(&folder).join(TITLE_FILE);
            if !title_path.is_file() {
                continue;
            }
            match std::fs::read_to_string(&title_path) {
                Ok(raw) => index.insert(strip_version(&folder), &raw),
                Err(e) => {
                    tracing::warn!(folder = %folder, error = %e, "error reading title");
                }
            }
        }

        index.finish();
        tracing::info!(
            papers = index.len(),
            distinct_titles = index.known_titles.len(),
            "title index built"
        );
        Ok(index)
    }

    /// Build an index from in-memory `(folder name, raw title)` pairs,
    /// applying the same version stripping and normalization as [`build`](Self::build).
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut index = TitleIndex::default();
        for (folder, raw) in entries {
            index.insert(strip_version(folder), raw);
        }
        index.finish();
        index
    }

    fn insert(&mut self, id: &str, raw_title: &str) {
        let title = normalize_title(raw_title);
        self.title_to_id.insert(title.clone(), id.to_string());
        self.id_to_title.insert(id.to_string(), title);
        self.id_to_raw_title
            .insert(id.to_string(), raw_title.trim().to_string());
    }

    fn finish(&mut self) {
        self.known_titles = self.title_to_id.keys().cloned().collect();
    }

    /// Number of indexed identifiers (graph nodes).
    pub fn len(&self) -> usize {
        self.id_to_title.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_title.is_empty()
    }

    pub fn contains_id(&self, id: &str) -> bool {
        self.id_to_title.contains_key(id)
    }

    pub fn title_of(&self, id: &str) -> Option<&str> {
        self.id_to_title.get(id).map(String::as_str)
    }

    pub fn raw_title_of(&self, id: &str) -> Option<&str> {
        self.id_to_raw_title.get(id).map(String::as_str)
    }

    pub fn id_of(&self, title: &str) -> Option<&str> {
        self.title_to_id.get(title).map(String::as_str)
    }

    /// All distinct normalized titles, lexicographically sorted.
    pub fn known_titles(&self) -> &[String] {
        &self.known_titles
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.id_to_title.keys().map(String::as_str)
    }

    pub fn title_to_id(&self) -> &BTreeMap<String, String> {
        &self.title_to_id
    }

    pub fn id_to_title(&self) -> &BTreeMap<String, String> {
        &self.id_to_title
    }

    /// Write the node listing: one `<id>\t<normalized title>` line per paper.
    pub fn write_node_listing(&self, w: &mut dyn Write) -> std::io::Result<()> {
        for (id, title) in &self.id_to_title {
            writeln!(w, "{}\t{}", id, title)?;
        }
        w.flush()
    }
}

/// List the entry names directly under `corpus_root`, sorted.
pub fn list_corpus_folders(corpus_root: &Path) -> Result<Vec<String>, CoreError> {
    let read_dir = std::fs::read_dir(corpus_root).map_err(|source| CoreError::CorpusRoot {
        path: corpus_root.to_path_buf(),
        source,
    })?;

    let mut names: Vec<String> = read_dir
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}
