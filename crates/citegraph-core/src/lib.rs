use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

pub mod config_file;
pub mod index;
pub mod latex;
pub mod matching;
pub mod orchestrator;
pub mod pool;
pub mod snapshot;
pub mod temporal;
pub mod text;
pub mod worker;

// Re-export for convenience
pub use index::TitleIndex;
pub use latex::strip_latex;
pub use matching::{CitationMatch, MATCH_THRESHOLD, match_citation, similarity};
pub use orchestrator::{EdgeRecorder, build_citation_graph};
pub use snapshot::GraphSnapshot;
pub use temporal::{IdDate, decode_id_date, is_temporally_plausible};
pub use text::{normalize_title, strip_version};
pub use worker::process_paper;

/// Candidates whose normalized title has at most this many chars are noise.
pub const MIN_TITLE_CHARS: usize = 10;

/// One bibliography entry reduced to its normalized title and optional year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateCitation {
    pub title: String,
    pub year: Option<u16>,
}

/// Deduplicated candidate citations for one paper, in first-seen order.
///
/// Shared by every bibliography file of the paper so the first occurrence of
/// a normalized title wins across files as well as within one.
#[derive(Debug, Clone, Default)]
pub struct CitedTitles {
    entries: Vec<CandidateCitation>,
    seen: HashSet<String>,
}

impl CitedTitles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize `raw_title` and record it unless it is noise or a duplicate.
    ///
    /// Returns `true` when a new candidate was added.
    pub fn offer(&mut self, raw_title: &str, year: Option<u16>) -> bool {
        let title = normalize_title(raw_title);
        if title.chars().count() <= MIN_TITLE_CHARS || self.seen.contains(&title) {
            return false;
        }
        self.seen.insert(title.clone());
        self.entries.push(CandidateCitation { title, year });
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateCitation> {
        self.entries.iter()
    }

    pub fn get(&self, title: &str) -> Option<&CandidateCitation> {
        self.entries.iter().find(|c| c.title == title)
    }
}

/// A citation resolved to another paper of the corpus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEdge {
    pub citing_id: String,
    pub cited_id: String,
    /// Normalized title as extracted from the citing paper's bibliography.
    pub candidate_title: String,
    /// Known title it matched.
    pub matched_title: String,
}

/// What one per-paper task hands back to the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct PaperOutcome {
    pub citing_id: String,
    pub edges: Vec<ResolvedEdge>,
    pub logs: Vec<String>,
}

/// Source of candidate citations for a paper folder.
///
/// Implementors read whatever bibliography files the folder holds. Failures
/// are handled per file inside the implementation; the worst case is an
/// empty [`CitedTitles`].
pub trait CitationExtractor: Send + Sync {
    fn cited_titles(&self, paper_dir: &Path) -> CitedTitles;
}

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("cannot read corpus root {path}: {source}")]
    CorpusRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error on {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot serialization error: {0}")]
    Snapshot(#[from] serde_json::Error),
    #[error("config error in {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Progress events emitted during a graph build.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    IndexBuilt {
        papers: usize,
    },
    /// All per-paper tasks have been queued.
    Dispatched {
        total: usize,
    },
    PaperDone {
        citing_id: String,
        processed: usize,
        total: usize,
        edges_so_far: usize,
    },
}

/// Configuration for one graph build.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub corpus_root: PathBuf,
    pub nodes_path: PathBuf,
    pub edges_path: PathBuf,
    pub log_path: PathBuf,
    pub graph_path: PathBuf,
    pub num_workers: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            corpus_root: PathBuf::from("./dataset_papers/"),
            nodes_path: PathBuf::from("nodes_parallelized.txt"),
            edges_path: PathBuf::from("edges_parallelized.txt"),
            log_path: PathBuf::from("log.txt"),
            graph_path: PathBuf::from("citation_graph.json"),
            num_workers: default_num_workers(),
        }
    }
}

/// Worker count matching the machine's available parallelism.
pub fn default_num_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

/// Shared progress callback type.
pub type ProgressFn = Arc<dyn Fn(ProgressEvent) + Send + Sync>;
