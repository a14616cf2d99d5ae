use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::index::{TitleIndex, list_corpus_folders};
use crate::pool::{PaperPool, WorkerContext};
use crate::snapshot::GraphSnapshot;
use crate::{CitationExtractor, CoreError, PaperOutcome, ProgressEvent, ProgressFn, RunConfig};

/// A progress line is written to the narrative log every this many papers.
pub const PROGRESS_INTERVAL: usize = 50;

/// Applies completed paper outcomes to the graph and the two log streams.
///
/// Owned by the draining side only. Counters count every completed paper,
/// including those that produced no edges.
pub struct EdgeRecorder<E: Write, L: Write> {
    edge_log: E,
    narrative_log: L,
    processed: usize,
    edges: usize,
}

impl<E: Write, L: Write> EdgeRecorder<E, L> {
    pub fn new(edge_log: E, narrative_log: L) -> Self {
        Self {
            edge_log,
            narrative_log,
            processed: 0,
            edges: 0,
        }
    }

    /// Insert `outcome`'s edges into `graph` and append them to both logs.
    pub fn record(
        &mut self,
        outcome: &PaperOutcome,
        index: &TitleIndex,
        graph: &mut GraphSnapshot,
    ) -> std::io::Result<()> {
        self.processed += 1;

        for edge in &outcome.edges {
            graph.add_edge(&edge.citing_id, &edge.cited_id);
            writeln!(self.edge_log, "{} -> {}", edge.citing_id, edge.cited_id)?;
            writeln!(
                self.edge_log,
                "{} -> {}",
                index.title_of(&edge.citing_id).unwrap_or_default(),
                index.title_of(&edge.cited_id).unwrap_or_default()
            )?;
            writeln!(
                self.narrative_log,
                "[EDGE ADDED] {} -> {}",
                edge.candidate_title, edge.matched_title
            )?;
            self.edges += 1;
        }

        for line in &outcome.logs {
            tracing::debug!(citing = %outcome.citing_id, "{}", line);
        }

        if self.processed % PROGRESS_INTERVAL == 0 {
            writeln!(
                self.narrative_log,
                "Processed {} vertices, {} edges so far.",
                self.processed, self.edges
            )?;
            self.narrative_log.flush()?;
        }
        Ok(())
    }

    /// Papers recorded so far.
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Edges recorded so far, counting repeats of the same pair.
    pub fn edges(&self) -> usize {
        self.edges
    }

    /// Flush both logs and hand back the writers.
    pub fn finish(mut self) -> std::io::Result<(E, L)> {
        self.edge_log.flush()?;
        self.narrative_log.flush()?;
        Ok((self.edge_log, self.narrative_log))
    }
}

fn create_artifact(path: &Path) -> Result<BufWriter<File>, CoreError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| CoreError::Artifact {
            path: path.to_path_buf(),
            source,
        })
}

/// Build the citation graph for the corpus described by `config`.
///
/// 1. Build the title index (sequential) and write the node listing.
/// 2. Seed the graph with one node per indexed identifier.
/// 3. Queue one task per corpus folder on a [`PaperPool`].
/// 4. Drain outcomes in completion order into the graph, the edge log and
///    the narrative log.
///
/// The returned snapshot is not written to disk; see [`GraphSnapshot::save`].
pub async fn build_citation_graph(
    config: &RunConfig,
    extractor: Arc<dyn CitationExtractor>,
    progress: ProgressFn,
) -> Result<GraphSnapshot, CoreError> {
    let index = TitleIndex::build(&config.corpus_root)?;
    {
        let mut nodes_out = create_artifact(&config.nodes_path)?;
        index
            .write_node_listing(&mut nodes_out)
            .map_err(|source| CoreError::Artifact {
                path: config.nodes_path.clone(),
                source,
            })?;
    }
    progress(ProgressEvent::IndexBuilt {
        papers: index.len(),
    });

    let index = Arc::new(index);
    let mut graph = GraphSnapshot::seed(&index);

    let folders = list_corpus_folders(&config.corpus_root)?;
    let total = folders.len();

    let mut recorder = EdgeRecorder::new(
        create_artifact(&config.edges_path)?,
        create_artifact(&config.log_path)?,
    );

    let ctx = Arc::new(WorkerContext {
        corpus_root: config.corpus_root.clone(),
        index: Arc::clone(&index),
        extractor,
    });
    let (results_tx, mut results_rx) = mpsc::unbounded_channel::<PaperOutcome>();
    let pool = PaperPool::new(ctx, config.num_workers, results_tx);

    tracing::info!(
        folders = total,
        workers = config.num_workers,
        "dispatching paper tasks"
    );
    for folder in folders {
        pool.submit(folder).await;
    }
    pool.close();
    progress(ProgressEvent::Dispatched { total });

    while let Some(outcome) = results_rx.recv().await {
        recorder.record(&outcome, &index, &mut graph)?;
        progress(ProgressEvent::PaperDone {
            citing_id: outcome.citing_id,
            processed: recorder.processed(),
            total,
            edges_so_far: recorder.edges(),
        });
    }
    pool.shutdown().await;

    if recorder.processed() != total {
        tracing::warn!(
            processed = recorder.processed(),
            total,
            "some paper tasks did not report back"
        );
    }
    tracing::info!(
        processed = recorder.processed(),
        edges_logged = recorder.edges(),
        distinct_edges = graph.edge_count(),
        "all paper tasks drained"
    );
    recorder.finish()?;

    Ok(graph)
}
