//! Worker pool for per-paper citation resolution.
//!
//! Architecture: one shared job queue of corpus folder names, drained by
//! `num_workers` worker tasks. Each worker runs [`process_paper`] on the
//! blocking thread pool (the work is file reads plus CPU-bound fuzzy
//! matching) and sends the [`PaperOutcome`] to a single results channel. The
//! receiving side of that channel is the only place shared state is touched.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::index::TitleIndex;
use crate::worker::process_paper;
use crate::{CitationExtractor, PaperOutcome};

/// Read-only state every worker needs.
pub struct WorkerContext {
    pub corpus_root: PathBuf,
    pub index: Arc<TitleIndex>,
    pub extractor: Arc<dyn CitationExtractor>,
}

/// A pool of worker tasks resolving one corpus folder per job.
///
/// Submit folder names via [`submit()`](PaperPool::submit); outcomes arrive on
/// the `results` sender passed to [`new()`](PaperPool::new), in completion
/// order. Once the pool is closed and every worker has exited, the results
/// channel closes.
pub struct PaperPool {
    job_tx: async_channel::Sender<String>,
    pool_handle: JoinHandle<()>,
}

impl PaperPool {
    /// Create a new pool with `num_workers` worker tasks (at least one).
    pub fn new(
        ctx: Arc<WorkerContext>,
        num_workers: usize,
        results: mpsc::UnboundedSender<PaperOutcome>,
    ) -> Self {
        let (job_tx, job_rx) = async_channel::unbounded::<String>();

        let pool_handle = tokio::spawn(async move {
            let mut handles = Vec::with_capacity(num_workers.max(1));
            for worker_id in 0..num_workers.max(1) {
                handles.push(tokio::spawn(worker_loop(
                    worker_id,
                    job_rx.clone(),
                    ctx.clone(),
                    results.clone(),
                )));
            }

            // Workers hold the remaining receiver and sender clones.
            drop(job_rx);
            drop(results);

            for h in handles {
                let _ = h.await;
            }
        });

        Self {
            job_tx,
            pool_handle,
        }
    }

    /// Queue one corpus folder for processing.
    pub async fn submit(&self, folder: String) {
        let _ = self.job_tx.send(folder).await;
    }

    /// Stop accepting jobs. Queued jobs still run.
    pub fn close(&self) {
        self.job_tx.close();
    }

    /// Close the pool and wait for every worker to finish.
    pub async fn shutdown(self) {
        self.job_tx.close();
        let _ = self.pool_handle.await;
    }
}

async fn worker_loop(
    worker_id: usize,
    job_rx: async_channel::Receiver<String>,
    ctx: Arc<WorkerContext>,
    results: mpsc::UnboundedSender<PaperOutcome>,
) {
    while let Ok(folder) = job_rx.recv().await {
        let task_ctx = Arc::clone(&ctx);
        let task_folder = folder.clone();
        let joined = tokio::task::spawn_blocking(move || {
            process_paper(
                &task_folder,
                &task_ctx.corpus_root,
                &task_ctx.index,
                task_ctx.extractor.as_ref(),
            )
        })
        .await;

        match joined {
            Ok(outcome) => {
                if results.send(outcome).is_err() {
                    tracing::debug!(worker_id, "results receiver dropped, stopping");
                    break;
                }
            }
            Err(e) => {
                tracing::error!(worker_id, folder = %folder, error = %e, "paper task failed");
            }
        }
    }
}
