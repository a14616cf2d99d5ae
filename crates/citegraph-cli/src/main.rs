use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use citegraph_core::config_file::{self, ConfigFile};
use citegraph_core::{ProgressEvent, ProgressFn, RunConfig};
use citegraph_ingest::BibliographyExtractor;

mod output;

use output::ColorMode;

/// Citation Graph Builder - Resolve the bibliographies of a paper corpus into a citation graph
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the citation graph for a corpus of paper folders
    Build(BuildArgs),

    /// Dry run: list the candidate citations found in one paper folder
    Extract {
        /// Paper folder holding .bib / .bbl files
        paper_dir: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

#[derive(Args, Debug, Default)]
struct BuildArgs {
    /// Corpus root directory (one sub-folder per paper)
    #[arg(long)]
    corpus: Option<PathBuf>,

    /// Node listing output path
    #[arg(long)]
    nodes_out: Option<PathBuf>,

    /// Edge listing output path
    #[arg(long)]
    edges_out: Option<PathBuf>,

    /// Narrative log output path
    #[arg(long)]
    log_out: Option<PathBuf>,

    /// Graph snapshot (JSON) output path
    #[arg(long)]
    graph_out: Option<PathBuf>,

    /// Number of concurrent paper workers
    #[arg(short = 'j', long)]
    workers: Option<usize>,

    /// Read configuration from this file instead of the default locations
    #[arg(long)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Build(args) => build(args).await,
        Command::Extract {
            paper_dir,
            no_color,
        } => extract(paper_dir, no_color),
    }
}

/// Diagnostics go to stderr; `RUST_LOG` overrides the `info` default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Resolve configuration: CLI flags > config file(s) > defaults.
fn resolve_config(args: &BuildArgs) -> anyhow::Result<RunConfig> {
    let file = match &args.config {
        Some(path) => config_file::load_from_path(path)?
            .ok_or_else(|| anyhow::anyhow!("Config file not found: {}", path.display()))?,
        None => config_file::load_config(),
    };
    Ok(apply_overrides(&file, args))
}

fn apply_overrides(file: &ConfigFile, args: &BuildArgs) -> RunConfig {
    let mut config = RunConfig::default();
    file.apply_to(&mut config);

    let overrides = [
        (&args.corpus, &mut config.corpus_root),
        (&args.nodes_out, &mut config.nodes_path),
        (&args.edges_out, &mut config.edges_path),
        (&args.log_out, &mut config.log_path),
        (&args.graph_out, &mut config.graph_path),
    ];
    for (flag, target) in overrides {
        if let Some(path) = flag {
            *target = path.clone();
        }
    }
    if let Some(n) = args.workers {
        config.num_workers = n.max(1);
    }
    config
}

fn progress_bar() -> anyhow::Result<ProgressBar> {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{bar:40.green/dim}] {pos}/{len} papers (eta {eta}) {msg}",
        )?
        .progress_chars("=> "),
    );
    Ok(bar)
}

async fn build(args: BuildArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    let color = ColorMode(!args.no_color);
    let mut stdout = std::io::stdout();

    if !config.corpus_root.is_dir() {
        anyhow::bail!("Corpus root not found: {}", config.corpus_root.display());
    }
    output::print_run_header(&mut stdout, &config, color)?;

    let bar = progress_bar()?;
    let progress: ProgressFn = {
        let bar = bar.clone();
        Arc::new(move |event: ProgressEvent| match event {
            ProgressEvent::IndexBuilt { papers } => {
                bar.set_message(format!("{} titles indexed", papers));
            }
            ProgressEvent::Dispatched { total } => bar.set_length(total as u64),
            ProgressEvent::PaperDone {
                processed,
                edges_so_far,
                ..
            } => {
                bar.set_position(processed as u64);
                bar.set_message(format!("{} edges", edges_so_far));
            }
        })
    };

    let run = citegraph_core::build_citation_graph(&config, Arc::new(BibliographyExtractor), progress);
    let graph = tokio::select! {
        result = run => result?,
        _ = tokio::signal::ctrl_c() => {
            bar.abandon_with_message("interrupted");
            anyhow::bail!("Interrupted; logs written so far are kept");
        }
    };
    bar.finish_and_clear();

    graph.save(&config.graph_path)?;
    output::print_build_summary(&mut stdout, &graph, color)?;
    stdout.flush()?;
    Ok(())
}

fn extract(paper_dir: PathBuf, no_color: bool) -> anyhow::Result<()> {
    if !paper_dir.is_dir() {
        anyhow::bail!("Paper folder not found: {}", paper_dir.display());
    }

    let files: Vec<String> = citegraph_ingest::bibliography_files(&paper_dir)?
        .into_iter()
        .filter_map(|(path, _)| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    let cited = citegraph_ingest::extract_cited_titles(&paper_dir);

    let mut stdout = std::io::stdout();
    output::print_candidates(&mut stdout, &paper_dir, &files, &cited, ColorMode(!no_color))?;
    Ok(())
}
