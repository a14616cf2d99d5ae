use std::io::Write;
use std::path::Path;

use citegraph_core::{CitedTitles, GraphSnapshot, RunConfig};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print where each artifact of a build goes.
pub fn print_run_header(w: &mut dyn Write, config: &RunConfig, color: ColorMode) -> std::io::Result<()> {
    let corpus = config.corpus_root.display().to_string();
    if color.enabled() {
        writeln!(w, "{} {}", "Corpus:".bold(), corpus.cyan())?;
    } else {
        writeln!(w, "Corpus: {}", corpus)?;
    }
    writeln!(w, "  nodes: {}", config.nodes_path.display())?;
    writeln!(w, "  edges: {}", config.edges_path.display())?;
    writeln!(w, "  log:   {}", config.log_path.display())?;
    writeln!(w, "  graph: {}", config.graph_path.display())?;
    writeln!(w, "  workers: {}", config.num_workers)?;
    writeln!(w)?;
    Ok(())
}

/// Final line of a build.
pub fn print_build_summary(
    w: &mut dyn Write,
    graph: &GraphSnapshot,
    color: ColorMode,
) -> std::io::Result<()> {
    let nodes = graph.node_count();
    let edges = graph.edge_count();
    if color.enabled() {
        writeln!(
            w,
            "Graph built with {} nodes and {} edges.",
            nodes.bold().green(),
            edges.bold().green()
        )
    } else {
        writeln!(w, "Graph built with {} nodes and {} edges.", nodes, edges)
    }
}

/// Dry-run listing of the candidate citations found in one paper folder.
pub fn print_candidates(
    w: &mut dyn Write,
    paper_dir: &Path,
    files: &[String],
    cited: &CitedTitles,
    color: ColorMode,
) -> std::io::Result<()> {
    let name = paper_dir
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| paper_dir.display().to_string());

    if color.enabled() {
        writeln!(
            w,
            "{} {} ({} candidate citations from {} files)\n",
            "DRY RUN:".bold().cyan(),
            name.bold(),
            cited.len(),
            files.len()
        )?;
    } else {
        writeln!(
            w,
            "DRY RUN: {} ({} candidate citations from {} files)\n",
            name,
            cited.len(),
            files.len()
        )?;
    }

    for file in files {
        writeln!(w, "  file: {}", file)?;
    }
    if !files.is_empty() {
        writeln!(w)?;
    }

    for (i, candidate) in cited.iter().enumerate() {
        let year = candidate
            .year
            .map(|y| y.to_string())
            .unwrap_or_else(|| "----".to_string());
        if color.enabled() {
            writeln!(
                w,
                "{} {}  {}",
                format!("[{}]", i + 1).bold().yellow(),
                year.dimmed(),
                candidate.title
            )?;
        } else {
            writeln!(w, "[{}] {}  {}", i + 1, year, candidate.title)?;
        }
    }

    if cited.is_empty() {
        if color.enabled() {
            writeln!(w, "{}", "No candidate citations found.".yellow())?;
        } else {
            writeln!(w, "No candidate citations found.")?;
        }
    }
    Ok(())
}
