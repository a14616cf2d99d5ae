//! The citation graph and its on-disk JSON form.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::CoreError;
use crate::index::TitleIndex;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct NodeData {
    title: String,
    raw_title: String,
}

/// Directed citation graph plus the title index it was built from.
///
/// Nodes are every indexed identifier; edges are citing → cited pairs. A
/// repeated pair is a single edge. Iteration and serialization are sorted by
/// identifier, so two snapshots of the same graph serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphSnapshot {
    nodes: BTreeMap<String, NodeData>,
    edges: BTreeSet<(String, String)>,
    title_to_id: BTreeMap<String, String>,
    id_to_title: BTreeMap<String, String>,
}

impl GraphSnapshot {
    /// One node per indexed identifier, no edges, index maps attached.
    pub fn seed(index: &TitleIndex) -> Self {
        let nodes = index
            .ids()
            .map(|id| {
                let data = NodeData {
                    title: index.title_of(id).unwrap_or_default().to_string(),
                    raw_title: index.raw_title_of(id).unwrap_or_default().to_string(),
                };
                (id.to_string(), data)
            })
            .collect();

        Self {
            nodes,
            edges: BTreeSet::new(),
            title_to_id: index.title_to_id().clone(),
            id_to_title: index.id_to_title().clone(),
        }
    }

    /// Add `citing → cited`. Returns `false` if the edge was already present.
    ///
    /// Endpoints missing from the node set are added as bare nodes.
    pub fn add_edge(&mut self, citing: &str, cited: &str) -> bool {
        for id in [citing, cited] {
            self.nodes.entry(id.to_string()).or_default();
        }
        self.edges.insert((citing.to_string(), cited.to_string()))
    }

    pub fn has_edge(&self, citing: &str, cited: &str) -> bool {
        self.edges
            .contains(&(citing.to_string(), cited.to_string()))
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Edges sorted by citing identifier, then cited identifier.
    pub fn edges(&self) -> impl Iterator<Item = (&str, &str)> {
        self.edges.iter().map(|(a, b)| (a.as_str(), b.as_str()))
    }

    pub fn raw_title(&self, id: &str) -> Option<&str> {
        self.nodes.get(id).map(|n| n.raw_title.as_str())
    }

    pub fn title_to_id(&self) -> &BTreeMap<String, String> {
        &self.title_to_id
    }

    pub fn id_to_title(&self) -> &BTreeMap<String, String> {
        &self.id_to_title
    }

    pub fn to_writer<W: Write>(&self, w: W) -> Result<(), CoreError> {
        serde_json::to_writer(w, &SnapshotFile::from(self))?;
        Ok(())
    }

    pub fn from_reader<R: std::io::Read>(r: R) -> Result<Self, CoreError> {
        let file: SnapshotFile = serde_json::from_reader(r)?;
        Ok(file.into())
    }

    /// Write the snapshot as JSON to `path`.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let file = std::fs::File::create(path).map_err(|source| CoreError::Artifact {
            path: path.to_path_buf(),
            source,
        })?;
        let mut w = BufWriter::new(file);
        self.to_writer(&mut w)?;
        w.flush().map_err(|source| CoreError::Artifact {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(
            path = %path.display(),
            nodes = self.node_count(),
            edges = self.edge_count(),
            "graph snapshot written"
        );
        Ok(())
    }

    /// Read a snapshot previously written by [`save`](Self::save).
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let file = std::fs::File::open(path).map_err(|source| CoreError::Artifact {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(BufReader::new(file))
    }
}

// ── On-disk layout (node-link JSON) ─────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    directed: bool,
    graph: GraphMetadata,
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GraphMetadata {
    title_to_id: BTreeMap<String, String>,
    id_to_title: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct NodeRecord {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    raw_title: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct EdgeRecord {
    source: String,
    target: String,
}

impl From<&GraphSnapshot> for SnapshotFile {
    fn from(g: &GraphSnapshot) -> Self {
        SnapshotFile {
            directed: true,
            graph: GraphMetadata {
                title_to_id: g.title_to_id.clone(),
                id_to_title: g.id_to_title.clone(),
            },
            nodes: g
                .nodes
                .iter()
                .map(|(id, n)| NodeRecord {
                    id: id.clone(),
                    title: n.title.clone(),
                    raw_title: n.raw_title.clone(),
                })
                .collect(),
            edges: g
                .edges
                .iter()
                .map(|(s, t)| EdgeRecord {
                    source: s.clone(),
                    target: t.clone(),
                })
                .collect(),
        }
    }
}

impl From<SnapshotFile> for GraphSnapshot {
    fn from(f: SnapshotFile) -> Self {
        GraphSnapshot {
            nodes: f
                .nodes
                .into_iter()
                .map(|n| {
                    (
                        n.id,
                        NodeData {
                            title: n.title,
                            raw_title: n.raw_title,
                        },
                    )
                })
                .collect(),
            edges: f.edges.into_iter().map(|e| (e.source, e.target)).collect(),
            title_to_id: f.graph.title_to_id,
            id_to_title: f.graph.id_to_title,
        }
    }
}
