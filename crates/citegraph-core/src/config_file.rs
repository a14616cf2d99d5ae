use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{CoreError, RunConfig};

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub paths: Option<PathsConfig>,
    pub concurrency: Option<ConcurrencyConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathsConfig {
    pub corpus_root: Option<String>,
    pub nodes_file: Option<String>,
    pub edges_file: Option<String>,
    pub log_file: Option<String>,
    pub graph_file: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConcurrencyConfig {
    pub num_workers: Option<usize>,
}

/// Platform config directory path: `<config_dir>/citegraph/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("citegraph").join("config.toml"))
}

/// Load config by cascading CWD `.citegraph.toml` over platform config.
/// CWD values override platform values. Missing or malformed files are
/// skipped with a warning.
pub fn load_config() -> ConfigFile {
    let platform = config_path().and_then(|p| load_or_warn(&p));
    let cwd = load_or_warn(Path::new(".citegraph.toml"));

    match (platform, cwd) {
        (None, None) => ConfigFile::default(),
        (Some(p), None) => p,
        (None, Some(c)) => c,
        (Some(p), Some(c)) => merge(p, c),
    }
}

fn load_or_warn(path: &Path) -> Option<ConfigFile> {
    match load_from_path(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring config file");
            None
        }
    }
}

/// Load a config from a specific path. `Ok(None)` if the file doesn't exist.
pub fn load_from_path(path: &Path) -> Result<Option<ConfigFile>, CoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(CoreError::Artifact {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&content)
        .map(Some)
        .map_err(|source| CoreError::Config {
            path: path.to_path_buf(),
            source,
        })
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let pick = |f: fn(&PathsConfig) -> Option<String>| {
        overlay
            .paths
            .as_ref()
            .and_then(f)
            .or_else(|| base.paths.as_ref().and_then(f))
    };

    ConfigFile {
        paths: Some(PathsConfig {
            corpus_root: pick(|p| p.corpus_root.clone()),
            nodes_file: pick(|p| p.nodes_file.clone()),
            edges_file: pick(|p| p.edges_file.clone()),
            log_file: pick(|p| p.log_file.clone()),
            graph_file: pick(|p| p.graph_file.clone()),
        }),
        concurrency: Some(ConcurrencyConfig {
            num_workers: overlay
                .concurrency
                .as_ref()
                .and_then(|c| c.num_workers)
                .or_else(|| base.concurrency.as_ref().and_then(|c| c.num_workers)),
        }),
    }
}

impl ConfigFile {
    /// Overlay this file's values onto `config`.
    pub fn apply_to(&self, config: &mut RunConfig) {
        if let Some(paths) = &self.paths {
            let set = |target: &mut PathBuf, value: &Option<String>| {
                if let Some(v) = value {
                    *target = PathBuf::from(v);
                }
            };
            set(&mut config.corpus_root, &paths.corpus_root);
            set(&mut config.nodes_path, &paths.nodes_file);
            set(&mut config.edges_path, &paths.edges_file);
            set(&mut config.log_path, &paths.log_file);
            set(&mut config.graph_path, &paths.graph_file);
        }
        if let Some(n) = self.concurrency.as_ref().and_then(|c| c.num_workers) {
            config.num_workers = n.max(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_root_round_trip_toml() {
        let config = ConfigFile {
            paths: Some(PathsConfig {
                corpus_root: Some("/data/papers".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: ConfigFile = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn absent_fields_deserialize_as_none() {
        let toml_str = "[paths]\ngraph_file = \"out/graph.json\"\n";
        let parsed: ConfigFile = toml::from_str(toml_str).unwrap();
        let paths = parsed.paths.unwrap();
        assert_eq!(paths.graph_file.as_deref(), Some("out/graph.json"));
        assert!(paths.corpus_root.is_none());
        assert!(parsed.concurrency.is_none());
    }

    #[test]
    fn merge_overlay_wins() {
        let base = ConfigFile {
            paths: Some(PathsConfig {
                corpus_root: Some("/base".to_string()),
                log_file: Some("base.log".to_string()),
                ..Default::default()
            }),
            concurrency: Some(ConcurrencyConfig {
                num_workers: Some(2),
            }),
        };
        let overlay = ConfigFile {
            paths: Some(PathsConfig {
                corpus_root: Some("/overlay".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = merge(base, overlay);
        let paths = merged.paths.unwrap();
        assert_eq!(paths.corpus_root.as_deref(), Some("/overlay"));
        assert_eq!(paths.log_file.as_deref(), Some("base.log"));
        assert_eq!(merged.concurrency.unwrap().num_workers, Some(2));
    }

    #[test]
    fn apply_to_overrides_only_present_values() {
        let file = ConfigFile {
            paths: Some(PathsConfig {
                edges_file: Some("e.txt".to_string()),
                ..Default::default()
            }),
            concurrency: Some(ConcurrencyConfig {
                num_workers: Some(0),
            }),
        };
        let mut config = RunConfig::default();
        file.apply_to(&mut config);
        assert_eq!(config.edges_path, PathBuf::from("e.txt"));
        assert_eq!(config.corpus_root, PathBuf::from("./dataset_papers/"));
        assert_eq!(config.num_workers, 1);
    }

    #[test]
    fn load_from_path_missing_is_none() {
        let tmp = tempfile::tempdir().unwrap();
        let loaded = load_from_path(&tmp.path().join("absent.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn load_from_path_malformed_is_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.toml");
        std::fs::write(&path, "[paths\ncorpus_root = 3").unwrap();
        assert!(matches!(
            load_from_path(&path),
            Err(CoreError::Config { .. })
        ));
    }
}
