use serde::{Deserialize, Serialize};

/// netgraphctl configuration file (YAML).
///
/// Example `netgraph.yaml`:
/// ```yaml
/// graph: ./topology.yaml
/// out-dir: ./manifests
/// log-format: json
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetgraphConfigFile {
    /// Graph snapshot used when `--graph` is not given.
    #[serde(default)]
    pub graph: Option<String>,
    /// Directory manifests are written to when `--out-dir` is not given.
    #[serde(default, alias = "out-dir")]
    pub out_dir: Option<String>,
    /// `text` or `json`.
    #[serde(default, alias = "log-format")]
    pub log_format: Option<String>,
}

/// Load a YAML config file, returning the default if the file doesn't exist.
pub fn load_config_file<T: serde::de::DeserializeOwned + Default>(path: &str) -> anyhow::Result<T> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(T::default());
        }
        Err(e) => return Err(e.into()),
    };
    let config: T = serde_yaml::from_str(&content)?;
    Ok(config)
}
