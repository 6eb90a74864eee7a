use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub sink: SinkConfig,
}

/// Worker pool sizing for one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Concurrent fetch workers
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
    /// Concurrent process workers
    #[serde(default = "default_process_concurrency")]
    pub process_concurrency: usize,
    /// Capacity of the queue between the fetch and process pools.
    ///
    /// `0` still yields a one-slot queue rather than a rendezvous hand-off,
    /// so at most `max(buffer_size, 1) + fetch_concurrency +
    /// process_concurrency` payloads are held at once. See
    /// [`PipelineConfig::results_capacity`].
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch_concurrency: default_fetch_concurrency(),
            process_concurrency: default_process_concurrency(),
            buffer_size: default_buffer_size(),
        }
    }
}

fn default_fetch_concurrency() -> usize {
    80
}

fn default_process_concurrency() -> usize {
    10
}

fn default_buffer_size() -> usize {
    10
}

/// Where remote paths are resolved from
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    #[serde(default = "default_source_root")]
    pub root: PathBuf,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: default_source_root(),
        }
    }
}

fn default_source_root() -> PathBuf {
    PathBuf::from("data/remote")
}

/// Sink provider type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkProvider {
    #[default]
    Local,
    Memory,
}

/// Where processed files are written
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub provider: SinkProvider,
    #[serde(default = "default_sink_root")]
    pub root: PathBuf,
    /// Key prefix for every stored file
    #[serde(default)]
    pub prefix: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            provider: SinkProvider::Local,
            root: default_sink_root(),
            prefix: String::new(),
        }
    }
}

fn default_sink_root() -> PathBuf {
    PathBuf::from("data/output")
}
