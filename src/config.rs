use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::correspondence::Strictness;
use crate::analysis::projection::DEFAULT_SILENT_LABEL;
use crate::graph::state_graph::{DEFAULT_STATE_LIMIT, StateGraphConfig};
use crate::net::ArcPolicy;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct AnalyzerConfig {
    #[serde(default = "default_state_limit")]
    pub state_limit: usize,
    #[serde(default)]
    pub strictness: Strictness,
    #[serde(default)]
    pub arc_policy: ArcPolicy,
    /// 无论是否出现在父网中都视为静默的迁移名称。
    #[serde(default = "default_silent_labels")]
    pub silent_labels: Vec<String>,
    /// 并行构造父网与子网的可达图。
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            state_limit: default_state_limit(),
            strictness: Strictness::default(),
            arc_policy: ArcPolicy::default(),
            silent_labels: default_silent_labels(),
            parallel: default_parallel(),
        }
    }
}

impl AnalyzerConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AnalyzerConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        Ok(config)
    }

    pub fn state_graph(&self) -> StateGraphConfig {
        StateGraphConfig {
            state_limit: self.state_limit,
        }
    }
}

fn default_state_limit() -> usize {
    DEFAULT_STATE_LIMIT
}

fn default_silent_labels() -> Vec<String> {
    vec![DEFAULT_SILENT_LABEL.to_string()]
}

fn default_parallel() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: AnalyzerConfig = toml::from_str(
            r#"
            state_limit = 500
            strictness = "strict"
            "#,
        )
        .unwrap();
        assert_eq!(config.state_limit, 500);
        assert_eq!(config.strictness, Strictness::Strict);
        assert_eq!(config.arc_policy, ArcPolicy::Lenient);
        assert_eq!(config.silent_labels, vec!["tau".to_string()]);
        assert!(config.parallel);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AnalyzerConfig::load_from_file("no/such/pn-inherit.toml").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
    }
}
