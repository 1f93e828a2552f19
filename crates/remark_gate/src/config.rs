use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::constants::{
    default_config_path, DEFAULT_ANALYZER_ARGS, DEFAULT_ANALYZER_COMMAND, DEFAULT_TIMEOUT_SECS,
    ENV_ANALYZER, ENV_LOG_FILE, ENV_TIMEOUT_SECS, EXEMPT_EXTENSIONS, SCANNED_TOOLS,
};
use crate::types::ConfigError;

/// Runtime settings for one gate invocation.
///
/// Built from defaults, then an optional TOML file, then `REMARK_GATE_*`
/// environment variables; the CLI applies its own flags last.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    pub analyzer_command: String,
    pub analyzer_args: Vec<String>,
    pub timeout_secs: u64,
    pub scanned_tools: Vec<String>,
    pub exempt_extensions: Vec<String>,
    pub log_file: Option<PathBuf>,
    pub heuristic_only: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            analyzer_command: DEFAULT_ANALYZER_COMMAND.to_string(),
            analyzer_args: DEFAULT_ANALYZER_ARGS.iter().map(|arg| arg.to_string()).collect(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            scanned_tools: SCANNED_TOOLS.iter().map(|tool| tool.to_string()).collect(),
            exempt_extensions: EXEMPT_EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            log_file: None,
            heuristic_only: false,
        }
    }
}

impl GateConfig {
    /// Loads `explicit_path` if given (it must exist), otherwise the per-user
    /// config file when present, then applies environment overrides.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit_path {
            Some(path) => Self::load_from_path(path)?,
            None => match default_config_path().filter(|path| path.is_file()) {
                Some(path) => Self::load_from_path(&path)?,
                None => Self::default(),
            },
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        debug!("Loading config from {}", path.display());
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `lookup` is injected so tests don't have to touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(command) = lookup(ENV_ANALYZER).filter(|value| !value.trim().is_empty()) {
            self.analyzer_command = command;
        }
        if let Some(value) = lookup(ENV_TIMEOUT_SECS) {
            self.timeout_secs = value.trim().parse().map_err(|_| ConfigError::Env {
                name: ENV_TIMEOUT_SECS,
                value: value.clone(),
            })?;
        }
        if let Some(path) = lookup(ENV_LOG_FILE).filter(|value| !value.trim().is_empty()) {
            self.log_file = Some(PathBuf::from(path));
        }
        Ok(())
    }

    pub fn scans_tool(&self, tool_name: &str) -> bool {
        self.scanned_tools.iter().any(|tool| tool == tool_name)
    }

    /// True when the path ends in `.<ext>` for one of the exempt extensions, which
    /// includes bare names such as `.md`.
    pub fn is_exempt(&self, file_path: &str) -> bool {
        self.exempt_extensions
            .iter()
            .any(|ext| file_path.ends_with(&format!(".{ext}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = GateConfig::default();
        assert_eq!(config.analyzer_command, "gpt5-mini");
        assert_eq!(config.analyzer_args, ["-f", "{prompt_file}"]);
        assert_eq!(config.timeout_secs, 30);
        assert!(config.scans_tool("MultiEdit"));
        assert!(!config.scans_tool("Bash"));
    }

    #[test]
    fn test_markdown_is_exempt() {
        let config = GateConfig::default();
        assert!(config.is_exempt("docs/x.md"));
        assert!(config.is_exempt("README.markdown"));
        assert!(!config.is_exempt("x.py"));
        assert!(!config.is_exempt("Makefile"));
        assert!(!config.is_exempt("notes.mdx"));
    }

    #[test]
    fn test_dotfile_markdown_is_exempt() {
        let config = GateConfig::default();
        assert!(config.is_exempt(".md"));
        assert!(config.is_exempt("docs/.markdown"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "analyzer_command = \"llm\"\nanalyzer_args = [\"-m\", \"mini\"]\ntimeout_secs = 12\n").unwrap();

        let config = GateConfig::load_from_path(&path).unwrap();
        assert_eq!(config.analyzer_command, "llm");
        assert_eq!(config.analyzer_args, ["-m", "mini"]);
        assert_eq!(config.timeout_secs, 12);
        assert_eq!(config.scanned_tools, GateConfig::default().scanned_tools);
    }

    #[test]
    fn test_invalid_toml_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "timeout_secs = \"soon\"").unwrap();

        assert!(matches!(GateConfig::load_from_path(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = GateConfig::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_ANALYZER, "claude-mini"),
            (ENV_TIMEOUT_SECS, " 5 "),
            (ENV_LOG_FILE, "/tmp/remark-gate.log"),
        ]);
        let mut config = GateConfig::default();
        config
            .apply_env(|name| env.get(name).map(|value| value.to_string()))
            .unwrap();

        assert_eq!(config.analyzer_command, "claude-mini");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/remark-gate.log")));
    }

    #[test]
    fn test_bad_timeout_env_is_rejected() {
        let mut config = GateConfig::default();
        let result = config.apply_env(|name| (name == ENV_TIMEOUT_SECS).then(|| "thirty".to_string()));
        assert!(matches!(result, Err(ConfigError::Env { .. })));
    }
}
