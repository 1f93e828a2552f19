use std::path::PathBuf;

pub const DEFAULT_ANALYZER_COMMAND: &str = "gpt5-mini";

/// Placeholder substituted with the prompt file path in analyzer arguments.
pub const PROMPT_FILE_PLACEHOLDER: &str = "{prompt_file}";

pub const DEFAULT_ANALYZER_ARGS: &[&str] = &["-f", PROMPT_FILE_PLACEHOLDER];

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const SCANNED_TOOLS: &[&str] = &["Edit", "MultiEdit", "Write"];

// Markdown headers collide with `#` comments.
pub const EXEMPT_EXTENSIONS: &[&str] = &["md", "markdown"];

/// Terms that mark a comment as narrating control flow or plain state changes.
pub const REDUNDANT_KEYWORDS: &[&str] = &[
    "increment",
    "decrement",
    "set",
    "get",
    "return",
    "loop",
    "iterate",
    "check if",
    "assign",
];

pub const FALLBACK_REASON: &str = "Fallback heuristic analysis";

pub const RECOVERED_REASON: &str = "Recovered from unstructured analyzer output";

pub const CONFIG_DIR_NAME: &str = "remark-gate";
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const ENV_ANALYZER: &str = "REMARK_GATE_ANALYZER";
pub const ENV_TIMEOUT_SECS: &str = "REMARK_GATE_TIMEOUT_SECS";
pub const ENV_LOG_FILE: &str = "REMARK_GATE_LOG_FILE";

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}
