use async_trait::async_trait;
use log::debug;
use std::io::Write;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::analysis::CommentClassifier;
use crate::constants::PROMPT_FILE_PLACEHOLDER;
use crate::prompt::build_prompt;
use crate::response::{match_entries, parse_analysis};
use crate::types::{Classification, ClassifierError, CommentOccurrence};

/// Classifies comments by running an external analyzer once per edit.
///
/// The prompt is written to a temp file whose path is passed on the command line;
/// the analyzer is expected to print its JSON verdicts on stdout before `timeout`.
#[derive(Debug, Clone)]
pub struct AnalyzerCommand {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl AnalyzerCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    fn args_for(&self, prompt_path: &Path) -> Vec<String> {
        let path = prompt_path.to_string_lossy();
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| arg.replace(PROMPT_FILE_PLACEHOLDER, &path))
            .collect();
        if !self.args.iter().any(|arg| arg.contains(PROMPT_FILE_PLACEHOLDER)) {
            args.push(path.into_owned());
        }
        args
    }

    async fn run(&self, prompt_path: &Path) -> Result<String, ClassifierError> {
        let args = self.args_for(prompt_path);
        debug!("Running analyzer: {} {:?}", self.program, args);

        let mut command = Command::new(&self.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Err(_) => return Err(ClassifierError::Timeout(self.timeout)),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ClassifierError::NotFound(self.program.clone()))
            }
            Ok(Err(e)) => return Err(ClassifierError::Spawn(e)),
            Ok(Ok(output)) => output,
        };

        if !output.status.success() {
            return Err(ClassifierError::ExitStatus {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl CommentClassifier for AnalyzerCommand {
    fn name(&self) -> &'static str {
        "analyzer"
    }

    async fn classify(
        &self,
        source: &str,
        comments: &[CommentOccurrence],
    ) -> Result<Vec<Classification>, ClassifierError> {
        let prompt = build_prompt(source, comments);

        // Removed when dropped, so every return path below cleans it up.
        let mut prompt_file = tempfile::Builder::new()
            .prefix("remark-gate-")
            .suffix(".txt")
            .tempfile()?;
        prompt_file.write_all(prompt.as_bytes())?;
        prompt_file.flush()?;

        let stdout = self.run(prompt_file.path()).await?;
        let entries = parse_analysis(&stdout)?;
        Ok(match_entries(&entries, comments))
    }
}
