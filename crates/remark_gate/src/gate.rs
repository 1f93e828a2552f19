use log::{debug, info};

use crate::analysis::{create_classifier, ClassifierGateway};
use crate::comment_detection::detect_comments;
use crate::config::GateConfig;
use crate::envelope::HookInput;
use crate::report::Verdict;
use crate::types::EnvelopeError;

/// Runs one candidate edit through extraction, classification and reporting.
pub struct Gate {
    config: GateConfig,
    classifier: ClassifierGateway,
}

impl Gate {
    pub fn new(config: GateConfig) -> Self {
        let classifier = create_classifier(&config);
        Self { config, classifier }
    }

    pub fn with_classifier(config: GateConfig, classifier: ClassifierGateway) -> Self {
        Self { config, classifier }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Reviews one hook payload. Tools the gate doesn't scan and exempt files pass
    /// through without their payload being interpreted.
    pub async fn review_hook(&self, input: &HookInput) -> Result<Verdict, EnvelopeError> {
        if !self.config.scans_tool(&input.tool_name) {
            debug!("Passing through tool {}", input.tool_name);
            return Ok(Verdict::accept());
        }

        let edit = input.edit_input()?;
        if self.config.is_exempt(&edit.file_path) {
            debug!("Passing through exempt file {}", edit.file_path);
            return Ok(Verdict::accept());
        }
        Ok(self.review_text(&edit.candidate_text(&input.tool_name)).await)
    }

    pub async fn review_text(&self, source: &str) -> Verdict {
        if source.is_empty() {
            return Verdict::accept();
        }

        let comments = detect_comments(source);
        if comments.is_empty() {
            return Verdict::accept();
        }
        debug!("Found {} comments to classify", comments.len());

        let classifications = self.classifier.classify(source, &comments).await;
        let verdict = Verdict::from_classifications(&classifications);
        info!(
            "{} comments, {} classified, {} redundant",
            comments.len(),
            classifications.len(),
            verdict.blocking_comments.len()
        );
        verdict
    }
}
