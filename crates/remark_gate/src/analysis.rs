use async_trait::async_trait;
use log::{debug, warn};
use std::time::Duration;

use crate::config::GateConfig;
use crate::services::analyzer::AnalyzerCommand;
use crate::services::heuristic::HeuristicClassifier;
use crate::types::{Classification, ClassifierError, CommentOccurrence};

/// Something that can judge a batch of comments against the code they sit in.
///
/// Implementations return at most one classification per comment. Comments left
/// out of the result have no verdict.
#[async_trait]
pub trait CommentClassifier: Send + Sync {
    fn name(&self) -> &'static str;

    async fn classify(
        &self,
        source: &str,
        comments: &[CommentOccurrence],
    ) -> Result<Vec<Classification>, ClassifierError>;
}

/// Tries the primary classifier once and falls back to the keyword heuristic on
/// any error. Never fails.
pub struct ClassifierGateway {
    primary: Option<Box<dyn CommentClassifier>>,
    fallback: HeuristicClassifier,
}

impl ClassifierGateway {
    pub fn new(primary: Box<dyn CommentClassifier>) -> Self {
        Self {
            primary: Some(primary),
            fallback: HeuristicClassifier,
        }
    }

    pub fn heuristic_only() -> Self {
        Self {
            primary: None,
            fallback: HeuristicClassifier,
        }
    }

    pub async fn classify(&self, source: &str, comments: &[CommentOccurrence]) -> Vec<Classification> {
        if comments.is_empty() {
            return Vec::new();
        }

        if let Some(primary) = &self.primary {
            match primary.classify(source, comments).await {
                Ok(classifications) => {
                    debug!(
                        "{} returned {} verdicts for {} comments",
                        primary.name(),
                        classifications.len(),
                        comments.len()
                    );
                    return classifications;
                }
                Err(err) => warn!("{} failed, using fallback heuristic: {}", primary.name(), err),
            }
        }

        self.fallback.classify_comments(comments)
    }
}

pub fn create_classifier(config: &GateConfig) -> ClassifierGateway {
    if config.heuristic_only {
        return ClassifierGateway::heuristic_only();
    }
    ClassifierGateway::new(Box::new(AnalyzerCommand::new(
        config.analyzer_command.clone(),
        config.analyzer_args.clone(),
        Duration::from_secs(config.timeout_secs),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FALLBACK_REASON;
    use crate::types::{Category, CommentKind};

    struct Scripted(Result<Vec<Classification>, fn() -> ClassifierError>);

    #[async_trait]
    impl CommentClassifier for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn classify(
            &self,
            _source: &str,
            _comments: &[CommentOccurrence],
        ) -> Result<Vec<Classification>, ClassifierError> {
            match &self.0 {
                Ok(classifications) => Ok(classifications.clone()),
                Err(make_error) => Err(make_error()),
            }
        }
    }

    fn comments() -> Vec<CommentOccurrence> {
        vec![CommentOccurrence {
            line: 1,
            text: "Increment i".to_string(),
            kind: CommentKind::SingleLine,
            source_line: "# Increment i".to_string(),
        }]
    }

    #[tokio::test]
    async fn test_primary_result_is_used_as_is() {
        let useful = Classification::for_occurrence(&comments()[0], Category::Useful, "fine");
        let gateway = ClassifierGateway::new(Box::new(Scripted(Ok(vec![useful.clone()]))));

        assert_eq!(gateway.classify("i += 1", &comments()).await, vec![useful]);
    }

    #[tokio::test]
    async fn test_primary_may_omit_verdicts() {
        let gateway = ClassifierGateway::new(Box::new(Scripted(Ok(Vec::new()))));
        assert!(gateway.classify("i += 1", &comments()).await.is_empty());
    }

    #[tokio::test]
    async fn test_falls_back_on_error() {
        let gateway = ClassifierGateway::new(Box::new(Scripted(Err(|| {
            ClassifierError::Timeout(Duration::from_secs(30))
        }))));

        let classifications = gateway.classify("i += 1", &comments()).await;
        assert_eq!(classifications.len(), 1);
        assert_eq!(classifications[0].category, Category::Redundant);
        assert_eq!(classifications[0].reason, FALLBACK_REASON);
    }

    #[tokio::test]
    async fn test_no_comments_no_call() {
        let gateway = ClassifierGateway::new(Box::new(Scripted(Err(|| {
            ClassifierError::NotFound("unused".to_string())
        }))));
        assert!(gateway.classify("", &[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_heuristic_only_config() {
        let config = GateConfig {
            heuristic_only: true,
            ..GateConfig::default()
        };
        let classifications = create_classifier(&config).classify("i += 1", &comments()).await;
        assert_eq!(classifications[0].reason, FALLBACK_REASON);
    }
}
