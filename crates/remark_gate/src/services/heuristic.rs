use async_trait::async_trait;

use crate::analysis::CommentClassifier;
use crate::constants::{FALLBACK_REASON, REDUNDANT_KEYWORDS};
use crate::types::{Category, Classification, ClassifierError, CommentOccurrence};

/// Keyword check that keeps the gate working when the analyzer can't be used.
/// Deliberately crude: it only spots comments narrating control flow or assignments.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    pub fn classify_comments(&self, comments: &[CommentOccurrence]) -> Vec<Classification> {
        comments
            .iter()
            .map(|comment| {
                let category = if is_mechanical(&comment.text) {
                    Category::Redundant
                } else {
                    Category::Useful
                };
                Classification::for_occurrence(comment, category, FALLBACK_REASON)
            })
            .collect()
    }
}

fn is_mechanical(text: &str) -> bool {
    let lowered = text.to_lowercase();
    REDUNDANT_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

#[async_trait]
impl CommentClassifier for HeuristicClassifier {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn classify(
        &self,
        _source: &str,
        comments: &[CommentOccurrence],
    ) -> Result<Vec<Classification>, ClassifierError> {
        Ok(self.classify_comments(comments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CommentKind;

    fn comment(text: &str) -> CommentOccurrence {
        CommentOccurrence {
            line: 1,
            text: text.to_string(),
            kind: CommentKind::SingleLine,
            source_line: format!("# {text}"),
        }
    }

    #[test]
    fn test_mechanical_comments_are_redundant() {
        let comments = vec![
            comment("increment counter"),
            comment("Increment i"),
            comment("Loop over the rows"),
            comment("Check if the user exists"),
            comment("assign the result"),
        ];
        let classifications = HeuristicClassifier.classify_comments(&comments);
        assert!(classifications.iter().all(Classification::is_redundant));
        assert!(classifications.iter().all(|c| c.reason == FALLBACK_REASON));
    }

    #[test]
    fn test_rationale_comments_are_useful() {
        let comments = vec![
            comment("The vendor API rejects batches above 100 items"),
            comment("Must run before the migration lock is taken"),
        ];
        let classifications = HeuristicClassifier.classify_comments(&comments);
        assert_eq!(classifications.len(), 2);
        assert!(classifications.iter().all(|c| c.category == Category::Useful));
    }

    #[tokio::test]
    async fn test_trait_impl_never_fails() {
        let comments = vec![comment("decrement retries")];
        let classifications = HeuristicClassifier.classify("", &comments).await.unwrap();
        assert_eq!(classifications[0].category, Category::Redundant);
        assert_eq!(classifications[0].comment_text, "decrement retries");
    }
}
