use serde::Serialize;
use std::fmt::Write;

use crate::types::Classification;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub blocked: bool,
    pub blocking_comments: Vec<Classification>,
}

impl Verdict {
    pub fn accept() -> Self {
        Self::default()
    }

    /// Blocks iff at least one classification is redundant; order is preserved.
    pub fn from_classifications(classifications: &[Classification]) -> Self {
        let blocking_comments: Vec<Classification> = classifications
            .iter()
            .filter(|classification| classification.is_redundant())
            .cloned()
            .collect();
        Self {
            blocked: !blocking_comments.is_empty(),
            blocking_comments,
        }
    }

    /// The explanation shown to the agent when the edit is blocked.
    pub fn message(&self) -> Option<String> {
        if !self.blocked {
            return None;
        }

        let mut message = String::from("🚫 Edit blocked: Redundant comments detected\n\n");
        message.push_str("The following comments don't provide useful contextual information:\n\n");
        for comment in &self.blocking_comments {
            let _ = writeln!(message, "  Line {}: \"{}\"", comment.line, comment.comment_text);
            let _ = writeln!(message, "    Reason: {}\n", comment.reason);
        }
        message.push_str("Please remove or improve these comments to provide more meaningful context.\n");
        message.push_str("Good comments explain WHY, not WHAT the code does.");
        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Category;

    fn classification(line: usize, text: &str, category: Category) -> Classification {
        Classification {
            line,
            comment_text: text.to_string(),
            category,
            reason: format!("reason for {text}"),
        }
    }

    #[test]
    fn test_all_useful_accepts() {
        let verdict = Verdict::from_classifications(&[classification(1, "why", Category::Useful)]);
        assert_eq!(verdict, Verdict::accept());
        assert_eq!(verdict.message(), None);
    }

    #[test]
    fn test_no_classifications_accepts() {
        assert!(!Verdict::from_classifications(&[]).blocked);
    }

    #[test]
    fn test_redundant_blocks_in_order() {
        let verdict = Verdict::from_classifications(&[
            classification(7, "Loop over users", Category::Redundant),
            classification(2, "Keeps p99 under 5ms", Category::Useful),
            classification(9, "Return the total", Category::Redundant),
        ]);

        assert!(verdict.blocked);
        let lines: Vec<usize> = verdict.blocking_comments.iter().map(|c| c.line).collect();
        assert_eq!(lines, [7, 9]);

        let message = verdict.message().unwrap();
        assert!(message.starts_with("🚫 Edit blocked"));
        assert!(message.contains("  Line 7: \"Loop over users\"\n    Reason: reason for Loop over users\n"));
        assert!(message.contains("  Line 9: \"Return the total\""));
        assert!(!message.contains("Keeps p99"));
        assert!(message.ends_with("Good comments explain WHY, not WHAT the code does."));
    }
}
