use crate::types::CommentOccurrence;

const RUBRIC: &str = "\
REDUNDANT comments:
- State the obvious from reading code
- Talk about how things used to work or what changed (\"instead of\", \"rather than\", \"used to\", \"changed from\", \"previously\", \"now we\", \"unlike before\")
- Reference other codebase parts that may change over time

USEFUL comments:
- Explain WHY (business logic, constraints, requirements)
- Document non-obvious behavior or edge cases
- Improve glanceability of complex logic
- Contain actionable info (TODOs, warnings, performance notes)

CRITICAL: Comments should only describe the current code. Any mention of old approaches, previous states, or what changed makes a comment REDUNDANT.";

const RESPONSE_FORMAT: &str = r#"{"analysis": [{"line": <number>, "comment": "<text>", "category": "REDUNDANT"|"USEFUL", "reason": "<brief explanation>"}]}"#;

/// Builds the single prompt sent to the analyzer for one edit.
pub fn build_prompt(source: &str, comments: &[CommentOccurrence]) -> String {
    let listing = comments
        .iter()
        .map(|comment| format!("Line {}: {}", comment.line, comment.text))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Analyze these comments to determine if they are REDUNDANT or USEFUL.\n\n\
         Code context:\n```\n{source}\n```\n\n\
         Comments:\n{listing}\n\n\
         {RUBRIC}\n\n\
         Respond with JSON:\n{RESPONSE_FORMAT}"
    )
}
