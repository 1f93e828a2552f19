//! Turns analyzer stdout into classifications.
//!
//! The expected document is `{"analysis": [{"line", "comment", "category", "reason"}]}`.
//! Chatty or fenced output is tolerated: an embedded JSON object is tried next, then
//! loose `Line N ... REDUNDANT` lines. Only when all three come up empty is the
//! output treated as malformed.

use crate::constants::RECOVERED_REASON;
use crate::types::{Category, Classification, ClassifierError, CommentOccurrence};

use log::debug;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

static LINE_VERDICT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bline\s+(\d+)\b.*?\b(redundant|useful)\b[\s:\-]*(.*)$").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisEntry {
    pub line: usize,
    pub comment: String,
    pub category: Category,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    line: usize,
    #[serde(default)]
    comment: String,
    category: String,
    #[serde(default)]
    reason: String,
}

pub fn parse_analysis(output: &str) -> Result<Vec<AnalysisEntry>, ClassifierError> {
    let output = output.trim();
    if let Some(entries) = parse_document(output) {
        return Ok(entries);
    }

    if let (Some(start), Some(end)) = (output.find('{'), output.rfind('}')) {
        if start < end {
            if let Some(entries) = parse_document(&output[start..=end]) {
                debug!("Recovered analysis from embedded JSON");
                return Ok(entries);
            }
        }
    }

    let entries = parse_line_verdicts(output);
    if entries.is_empty() {
        let preview: String = output.chars().take(200).collect();
        return Err(ClassifierError::MalformedOutput(preview));
    }
    debug!("Recovered {} verdicts from plain text", entries.len());
    Ok(entries)
}

/// `None` when the text is not a conforming document. Individual entries that
/// don't fit the schema are dropped, but a non-empty array with no usable entry
/// is not conforming.
fn parse_document(text: &str) -> Option<Vec<AnalysisEntry>> {
    let document: Value = serde_json::from_str(text).ok()?;
    let items = document.get("analysis")?.as_array()?;

    let entries: Vec<AnalysisEntry> = items
        .iter()
        .filter_map(|item| serde_json::from_value::<RawEntry>(item.clone()).ok())
        .filter_map(|raw| {
            Some(AnalysisEntry {
                line: raw.line,
                comment: raw.comment.trim().to_string(),
                category: Category::parse(&raw.category)?,
                reason: raw.reason.trim().to_string(),
            })
        })
        .collect();

    if entries.is_empty() && !items.is_empty() {
        debug!("None of the {} analysis entries fit the schema", items.len());
        return None;
    }
    Some(entries)
}

fn parse_line_verdicts(text: &str) -> Vec<AnalysisEntry> {
    text.lines()
        .filter_map(|line| LINE_VERDICT.captures(line))
        .filter_map(|captures| {
            let line = captures[1].parse().ok()?;
            let category = Category::parse(&captures[2])?;
            let reason = captures
                .get(3)
                .map(|m| m.as_str().trim())
                .filter(|reason| !reason.is_empty())
                .unwrap_or(RECOVERED_REASON);
            Some(AnalysisEntry {
                line,
                comment: String::new(),
                category,
                reason: reason.to_string(),
            })
        })
        .collect()
}

/// Pairs analyzer entries with the comments they describe.
///
/// An entry matches the comment on its line with the same text; when the text
/// differs it still matches if that line holds exactly one unclaimed comment.
/// Each comment receives at most one classification, and comments the analyzer
/// skipped receive none.
pub fn match_entries(entries: &[AnalysisEntry], comments: &[CommentOccurrence]) -> Vec<Classification> {
    let mut verdicts: Vec<Option<Classification>> = vec![None; comments.len()];

    for entry in entries {
        let open: Vec<usize> = comments
            .iter()
            .enumerate()
            .filter(|(index, comment)| comment.line == entry.line && verdicts[*index].is_none())
            .map(|(index, _)| index)
            .collect();

        let target = open
            .iter()
            .copied()
            .find(|&index| comments[index].text == entry.comment)
            .or_else(|| (open.len() == 1).then(|| open[0]));

        match target {
            Some(index) => {
                let reason = if entry.reason.is_empty() {
                    "No reason given".to_string()
                } else {
                    entry.reason.clone()
                };
                verdicts[index] = Some(Classification::for_occurrence(&comments[index], entry.category, reason));
            }
            None => debug!("No comment matches analyzer entry for line {}", entry.line),
        }
    }

    verdicts.into_iter().flatten().collect()
}
