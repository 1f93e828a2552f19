use crate::patterns::{first_exclusion, Candidate, Exclusion, BLOCK_FAMILIES, LINE_FAMILIES};
use crate::types::{CommentKind, CommentOccurrence};

use log::debug;
use std::ops::Range;

/// Finds the comments in `source`.
///
/// Single-line comments come first in line order, then block comments grouped by
/// family priority and ordered by position. Spans never overlap: whichever match
/// claims a span first keeps it. A single-line marker that sits inside a block
/// comment or docstring belongs to that block.
pub fn detect_comments(source: &str) -> Vec<CommentOccurrence> {
    let lines: Vec<&str> = source.split('\n').collect();
    let mut comments = Vec::new();
    let mut claimed: Vec<Range<usize>> = Vec::new();
    let block_spans = block_spans(source);

    let mut line_start = 0;
    for (index, line) in lines.iter().enumerate() {
        let next_line = lines.get(index + 1).copied();
        let found = scan_line(line, next_line)
            .filter(|(marker_pos, _)| !block_spans.iter().any(|span| span.contains(&(line_start + marker_pos))));
        if let Some((marker_pos, text)) = found {
            debug!("Line {}: '{}' -> '{}'", index + 1, line, text);
            claimed.push(line_start + marker_pos..line_start + line.len());
            comments.push(CommentOccurrence {
                line: index + 1,
                text,
                kind: CommentKind::SingleLine,
                source_line: line.to_string(),
            });
        }
        line_start += line.len() + 1;
    }

    for family in BLOCK_FAMILIES.iter() {
        for captures in family.regex.captures_iter(source) {
            let (Some(whole), Some(body)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let span = whole.range();
            if claimed.iter().any(|other| overlaps(other, &span)) {
                debug!("Skipping {} match at {:?}: span already claimed", family.name, span);
                continue;
            }

            let text = body.as_str().trim();
            if text.is_empty() {
                continue;
            }

            let line = line_number_at(source, span.start);
            debug!("Line {}: {} comment '{}'", line, family.name, text);
            comments.push(CommentOccurrence {
                line,
                text: text.to_string(),
                kind: CommentKind::MultiLine,
                source_line: lines.get(line - 1).copied().unwrap_or_default().to_string(),
            });
            claimed.push(span);
        }
    }

    comments
}

fn block_spans(source: &str) -> Vec<Range<usize>> {
    BLOCK_FAMILIES
        .iter()
        .flat_map(|family| family.regex.find_iter(source).map(|m| m.range()))
        .collect()
}

/// Returns the marker offset and trimmed text of the comment on `line`, if any.
fn scan_line(line: &str, next_line: Option<&str>) -> Option<(usize, String)> {
    for family in LINE_FAMILIES {
        let Some(found) = family.find(line) else {
            continue;
        };
        let candidate = Candidate {
            line,
            next_line,
            marker_pos: found.marker_pos,
            text: found.text,
        };
        match first_exclusion(&candidate) {
            None => return Some((found.marker_pos, found.text.to_string())),
            Some(rule) => {
                debug!("{} match on '{}' excluded by {}", family.name, line, rule.name);
                if rule.action == Exclusion::Line {
                    return None;
                }
            }
        }
    }
    None
}

fn overlaps(a: &Range<usize>, b: &Range<usize>) -> bool {
    a.start < b.end && b.start < a.end
}

fn line_number_at(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}
