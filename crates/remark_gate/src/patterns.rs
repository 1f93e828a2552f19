//! Comment syntax families and the false-positive rules applied to them.
//!
//! Comment markers overlap with URLs, shell variables and string contents, so a
//! candidate has to get through every [`ExclusionRule`] before it counts.

use regex::Regex;
use std::sync::LazyLock;

static TYPED_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+\w+\s+[\w*\[\].]+").unwrap());
static PRINT_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(print|console\.log|printf|puts|echo)\s*\(").unwrap());
static COMMENTED_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(vim\.|local |function |if |for |while |return |end|\})").unwrap()
});
static CODE_STATEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*\s*[=(]").unwrap());

#[derive(Debug, Clone, Copy)]
enum Anchor {
    /// Marker may appear anywhere unless the previous character is this one.
    NotAfter(char),
    /// Marker must be the first non-whitespace text on the line.
    LineStart,
}

/// A single-line comment syntax such as `//` or `#`.
#[derive(Debug)]
pub struct LineFamily {
    pub name: &'static str,
    marker: &'static str,
    anchor: Anchor,
}

/// Where a line family matched: byte offset of the marker and the raw text after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineMatch<'a> {
    pub marker_pos: usize,
    pub text: &'a str,
}

impl LineFamily {
    pub fn find<'a>(&self, line: &'a str) -> Option<LineMatch<'a>> {
        match self.anchor {
            Anchor::NotAfter(guard) => line
                .match_indices(self.marker)
                .filter(|(pos, _)| !line[..*pos].ends_with(guard))
                .find_map(|(pos, _)| self.body_at(line, pos)),
            Anchor::LineStart => {
                let trimmed = line.trim_start();
                if !trimmed.starts_with(self.marker) {
                    return None;
                }
                self.body_at(line, line.len() - trimmed.len())
            }
        }
    }

    fn body_at<'a>(&self, line: &'a str, pos: usize) -> Option<LineMatch<'a>> {
        let body = &line[pos + self.marker.len()..];
        if body.is_empty() {
            return None;
        }
        Some(LineMatch {
            marker_pos: pos,
            text: body.trim(),
        })
    }
}

/// Single-line families in priority order. A line yields at most one comment.
pub static LINE_FAMILIES: &[LineFamily] = &[
    LineFamily {
        name: "double-slash",
        marker: "//",
        anchor: Anchor::NotAfter(':'),
    },
    LineFamily {
        name: "hash",
        marker: "#",
        anchor: Anchor::NotAfter('$'),
    },
    LineFamily {
        name: "double-dash",
        marker: "--",
        anchor: Anchor::LineStart,
    },
];

/// A comment syntax that may span lines, matched against the whole text.
#[derive(Debug)]
pub struct BlockFamily {
    pub name: &'static str,
    pub regex: Regex,
}

/// Block families in priority order. Earlier families claim a span first, so
/// the JSX form has to precede plain C blocks.
pub static BLOCK_FAMILIES: LazyLock<Vec<BlockFamily>> = LazyLock::new(|| {
    [
        ("jsx-block", r"(?s)\{\s*/\*\s*(.+?)\s*\*/\s*\}"),
        ("c-block", r"(?s)/\*\s*(.+?)\s*\*/"),
        ("triple-double-quote", r#"(?s)"""(.+?)""""#),
        ("triple-single-quote", r"(?s)'''(.+?)'''"),
    ]
    .into_iter()
    .map(|(name, pattern)| BlockFamily {
        name,
        regex: Regex::new(pattern).unwrap(),
    })
    .collect()
});

/// A single-line match waiting on the exclusion rules.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub line: &'a str,
    pub next_line: Option<&'a str>,
    pub marker_pos: usize,
    pub text: &'a str,
}

impl<'a> Candidate<'a> {
    fn before_marker(&self) -> &'a str {
        &self.line[..self.marker_pos]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    /// The line contributes no comment at all.
    Line,
    /// This family's match is discarded; lower-priority families still get a try.
    Family,
}

pub struct ExclusionRule {
    pub name: &'static str,
    pub action: Exclusion,
    pub applies: fn(&Candidate) -> bool,
}

impl std::fmt::Debug for ExclusionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExclusionRule")
            .field("name", &self.name)
            .field("action", &self.action)
            .finish()
    }
}

/// Evaluated top to bottom; the first rule that applies decides.
pub static EXCLUSION_RULES: &[ExclusionRule] = &[
    ExclusionRule {
        name: "shebang",
        action: Exclusion::Line,
        applies: is_shebang,
    },
    ExclusionRule {
        name: "typed-field-doc",
        action: Exclusion::Line,
        applies: precedes_typed_field,
    },
    ExclusionRule {
        name: "inside-string",
        action: Exclusion::Family,
        applies: is_inside_quotes,
    },
    ExclusionRule {
        name: "print-argument",
        action: Exclusion::Family,
        applies: is_print_argument,
    },
    ExclusionRule {
        name: "empty-text",
        action: Exclusion::Line,
        applies: has_empty_text,
    },
    ExclusionRule {
        name: "commented-out-code",
        action: Exclusion::Family,
        applies: is_commented_out_code,
    },
    ExclusionRule {
        name: "code-statement",
        action: Exclusion::Family,
        applies: is_code_statement,
    },
];

pub fn first_exclusion(candidate: &Candidate) -> Option<&'static ExclusionRule> {
    EXCLUSION_RULES.iter().find(|rule| (rule.applies)(candidate))
}

fn is_shebang(candidate: &Candidate) -> bool {
    candidate.line.trim().starts_with("#!")
}

fn precedes_typed_field(candidate: &Candidate) -> bool {
    candidate
        .next_line
        .is_some_and(|next| TYPED_FIELD.is_match(next))
}

// Quote parity only; escaped quotes are discounted but nothing else is tokenized.
fn is_inside_quotes(candidate: &Candidate) -> bool {
    let before = candidate.before_marker();
    let single = before.matches('\'').count() - before.matches("\\'").count();
    let double = before.matches('"').count() - before.matches("\\\"").count();
    single % 2 == 1 || double % 2 == 1
}

fn is_print_argument(candidate: &Candidate) -> bool {
    PRINT_CALL.is_match(candidate.before_marker())
}

fn has_empty_text(candidate: &Candidate) -> bool {
    candidate.text.is_empty()
}

fn is_commented_out_code(candidate: &Candidate) -> bool {
    COMMENTED_CODE.is_match(candidate.text)
}

fn is_code_statement(candidate: &Candidate) -> bool {
    CODE_STATEMENT.is_match(candidate.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate<'a>(line: &'a str, next_line: Option<&'a str>) -> Candidate<'a> {
        let found = LINE_FAMILIES
            .iter()
            .find_map(|family| family.find(line))
            .expect("line should contain a comment marker");
        Candidate {
            line,
            next_line,
            marker_pos: found.marker_pos,
            text: found.text,
        }
    }

    fn excluded_by(line: &str, next_line: Option<&str>) -> Option<&'static str> {
        first_exclusion(&candidate(line, next_line)).map(|rule| rule.name)
    }

    #[test]
    fn test_double_slash_skips_url_scheme() {
        let family = &LINE_FAMILIES[0];
        assert_eq!(family.find(r#"url = "http://example.com""#), None);

        let found = family.find("fetch(\"http://a.io\") // retry once").unwrap();
        assert_eq!(found.text, "retry once");
    }

    #[test]
    fn test_hash_skips_shell_variable() {
        let family = &LINE_FAMILIES[1];
        assert_eq!(family.find("echo $#"), None);

        let found = family.find("count=$# # number of args").unwrap();
        assert_eq!(found.text, "number of args");
    }

    #[test]
    fn test_double_dash_only_at_line_start() {
        let family = &LINE_FAMILIES[2];
        assert_eq!(family.find("x = y -- z"), None);

        let found = family.find("  -- users without orders").unwrap();
        assert_eq!(found.marker_pos, 2);
        assert_eq!(found.text, "users without orders");
    }

    #[test]
    fn test_marker_at_end_of_line_has_no_body() {
        assert_eq!(LINE_FAMILIES[0].find("value //"), None);
    }

    #[test]
    fn test_shebang_excluded() {
        assert_eq!(excluded_by("#!/usr/bin/env python3", None), Some("shebang"));
    }

    #[test]
    fn test_typed_field_doc_excluded() {
        assert_eq!(
            excluded_by("    // retries before giving up", Some("    MaxRetries int")),
            Some("typed-field-doc")
        );
        assert_eq!(excluded_by("// retries before giving up", Some("retries = 3")), None);
    }

    #[test]
    fn test_inside_string_excluded() {
        assert_eq!(excluded_by(r#"let s = "a # b";"#, None), Some("inside-string"));
        assert_eq!(excluded_by(r#"let s = 'it\'s # fine"#, None), Some("inside-string"));
    }

    #[test]
    fn test_print_argument_excluded() {
        assert_eq!(excluded_by("print(x) # show x", None), Some("print-argument"));
        assert_eq!(excluded_by("console.log(a, b) // debug", None), Some("print-argument"));
    }

    #[test]
    fn test_empty_text_excluded() {
        assert_eq!(excluded_by("x = 1 //   ", None), Some("empty-text"));
    }

    #[test]
    fn test_commented_out_code_excluded() {
        assert_eq!(excluded_by("-- local x = 1", None), Some("commented-out-code"));
        assert_eq!(excluded_by("// return value;", None), Some("commented-out-code"));
        assert_eq!(excluded_by("# }", None), Some("commented-out-code"));
    }

    #[test]
    fn test_code_statement_excluded() {
        assert_eq!(excluded_by("# total = a + b", None), Some("code-statement"));
        assert_eq!(excluded_by("// doThing(42)", None), Some("code-statement"));
    }

    #[test]
    fn test_prose_passes_all_rules() {
        assert_eq!(excluded_by("x = 5  // increment counter", None), None);
        assert_eq!(excluded_by("# Cache misses fall through to disk", Some("load()")), None);
    }

    #[test]
    fn test_block_families_are_ordered_jsx_first() {
        let names: Vec<_> = BLOCK_FAMILIES.iter().map(|family| family.name).collect();
        assert_eq!(
            names,
            ["jsx-block", "c-block", "triple-double-quote", "triple-single-quote"]
        );
    }
}
