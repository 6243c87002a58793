//! SKILL.md frontmatter parser.
//!
//! Only a restricted YAML subset is understood: `key: value` lines, optional
//! single or double quotes around a value, and `|` / `>` block scalars made of
//! indented continuation lines. Anything else inside the header is skipped.

use crate::error::{Result, SkillError};
use indexmap::IndexMap;

const DELIMITER: &str = "---";

/// Parsed key/value header of a SKILL.md file, in order of first appearance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    entries: IndexMap<String, String>,
}

impl Frontmatter {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, key: String, value: String) {
        // IndexMap keeps the original slot on overwrite
        self.entries.insert(key, value);
    }
}

/// Parse only the frontmatter block of a SKILL.md file
pub fn parse_frontmatter(content: &str) -> Result<Frontmatter> {
    split_manifest(content).map(|(frontmatter, _)| frontmatter)
}

/// Parse the frontmatter and return it together with the body that follows
/// the closing delimiter (trimmed).
pub fn split_manifest(content: &str) -> Result<(Frontmatter, String)> {
    let lines = split_lines(content);

    if lines.first().map(|l| l.trim()) != Some(DELIMITER) {
        return Err(SkillError::format(
            "SKILL.md must start with a YAML frontmatter block ('---').",
        ));
    }

    let end = lines
        .iter()
        .skip(1)
        .position(|l| l.trim() == DELIMITER)
        .map(|i| i + 1)
        .ok_or_else(|| {
            SkillError::format(
                "SKILL.md YAML frontmatter must be terminated by a second '---' line.",
            )
        })?;

    let frontmatter = parse_block(&lines[1..end]);
    let body = lines[end + 1..].join("\n").trim().to_string();

    Ok((frontmatter, body))
}

/// Split on every line boundary: `\n`, `\r\n`, lone `\r`, vertical tab,
/// form feed, the file/group/record separators, NEL, and U+2028/U+2029.
/// A trailing boundary does not produce an empty last line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                chars.next();
                start = j + 1;
            }
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r'
            | '\x0b'
            | '\x0c'
            | '\x1c'
            | '\x1d'
            | '\x1e'
            | '\u{85}'
            | '\u{2028}'
            | '\u{2029}'
    )
}

fn parse_block(lines: &[&str]) -> Frontmatter {
    let mut out = Frontmatter::default();
    let mut i = 0;

    while i < lines.len() {
        let raw = lines[i];
        let line = raw.trim();
        i += 1;

        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, rest)) = raw.split_once(':') else {
            continue;
        };

        let key = key.trim();
        let rest = rest.trim();

        let value = if rest == "|" || rest == ">" {
            let mut block = Vec::new();
            while i < lines.len() && is_indented(lines[i]) {
                block.push(lines[i].trim_start());
                i += 1;
            }
            block.join("\n").trim_end().to_string()
        } else if is_quoted(rest) {
            rest[1..rest.len() - 1].to_string()
        } else {
            rest.to_string()
        };

        if !key.is_empty() {
            out.insert(key.to_string(), value);
        }
    }

    out
}

fn is_indented(line: &str) -> bool {
    line.starts_with(' ') || line.starts_with('\t')
}

fn is_quoted(value: &str) -> bool {
    value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frontmatter() {
        let content = r#"---
name: pdf-tables
description: Extract tables from PDF reports into CSV
license: MIT
---

Run scripts/extract.py on each input file.
"#;
        let fm = parse_frontmatter(content).unwrap();
        assert_eq!(fm.get("name"), Some("pdf-tables"));
        assert_eq!(
            fm.get("description"),
            Some("Extract tables from PDF reports into CSV")
        );
        assert_eq!(fm.get("license"), Some("MIT"));
        assert_eq!(fm.len(), 3);
    }

    #[test]
    fn test_split_lines_boundaries() {
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\n\r\nb"), vec!["a", "", "b"]);
        assert_eq!(
            split_lines("a\rb\x0bc\x0cd\x1ce\u{85}f"),
            vec!["a", "b", "c", "d", "e", "f"]
        );
        assert_eq!(split_lines("a\u{2028}b\u{2029}"), vec!["a", "b"]);
        assert_eq!(split_lines("\n"), vec![""]);
    }

    #[test]
    fn test_carriage_return_only_manifest() {
        let fm = parse_frontmatter("---\rname: x\rdescription: d\r---\r").unwrap();
        assert_eq!(fm.get("name"), Some("x"));
        assert_eq!(fm.get("description"), Some("d"));
    }

    #[test]
    fn test_unicode_line_separators_end_values() {
        let fm = parse_frontmatter("---\ndescription: hello\u{2028}world\n---\n").unwrap();
        assert_eq!(fm.get("description"), Some("hello"));

        let fm = parse_frontmatter("---\ndescription: a\x0cb: c\n---\n").unwrap();
        assert_eq!(fm.get("description"), Some("a"));
        assert_eq!(fm.get("b"), Some("c"));
    }

    #[test]
    fn test_split_manifest_body() {
        let content = "---\nname: x\n---\n\n# Usage\n\nDo things.\n";
        let (fm, body) = split_manifest(content).unwrap();
        assert_eq!(fm.get("name"), Some("x"));
        assert_eq!(body, "# Usage\n\nDo things.");
    }

    #[test]
    fn test_missing_opening_delimiter() {
        let err = parse_frontmatter("name: x\n---\n").unwrap_err();
        assert!(matches!(err, SkillError::Format(_)));
        assert!(parse_frontmatter("").is_err());
    }

    #[test]
    fn test_missing_closing_delimiter() {
        let err = parse_frontmatter("---\nname: x\ndescription: y\n").unwrap_err();
        assert!(matches!(err, SkillError::Format(_)));
        assert!(err.to_string().contains("terminated"));
    }

    #[test]
    fn test_delimiters_ignore_surrounding_whitespace() {
        let fm = parse_frontmatter("  ---  \r\nname: x\r\n\t---\r\n").unwrap();
        assert_eq!(fm.get("name"), Some("x"));
    }

    #[test]
    fn test_quoted_values() {
        let content = "---\na: \"hello\"\nb: 'world'\nc: \"\"\nd: \"\ne: \"mixed'\nf: \"keep \\n raw\"\n---\n";
        let fm = parse_frontmatter(content).unwrap();
        assert_eq!(fm.get("a"), Some("hello"));
        assert_eq!(fm.get("b"), Some("world"));
        assert_eq!(fm.get("c"), Some(""));
        assert_eq!(fm.get("d"), Some("\""));
        assert_eq!(fm.get("e"), Some("\"mixed'"));
        assert_eq!(fm.get("f"), Some("keep \\n raw"));
    }

    #[test]
    fn test_block_scalars() {
        let content = "---\nname: demo\ndescription: |\n  First line\n    nested\n\tTabbed   \nother: >\n  folded\n  stays split\n---\n";
        let fm = parse_frontmatter(content).unwrap();
        assert_eq!(fm.get("description"), Some("First line\nnested\nTabbed"));
        assert_eq!(fm.get("other"), Some("folded\nstays split"));
        assert_eq!(fm.get("name"), Some("demo"));
    }

    #[test]
    fn test_block_scalar_ends_at_blank_line() {
        let content = "---\ndescription: |\n  one\n\n  two\n---\n";
        let fm = parse_frontmatter(content).unwrap();
        assert_eq!(fm.get("description"), Some("one"));
    }

    #[test]
    fn test_empty_block_scalar() {
        let fm = parse_frontmatter("---\ndescription: |\nname: x\n---\n").unwrap();
        assert_eq!(fm.get("description"), Some(""));
        assert_eq!(fm.get("name"), Some("x"));
    }

    #[test]
    fn test_skips_comments_and_lines_without_separator() {
        let content = "---\n# comment: ignored\n\njust text\n  - item\nname: x\n: no key\n---\n";
        let fm = parse_frontmatter(content).unwrap();
        assert_eq!(fm.len(), 1);
        assert_eq!(fm.get("name"), Some("x"));
    }

    #[test]
    fn test_value_keeps_later_colons() {
        let fm = parse_frontmatter("---\nurl: https://example.com:8080/x\n---\n").unwrap();
        assert_eq!(fm.get("url"), Some("https://example.com:8080/x"));
    }

    #[test]
    fn test_later_keys_overwrite_in_place() {
        let content = "---\nname: first\ndescription: d\nname: second\n---\n";
        let fm = parse_frontmatter(content).unwrap();
        let keys: Vec<_> = fm.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["name", "description"]);
        assert_eq!(fm.get("name"), Some("second"));
    }

    #[test]
    fn test_reparse_of_serialized_mapping_is_stable() {
        let content = "---\nname: my-skill\ndescription: \"Does: things\"\nversion: '1.0'\n---\n";
        let fm = parse_frontmatter(content).unwrap();

        let mut rendered = String::from("---\n");
        for (k, v) in fm.iter() {
            rendered.push_str(&format!("{}: {}\n", k, v));
        }
        rendered.push_str("---\n");

        assert_eq!(parse_frontmatter(&rendered).unwrap(), fm);
    }
}
