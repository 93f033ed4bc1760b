//! Front matter: the `---` delimited metadata block at the top of the ledger.
//!
//! Lines are kept in their original order. `key: value` lines become fields;
//! anything else (list items, comments, repeated keys) is carried verbatim.
//! A field that is never touched renders exactly as it was read.

use serde::{Deserialize, Serialize};

pub const DELIMITER: &str = "---";

/// Publishing fields used when a ledger document has to be created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTemplate {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default = "default_image")]
    pub image: String,
}

fn default_title() -> String {
    "Upload Records".to_string()
}

fn default_description() -> String {
    "This page is generated automatically and lists every file uploaded through the uploader."
        .to_string()
}

fn default_category() -> String {
    "uploads".to_string()
}

fn default_image() -> String {
    "img/title.jpg".to_string()
}

impl Default for DocumentTemplate {
    fn default() -> Self {
        Self {
            title: default_title(),
            description: default_description(),
            category: default_category(),
            image: default_image(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Line {
    Field {
        key: String,
        value: String,
        raw: Option<String>,
    },
    Verbatim(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FrontMatter {
    lines: Vec<Line>,
}

impl FrontMatter {
    /// Parse the lines between the two delimiters.
    pub fn parse(body: &str) -> Self {
        let mut lines = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for raw in body.lines() {
            match split_field(raw) {
                Some((key, value)) if seen.insert(key.to_string()) => lines.push(Line::Field {
                    key: key.to_string(),
                    value: value.to_string(),
                    raw: Some(raw.to_string()),
                }),
                _ => lines.push(Line::Verbatim(raw.to_string())),
            }
        }
        Self { lines }
    }

    /// Front matter for a new ledger document.
    pub fn fresh(template: &DocumentTemplate, slug: &str, date: &str, lastmod: &str) -> Self {
        let mut fm = Self::default();
        fm.set("title", &template.title);
        fm.set("slug", slug);
        fm.set("description", "");
        fm.set("date", date);
        fm.set("lastmod", lastmod);
        fm.set("image", &template.image);
        fm.set("math", "");
        fm.set("license", "");
        fm.set("hidden", "false");
        fm.set("draft", "false");
        fm.set("password", "");
        fm.set("categories", &format!("['{}']", template.category));
        fm.set("tags", "[]");
        fm
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines.iter().find_map(|line| match line {
            Line::Field { key: k, value, .. } if k == key => Some(value.as_str()),
            _ => None,
        })
    }

    /// Ordered `(key, value)` pairs.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|line| match line {
            Line::Field { key, value, .. } => Some((key.as_str(), value.as_str())),
            Line::Verbatim(_) => None,
        })
    }

    /// Replace the value of `key`, or append the field at the end.
    pub fn set(&mut self, key: &str, value: &str) {
        if let Some(slot) = self.field_mut(key) {
            *slot = value.to_string();
            return;
        }
        self.lines.push(new_field(key, value));
    }

    /// Set `lastmod`; a missing field goes right after `date`, or at the end.
    pub fn set_lastmod(&mut self, value: &str) {
        if let Some(slot) = self.field_mut("lastmod") {
            *slot = value.to_string();
            return;
        }
        let after_date = self
            .lines
            .iter()
            .position(|line| matches!(line, Line::Field { key, .. } if key == "date"));
        match after_date {
            Some(i) => self.lines.insert(i + 1, new_field("lastmod", value)),
            None => self.lines.push(new_field("lastmod", value)),
        }
    }

    /// Render the block including both delimiters and a trailing newline.
    pub fn render(&self) -> String {
        let mut out = String::from(DELIMITER);
        out.push('\n');
        for line in &self.lines {
            match line {
                Line::Field {
                    raw: Some(raw), ..
                } => out.push_str(raw),
                Line::Field { key, value, .. } if value.is_empty() => {
                    out.push_str(key);
                    out.push(':');
                }
                Line::Field { key, value, .. } => {
                    out.push_str(key);
                    out.push_str(": ");
                    out.push_str(value);
                }
                Line::Verbatim(raw) => out.push_str(raw),
            }
            out.push('\n');
        }
        out.push_str(DELIMITER);
        out.push('\n');
        out
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut String> {
        self.lines.iter_mut().find_map(|line| match line {
            Line::Field {
                key: k, value, raw, ..
            } if k.as_str() == key => {
                *raw = None;
                Some(value)
            }
            _ => None,
        })
    }
}

fn new_field(key: &str, value: &str) -> Line {
    Line::Field {
        key: key.to_string(),
        value: value.to_string(),
        raw: None,
    }
}

/// `key: value` at column zero. Keys are bare words (letters, digits, `_`, `-`).
fn split_field(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once(':')?;
    let valid_key = !key.is_empty()
        && !key.starts_with('-')
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    valid_key.then(|| (key, value.trim()))
}

/// Split a document into the front matter body and the text after the block.
///
/// The first line must be exactly `---` and the block ends at the next line
/// that is exactly `---`. Returns `None` when either delimiter is missing.
pub fn split_document(text: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    let mut lines = text.split_inclusive('\n');

    let first = lines.next()?;
    if trim_eol(first) != DELIMITER {
        return None;
    }
    offset += first.len();
    let body_start = offset;

    for line in lines {
        if trim_eol(line) == DELIMITER {
            let body = &text[body_start..offset];
            let rest = &text[offset + line.len()..];
            return Some((body, rest));
        }
        offset += line.len();
    }
    None
}

fn trim_eol(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}
