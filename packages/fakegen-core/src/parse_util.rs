//! Source locations and spans attached to validated declarations and diagnostics.

use crate::chars;
use serde::{Deserialize, Serialize};

/// Largest char-boundary index `<= idx`. Diagnostic context windows are
/// measured in bytes but must still slice on a UTF-8 boundary.
fn floor_char_boundary(s: &str, idx: usize) -> usize {
    let mut idx = idx.min(s.len());
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Smallest char-boundary index `>= idx`.
fn ceil_char_boundary(s: &str, idx: usize) -> usize {
    let mut idx = idx.min(s.len());
    while idx < s.len() && !s.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseSourceFile {
    pub content: String,
    pub url: String,
}

impl ParseSourceFile {
    pub fn new(content: String, url: String) -> Self {
        ParseSourceFile { content, url }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParseLocation {
    pub file: ParseSourceFile,
    pub offset: usize,
    pub line: usize,
    pub col: usize,
}

impl ParseLocation {
    pub fn new(file: ParseSourceFile, offset: usize, line: usize, col: usize) -> Self {
        ParseLocation { file, offset, line, col }
    }

    pub fn to_display_string(&self) -> String {
        format!("{}@{}:{}", self.file.url, self.line, self.col)
    }

    /// Returns the source text immediately before/after this location, for
    /// diagnostic context. Bounded by `max_chars`/`max_lines` on each side.
    pub fn get_context(&self, max_chars: usize, max_lines: usize) -> Option<(String, String)> {
        let content = &self.file.content;
        if content.is_empty() {
            return None;
        }
        let mut start_offset = self.offset.min(content.len().saturating_sub(1));
        let mut end_offset = start_offset;
        let mut ctx_chars = 0;
        let mut ctx_lines = 0;

        while ctx_chars < max_chars && start_offset > 0 {
            start_offset -= 1;
            ctx_chars += 1;
            if content.as_bytes()[start_offset] == chars::NEWLINE as u8 {
                ctx_lines += 1;
                if ctx_lines >= max_lines {
                    break;
                }
            }
        }

        ctx_chars = 0;
        ctx_lines = 0;
        while ctx_chars < max_chars && end_offset < content.len().saturating_sub(1) {
            end_offset += 1;
            ctx_chars += 1;
            if content.as_bytes()[end_offset] == chars::NEWLINE as u8 {
                ctx_lines += 1;
                if ctx_lines >= max_lines {
                    break;
                }
            }
        }

        let mid = floor_char_boundary(content, self.offset.min(content.len()));
        let start_offset = floor_char_boundary(content, start_offset);
        let end_offset = ceil_char_boundary(content, end_offset + 1);
        let before = content[start_offset..mid].to_string();
        let after = content[mid..end_offset].to_string();
        Some((before, after))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseSourceSpan {
    pub start: ParseLocation,
    pub end: ParseLocation,
    pub details: Option<String>,
}

impl ParseSourceSpan {
    pub fn new(start: ParseLocation, end: ParseLocation) -> Self {
        ParseSourceSpan { start, end, details: None }
    }

    pub fn with_details(mut self, details: String) -> Self {
        self.details = Some(details);
        self
    }

    /// A span covering an entire (typically single-line) declaration facts
    /// record, used when the host only hands over a file/name rather than
    /// precise offsets.
    pub fn whole_file(url: impl Into<String>) -> Self {
        let file = ParseSourceFile::new(String::new(), url.into());
        let loc = ParseLocation::new(file, 0, 0, 0);
        ParseSourceSpan::new(loc.clone(), loc)
    }
}

impl std::fmt::Display for ParseSourceSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.start.to_display_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParseErrorLevel {
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseError {
    pub span: ParseSourceSpan,
    pub msg: String,
    pub level: ParseErrorLevel,
}

impl ParseError {
    pub fn new(span: ParseSourceSpan, msg: String, level: ParseErrorLevel) -> Self {
        ParseError { span, msg, level }
    }

    pub fn contextual_message(&self) -> String {
        if let Some((before, after)) = self.span.start.get_context(100, 3) {
            let level_str = match self.level {
                ParseErrorLevel::Warning => "WARNING",
                ParseErrorLevel::Error => "ERROR",
            };
            format!("{} (\"{}[{} ->]{}\")", self.msg, before, level_str, after)
        } else {
            self.msg.clone()
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let details = self
            .span
            .details
            .as_ref()
            .map(|d| format!(", {d}"))
            .unwrap_or_default();
        write!(
            f,
            "{}: {}{}",
            self.contextual_message(),
            self.span.start.to_display_string(),
            details
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_display_includes_url_line_col() {
        let file = ParseSourceFile::new("fun hello() {}".into(), "Greeter.kt".into());
        let loc = ParseLocation::new(file, 4, 1, 5);
        assert_eq!(loc.to_display_string(), "Greeter.kt@1:5");
    }

    #[test]
    fn parse_error_display_has_context() {
        let file = ParseSourceFile::new("abstract class Foo".into(), "Foo.kt".into());
        let loc = ParseLocation::new(file, 0, 1, 1);
        let span = ParseSourceSpan::new(loc.clone(), loc);
        let err = ParseError::new(span, "must be abstract".into(), ParseErrorLevel::Error);
        assert!(err.to_string().contains("must be abstract"));
        assert!(err.to_string().contains("Foo.kt"));
    }

    #[test]
    fn get_context_does_not_panic_on_multibyte_boundary() {
        // "café" has a 2-byte 'é'; an offset landing inside it must not
        // split the string mid-character.
        let content = "// café\nabstract class Foo".to_string();
        let offset = content.find('é').unwrap();
        let file = ParseSourceFile::new(content, "Foo.kt".into());
        let loc = ParseLocation::new(file, offset, 1, offset);
        let (before, after) = loc.get_context(100, 3).unwrap();
        assert!(before.ends_with("caf") || before.ends_with("café"));
        assert!(after.starts_with('é') || after.starts_with("\n"));
    }
}
