//! Line tokenizer for the `.sol` finite-element interchange format.
//!
//! A `.sol` file is a flat sequence of comma-separated records. The first field
//! of every record is an upper-case directive keyword; lines whose first token
//! starts with `#` are comments. This crate only splits and classifies lines,
//! semantic assembly lives in `fem-io`.

mod directive;
mod ranges;

use std::fs;
use std::path::Path;
use thiserror::Error;

pub use directive::Directive;
pub use ranges::{decode_id_members, encode_id_ranges};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolFile {
    pub records: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub directive: Directive,
    /// Trimmed fields after the keyword.
    pub fields: Vec<String>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

impl SolFile {
    pub fn parse_file(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| ParseError {
            line: 0,
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        Self::parse_str(&raw)
    }

    pub fn parse_str(raw: &str) -> Result<Self, ParseError> {
        let mut records = Vec::new();

        for (idx, raw_line) in raw.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw_line.trim();
            if trimmed.is_empty() || is_comment(trimmed) {
                continue;
            }

            let mut parts = trimmed.split(',').map(str::trim);
            let keyword = parts.next().unwrap_or_default();
            if keyword.is_empty() {
                return Err(ParseError::new(line, "empty directive keyword"));
            }
            let directive = Directive::from_keyword(keyword)
                .ok_or_else(|| ParseError::new(line, format!("unknown directive '{keyword}'")))?;

            let mut fields: Vec<String> = parts.map(str::to_string).collect();
            // A trailing comma leaves an empty last field; it carries no data.
            while fields.last().is_some_and(|f| f.is_empty()) {
                fields.pop();
            }

            records.push(Record {
                directive,
                fields,
                line,
            });
        }

        Ok(SolFile { records })
    }
}

fn is_comment(line: &str) -> bool {
    line.starts_with('#')
}

impl Record {
    pub fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.line, message)
    }

    pub fn expect_min_fields(&self, min: usize) -> Result<(), ParseError> {
        if self.fields.len() < min {
            return Err(self.error(format!(
                "{} expects at least {min} fields, found {}",
                self.directive,
                self.fields.len()
            )));
        }
        Ok(())
    }

    pub fn field(&self, index: usize) -> Result<&str, ParseError> {
        self.fields
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| self.error(format!("{} is missing field {}", self.directive, index + 1)))
    }

    pub fn int(&self, index: usize) -> Result<i32, ParseError> {
        let raw = self.field(index)?;
        raw.parse::<i32>()
            .map_err(|_| self.error(format!("expected an integer, found '{raw}'")))
    }

    pub fn float(&self, index: usize) -> Result<f64, ParseError> {
        let raw = self.field(index)?;
        raw.parse::<f64>()
            .map_err(|_| self.error(format!("expected a number, found '{raw}'")))
    }

    pub fn floats(&self, range: std::ops::Range<usize>) -> Result<Vec<f64>, ParseError> {
        range.map(|i| self.float(i)).collect()
    }

    pub fn ints_from(&self, start: usize) -> Result<Vec<i32>, ParseError> {
        (start..self.fields.len()).map(|i| self.int(i)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_records_and_skips_comments() {
        let src = r#"
# written by hand
NODE,1,0,0,0
  # indented comment
NODE, 2, 1.5, 0, 0
ELEMENT,1,ROD2N,1,1,2
"#;
        let file = SolFile::parse_str(src).expect("parser should succeed");
        assert_eq!(file.records.len(), 3);
        assert_eq!(file.records[0].directive, Directive::Node);
        assert_eq!(file.records[1].fields, vec!["2", "1.5", "0", "0"]);
        assert_eq!(file.records[1].line, 5);
        assert_eq!(file.records[2].directive, Directive::Element);
    }

    #[test]
    fn rejects_unknown_directive_with_line() {
        let src = "NODE,1,0,0,0\nBOGUS,1\n";
        let err = SolFile::parse_str(src).expect_err("should fail");
        assert_eq!(err.line, 2);
        assert!(err.message.contains("BOGUS"));
    }

    #[test]
    fn drops_trailing_empty_fields() {
        let file = SolFile::parse_str("LOADS,tip,\n").expect("parse");
        assert_eq!(file.records[0].fields, vec!["tip"]);
    }

    #[test]
    fn keeps_inner_empty_fields() {
        let file = SolFile::parse_str("ELEMENT,4,TRI3N,,1,2,3\n").expect("parse");
        assert_eq!(file.records[0].fields[2], "");
        assert_eq!(file.records[0].ints_from(3).expect("ints"), vec![1, 2, 3]);
    }

    #[test]
    fn typed_accessors_report_bad_fields() {
        let file = SolFile::parse_str("NODE,x,0,0,0\n").expect("parse");
        let err = file.records[0].int(0).expect_err("not an int");
        assert_eq!(err.line, 1);
        assert!(err.message.contains("'x'"));
        assert!(file.records[0].expect_min_fields(5).is_err());
    }
}
