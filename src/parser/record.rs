//! Record parsing: extract prefixes from whole lines or delimited fields.

use super::ValueParser;
use crate::error::{ConfigError, ParseError};
use crate::models::Prefix;
use itertools::Itertools;

/// The two-character sequence accepted in place of a literal tab delimiter.
pub const TAB_ESCAPE: &str = "\\t";

/// Turns raw text lines into [`ParsedLine`]s.
#[derive(Debug, Clone, Default)]
pub struct RecordParser {
    fields: Vec<usize>,
    delimiter: Option<String>,
    value_parser: ValueParser,
}

impl RecordParser {
    /// Create a parser for the given 1-indexed `fields`.
    ///
    /// With no fields the whole line is one value and `delimiter` is ignored.
    ///
    /// # Errors
    /// * [`ConfigError::InvalidField`] for a field number of 0
    /// * [`ConfigError::MissingDelimiter`] when fields are given without a delimiter
    pub fn new(
        fields: Vec<usize>,
        delimiter: Option<&str>,
        value_parser: ValueParser,
    ) -> Result<RecordParser, ConfigError> {
        if fields.is_empty() {
            return Ok(RecordParser {
                fields,
                delimiter: None,
                value_parser,
            });
        }
        if let Some(&field) = fields.iter().find(|&&f| f == 0) {
            return Err(ConfigError::InvalidField(field));
        }
        let delimiter = match delimiter {
            Some(TAB_ESCAPE) => "\t",
            Some(d) if !d.is_empty() => d,
            _ => return Err(ConfigError::MissingDelimiter),
        };
        Ok(RecordParser {
            fields,
            delimiter: Some(delimiter.to_string()),
            value_parser,
        })
    }

    /// Whole-line parser for plain lists of CIDRs or addresses.
    pub fn bare() -> RecordParser {
        RecordParser::default()
    }

    pub fn fields(&self) -> &[usize] {
        &self.fields
    }

    pub fn delimiter(&self) -> Option<&str> {
        self.delimiter.as_deref()
    }

    pub fn value_parser(&self) -> ValueParser {
        self.value_parser
    }

    /// Parse one line. Every requested field must hold a valid value.
    pub fn parse_line<'a>(&'a self, raw: &'a str) -> Result<ParsedLine<'a>, ParseError> {
        let Some(delimiter) = self.delimiter.as_deref() else {
            let prefix = self.value_parser.parse(raw)?;
            return Ok(ParsedLine {
                raw,
                parts: Vec::new(),
                field_prefix: Vec::new(),
                prefixes: vec![prefix],
                delimiter: None,
            });
        };

        let parts: Vec<&str> = raw.split(delimiter).collect();
        let mut field_prefix = vec![None; parts.len()];
        let mut prefixes = Vec::with_capacity(self.fields.len());
        for &field in &self.fields {
            let part = parts.get(field - 1).ok_or_else(|| ParseError::FieldNotFound {
                field,
                line: raw.to_string(),
            })?;
            prefixes.push(self.value_parser.parse(part)?);
            field_prefix[field - 1] = Some(prefixes.len() - 1);
        }
        Ok(ParsedLine {
            raw,
            parts,
            field_prefix,
            prefixes,
            delimiter: Some(delimiter),
        })
    }
}

/// One input line and the prefixes found in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine<'a> {
    raw: &'a str,
    parts: Vec<&'a str>,
    /// For each part, the index in `prefixes` of the value parsed from it.
    field_prefix: Vec<Option<usize>>,
    prefixes: Vec<Prefix>,
    delimiter: Option<&'a str>,
}

impl<'a> ParsedLine<'a> {
    /// The line exactly as read (without its line terminator).
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Prefixes in the order the fields were requested.
    pub fn prefixes(&self) -> &[Prefix] {
        &self.prefixes
    }

    /// Delimited parts of the line; empty when no fields were requested.
    pub fn parts(&self) -> &[&'a str] {
        &self.parts
    }

    /// The line with each parsed field replaced by its canonical prefix.
    ///
    /// Unparsed fields and delimiters are kept verbatim. Without fields the
    /// result is the canonical form of the single value.
    pub fn clean(&self) -> String {
        match self.delimiter {
            None => self
                .prefixes
                .first()
                .map(|p| p.to_string())
                .unwrap_or_default(),
            Some(delimiter) => self
                .parts
                .iter()
                .zip(&self.field_prefix)
                .map(|(part, index)| match index {
                    Some(i) => self.prefixes[*i].to_string(),
                    None => part.to_string(),
                })
                .join(delimiter),
        }
    }
}
