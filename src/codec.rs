//! CSV Codec Module
//!
//! Field quoting for snapshot rows and a quote-aware parser for reading
//! them (and patient-access input files) back.
//!
//! A field is quoted when it contains the delimiter, the quote character,
//! or a line break; quotes inside a quoted field are doubled.

use std::borrow::Cow;

// == Public Constants ==
pub const DELIMITER: char = ',';
pub const QUOTE: char = '"';

// == Quoting ==
/// Returns true if `field` must be wrapped in quotes to survive a round trip.
pub fn needs_quoting(field: &str) -> bool {
    field.contains([DELIMITER, QUOTE, '\n', '\r'])
}

/// Quotes a single field if required.
pub fn quote_field(field: &str) -> Cow<'_, str> {
    if !needs_quoting(field) {
        return Cow::Borrowed(field);
    }

    let mut out = String::with_capacity(field.len() + 2);
    out.push(QUOTE);
    for ch in field.chars() {
        if ch == QUOTE {
            out.push(QUOTE);
        }
        out.push(ch);
    }
    out.push(QUOTE);
    Cow::Owned(out)
}

/// Joins fields into one row, without a trailing newline.
pub fn encode_row<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut row = String::new();
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            row.push(DELIMITER);
        }
        row.push_str(&quote_field(field.as_ref()));
    }
    row
}

// == Parsing ==
/// One parsed row along with the input line it started on (1-based).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Parses CSV text into records.
///
/// Accepts LF or CRLF endings, quoted fields spanning lines, and doubled
/// quotes. Blank lines are skipped. Fields are returned untrimmed.
pub fn parse_records(input: &str) -> Vec<Record> {
    let mut records = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    // set once the current field saw a quote, so `""` is not a blank line
    let mut quoted = false;
    let mut line = 1;
    let mut record_line = 1;

    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                QUOTE if chars.peek() == Some(&QUOTE) => {
                    chars.next();
                    current.push(QUOTE);
                }
                QUOTE => in_quotes = false,
                '\n' => {
                    line += 1;
                    current.push(ch);
                }
                _ => current.push(ch),
            }
            continue;
        }

        match ch {
            QUOTE => {
                in_quotes = true;
                quoted = true;
            }
            DELIMITER => {
                fields.push(std::mem::take(&mut current));
                quoted = false;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                finish_record(&mut records, &mut fields, &mut current, quoted, record_line);
                quoted = false;
                line += 1;
                record_line = line;
            }
            _ => current.push(ch),
        }
    }
    finish_record(&mut records, &mut fields, &mut current, quoted, record_line);

    records
}

fn finish_record(
    records: &mut Vec<Record>,
    fields: &mut Vec<String>,
    current: &mut String,
    quoted: bool,
    line: usize,
) {
    if fields.is_empty() && current.is_empty() && !quoted {
        return;
    }
    fields.push(std::mem::take(current));
    records.push(Record {
        line,
        fields: std::mem::take(fields),
    });
}

/// Parses a single line into its fields.
pub fn parse_line(line: &str) -> Vec<String> {
    parse_records(line)
        .into_iter()
        .next()
        .map(|record| record.fields)
        .unwrap_or_default()
}
