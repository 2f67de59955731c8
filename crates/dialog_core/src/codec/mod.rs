//! Record codec for the synonym and response files.
//!
//! # Responsibility
//! - Decode rows into `SynonymRecord` / `ResponseRecord`, skipping malformed
//!   rows.
//! - Encode engine state back into the same row layout.
//!
//! # Invariants
//! - Synonym rows: `prompt,syn1,syn2,...` (at least 2 fields).
//! - Response rows: `prompt,response,action1,...` (at least 3 fields).
//! - Any phrase the engine holds (padded, empty, containing separators)
//!   decodes back to the same string it was encoded from.
//! - A zero-action response is written with one bare trailing field and
//!   decodes back to an empty action list; `[""]` stays `[""]`.
//! - Unquoted fields are trimmed; bare empty synonym fields are dropped.

mod fields;

pub use fields::{parse_rows, write_row, write_row_with_blank_tail, RawField};

use crate::model::dialog::{ActionId, Prompt, ResponseEntry, Synonym};
use std::io::{self, Write};

const MIN_SYNONYM_FIELDS: usize = 2;
const MIN_RESPONSE_FIELDS: usize = 3;

/// One decoded synonym row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynonymRecord {
    pub prompt: Prompt,
    pub synonyms: Vec<Synonym>,
}

impl SynonymRecord {
    /// Decodes one raw row. Returns `None` for malformed rows.
    ///
    /// Blank (bare empty) synonym fields are dropped.
    pub fn from_fields(fields: &[RawField]) -> Option<Self> {
        if fields.len() < MIN_SYNONYM_FIELDS || fields[0].is_blank() {
            return None;
        }
        let synonyms = fields[1..]
            .iter()
            .filter(|field| !field.is_blank())
            .map(|field| field.value().to_string())
            .collect();
        Some(Self {
            prompt: fields[0].value().to_string(),
            synonyms,
        })
    }

    /// Writes this record as one row.
    pub fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        let mut row = Vec::with_capacity(self.synonyms.len() + 1);
        row.push(self.prompt.as_str());
        row.extend(self.synonyms.iter().map(String::as_str));
        write_row(writer, &row)
    }
}

/// One decoded response row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseRecord {
    pub prompt: Prompt,
    pub entry: ResponseEntry,
}

impl ResponseRecord {
    /// Decodes one raw row. Returns `None` for malformed rows.
    ///
    /// Action fields that are all blank mean "no actions".
    pub fn from_fields(fields: &[RawField]) -> Option<Self> {
        if fields.len() < MIN_RESPONSE_FIELDS || fields[0].is_blank() {
            return None;
        }
        let action_fields = &fields[2..];
        let actions: Vec<ActionId> = if action_fields.iter().all(RawField::is_blank) {
            Vec::new()
        } else {
            action_fields
                .iter()
                .map(|field| field.value().to_string())
                .collect()
        };
        Some(Self {
            prompt: fields[0].value().to_string(),
            entry: ResponseEntry {
                response: fields[1].value().to_string(),
                actions,
            },
        })
    }

    /// Writes this record as one row.
    pub fn encode<W: Write + ?Sized>(&self, writer: &mut W) -> io::Result<()> {
        write_response_row(writer, self.prompt.as_str(), &self.entry)
    }
}

/// Decodes every well-formed synonym row in `input`.
pub fn decode_synonym_records(input: &str) -> Vec<SynonymRecord> {
    parse_rows(input)
        .iter()
        .filter_map(|row| SynonymRecord::from_fields(row.as_slice()))
        .collect()
}

/// Decodes every well-formed response row in `input`.
pub fn decode_response_records(input: &str) -> Vec<ResponseRecord> {
    parse_rows(input)
        .iter()
        .filter_map(|row| ResponseRecord::from_fields(row.as_slice()))
        .collect()
}

/// Writes one synonym row per `(prompt, synonyms)` group.
pub fn encode_synonym_groups<'a, W, I>(writer: &mut W, groups: I) -> io::Result<usize>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = (&'a str, Vec<&'a str>)>,
{
    let mut written = 0;
    for (prompt, synonyms) in groups {
        let mut row = Vec::with_capacity(synonyms.len() + 1);
        row.push(prompt);
        row.extend(synonyms);
        write_row(writer, &row)?;
        written += 1;
    }
    Ok(written)
}

/// Writes one response row per catalog entry.
pub fn encode_response_entries<'a, W, I>(writer: &mut W, entries: I) -> io::Result<usize>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = (&'a str, &'a ResponseEntry)>,
{
    let mut written = 0;
    for (prompt, entry) in entries {
        write_response_row(writer, prompt, entry)?;
        written += 1;
    }
    Ok(written)
}

fn write_response_row<W: Write + ?Sized>(
    writer: &mut W,
    prompt: &str,
    entry: &ResponseEntry,
) -> io::Result<()> {
    let mut row = vec![prompt, entry.response.as_str()];
    if entry.actions.is_empty() {
        return write_row_with_blank_tail(writer, &row);
    }
    row.extend(entry.actions.iter().map(String::as_str));
    write_row(writer, &row)
}

#[cfg(test)]
mod tests {
    use super::{decode_response_records, decode_synonym_records, ResponseRecord, SynonymRecord};
    use crate::model::dialog::ResponseEntry;

    fn encode_then_decode(record: &ResponseRecord) -> ResponseRecord {
        let mut out = Vec::new();
        record.encode(&mut out).unwrap();
        let mut decoded = decode_response_records(std::str::from_utf8(&out).unwrap());
        assert_eq!(decoded.len(), 1);
        decoded.remove(0)
    }

    #[test]
    fn synonym_rows_shorter_than_two_fields_are_skipped() {
        let records = decode_synonym_records("lonely\ngreeting, hi , hello,\n,orphan\n");
        assert_eq!(
            records,
            vec![SynonymRecord {
                prompt: "greeting".to_string(),
                synonyms: vec!["hi".to_string(), "hello".to_string()],
            }]
        );
    }

    #[test]
    fn synonym_record_encodes_padded_and_empty_synonyms() {
        let record = SynonymRecord {
            prompt: " padded".to_string(),
            synonyms: vec![" hi".to_string(), String::new(), "hey".to_string()],
        };
        let mut out = Vec::new();
        record.encode(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "\" padded\",\" hi\",\"\",hey\n");
        assert_eq!(decode_synonym_records(&text), vec![record]);
    }

    #[test]
    fn quoted_synonym_fields_are_kept_exactly() {
        let records = decode_synonym_records("\"\",\" hi\",\"\"\n");
        assert_eq!(
            records,
            vec![SynonymRecord {
                prompt: String::new(),
                synonyms: vec![" hi".to_string(), String::new()],
            }]
        );
    }

    #[test]
    fn response_rows_shorter_than_three_fields_are_skipped() {
        let records = decode_response_records("greeting,Hello there!\nbye,Goodbye!,wave,nod\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].prompt, "bye");
        assert_eq!(
            records[0].entry,
            ResponseEntry::new("Goodbye!", ["wave", "nod"])
        );
    }

    #[test]
    fn zero_action_response_uses_bare_trailing_field() {
        let record = ResponseRecord {
            prompt: "thanks".to_string(),
            entry: ResponseEntry::new("You're welcome", Vec::<String>::new()),
        };
        let mut out = Vec::new();
        record.encode(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "thanks,You're welcome,\n");

        assert!(encode_then_decode(&record).entry.actions.is_empty());
    }

    #[test]
    fn single_empty_action_is_not_collapsed() {
        let record = ResponseRecord {
            prompt: "solo".to_string(),
            entry: ResponseEntry::new("Ok", [""]),
        };
        assert_eq!(encode_then_decode(&record), record);
    }

    #[test]
    fn padded_values_survive_encoding() {
        let record = ResponseRecord {
            prompt: " padded".to_string(),
            entry: ResponseEntry::new("  spaced reply ", ["act ", "go"]),
        };
        assert_eq!(encode_then_decode(&record), record);
    }
}
