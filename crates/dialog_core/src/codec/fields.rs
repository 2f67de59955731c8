//! Comma-separated field framing.
//!
//! Reads and writes rows of text fields: `,` between fields, `\n` or `\r\n`
//! between rows, double quotes around fields that need them (`""` inside a
//! quoted field is a literal quote).
//!
//! A field is written quoted when it is empty, has leading or trailing
//! whitespace, or contains a separator or quote. Quoted fields read back
//! byte-exact; unquoted fields are trimmed by the record decoders.
//!
//! Parsing is lenient: a stray quote in the middle of an unquoted field is
//! kept literally and an unterminated quoted field ends at end of input.

use std::io::{self, Write};

/// One parsed field and whether it was quoted in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawField {
    pub text: String,
    pub quoted: bool,
}

impl RawField {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: false,
        }
    }

    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: true,
        }
    }

    /// Field value as a record sees it: exact when quoted, trimmed otherwise.
    pub fn value(&self) -> &str {
        if self.quoted {
            self.text.as_str()
        } else {
            self.text.trim()
        }
    }

    /// Unquoted and whitespace-only: an absent value, not an empty string.
    pub fn is_blank(&self) -> bool {
        !self.quoted && self.text.trim().is_empty()
    }
}

/// Splits `input` into rows of fields.
///
/// Blank lines produce no row.
pub fn parse_rows(input: &str) -> Vec<Vec<RawField>> {
    let mut rows = Vec::new();
    let mut row: Vec<RawField> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_was_quoted = false;
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                other => field.push(other),
            }
            continue;
        }

        match ch {
            '"' if field.trim().is_empty() && !field_was_quoted => {
                field.clear();
                in_quotes = true;
                field_was_quoted = true;
            }
            ',' => {
                row.push(take_field(&mut field, field_was_quoted));
                field_was_quoted = false;
            }
            '\r' | '\n' => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                finish_row(&mut rows, &mut row, &mut field, field_was_quoted);
                field_was_quoted = false;
            }
            // Padding after a closing quote is not part of the value.
            other if field_was_quoted && other.is_whitespace() => {}
            other => field.push(other),
        }
    }
    finish_row(&mut rows, &mut row, &mut field, field_was_quoted);

    rows
}

fn take_field(field: &mut String, quoted: bool) -> RawField {
    RawField {
        text: std::mem::take(field),
        quoted,
    }
}

fn finish_row(
    rows: &mut Vec<Vec<RawField>>,
    row: &mut Vec<RawField>,
    field: &mut String,
    field_was_quoted: bool,
) {
    if row.is_empty() && field.trim().is_empty() && !field_was_quoted {
        field.clear();
        return;
    }
    row.push(take_field(field, field_was_quoted));
    rows.push(std::mem::take(row));
}

/// Writes one row followed by `\n`, quoting fields where required.
pub fn write_row<W, S>(writer: &mut W, fields: &[S]) -> io::Result<()>
where
    W: Write + ?Sized,
    S: AsRef<str>,
{
    write_fields(writer, fields)?;
    writer.write_all(b"\n")
}

/// Writes one row that ends in an unquoted empty field (`a,b,`).
///
/// The bare trailing separator reads back as an absent value, unlike a
/// quoted empty string.
pub fn write_row_with_blank_tail<W, S>(writer: &mut W, fields: &[S]) -> io::Result<()>
where
    W: Write + ?Sized,
    S: AsRef<str>,
{
    write_fields(writer, fields)?;
    writer.write_all(b",\n")
}

fn write_fields<W, S>(writer: &mut W, fields: &[S]) -> io::Result<()>
where
    W: Write + ?Sized,
    S: AsRef<str>,
{
    for (position, field) in fields.iter().enumerate() {
        if position > 0 {
            writer.write_all(b",")?;
        }
        write_field(writer, field.as_ref())?;
    }
    Ok(())
}

fn write_field<W: Write + ?Sized>(writer: &mut W, field: &str) -> io::Result<()> {
    if !needs_quotes(field) {
        return writer.write_all(field.as_bytes());
    }
    writer.write_all(b"\"")?;
    writer.write_all(field.replace('"', "\"\"").as_bytes())?;
    writer.write_all(b"\"")
}

fn needs_quotes(field: &str) -> bool {
    field.is_empty() || field.trim() != field || field.contains([',', '"', '\r', '\n'])
}

#[cfg(test)]
mod tests {
    use super::{parse_rows, write_row, write_row_with_blank_tail, RawField};

    fn values(rows: &[Vec<RawField>]) -> Vec<Vec<&str>> {
        rows.iter()
            .map(|row| row.iter().map(RawField::value).collect())
            .collect()
    }

    #[test]
    fn parses_plain_rows_and_skips_blank_lines() {
        let rows = parse_rows("greeting,hi,hello\n\r\n  \nbye,cya\r\n");
        assert_eq!(
            values(&rows),
            vec![vec!["greeting", "hi", "hello"], vec!["bye", "cya"]]
        );
    }

    #[test]
    fn parses_quoted_fields_with_separators_and_escaped_quotes() {
        let rows = parse_rows("weather,\"Sunny, \"\"mostly\"\"\nlater\",look_up\n");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][1], RawField::quoted("Sunny, \"mostly\"\nlater"));
        assert_eq!(rows[0][2], RawField::plain("look_up"));
    }

    #[test]
    fn quoted_fields_keep_padding_and_emptiness() {
        let rows = parse_rows("\" padded\", \"\" ,\"tail \"\n\"\"\n");
        assert_eq!(
            rows,
            vec![
                vec![
                    RawField::quoted(" padded"),
                    RawField::quoted(""),
                    RawField::quoted("tail "),
                ],
                vec![RawField::quoted("")],
            ]
        );
    }

    #[test]
    fn unquoted_padding_is_trimmed_and_bare_empty_is_blank() {
        let rows = parse_rows(" hi ,\n");
        assert_eq!(rows[0][0].value(), "hi");
        assert!(rows[0][1].is_blank());
        assert!(!RawField::quoted("").is_blank());
    }

    #[test]
    fn unterminated_quote_ends_at_input_end() {
        let rows = parse_rows("a,\"open field");
        assert_eq!(values(&rows), vec![vec!["a", "open field"]]);
    }

    #[test]
    fn write_row_quotes_only_when_needed() {
        let mut out = Vec::new();
        write_row(&mut out, &["plain", "with,comma", "say \"hi\"", "", " pad"]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "plain,\"with,comma\",\"say \"\"hi\"\"\",\"\",\" pad\"\n"
        );
    }

    #[test]
    fn blank_tail_is_written_bare() {
        let mut out = Vec::new();
        write_row_with_blank_tail(&mut out, &["thanks", "You're welcome"]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "thanks,You're welcome,\n");
    }

    #[test]
    fn written_rows_parse_back_to_same_values() {
        let fields = ["p", "multi\nline", "a,b", "\"quoted\"", "", "  both  "];
        let mut out = Vec::new();
        write_row(&mut out, &fields).unwrap();
        let rows = parse_rows(std::str::from_utf8(&out).unwrap());
        assert_eq!(values(&rows), vec![fields.to_vec()]);
    }
}
