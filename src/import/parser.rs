//! Quote-aware CSV scanner.
//!
//! Handles `"`-quoted fields, `""` escapes inside quotes, and `\n`, `\r` or
//! `\r\n` row terminators. No trimming and no type inference; every field
//! comes back exactly as written.

/// Split CSV text into rows of raw fields.
///
/// A trailing partial row is flushed at end of input. A trailing newline does
/// not produce an extra empty row.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut inside_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if inside_quotes && chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    inside_quotes = !inside_quotes;
                }
            }
            ',' if !inside_quotes => {
                row.push(std::mem::take(&mut field));
            }
            '\n' | '\r' if !inside_quotes => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(std::mem::take(&mut field));
                rows.push(std::mem::take(&mut row));
            }
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}
