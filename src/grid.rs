use std::mem::take;

use anyhow::anyhow;

use crate::error::BoardError;

// Row/column text matrix from the sheet export. Rows are not guaranteed
// rectangular; go through `cell` for anything positional.
pub type RawGrid = Vec<Vec<String>>;

// Comma tokenizer for the Sheets CSV export: double-quote escapes, CRLF
// line ends, ragged rows. Truly empty lines are dropped; rows like `,,`
// are kept because the mission block relies on absolute row offsets.
pub fn parse_grid(text: &str) -> Result<RawGrid, BoardError> {
    let mut rows: RawGrid = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => row.push(take(&mut field)),
            '\r' | '\n' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(take(&mut field));
                if row.len() == 1 && row[0].is_empty() {
                    row.clear();
                } else {
                    rows.push(take(&mut row));
                }
            }
            _ => field.push(ch),
        }
    }

    // Flush the trailing row even if the final quote was left open.
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(BoardError::Parse(anyhow!("no rows in sheet payload")));
    }
    Ok(rows)
}

// Out-of-range reads are empty cells, same as a present-but-blank cell.
pub fn cell(grid: &RawGrid, row: usize, col: usize) -> &str {
    grid.get(row)
        .and_then(|r| r.get(col))
        .map(String::as_str)
        .unwrap_or("")
}
