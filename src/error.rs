use thiserror::Error;

// Only fetch and parse abort a refresh cycle. Extraction-level anomalies
// (blank cells, reordered columns, trailing junk rows) degrade to defaults
// instead of erroring, because the sheet is hand-edited by the operators.
#[derive(Debug, Error)]
pub enum BoardError {
    #[error("sheet fetch failed: {0:#}")]
    Fetch(anyhow::Error),
    #[error("sheet parse failed: {0:#}")]
    Parse(anyhow::Error),
}
