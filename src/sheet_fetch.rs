use std::env;
use std::time::Duration;

use anyhow::{Context, anyhow};
use chrono::{Local, Utc};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::CACHE_CONTROL;

use crate::error::BoardError;
use crate::state::BoardSnapshot;
use crate::{extract, grid, stats};

// Published CSV export of the dispatch sheet, gid 0. The layout module in
// `extract` encodes where each region sits inside it.
const SHEET_CSV_URL: &str = "https://docs.google.com/spreadsheets/d/1hB4VvKXW265xGTOyodfh56eADx_7qUrKK-T2cfJHi28/export?format=csv&id=1hB4VvKXW265xGTOyodfh56eADx_7qUrKK-T2cfJHi28&gid=0";

const REQUEST_TIMEOUT_SECS: u64 = 10;
const UPDATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M";

static CLIENT: OnceCell<Client> = OnceCell::new();

fn http_client() -> anyhow::Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("failed to build http client")
    })
}

pub fn sheet_url() -> String {
    env::var("BOARD_SHEET_URL")
        .ok()
        .filter(|val| !val.trim().is_empty())
        .unwrap_or_else(|| SHEET_CSV_URL.to_string())
}

// The export is served through Google's edge cache, which happily returns
// a minutes-old copy. A per-request timestamp param plus no-store forces a
// fresh body every cycle.
pub fn fetch_board_csv(url: &str) -> Result<String, BoardError> {
    let client = http_client().map_err(BoardError::Fetch)?;

    let sep = if url.contains('?') { '&' } else { '?' };
    let busted = format!("{url}{sep}_={}", Utc::now().timestamp_millis());

    let resp = client
        .get(&busted)
        .header(CACHE_CONTROL, "no-store")
        .send()
        .context("request failed")
        .map_err(BoardError::Fetch)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(BoardError::Fetch(anyhow!("http {status}")));
    }
    resp.text()
        .context("failed reading body")
        .map_err(BoardError::Fetch)
}

// Fetch -> parse -> extract -> aggregate, one sequential cycle.
pub fn load_board(url: &str) -> Result<BoardSnapshot, BoardError> {
    let raw = fetch_board_csv(url)?;
    build_snapshot(&raw)
}

pub fn build_snapshot(raw: &str) -> Result<BoardSnapshot, BoardError> {
    let grid = grid::parse_grid(raw)?;
    let leaderboard = extract::extract_leaderboard(&grid);
    let stats = stats::aggregate(&leaderboard);
    Ok(BoardSnapshot {
        goals: extract::extract_goals(&grid),
        mission: extract::extract_mission(&grid),
        leaderboard,
        stats,
        updated_at: Local::now().format(UPDATED_AT_FORMAT).to_string(),
    })
}
