use std::collections::HashMap;

use crate::grid::{RawGrid, cell};
use crate::state::{
    GoalTargets, LeaderboardSnapshot, MissionSchedule, MissionSession, MissionStage, RiderEntry,
    SegmentCounts, DISPLAY_ROWS,
};

// Fixed sheet coordinates, agreed with the spreadsheet owners. One sheet
// carries three regions side by side: leaderboard columns on the left,
// goal block and mission block in columns N/P on the right. All offsets
// are 0-indexed into the parsed grid; a layout change edits this table
// and nothing else.
pub mod layout {
    use std::ops::Range;

    // Leaderboard: header labels on the first row, body below it.
    pub const HEADER_ROW: usize = 0;

    // Goal block: label row over value row, columns N..S.
    pub const GOAL_LABEL_ROW: usize = 1;
    pub const GOAL_VALUE_ROW: usize = 2;
    pub const GOAL_COLS: Range<usize> = 13..19;

    // Mission block: labels in column N, values in column P.
    pub const MISSION_LABEL_COL: usize = 13;
    pub const MISSION_VALUE_COL: usize = 15;

    // Each session is a 7-row block starting at its title row.
    pub const MORNING_SESSION_ROW: usize = 9;
    pub const AFTERNOON_SESSION_ROW: usize = 16;

    // Offsets within a session block, relative to the title row.
    pub const STAGE1_LABEL: usize = 1; // team count shares this row
    pub const STAGE1_PERSONAL: usize = 2;
    pub const STAGE1_REWARD: usize = 3;
    pub const STAGE2_LABEL: usize = 4;
    pub const STAGE2_PERSONAL: usize = 5;
    pub const STAGE2_REWARD: usize = 6;
}

// Cell literals as the operators type them. The leaderboard header row is
// the authoritative field list; extraction keys on these trimmed labels,
// so reordering columns in the sheet is tolerated. Goal lookups carry an
// ordered list of acceptable labels per logical field ("아침" survives in
// older copies of the sheet).
pub mod labels {
    pub const RIDER_NAME: &str = "이름";
    pub const RUN_STATUS: &str = "운행상태";
    pub const STATUS_ACTIVE: &str = "운행중";
    pub const COMPLETED: &str = "완료";
    pub const REJECTED: &str = "거절";
    pub const DISPATCH_CANCELLED: &str = "배차취소";
    pub const RIDER_FAULT: &str = "배달취소(라이더귀책)";
    pub const SEG_MORNING: &str = "아침점심피크";
    pub const SEG_AFTERNOON: &str = "오후논피크";
    pub const SEG_EVENING: &str = "저녁피크";
    pub const SEG_NIGHT: &str = "심야논피크";

    pub const GOAL_TOTAL: &[&str] = &["총 완료"];
    pub const GOAL_MORNING: &[&str] = &["아점", "아침"];
    pub const GOAL_AFTERNOON: &[&str] = &["오후"];
    pub const GOAL_EVENING: &[&str] = &["저녁"];
    pub const GOAL_NIGHT: &[&str] = &["심야"];

    pub const MORNING_SESSION_FALLBACK: &str = "오전 미션";
    pub const AFTERNOON_SESSION_FALLBACK: &str = "오후 미션";
    pub const STAGE_FALLBACKS: [&str; 2] = ["1단계", "2단계"];
}

// Lenient coercion for sheet cells: drops currency suffixes, thousands
// separators and stray whitespace, then clamps to a non-negative integer.
// Anything that still fails to parse counts as zero.
pub fn parse_count(raw: &str) -> u32 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => v as u32,
        _ => 0,
    }
}

pub fn extract_goals(grid: &RawGrid) -> GoalTargets {
    let mut by_label: HashMap<&str, u32> = HashMap::new();
    for col in layout::GOAL_COLS {
        let label = cell(grid, layout::GOAL_LABEL_ROW, col).trim();
        if label.is_empty() {
            continue;
        }
        by_label.insert(label, parse_count(cell(grid, layout::GOAL_VALUE_ROW, col)));
    }

    let target = |keys: &[&str]| {
        keys.iter()
            .find_map(|key| by_label.get(key).copied())
            .unwrap_or(0)
    };

    GoalTargets {
        total: target(labels::GOAL_TOTAL),
        segments: SegmentCounts {
            morning: target(labels::GOAL_MORNING),
            afternoon: target(labels::GOAL_AFTERNOON),
            evening: target(labels::GOAL_EVENING),
            night: target(labels::GOAL_NIGHT),
        },
    }
}

pub fn extract_mission(grid: &RawGrid) -> MissionSchedule {
    MissionSchedule {
        morning: extract_session(
            grid,
            layout::MORNING_SESSION_ROW,
            labels::MORNING_SESSION_FALLBACK,
        ),
        afternoon: extract_session(
            grid,
            layout::AFTERNOON_SESSION_ROW,
            labels::AFTERNOON_SESSION_FALLBACK,
        ),
    }
}

fn extract_session(grid: &RawGrid, base_row: usize, fallback_title: &str) -> MissionSession {
    let label_at = |offset: usize| {
        cell(grid, base_row + offset, layout::MISSION_LABEL_COL)
            .trim()
            .to_string()
    };
    let value_at = |offset: usize| parse_count(cell(grid, base_row + offset, layout::MISSION_VALUE_COL));

    let mut title = label_at(0);
    if title.is_empty() {
        title = fallback_title.to_string();
    }
    let window = cell(grid, base_row, layout::MISSION_VALUE_COL).trim().to_string();

    let stage = |label_offset: usize, personal_offset: usize, reward_offset: usize, idx: usize| {
        let mut label = label_at(label_offset);
        if label.is_empty() {
            label = labels::STAGE_FALLBACKS[idx].to_string();
        }
        MissionStage {
            label,
            team_target: value_at(label_offset),
            personal_target: value_at(personal_offset),
            reward_won: value_at(reward_offset),
        }
    };

    MissionSession {
        title,
        window,
        stages: [
            stage(layout::STAGE1_LABEL, layout::STAGE1_PERSONAL, layout::STAGE1_REWARD, 0),
            stage(layout::STAGE2_LABEL, layout::STAGE2_PERSONAL, layout::STAGE2_REWARD, 1),
        ],
    }
}

pub fn extract_leaderboard(grid: &RawGrid) -> LeaderboardSnapshot {
    // Column positions are re-resolved from the header row every refresh,
    // never remembered across snapshots.
    let headers: Vec<&str> = grid
        .get(layout::HEADER_ROW)
        .map(|row| row.iter().map(|h| h.trim()).collect())
        .unwrap_or_default();
    let col_of = |label: &str| headers.iter().position(|h| *h == label);

    let name_col = col_of(labels::RIDER_NAME);
    let status_col = col_of(labels::RUN_STATUS);
    let completed_col = col_of(labels::COMPLETED);
    let rejected_col = col_of(labels::REJECTED);
    let dispatch_col = col_of(labels::DISPATCH_CANCELLED);
    let fault_col = col_of(labels::RIDER_FAULT);
    let morning_col = col_of(labels::SEG_MORNING);
    let afternoon_col = col_of(labels::SEG_AFTERNOON);
    let evening_col = col_of(labels::SEG_EVENING);
    let night_col = col_of(labels::SEG_NIGHT);

    let text = |row: &[String], col: Option<usize>| {
        col.and_then(|c| row.get(c))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };
    let count = |row: &[String], col: Option<usize>| {
        col.and_then(|c| row.get(c))
            .map(|s| parse_count(s))
            .unwrap_or(0)
    };

    let mut entries: Vec<RiderEntry> = Vec::new();
    for row in grid.iter().skip(layout::HEADER_ROW + 1) {
        // An empty leading cell marks a blank trailer row, not a rider.
        if row.first().map(String::as_str).unwrap_or("").is_empty() {
            continue;
        }
        entries.push(RiderEntry {
            name: text(row, name_col),
            status: text(row, status_col),
            completed: count(row, completed_col),
            rejected: count(row, rejected_col),
            dispatch_cancelled: count(row, dispatch_col),
            rider_fault: count(row, fault_col),
            segments: SegmentCounts {
                morning: count(row, morning_col),
                afternoon: count(row, afternoon_col),
                evening: count(row, evening_col),
                night: count(row, night_col),
            },
        });
    }

    // sort_by is stable: equal completion counts keep sheet order.
    entries.sort_by(|a, b| b.completed.cmp(&a.completed));
    let display = entries.iter().take(DISPLAY_ROWS).cloned().collect();

    LeaderboardSnapshot { entries, display }
}
