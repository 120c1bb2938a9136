use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

// Rows shown in the default leaderboard view. Stats are always computed
// over the full entry set, never this slice.
pub const DISPLAY_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentCounts {
    pub morning: u32,
    pub afternoon: u32,
    pub evening: u32,
    pub night: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalTargets {
    pub total: u32,
    pub segments: SegmentCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionStage {
    pub label: String,
    pub team_target: u32,
    pub personal_target: u32,
    pub reward_won: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionSession {
    pub title: String,
    pub window: String,
    pub stages: [MissionStage; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionSchedule {
    pub morning: MissionSession,
    pub afternoon: MissionSession,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiderEntry {
    pub name: String,
    pub status: String,
    pub completed: u32,
    pub rejected: u32,
    pub dispatch_cancelled: u32,
    pub rider_fault: u32,
    pub segments: SegmentCounts,
}

impl RiderEntry {
    pub fn is_active(&self) -> bool {
        self.status == crate::extract::labels::STATUS_ACTIVE
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardSnapshot {
    // Full set, sorted descending by `completed` (stable, so ties keep
    // sheet order).
    pub entries: Vec<RiderEntry>,
    // First DISPLAY_ROWS of `entries`, retained for the table view.
    pub display: Vec<RiderEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardStats {
    pub total_done: u32,
    pub segments: SegmentCounts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub goals: GoalTargets,
    pub mission: MissionSchedule,
    pub leaderboard: LeaderboardSnapshot,
    pub stats: BoardStats,
    pub updated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardView {
    Top,
    Full,
}

#[derive(Debug, Clone)]
pub enum Delta {
    // Wholesale replacement; readers never see a half-updated board.
    SetBoard(Box<BoardSnapshot>),
    Log(String),
}

#[derive(Debug, Clone)]
pub enum ProviderCommand {
    Refresh,
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub board: Option<BoardSnapshot>,
    pub view: BoardView,
    pub scroll: u16,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            board: None,
            view: BoardView::Top,
            scroll: 0,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
        }
    }

    pub fn visible_riders(&self) -> &[RiderEntry] {
        let Some(board) = &self.board else {
            return &[];
        };
        match self.view {
            BoardView::Top => &board.leaderboard.display,
            BoardView::Full => &board.leaderboard.entries,
        }
    }

    pub fn toggle_view(&mut self) {
        self.view = match self.view {
            BoardView::Top => BoardView::Full,
            BoardView::Full => BoardView::Top,
        };
        self.scroll = 0;
    }

    pub fn scroll_down(&mut self) {
        let total = self.visible_riders().len();
        if total == 0 {
            self.scroll = 0;
            return;
        }
        let max_scroll = (total - 1).min(u16::MAX as usize) as u16;
        if self.scroll < max_scroll {
            self.scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn clamp_scroll(&mut self) {
        let total = self.visible_riders().len();
        if total == 0 {
            self.scroll = 0;
        } else {
            self.scroll = self.scroll.min((total - 1).min(u16::MAX as usize) as u16);
        }
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::SetBoard(board) => {
            state.board = Some(*board);
            state.clamp_scroll();
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
