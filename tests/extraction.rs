use std::fs;
use std::path::PathBuf;

use rider_terminal::extract::{
    extract_goals, extract_leaderboard, extract_mission, labels, layout, parse_count,
};
use rider_terminal::grid::{cell, parse_grid, RawGrid};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn fixture_grid() -> RawGrid {
    parse_grid(&read_fixture("board.csv")).expect("fixture should parse")
}

// A row with `skip` leading empty cells, then the given cells.
fn padded_row(skip: usize, cells: &[&str]) -> Vec<String> {
    let mut row = vec![String::new(); skip];
    row.extend(cells.iter().map(|c| c.to_string()));
    row
}

#[test]
fn layout_constants_still_point_at_the_sheet_regions() {
    // Boundary check against the bundled export copy: if the sheet layout
    // drifts, this is the first test that should go red.
    let grid = fixture_grid();
    assert_eq!(cell(&grid, layout::GOAL_LABEL_ROW, layout::GOAL_COLS.start), "총 완료");
    assert!(cell(&grid, layout::MORNING_SESSION_ROW, layout::MISSION_LABEL_COL).contains("미션"));
    assert!(cell(&grid, layout::AFTERNOON_SESSION_ROW, layout::MISSION_LABEL_COL).contains("미션"));
    let headers = &grid[layout::HEADER_ROW];
    assert!(headers.iter().any(|h| h == labels::RIDER_NAME));
    assert!(headers.iter().any(|h| h == labels::COMPLETED));
}

#[test]
fn goal_targets_from_fixture() {
    let goals = extract_goals(&fixture_grid());
    assert_eq!(goals.total, 300);
    assert_eq!(goals.segments.morning, 90);
    assert_eq!(goals.segments.afternoon, 80);
    assert_eq!(goals.segments.evening, 60);
    assert_eq!(goals.segments.night, 45);
}

#[test]
fn goal_morning_accepts_the_older_label() {
    let mut grid: RawGrid = vec![Vec::new()];
    grid.push(padded_row(13, &["총 완료", "아침", "오후", "저녁", "심야"]));
    grid.push(padded_row(13, &["200", "55", "40", "30", "20"]));
    let goals = extract_goals(&grid);
    assert_eq!(goals.segments.morning, 55);
}

#[test]
fn absent_goal_labels_default_to_zero() {
    let grid: RawGrid = vec![vec!["이름".to_string()]];
    let goals = extract_goals(&grid);
    assert_eq!(goals.total, 0);
    assert_eq!(goals.segments.night, 0);
}

#[test]
fn goal_values_with_separators_coerce() {
    let mut grid: RawGrid = vec![Vec::new()];
    grid.push(padded_row(13, &["총 완료", "아점"]));
    grid.push(padded_row(13, &["1,200", " 35 "]));
    let goals = extract_goals(&grid);
    assert_eq!(goals.total, 1200);
    assert_eq!(goals.segments.morning, 35);
}

#[test]
fn mission_schedule_from_fixture() {
    let mission = extract_mission(&fixture_grid());

    assert_eq!(mission.morning.title, "오전 미션");
    assert_eq!(mission.morning.window, "06:00 ~ 12:59");
    assert_eq!(mission.morning.stages[0].label, "1단계");
    assert_eq!(mission.morning.stages[0].team_target, 25);
    assert_eq!(mission.morning.stages[0].personal_target, 3);
    assert_eq!(mission.morning.stages[0].reward_won, 50_000);
    assert_eq!(mission.morning.stages[1].label, "2단계");
    assert_eq!(mission.morning.stages[1].team_target, 40);
    assert_eq!(mission.morning.stages[1].personal_target, 5);
    assert_eq!(mission.morning.stages[1].reward_won, 100_000);

    assert_eq!(mission.afternoon.title, "오후 미션");
    assert_eq!(mission.afternoon.window, "17:00 ~ 02:59");
    assert_eq!(mission.afternoon.stages[0].team_target, 30);
    assert_eq!(mission.afternoon.stages[0].personal_target, 4);
    assert_eq!(mission.afternoon.stages[0].reward_won, 60_000);
    assert_eq!(mission.afternoon.stages[1].team_target, 50);
    assert_eq!(mission.afternoon.stages[1].personal_target, 6);
    assert_eq!(mission.afternoon.stages[1].reward_won, 120_000);
}

#[test]
fn mission_labels_fall_back_when_blank() {
    let grid: RawGrid = Vec::new();
    let mission = extract_mission(&grid);
    assert_eq!(mission.morning.title, "오전 미션");
    assert_eq!(mission.afternoon.title, "오후 미션");
    assert_eq!(mission.morning.stages[0].label, "1단계");
    assert_eq!(mission.morning.stages[1].label, "2단계");
    assert_eq!(mission.morning.stages[0].team_target, 0);
    assert_eq!(mission.afternoon.stages[1].reward_won, 0);
}

#[test]
fn leaderboard_from_fixture() {
    let board = extract_leaderboard(&fixture_grid());
    assert_eq!(board.entries.len(), 14);
    assert_eq!(board.display.len(), 10);

    assert_eq!(board.entries[0].name, "박도윤");
    assert_eq!(board.entries[0].completed, 35);
    assert_eq!(board.entries[1].name, "김민준");
    assert_eq!(board.entries[2].name, "이서연");

    // 최서준 and 정하은 both completed 18; sheet order survives the sort.
    let tied: Vec<&str> = board
        .entries
        .iter()
        .filter(|e| e.completed == 18)
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(tied, vec!["최서준", "정하은"]);

    // Trailer rows with an empty identity cell never become entries.
    assert!(board.entries.iter().all(|e| !e.name.is_empty()));
}

#[test]
fn leaderboard_status_flag() {
    let board = extract_leaderboard(&fixture_grid());
    let top = &board.entries[0];
    assert_eq!(top.status, "운행중");
    assert!(top.is_active());
    let inactive = board
        .entries
        .iter()
        .find(|e| e.name == "최서준")
        .expect("rider should be present");
    assert!(!inactive.is_active());
}

#[test]
fn sort_is_descending_and_stable() {
    let raw = "이름,완료\nA,5\nB,5\nC,9\n";
    let board = extract_leaderboard(&parse_grid(raw).expect("should parse"));
    let names: Vec<&str> = board.entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["C", "A", "B"]);
}

#[test]
fn reordered_columns_still_map() {
    let raw = "완료,이름,운행상태\n7,Kim,운행중\n";
    let board = extract_leaderboard(&parse_grid(raw).expect("should parse"));
    assert_eq!(board.entries.len(), 1);
    assert_eq!(board.entries[0].name, "Kim");
    assert_eq!(board.entries[0].completed, 7);
    assert!(board.entries[0].is_active());
}

#[test]
fn short_rows_extract_with_defaults() {
    let raw = "이름,운행상태,완료\nKim\n";
    let board = extract_leaderboard(&parse_grid(raw).expect("should parse"));
    assert_eq!(board.entries.len(), 1);
    assert_eq!(board.entries[0].name, "Kim");
    assert_eq!(board.entries[0].completed, 0);
    assert_eq!(board.entries[0].status, "");
}

#[test]
fn garbage_numeric_cells_count_as_zero() {
    let raw = "이름,완료,거절\nKim,twelve,�\n";
    let board = extract_leaderboard(&parse_grid(raw).expect("should parse"));
    assert_eq!(board.entries[0].completed, 0);
    assert_eq!(board.entries[0].rejected, 0);
}

#[test]
fn parse_count_coercions() {
    assert_eq!(parse_count("12"), 12);
    assert_eq!(parse_count(" 12 "), 12);
    assert_eq!(parse_count("1,234"), 1234);
    assert_eq!(parse_count("50,000원"), 50_000);
    assert_eq!(parse_count("12.7"), 12);
    assert_eq!(parse_count(""), 0);
    assert_eq!(parse_count("abc"), 0);
    assert_eq!(parse_count("-5"), 0);
    assert_eq!(parse_count("-"), 0);
    assert_eq!(parse_count("1.2.3"), 0);
}

#[test]
fn extraction_is_idempotent() {
    let grid = fixture_grid();
    assert_eq!(extract_goals(&grid), extract_goals(&grid));
    assert_eq!(extract_mission(&grid), extract_mission(&grid));
    assert_eq!(extract_leaderboard(&grid), extract_leaderboard(&grid));
}
