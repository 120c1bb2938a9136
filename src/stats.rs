use crate::state::{BoardStats, LeaderboardSnapshot};

// One pass over the FULL entry set. The display slice is a view concern;
// aggregating over it would undercount everyone past the cutoff. Rebuilt
// from scratch per refresh because rider membership changes between
// snapshots.
pub fn aggregate(board: &LeaderboardSnapshot) -> BoardStats {
    let mut stats = BoardStats::default();
    for entry in &board.entries {
        stats.total_done += entry.completed;
        stats.segments.morning += entry.segments.morning;
        stats.segments.afternoon += entry.segments.afternoon;
        stats.segments.evening += entry.segments.evening;
        stats.segments.night += entry.segments.night;
    }
    stats
}
