use std::env;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::sheet_fetch::{load_board, sheet_url};
use crate::state::{Delta, ProviderCommand};

pub const REFRESH_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

// Owns the refresh schedule and the single-in-flight rule. The first tick
// is due immediately so startup gets a snapshot without waiting out a
// period; afterwards the next tick is armed from the END of each cycle,
// so a slow fetch can never stack a second one behind it.
#[derive(Debug)]
pub struct RefreshGate {
    state: RefreshState,
    interval: Duration,
    next_due: Option<Instant>,
}

impl RefreshGate {
    pub fn new(interval: Duration) -> Self {
        Self {
            state: RefreshState::Idle,
            interval,
            next_due: None,
        }
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    pub fn due(&self, now: Instant) -> bool {
        self.state == RefreshState::Idle && self.next_due.is_none_or(|due| now >= due)
    }

    // Idle -> Refreshing. Returns false while a cycle is already in
    // flight, whatever the schedule says.
    pub fn begin(&mut self) -> bool {
        if self.state == RefreshState::Refreshing {
            return false;
        }
        self.state = RefreshState::Refreshing;
        true
    }

    pub fn finish(&mut self, now: Instant) {
        self.state = RefreshState::Idle;
        self.next_due = Some(now + self.interval);
    }
}

pub fn poll_interval() -> Duration {
    Duration::from_secs(
        env::var("BOARD_POLL_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(REFRESH_INTERVAL_SECS)
            .max(10),
    )
}

// Provider thread: one refresh at startup, then on the fixed period, plus
// manual cycles on ProviderCommand::Refresh. Stops when the command
// sender is dropped, so tearing down the UI releases the schedule and no
// further fetches run.
pub fn spawn_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let url = sheet_url();
        let mut gate = RefreshGate::new(poll_interval());

        loop {
            if gate.due(Instant::now()) && gate.begin() {
                run_cycle(&url, &tx);
                gate.finish(Instant::now());
            }

            match cmd_rx.recv_timeout(Duration::from_millis(250)) {
                Ok(ProviderCommand::Refresh) => {
                    if gate.begin() {
                        run_cycle(&url, &tx);
                        gate.finish(Instant::now());
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    });
}

fn run_cycle(url: &str, tx: &Sender<Delta>) {
    match load_board(url) {
        Ok(board) => {
            let _ = tx.send(Delta::SetBoard(Box::new(board)));
        }
        // The previous snapshot stays published; the next tick retries.
        Err(err) => {
            let _ = tx.send(Delta::Log(format!("[WARN] {err}")));
        }
    }
}
