use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crate::refresh::{poll_interval, RefreshGate};
use crate::sheet_fetch::build_snapshot;
use crate::state::{Delta, ProviderCommand};

// Offline provider for demos and development: a bundled copy of the sheet
// export runs through the exact pipeline the network provider uses.
const SAMPLE_CSV: &str = include_str!("../tests/fixtures/board.csv");

pub fn spawn_sample_provider(tx: Sender<Delta>, cmd_rx: Receiver<ProviderCommand>) {
    thread::spawn(move || {
        let mut gate = RefreshGate::new(poll_interval());

        loop {
            if gate.due(Instant::now()) && gate.begin() {
                publish(&tx);
                gate.finish(Instant::now());
            }

            match cmd_rx.recv_timeout(Duration::from_millis(250)) {
                Ok(ProviderCommand::Refresh) => {
                    if gate.begin() {
                        publish(&tx);
                        gate.finish(Instant::now());
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    });
}

fn publish(tx: &Sender<Delta>) {
    match build_snapshot(SAMPLE_CSV) {
        Ok(board) => {
            let _ = tx.send(Delta::SetBoard(Box::new(board)));
        }
        Err(err) => {
            let _ = tx.send(Delta::Log(format!("[WARN] sample feed: {err}")));
        }
    }
}
