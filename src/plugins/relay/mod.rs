//! Outbound relay: hands every `ShotEvent` to an external transaction layer.
//!
//! ```text
//!   frame loop                        tokio runtime
//!   ShotEvent ──> ShotOutbox ──mpsc──> drain ──> ShotSubmitter::submit ──> TxLedger
//! ```
//!
//! Sending never blocks the frame loop and nothing in the core reads the ledger
//! back. `drain` awaits each submission before taking the next event, so
//! submissions from one sender never overlap.

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use thiserror::Error;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::plugins::core::FrameSet;
use crate::plugins::session::ShotEvent;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("relay channel closed")]
    Closed,
    #[error("submission failed: {0}")]
    Submit(String),
}

/// The external collaborator that turns a shot into a transaction.
pub trait ShotSubmitter: Send + 'static {
    /// Returns the transaction hash on success.
    fn submit(&mut self, event: ShotEvent) -> impl Future<Output = Result<String, RelayError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxStatus {
    Pending,
    Done,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRecord {
    pub id: u64,
    pub status: TxStatus,
    pub hash: Option<String>,
}

/// Shared list of submissions, newest last. Cheap to clone.
#[derive(Resource, Debug, Clone, Default)]
pub struct TxLedger(Arc<Mutex<Vec<TxRecord>>>);

impl TxLedger {
    fn lock(&self) -> MutexGuard<'_, Vec<TxRecord>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open(&self) -> u64 {
        let mut records = self.lock();
        let id = records.len() as u64 + 1;
        records.push(TxRecord { id, status: TxStatus::Pending, hash: None });
        id
    }

    fn close(&self, id: u64, status: TxStatus, hash: Option<String>) {
        if let Some(rec) = self.lock().iter_mut().find(|r| r.id == id) {
            rec.status = status;
            rec.hash = hash;
        }
    }

    pub fn records(&self) -> Vec<TxRecord> {
        self.lock().clone()
    }

    pub fn pending(&self) -> usize {
        self.lock().iter().filter(|r| r.status == TxStatus::Pending).count()
    }
}

/// Sending half of the relay channel.
#[derive(Resource, Debug)]
pub struct ShotOutbox {
    tx: UnboundedSender<ShotEvent>,
    warned: bool,
}

impl ShotOutbox {
    pub fn channel() -> (Self, UnboundedReceiver<ShotEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, warned: false }, rx)
    }

    pub fn send(&self, event: ShotEvent) -> Result<(), RelayError> {
        self.tx.send(event).map_err(|_| RelayError::Closed)
    }
}

/// Submit events one at a time until every sender is gone.
pub async fn drain<S: ShotSubmitter>(mut rx: UnboundedReceiver<ShotEvent>, mut submitter: S, ledger: TxLedger) {
    while let Some(event) = rx.recv().await {
        let id = ledger.open();
        match submitter.submit(event).await {
            Ok(hash) => ledger.close(id, TxStatus::Done, Some(hash)),
            Err(e) => {
                warn!("Shot tx {id}: {e}");
                ledger.close(id, TxStatus::Fail, None);
            }
        }
    }
    debug!("Relay drained");
}

/// Stand-in submitter for local play: accepts everything and makes up a hash.
#[derive(Debug, Default)]
pub struct LocalSubmitter {
    sequence: u64,
}

impl ShotSubmitter for LocalSubmitter {
    async fn submit(&mut self, event: ShotEvent) -> Result<String, RelayError> {
        self.sequence += 1;
        Ok(format!("0x{:016x}{:02x}", self.sequence, u8::from(event.hit)))
    }
}

/// Keeps the relay's runtime alive for the app's lifetime.
#[derive(Resource)]
pub struct RelayRuntime(pub tokio::runtime::Runtime);

pub fn plugin(app: &mut App) {
    app.add_systems(Update, forward_shot_events.in_set(FrameSet::Snapshot));
}

/// Start a runtime with a `LocalSubmitter` behind the outbox.
pub fn install_local_relay(app: &mut App) {
    let rt = match tokio::runtime::Builder::new_multi_thread().worker_threads(1).enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to start relay runtime, shots will not be relayed: {e}");
            return;
        }
    };

    let (outbox, rx) = ShotOutbox::channel();
    let ledger = TxLedger::default();
    rt.spawn(drain(rx, LocalSubmitter::default(), ledger.clone()));

    app.insert_resource(outbox);
    app.insert_resource(ledger);
    app.insert_resource(RelayRuntime(rt));
}

/// Fire-and-forget: push this frame's shot events into the outbox.
pub fn forward_shot_events(mut reader: MessageReader<ShotEvent>, outbox: Option<ResMut<ShotOutbox>>) {
    let Some(mut outbox) = outbox else {
        // No relay installed (headless); just consume.
        reader.clear();
        return;
    };

    for event in reader.read() {
        if outbox.send(*event).is_err() && !outbox.warned {
            warn!("Relay channel closed; shots are no longer relayed");
            outbox.warned = true;
        }
    }
}
