//! Background persistence of `SystemData` snapshots.
//!
//! The engine hands every post-mutation snapshot to a [`SnapshotSink`]. The
//! production sink is [`BackgroundWriter`]: a single writer thread fed by a
//! bounded queue. Submitting never waits on disk I/O; snapshots are written
//! one at a time in submission order, so saves cannot interleave and the last
//! submitted snapshot is the one left on disk.

use crate::store::DataFile;
use crate::types::SystemData;
use crate::{Error, Result};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};
use std::thread::JoinHandle;

/// Destination for snapshots taken after each mutation
pub trait SnapshotSink {
    fn submit(&mut self, snapshot: SystemData);
}

/// Synchronous sink: writes immediately on the caller's thread
///
/// Failures are logged, matching the background writer's policy.
impl SnapshotSink for DataFile {
    fn submit(&mut self, snapshot: SystemData) {
        if let Err(e) = self.save(&snapshot) {
            tracing::error!("Could not save data to {:?}: {}", self.path(), e);
        }
    }
}

enum WriterCommand {
    Write(SystemData),
    /// Reply with the number of failed writes since the previous flush
    Flush(SyncSender<usize>),
}

/// Single-writer background persistence
pub struct BackgroundWriter {
    tx: Option<SyncSender<WriterCommand>>,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundWriter {
    /// Start the writer thread for `file`
    ///
    /// `capacity` bounds how many snapshots may wait in the queue; `submit`
    /// only blocks when that many writes are already pending.
    pub fn spawn(file: DataFile, capacity: usize) -> Result<Self> {
        let (tx, rx) = sync_channel(capacity.max(1));
        let handle = std::thread::Builder::new()
            .name("pfotbal-writer".into())
            .spawn(move || run_writer(file, rx))?;

        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    /// Wait until every snapshot submitted so far has been handled
    ///
    /// Returns [`Error::Persistence`] if any of those writes failed.
    pub fn flush(&self) -> Result<()> {
        let tx = self
            .tx
            .as_ref()
            .ok_or_else(|| Error::Persistence("writer already shut down".into()))?;

        let (reply_tx, reply_rx) = sync_channel(1);
        tx.send(WriterCommand::Flush(reply_tx))
            .map_err(|_| Error::Persistence("writer thread is gone".into()))?;
        let failed = reply_rx
            .recv()
            .map_err(|_| Error::Persistence("writer thread is gone".into()))?;

        if failed > 0 {
            return Err(Error::Persistence(format!(
                "{} background save(s) failed",
                failed
            )));
        }
        Ok(())
    }

    /// Drain the queue, stop the thread, and report any failed writes
    pub fn shutdown(mut self) -> Result<()> {
        let result = self.flush();
        self.close();
        result
    }

    fn close(&mut self) {
        // Dropping the sender ends the writer loop once the queue is drained
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("Writer thread panicked");
            }
        }
    }
}

impl SnapshotSink for BackgroundWriter {
    fn submit(&mut self, snapshot: SystemData) {
        let Some(tx) = self.tx.as_ref() else {
            tracing::error!("Snapshot dropped: writer already shut down");
            return;
        };
        if tx.send(WriterCommand::Write(snapshot)).is_err() {
            tracing::error!("Snapshot dropped: writer thread is gone");
        }
    }
}

impl Drop for BackgroundWriter {
    fn drop(&mut self) {
        self.close();
    }
}

fn run_writer(file: DataFile, rx: Receiver<WriterCommand>) {
    let mut failed = 0usize;

    for command in rx {
        match command {
            WriterCommand::Write(snapshot) => {
                tracing::info!("Background save started: {:?}", file.path());
                match file.save(&snapshot) {
                    Ok(()) => tracing::info!("Background save finished: {:?}", file.path()),
                    Err(e) => {
                        failed += 1;
                        tracing::error!("Background save failed for {:?}: {}", file.path(), e);
                    }
                }
            }
            WriterCommand::Flush(reply) => {
                // The flusher may have given up waiting; nothing to do then
                let _ = reply.send(std::mem::take(&mut failed));
            }
        }
    }

    tracing::debug!("Writer thread for {:?} stopped", file.path());
}
