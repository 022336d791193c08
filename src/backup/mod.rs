//! Fire-and-forget snapshot backups.
//!
//! A single long-lived worker thread drains a queue of pre-encoded
//! snapshots and pushes them to the store. The drawing path only ever
//! enqueues finished bytes, so a backup can neither block nor fail a
//! command that already mutated the canvas: push failures are logged and
//! dropped, with no retry.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use crate::archive::SnapshotStore;

pub type SharedStore = Arc<dyn SnapshotStore + Send + Sync>;

#[derive(Debug)]
pub struct BackupWorker {
    queue: Option<mpsc::Sender<Vec<u8>>>,
    thread: Option<thread::JoinHandle<()>>,
}

/// Starts the worker thread pushing every queued snapshot under `label`.
pub fn spawn(store: SharedStore, label: String) -> BackupWorker {
    let (queue, jobs) = mpsc::channel::<Vec<u8>>();
    let thread = thread::spawn(move || {
        while let Ok(bytes) = jobs.recv() {
            match store.push(&label, &bytes) {
                Ok(handle) => tracing::debug!(handle = %handle, "snapshot backed up"),
                Err(err) => tracing::error!(?err, "snapshot backup failed"),
            }
        }
    });

    BackupWorker {
        queue: Some(queue),
        thread: Some(thread),
    }
}

impl BackupWorker {
    /// Enqueues an already-encoded snapshot and returns immediately.
    pub fn submit(&self, bytes: Vec<u8>) {
        let Some(queue) = &self.queue else {
            return;
        };
        if queue.send(bytes).is_err() {
            tracing::warn!("backup worker is gone; snapshot dropped");
        }
    }

    /// Closes the queue and waits for pending backups to drain.
    pub fn shutdown(mut self) {
        self.queue.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for BackupWorker {
    fn drop(&mut self) {
        self.queue.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::{ArchiveError, ArchiveResult};
    use std::io;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        pushed: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl SnapshotStore for RecordingStore {
        fn push(&self, label: &str, bytes: &[u8]) -> ArchiveResult<String> {
            self.pushed
                .lock()
                .unwrap()
                .push((label.to_string(), bytes.to_vec()));
            Ok(label.to_string())
        }

        fn fetch_latest(&self, _label: &str) -> ArchiveResult<Option<Vec<u8>>> {
            Ok(None)
        }
    }

    struct FailingStore;

    impl SnapshotStore for FailingStore {
        fn push(&self, _label: &str, _bytes: &[u8]) -> ArchiveResult<String> {
            Err(ArchiveError::Io(io::Error::other("store offline")))
        }

        fn fetch_latest(&self, _label: &str) -> ArchiveResult<Option<Vec<u8>>> {
            Ok(None)
        }
    }

    #[test]
    fn submitted_snapshots_reach_the_store_in_order() {
        let store = Arc::new(RecordingStore::default());
        let worker = spawn(store.clone(), "board.png".to_string());

        worker.submit(vec![1]);
        worker.submit(vec![2, 3]);
        worker.shutdown();

        let pushed = store.pushed.lock().unwrap();
        assert_eq!(
            *pushed,
            vec![
                ("board.png".to_string(), vec![1]),
                ("board.png".to_string(), vec![2, 3]),
            ]
        );
    }

    #[test]
    fn push_failures_are_swallowed_not_propagated() {
        let worker = spawn(Arc::new(FailingStore), "board.png".to_string());
        worker.submit(vec![9, 9, 9]);
        // Shutdown drains the queue; the failed push must not panic the worker.
        worker.shutdown();
    }
}
