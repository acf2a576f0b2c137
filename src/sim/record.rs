/// Personal-best persistence.
///
/// ## File format:
///   A single line holding the best length in plain decimal, e.g. `12`.
///   Missing, unreadable or malformed files read as 0.
///
/// Writes go through `BackgroundRecorder`, which owns the file store on a
/// worker thread so the game loop never waits on the disk.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("record writer is no longer running")]
    WriterGone,
}

/// Durable slot for a single integer.
pub trait RecordStore {
    /// Never fails: anything unreadable is 0.
    fn load(&self) -> u32;
    fn save(&self, value: u32) -> Result<(), RecordError>;
}

// ══════════════════════════════════════════════════════════════
// File store
// ══════════════════════════════════════════════════════════════

pub struct FileRecordStore {
    path: PathBuf,
}

impl FileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileRecordStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for FileRecordStore {
    fn load(&self) -> u32 {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => parse_record(&text).unwrap_or_else(|| {
                log::debug!("{} is malformed, personal best reads as 0", self.path.display());
                0
            }),
            Err(e) => {
                log::debug!("no personal best at {}: {e}", self.path.display());
                0
            }
        }
    }

    fn save(&self, value: u32) -> Result<(), RecordError> {
        std::fs::write(&self.path, value.to_string())
            .map_err(|source| RecordError::Write { path: self.path.clone(), source })
    }
}

/// First line, trimmed, as a decimal.
fn parse_record(text: &str) -> Option<u32> {
    text.lines().next()?.trim().parse().ok()
}

// ══════════════════════════════════════════════════════════════
// Background writer
// ══════════════════════════════════════════════════════════════

/// Serializes saves onto one worker thread. Loads still run on the
/// caller's thread: they happen once, before the first frame.
pub struct BackgroundRecorder<S: RecordStore + Send + Sync + 'static> {
    store: std::sync::Arc<S>,
    tx: Option<Sender<u32>>,
    worker: Option<JoinHandle<()>>,
}

impl<S: RecordStore + Send + Sync + 'static> BackgroundRecorder<S> {
    pub fn spawn(store: S) -> Self {
        let store = std::sync::Arc::new(store);
        let (tx, rx) = mpsc::channel::<u32>();
        let writer = std::sync::Arc::clone(&store);
        let worker = std::thread::Builder::new()
            .name("record-writer".into())
            .spawn(move || {
                for value in rx {
                    match writer.save(value) {
                        Ok(()) => log::info!("personal best {value} saved"),
                        Err(e) => log::warn!("personal best {value} lost: {e}"),
                    }
                }
            });

        match worker {
            Ok(handle) => BackgroundRecorder { store, tx: Some(tx), worker: Some(handle) },
            Err(e) => {
                log::warn!("could not start record writer, saves disabled: {e}");
                BackgroundRecorder { store, tx: None, worker: None }
            }
        }
    }
}

impl<S: RecordStore + Send + Sync + 'static> RecordStore for BackgroundRecorder<S> {
    fn load(&self) -> u32 {
        self.store.load()
    }

    fn save(&self, value: u32) -> Result<(), RecordError> {
        let tx = self.tx.as_ref().ok_or(RecordError::WriterGone)?;
        tx.send(value).map_err(|_| RecordError::WriterGone)
    }
}

impl<S: RecordStore + Send + Sync + 'static> Drop for BackgroundRecorder<S> {
    /// Flush: close the channel and wait for queued writes.
    fn drop(&mut self) {
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::warn!("record writer panicked");
            }
        }
    }
}
