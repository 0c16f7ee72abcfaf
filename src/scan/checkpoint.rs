//! Durable scan checkpoints.
//!
//! Each checkpoint is a single-frame file named `checkpoint_NNNNNN.ckpt`
//! where `NNNNNN` is the number of roster entries processed so far. Saves
//! are write-then-publish: the frame goes to a uniquely named temp file,
//! is flushed and synced, then renamed over the final path. A reader never
//! observes a half-written checkpoint under its final name.
//!
//! Resume walks the directory from the highest index downward and returns
//! the first checkpoint that decodes cleanly and matches the roster
//! digest. Corrupt files are skipped with a warning; a clean decode whose
//! digest disagrees with the current roster is a hard error, because
//! silently continuing would attribute counts to the wrong figures.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::codec::{decode_frame, encode_frame};
use super::lock::ScanLock;
use super::ScanState;
use crate::error::CheckpointError;

/// Extension of published checkpoint files.
const CHECKPOINT_EXT: &str = "ckpt";

/// Filename prefix of published checkpoint files.
const CHECKPOINT_PREFIX: &str = "checkpoint_";

/// Marker embedded in temp filenames, used by the startup sweep.
const TEMP_MARKER: &str = ".ckpt.tmp.";

/// A point-in-time snapshot of scan progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Number of roster entries fully processed when this was taken.
    pub index: usize,
    /// When the checkpoint was written.
    pub created_at: DateTime<Utc>,
    /// Digest of the roster the scan ran over.
    pub roster_digest: String,
    /// Accumulated counts and edges.
    pub state: ScanState,
}

impl Checkpoint {
    /// Creates a checkpoint stamped with the current time.
    #[must_use]
    pub fn new(index: usize, roster_digest: String, state: ScanState) -> Self {
        Self {
            index,
            created_at: Utc::now(),
            roster_digest,
            state,
        }
    }
}

/// Directory-backed checkpoint storage with exclusive-access locking.
#[derive(Debug)]
pub struct CheckpointStore {
    dir: PathBuf,
    _lock: ScanLock,
}

impl CheckpointStore {
    /// Opens (creating if needed) a checkpoint directory and takes the
    /// exclusive scan lock.
    ///
    /// Stale temp files left by an interrupted save are removed here.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::Locked`] if another process holds the
    /// lock, or an I/O error if the directory cannot be prepared.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CheckpointError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;

        let lock = match ScanLock::acquire(&dir) {
            Ok(lock) => lock,
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                return Err(CheckpointError::Locked { dir });
            }
            Err(e) => return Err(e.into()),
        };

        let store = Self { dir, _lock: lock };
        store.sweep_stale_temps()?;
        Ok(store)
    }

    /// Path a checkpoint at `index` is published under.
    #[must_use]
    pub fn checkpoint_path(&self, index: usize) -> PathBuf {
        self.dir
            .join(format!("{CHECKPOINT_PREFIX}{index:06}.{CHECKPOINT_EXT}"))
    }

    /// Removes temp files from interrupted saves. Published checkpoints
    /// are never touched.
    fn sweep_stale_temps(&self) -> Result<(), CheckpointError> {
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.contains(TEMP_MARKER) {
                tracing::warn!(file = %name, "removing stale checkpoint temp file");
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }

    /// Atomically persists a checkpoint.
    ///
    /// The frame is written to a temp file, flushed, synced to disk, and
    /// renamed to its final name. On any failure the temp file is removed
    /// and the previously published checkpoints are left intact.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if any step of the write fails.
    pub fn save(&self, checkpoint: &Checkpoint) -> Result<(), CheckpointError> {
        let final_path = self.checkpoint_path(checkpoint.index);
        let temp_path = self
            .dir
            .join(format!("{CHECKPOINT_PREFIX}{:06}{TEMP_MARKER}{}", checkpoint.index, Uuid::new_v4()));

        let result = (|| {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            encode_frame(&mut writer, checkpoint)?;
            writer.flush()?;
            writer.get_ref().sync_all()?;
            fs::rename(&temp_path, &final_path)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        } else {
            tracing::info!(
                index = checkpoint.index,
                path = %final_path.display(),
                "checkpoint published"
            );
        }
        result.map_err(CheckpointError::Io)
    }

    /// Indices of published checkpoints, ascending.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory cannot be read.
    pub fn indices(&self) -> Result<Vec<usize>, CheckpointError> {
        let mut indices = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(CHECKPOINT_EXT) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(digits) = stem.strip_prefix(CHECKPOINT_PREFIX) else {
                continue;
            };
            if let Ok(index) = digits.parse::<usize>() {
                indices.push(index);
            }
        }
        indices.sort_unstable();
        Ok(indices)
    }

    /// Loads and verifies the checkpoint at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::Corrupted`] if the file fails to decode
    /// or its recorded index disagrees with its filename.
    pub fn load(&self, index: usize) -> Result<Checkpoint, CheckpointError> {
        let path = self.checkpoint_path(index);
        let file = File::open(&path)?;
        let mut reader = BufReader::new(file);

        let checkpoint: Checkpoint = decode_frame(&mut reader).map_err(|e| {
            if matches!(e.kind(), ErrorKind::InvalidData | ErrorKind::UnexpectedEof) {
                CheckpointError::Corrupted {
                    index,
                    reason: e.to_string(),
                }
            } else {
                CheckpointError::Io(e)
            }
        })?;

        if checkpoint.index != index {
            return Err(CheckpointError::Corrupted {
                index,
                reason: format!(
                    "recorded index {} does not match filename index {index}",
                    checkpoint.index
                ),
            });
        }
        Ok(checkpoint)
    }

    /// Finds the most recent valid checkpoint for a roster.
    ///
    /// Walks indices from highest to lowest. Corrupt files are skipped
    /// with a warning so an interrupted or damaged latest save falls back
    /// to the one before it.
    ///
    /// # Errors
    ///
    /// Returns [`CheckpointError::RosterMismatch`] if a checkpoint decodes
    /// cleanly but was taken against a different roster.
    pub fn latest(&self, roster_digest: &str) -> Result<Option<Checkpoint>, CheckpointError> {
        let mut indices = self.indices()?;
        indices.reverse();

        for index in indices {
            match self.load(index) {
                Ok(checkpoint) => {
                    if checkpoint.roster_digest != roster_digest {
                        return Err(CheckpointError::RosterMismatch { index });
                    }
                    return Ok(Some(checkpoint));
                }
                Err(CheckpointError::Corrupted { index, reason }) => {
                    tracing::warn!(index, %reason, "skipping corrupt checkpoint");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }
}
