// ============================================================
// Layer 7 — Checkpoint Store
// ============================================================
// Persists the full training state after every epoch and keeps
// a separate copy of the best-scoring epoch.
//
// File layout:
//   checkpoints/
//     checkpoint/            ← latest epoch, overwritten every epoch
//       meta.json            ← epoch, accuracies, architecture,
//                               blob digests
//       model.bin            ← model state (opaque bytes)
//       optimizer.bin        ← optimizer state (opaque bytes)
//     model_best/            ← byte copy of checkpoint/ for the best epoch
//     train_config.json      ← hyperparameters of the run
//
// Every artifact is first written to a `<name>.partial` staging
// directory and then swapped into place with renames:
//
//   <name>          → <name>.old      (retire previous)
//   <name>.partial  → <name>          (publish new)
//   <name>.old      removed
//
// A crash between the two renames leaves only `<name>.old`. Opening
// the store moves it back, and `load` reads it when `<name>` is
// missing, so the last good artifact is never lost. The best copy
// is taken from the finished latest artifact (copy-after-write).
//
// SHA-256 digests of both blobs are stored in meta.json and
// verified on load.

use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::{error::TrainError, records::CheckpointRecord};

pub const LATEST_DIR: &str = "checkpoint";
pub const BEST_DIR: &str = "model_best";
pub const CONFIG_FILE: &str = "train_config.json";

const META_FILE: &str = "meta.json";
const MODEL_FILE: &str = "model.bin";
const OPTIMIZER_FILE: &str = "optimizer.bin";
const FORMAT_VERSION: u32 = 2;

/// Scalar half of a checkpoint, stored as JSON next to the blobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CheckpointMeta {
    version: u32,
    epoch: usize,
    /// Shape fingerprint of the network the model blob belongs to
    architecture: String,
    accuracy: f64,
    best_accuracy: f64,
    model_sha256: String,
    optimizer_sha256: String,
}

/// Saves and restores checkpoint records under one directory.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// Open (and create if needed) a checkpoint directory.
    ///
    /// Artifacts left retired by an interrupted swap are restored.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, TrainError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| TrainError::io(&dir, e))?;
        let store = Self { dir };
        recover_retired(&store.latest_path())?;
        recover_retired(&store.best_path())?;
        Ok(store)
    }

    pub fn latest_path(&self) -> PathBuf {
        self.dir.join(LATEST_DIR)
    }

    pub fn best_path(&self) -> PathBuf {
        Self::best_path_in(&self.dir)
    }

    /// Best-checkpoint location under `dir`, without creating anything.
    pub fn best_path_in(dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(BEST_DIR)
    }

    /// Persist `record` as the latest checkpoint, and also as the
    /// best checkpoint when `is_best` is set.
    pub fn save(&self, record: &CheckpointRecord, is_best: bool) -> Result<(), TrainError> {
        // ── Latest: write everything into staging, then swap ─────────────────
        let latest = self.latest_path();
        let staging = staging_path(&latest);
        reset_dir(&staging)?;

        let meta = CheckpointMeta {
            version: FORMAT_VERSION,
            epoch: record.epoch,
            architecture: record.architecture.clone(),
            accuracy: record.accuracy,
            best_accuracy: record.best_accuracy,
            model_sha256: sha256_hex(&record.model_state),
            optimizer_sha256: sha256_hex(&record.optimizer_state),
        };
        write_file(&staging.join(MODEL_FILE), &record.model_state)?;
        write_file(&staging.join(OPTIMIZER_FILE), &record.optimizer_state)?;
        let json = serde_json::to_vec_pretty(&meta).map_err(|e| TrainError::CorruptCheckpoint {
            path: staging.join(META_FILE),
            reason: e.to_string(),
        })?;
        write_file(&staging.join(META_FILE), &json)?;
        swap_into_place(&staging, &latest)?;
        tracing::debug!("Saved checkpoint for epoch {} to '{}'", record.epoch, latest.display());

        // ── Best: copy the finished latest artifact, then swap ───────────────
        if is_best {
            let best = self.best_path();
            let staging = staging_path(&best);
            reset_dir(&staging)?;
            for name in [META_FILE, MODEL_FILE, OPTIMIZER_FILE] {
                let from = latest.join(name);
                fs::copy(&from, staging.join(name)).map_err(|e| TrainError::io(&from, e))?;
            }
            swap_into_place(&staging, &best)?;
            tracing::debug!("Copied epoch {} to '{}'", record.epoch, best.display());
        }
        Ok(())
    }

    /// Restore a record from a checkpoint directory written by `save`.
    ///
    /// Falls back to the retired copy when an interrupted swap left
    /// only `<path>.old` behind.
    pub fn load(path: &Path) -> Result<CheckpointRecord, TrainError> {
        if !path.is_dir() {
            let retired = retired_path(path);
            if retired.is_dir() {
                tracing::warn!(
                    "'{}' is missing; loading interrupted swap leftover '{}'",
                    path.display(),
                    retired.display()
                );
                return Self::load(&retired);
            }
            return Err(TrainError::CheckpointNotFound { path: path.to_path_buf() });
        }

        // ── Meta first: version and digests decide what is trusted ───────────
        let meta_path = path.join(META_FILE);
        let meta_bytes = read_file(&meta_path)?;
        let meta: CheckpointMeta =
            serde_json::from_slice(&meta_bytes).map_err(|e| TrainError::CorruptCheckpoint {
                path: meta_path.clone(),
                reason: e.to_string(),
            })?;
        if meta.version != FORMAT_VERSION {
            return Err(TrainError::CorruptCheckpoint {
                path: meta_path,
                reason: format!("unsupported format version {}", meta.version),
            });
        }

        let model_state = read_verified(&path.join(MODEL_FILE), &meta.model_sha256)?;
        let optimizer_state = read_verified(&path.join(OPTIMIZER_FILE), &meta.optimizer_sha256)?;

        Ok(CheckpointRecord {
            epoch: meta.epoch,
            architecture: meta.architecture,
            model_state,
            optimizer_state,
            accuracy: meta.accuracy,
            best_accuracy: meta.best_accuracy,
        })
    }

    /// Write the run configuration as pretty JSON.
    pub fn save_config<T: Serialize>(&self, config: &T) -> Result<(), TrainError> {
        let path = self.dir.join(CONFIG_FILE);
        let json = serde_json::to_string_pretty(config)
            .map_err(|e| TrainError::config(format!("cannot serialise config: {e}")))?;
        write_file(&path, json.as_bytes())?;
        tracing::debug!("Saved training config to '{}'", path.display());
        Ok(())
    }
}

fn staging_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    target.with_file_name(name)
}

fn retired_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".old");
    target.with_file_name(name)
}

fn reset_dir(dir: &Path) -> Result<(), TrainError> {
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(|e| TrainError::io(dir, e))?;
    }
    fs::create_dir_all(dir).map_err(|e| TrainError::io(dir, e))
}

/// Move `<target>.old` back to `target` if the swap that retired
/// it never published a replacement.
fn recover_retired(target: &Path) -> Result<(), TrainError> {
    let retired = retired_path(target);
    if !target.exists() && retired.is_dir() {
        fs::rename(&retired, target).map_err(|e| TrainError::io(&retired, e))?;
        tracing::warn!("Restored '{}' from an interrupted save", target.display());
    }
    Ok(())
}

/// Replace `target` with the fully written `staging` directory.
/// The previous artifact survives until the new one is in place.
fn swap_into_place(staging: &Path, target: &Path) -> Result<(), TrainError> {
    recover_retired(target)?;
    let retired = retired_path(target);
    if retired.exists() {
        fs::remove_dir_all(&retired).map_err(|e| TrainError::io(&retired, e))?;
    }
    if target.exists() {
        fs::rename(target, &retired).map_err(|e| TrainError::io(target, e))?;
    }
    fs::rename(staging, target).map_err(|e| TrainError::io(staging, e))?;
    if retired.exists() {
        fs::remove_dir_all(&retired).map_err(|e| TrainError::io(&retired, e))?;
    }
    Ok(())
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), TrainError> {
    fs::write(path, bytes).map_err(|e| TrainError::io(path, e))
}

fn read_file(path: &Path) -> Result<Vec<u8>, TrainError> {
    fs::read(path).map_err(|e| TrainError::io(path, e))
}

fn read_verified(path: &Path, expected_sha: &str) -> Result<Vec<u8>, TrainError> {
    let bytes = read_file(path)?;
    let actual = sha256_hex(&bytes);
    if actual != expected_sha {
        return Err(TrainError::CorruptCheckpoint {
            path: path.to_path_buf(),
            reason: format!("sha256 mismatch (expected {expected_sha}, found {actual})"),
        });
    }
    Ok(bytes)
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes).iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(epoch: usize, accuracy: f64, best_accuracy: f64) -> CheckpointRecord {
        CheckpointRecord {
            epoch,
            architecture: "cifarnet(blocks=3, features=64, classes=10)".to_string(),
            model_state: (0..=255u8).cycle().take(4096 + epoch).collect(),
            optimizer_state: vec![0xAB, 0x00, 0xFF, epoch as u8],
            accuracy,
            best_accuracy,
        }
    }

    #[test]
    fn round_trip_preserves_fields_and_blobs() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(tmp.path()).unwrap();
        let original = record(7, 61.25, 63.5);

        store.save(&original, false).unwrap();
        let loaded = CheckpointStore::load(&store.latest_path()).unwrap();

        assert_eq!(loaded, original);
        assert!(!store.best_path().exists());
    }

    #[test]
    fn best_copy_only_written_when_flagged() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(tmp.path()).unwrap();

        store.save(&record(0, 40.0, 40.0), true).unwrap();
        store.save(&record(1, 35.0, 40.0), false).unwrap();

        let latest = CheckpointStore::load(&store.latest_path()).unwrap();
        let best = CheckpointStore::load(&store.best_path()).unwrap();
        assert_eq!(latest.epoch, 1);
        assert_eq!(best.epoch, 0);
        assert_eq!(best.accuracy, 40.0);
    }

    #[test]
    fn overwrite_leaves_no_staging_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(tmp.path()).unwrap();
        store.save(&record(0, 10.0, 10.0), true).unwrap();
        store.save(&record(1, 20.0, 20.0), true).unwrap();

        let mut names: Vec<String> = fs::read_dir(tmp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec![LATEST_DIR.to_string(), BEST_DIR.to_string()]);
        assert_eq!(CheckpointStore::load(&store.best_path()).unwrap().epoch, 1);
    }

    #[test]
    fn interrupted_best_swap_keeps_last_good_copy() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(tmp.path()).unwrap();
        store.save(&record(4, 70.0, 70.0), true).unwrap();

        // crash after retiring model_best but before publishing the new one
        let best = store.best_path();
        fs::rename(&best, retired_path(&best)).unwrap();

        let loaded = CheckpointStore::load(&best).unwrap();
        assert_eq!(loaded.epoch, 4);

        // reopening puts it back; a non-best save must not touch it
        let store = CheckpointStore::new(tmp.path()).unwrap();
        assert!(best.is_dir());
        assert!(!retired_path(&best).exists());
        store.save(&record(5, 60.0, 70.0), false).unwrap();
        assert_eq!(CheckpointStore::load(&best).unwrap().epoch, 4);
    }

    #[test]
    fn swap_recovers_leftover_before_retiring() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(tmp.path()).unwrap();
        store.save(&record(1, 30.0, 30.0), true).unwrap();
        let best = store.best_path();
        fs::rename(&best, retired_path(&best)).unwrap();

        store.save(&record(2, 35.0, 35.0), true).unwrap();
        assert_eq!(CheckpointStore::load(&best).unwrap().epoch, 2);
        assert!(!retired_path(&best).exists());
    }

    #[test]
    fn architecture_survives_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(tmp.path()).unwrap();
        let mut original = record(0, 10.0, 10.0);
        original.architecture = "cifarnet(blocks=12, features=256, classes=100)".into();
        store.save(&original, false).unwrap();
        let loaded = CheckpointStore::load(&store.latest_path()).unwrap();
        assert_eq!(loaded.architecture, original.architecture);
    }

    #[test]
    fn missing_path_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = CheckpointStore::load(&tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, TrainError::CheckpointNotFound { .. }));
    }

    #[test]
    fn tampered_blob_is_detected() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(tmp.path()).unwrap();
        store.save(&record(3, 50.0, 50.0), false).unwrap();

        fs::write(store.latest_path().join(MODEL_FILE), b"garbage").unwrap();
        let err = CheckpointStore::load(&store.latest_path()).unwrap_err();
        assert!(matches!(err, TrainError::CorruptCheckpoint { .. }));
    }

    #[test]
    fn config_is_written_as_json() {
        let tmp = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(tmp.path()).unwrap();
        store.save_config(&serde_json::json!({ "lr": 0.1, "epochs": 180 })).unwrap();

        let text = fs::read_to_string(tmp.path().join(CONFIG_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["epochs"], 180);
    }
}
