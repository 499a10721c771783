//! Durable snapshots of the ledger state
//!
//! A snapshot directory holds:
//!
//! - `state-<generation>.json`: the full [`LedgerState`] written by one save
//! - `manifest.json`: format version, generation, the name and CRC32 of the
//!   current state file, creation time and record counts
//!
//! Every file is written to a temporary sibling, fsynced, then renamed into
//! place. A save writes a fresh state file first and the manifest second;
//! the manifest rename is the commit point. A crash before it leaves the
//! previous manifest pointing at the previous, untouched state file. State
//! files the manifest no longer names are removed after the commit.
//! Loading verifies the checksum before parsing. A snapshot can be
//! exported to, and restored from, a tar archive.

mod archive;
mod checksum;
mod errors;
mod manifest;

pub use checksum::{checksum_of, compute_checksum, format_checksum, parse_checksum};
pub use errors::{SnapshotError, SnapshotResult};
pub use manifest::{is_state_file_name, state_file_name, StateManifest, FORMAT_VERSION};

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::registry::LedgerState;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Snapshot directory handle
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(MANIFEST_FILE)
    }

    /// Path of the state file the current manifest names
    pub fn state_path(&self) -> SnapshotResult<PathBuf> {
        let manifest = self.read_manifest()?;
        Ok(self.dir.join(manifest.state_file))
    }

    /// A snapshot exists once its manifest does
    pub fn exists(&self) -> bool {
        self.manifest_path().is_file()
    }

    /// Write `state` as a new generation and commit it by replacing the
    /// manifest.
    pub fn save(&self, state: &LedgerState) -> SnapshotResult<StateManifest> {
        fs::create_dir_all(&self.dir).map_err(|e| SnapshotError::io(&self.dir, e))?;

        let generation = self.next_generation()?;
        let bytes = serde_json::to_vec_pretty(state)?;
        let manifest = StateManifest::new(&state.summary(), generation, checksum_of(&bytes));

        write_durable(&self.dir.join(&manifest.state_file), &bytes)?;
        write_durable(&self.manifest_path(), manifest.to_json()?.as_bytes())?;
        fsync_dir(&self.dir)?;

        self.remove_stale_states(&manifest.state_file)?;
        Ok(manifest)
    }

    /// Check the manifest against the state file without parsing the state.
    pub fn verify(&self) -> SnapshotResult<StateManifest> {
        let (manifest, _) = self.read_verified()?;
        Ok(manifest)
    }

    pub fn load(&self) -> SnapshotResult<LedgerState> {
        let (_, bytes) = self.read_verified()?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn read_manifest(&self) -> SnapshotResult<StateManifest> {
        if !self.exists() {
            return Err(SnapshotError::Missing(self.dir.display().to_string()));
        }

        let manifest_path = self.manifest_path();
        let text =
            fs::read_to_string(&manifest_path).map_err(|e| SnapshotError::io(&manifest_path, e))?;
        let manifest = StateManifest::from_json(&text)?;
        if manifest.format_version != FORMAT_VERSION {
            return Err(SnapshotError::UnsupportedFormat(manifest.format_version));
        }
        if !is_state_file_name(&manifest.state_file) {
            return Err(SnapshotError::Serialization(format!(
                "manifest names invalid state file '{}'",
                manifest.state_file
            )));
        }
        Ok(manifest)
    }

    fn read_verified(&self) -> SnapshotResult<(StateManifest, Vec<u8>)> {
        let manifest = self.read_manifest()?;

        let state_path = self.dir.join(&manifest.state_file);
        let bytes = fs::read(&state_path).map_err(|e| SnapshotError::io(&state_path, e))?;

        let actual = checksum_of(&bytes);
        let matches = parse_checksum(&manifest.state_checksum) == Some(compute_checksum(&bytes));
        if !matches {
            return Err(SnapshotError::ChecksumMismatch {
                expected: manifest.state_checksum.clone(),
                actual,
            });
        }

        Ok((manifest, bytes))
    }

    /// State files present in the directory, committed or not
    fn state_files(&self) -> SnapshotResult<Vec<(u64, String)>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| SnapshotError::io(&self.dir, e))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| SnapshotError::io(&self.dir, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !is_state_file_name(&name) {
                continue;
            }
            let generation = name
                .trim_start_matches("state-")
                .trim_end_matches(".json")
                .parse::<u64>()
                .ok();
            if let Some(generation) = generation {
                files.push((generation, name));
            }
        }
        Ok(files)
    }

    /// One past every generation on disk, so a save never overwrites a
    /// state file, including one left by an interrupted save.
    fn next_generation(&self) -> SnapshotResult<u64> {
        let highest = self
            .state_files()?
            .into_iter()
            .map(|(generation, _)| generation)
            .max()
            .unwrap_or(0);
        highest
            .checked_add(1)
            .ok_or_else(|| SnapshotError::Serialization("generation counter exhausted".into()))
    }

    fn remove_stale_states(&self, current: &str) -> SnapshotResult<()> {
        for (_, name) in self.state_files()? {
            if name != current {
                let path = self.dir.join(&name);
                fs::remove_file(&path).map_err(|e| SnapshotError::io(&path, e))?;
            }
        }
        Ok(())
    }
}

/// Write through a temporary sibling, fsync, then rename over `path`.
fn write_durable(path: &Path, bytes: &[u8]) -> SnapshotResult<()> {
    let tmp = path.with_extension("json.tmp");

    let mut file = File::create(&tmp).map_err(|e| SnapshotError::io(&tmp, e))?;
    file.write_all(bytes).map_err(|e| SnapshotError::io(&tmp, e))?;
    file.sync_all().map_err(|e| SnapshotError::io(&tmp, e))?;
    drop(file);

    fs::rename(&tmp, path).map_err(|e| SnapshotError::io(path, e))
}

fn fsync_dir(path: &Path) -> SnapshotResult<()> {
    let dir = OpenOptions::new()
        .read(true)
        .open(path)
        .map_err(|e| SnapshotError::io(path, e))?;
    dir.sync_all().map_err(|e| SnapshotError::io(path, e))
}
