//! Tar archives of a snapshot directory
//!
//! An archive holds exactly one `state-<generation>.json` then
//! `manifest.json`, uncompressed.
//! Export verifies the snapshot first; restore unpacks into a sibling
//! `<dir>.restore_tmp`, verifies there, then moves the files into place with
//! the manifest last.

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tar::{Archive, Builder};

use super::errors::{SnapshotError, SnapshotResult};
use super::manifest::{is_state_file_name, StateManifest};
use super::{fsync_dir, SnapshotStore, MANIFEST_FILE};

fn archive_error(path: &Path, err: io::Error) -> SnapshotError {
    SnapshotError::InvalidArchive(format!("{}: {}", path.display(), err))
}

impl SnapshotStore {
    /// Write a verified copy of this snapshot to `output`.
    pub fn export_archive(&self, output: &Path) -> SnapshotResult<StateManifest> {
        let manifest = self.verify()?;

        let file = File::create(output).map_err(|e| SnapshotError::io(output, e))?;
        let mut builder = Builder::new(BufWriter::new(file));
        for name in [manifest.state_file.as_str(), MANIFEST_FILE] {
            let path = self.dir().join(name);
            let mut source = File::open(&path).map_err(|e| SnapshotError::io(&path, e))?;
            builder
                .append_file(name, &mut source)
                .map_err(|e| SnapshotError::io(output, e))?;
        }

        let writer = builder.into_inner().map_err(|e| SnapshotError::io(output, e))?;
        let file = writer
            .into_inner()
            .map_err(|e| SnapshotError::io(output, e.into_error()))?;
        file.sync_all().map_err(|e| SnapshotError::io(output, e))?;

        Ok(manifest)
    }

    /// Populate an empty snapshot directory from `archive`.
    pub fn restore_archive(&self, archive: &Path) -> SnapshotResult<StateManifest> {
        if self.exists() {
            return Err(SnapshotError::Occupied(self.dir().display().to_string()));
        }

        let staging = staging_dir(self.dir())?;
        if staging.exists() {
            fs::remove_dir_all(&staging).map_err(|e| SnapshotError::io(&staging, e))?;
        }
        fs::create_dir_all(&staging).map_err(|e| SnapshotError::io(&staging, e))?;

        let result = unpack(archive, &staging)
            .and_then(|state_file| {
                let manifest = SnapshotStore::new(&staging).verify()?;
                if manifest.state_file != state_file {
                    return Err(SnapshotError::InvalidArchive(format!(
                        "manifest names '{}' but archive holds '{}'",
                        manifest.state_file, state_file
                    )));
                }
                Ok(manifest)
            })
            .and_then(|manifest| self.adopt(&staging, &manifest).map(|_| manifest));

        let _ = fs::remove_dir_all(&staging);
        result
    }

    fn adopt(&self, staging: &Path, manifest: &StateManifest) -> SnapshotResult<()> {
        fs::create_dir_all(self.dir()).map_err(|e| SnapshotError::io(self.dir(), e))?;
        for name in [manifest.state_file.as_str(), MANIFEST_FILE] {
            let target = self.dir().join(name);
            fs::rename(staging.join(name), &target).map_err(|e| SnapshotError::io(&target, e))?;
        }
        fsync_dir(self.dir())
    }
}

fn staging_dir(dir: &Path) -> SnapshotResult<PathBuf> {
    let name = dir.file_name().ok_or_else(|| {
        SnapshotError::InvalidArchive(format!("no directory name in {}", dir.display()))
    })?;
    let parent = dir.parent().unwrap_or(Path::new("."));
    Ok(parent.join(format!("{}.restore_tmp", name.to_string_lossy())))
}

/// Unpack the two snapshot files, refusing any other entry. Returns the
/// name of the state file.
fn unpack(archive_path: &Path, dest: &Path) -> SnapshotResult<String> {
    let file = File::open(archive_path).map_err(|e| SnapshotError::io(archive_path, e))?;
    let mut archive = Archive::new(file);

    let mut state_file: Option<String> = None;
    let entries = archive.entries().map_err(|e| archive_error(archive_path, e))?;
    for entry in entries {
        let mut entry = entry.map_err(|e| archive_error(archive_path, e))?;
        let name = entry
            .path()
            .map_err(|e| archive_error(archive_path, e))?
            .to_string_lossy()
            .into_owned();
        if is_state_file_name(&name) {
            if let Some(previous) = &state_file {
                return Err(SnapshotError::InvalidArchive(format!(
                    "second state file '{}' after '{}'",
                    name, previous
                )));
            }
            state_file = Some(name.clone());
        } else if name != MANIFEST_FILE {
            return Err(SnapshotError::InvalidArchive(format!(
                "unexpected entry '{}'",
                name
            )));
        }
        entry
            .unpack(dest.join(&name))
            .map_err(|e| archive_error(archive_path, e))?;
    }

    if !dest.join(MANIFEST_FILE).is_file() {
        return Err(SnapshotError::InvalidArchive(format!(
            "missing entry '{}'",
            MANIFEST_FILE
        )));
    }
    state_file.ok_or_else(|| SnapshotError::InvalidArchive("missing state file".into()))
}
