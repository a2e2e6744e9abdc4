//! Snapshot storage
//!
//! The whole state lives in one JSON file. It is read once at startup and
//! rewritten wholesale after changes. Writes go to a sibling temp file that
//! is renamed over the target, so a crash mid-write leaves the previous
//! snapshot intact.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::{error::Result, state::TimerSnapshot, utils::clock::EpochMs};

/// JSON file holding the persisted snapshot
#[derive(Debug, Clone)]
pub struct SnapshotStorage {
    path: PathBuf,
}

impl SnapshotStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored snapshot; a missing file means a fresh start
    pub fn load(&self) -> Result<Option<TimerSnapshot>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No snapshot at {}, starting empty", self.path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot: TimerSnapshot = serde_json::from_slice(&bytes)?;
        info!(
            "Loaded {} timer(s) and {} group(s) from {}",
            snapshot.timers.len(),
            snapshot.groups.len(),
            self.path.display()
        );
        Ok(Some(snapshot))
    }

    /// Write `snapshot` stamped with `saved_at`
    pub async fn save(&self, snapshot: &TimerSnapshot, saved_at: EpochMs) -> Result<()> {
        let mut stamped = snapshot.clone();
        stamped.saved_at = Some(saved_at);
        let bytes = serde_json::to_vec_pretty(&stamped)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = self.temp_path();
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!("Saved snapshot to {} ({} bytes)", self.path.display(), bytes.len());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::fixtures::Fixture;
    use crate::state::{NewGroup, NewTimer};
    use tempfile::TempDir;

    #[tokio::test]
    async fn round_trips_a_snapshot() {
        let dir = TempDir::new().unwrap();
        let storage = SnapshotStorage::new(dir.path().join("nested").join("timers.json"));

        let mut fx = Fixture::new();
        fx.add_group("g", NewGroup::named("Morning").scheduled("06:45".parse().unwrap()));
        fx.add_timer("a", NewTimer::duration("Tea", 1000).in_group("g"));
        fx.start_group("g");

        storage.save(&fx.state, 42).await.unwrap();
        let loaded = storage.load().unwrap().unwrap();

        assert_eq!(loaded.saved_at, Some(42));
        assert_eq!(loaded.timers, fx.state.timers);
        assert_eq!(loaded.groups, fx.state.groups);
        assert!(!dir.path().join("nested").join("timers.json.tmp").exists());
    }

    #[test]
    fn missing_file_is_a_fresh_start() {
        let dir = TempDir::new().unwrap();
        let storage = SnapshotStorage::new(dir.path().join("absent.json"));

        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("timers.json");
        std::fs::write(&path, b"{not json").unwrap();

        assert!(SnapshotStorage::new(path).load().is_err());
    }
}
