//! On-disk persistence for the request ledger.
//!
//! The store is a JSON array at a single primary path, with the previous
//! generation kept as a `.bak` sibling. Writes go through a temp file and an
//! atomic rename, so a reader never observes a partially written primary.

use crate::error::Error;
use crate::ledger::Request;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub struct Store {
    primary: PathBuf,
    backup: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let primary = path.into();
        let backup = primary.with_extension("bak");
        Store { primary, backup }
    }

    pub fn path(&self) -> &Path {
        &self.primary
    }

    fn temp_path(&self) -> PathBuf {
        self.primary.with_extension("json.tmp")
    }

    /// Load the ledger, trying the primary file first and the backup second.
    ///
    /// A missing or malformed file falls through to the next candidate; both
    /// failing is a cold start, not an error. Records lacking `created_at`
    /// are backfilled with the current time on deserialization.
    pub fn load(&self) -> Vec<Request> {
        for path in [&self.primary, &self.backup] {
            let contents = match std::fs::read_to_string(path) {
                Ok(contents) => contents,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to read ledger file");
                    continue;
                }
            };
            match serde_json::from_str::<Vec<Request>>(&contents) {
                Ok(requests) => {
                    info!(path = %path.display(), count = requests.len(), "Loaded request ledger");
                    return requests;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Malformed ledger file, trying fallback");
                }
            }
        }
        info!("No ledger found on disk, starting empty");
        Vec::new()
    }

    /// Persist the ledger atomically.
    ///
    /// Sequence: rename the current primary to the backup (preserving the
    /// last known-good generation), write the new content to a temp path,
    /// then rename the temp file over the primary.
    pub fn save(&self, requests: &[Request]) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(requests).map_err(std::io::Error::other)?;

        if self.primary.exists() {
            std::fs::rename(&self.primary, &self.backup)?;
        }

        let temp_path = self.temp_path();
        let mut file = std::fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        std::fs::rename(&temp_path, &self.primary)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Request;

    fn request(message_id: u64, name: &str) -> Request {
        Request {
            artist: "Carti".into(),
            name: name.into(),
            link: "http://x".into(),
            message_id,
            created_at: 1_700_000_000,
            requested_by: "user#0".into(),
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> Store {
        Store::new(dir.path().join("requests.json"))
    }

    #[test]
    fn round_trip_preserves_requests_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let requests = vec![request(1, "Song X"), request(2, "Song Y")];

        store.save(&requests).unwrap();
        assert_eq!(store.load(), requests);
    }

    #[test]
    fn load_returns_empty_on_cold_start() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().is_empty());
    }

    #[test]
    fn load_falls_back_to_backup_on_malformed_primary() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let first = vec![request(1, "Song X")];

        store.save(&first).unwrap();
        store.save(&[request(1, "Song X"), request(2, "Song Y")]).unwrap();
        std::fs::write(dir.path().join("requests.json"), "{ not json").unwrap();

        // The previous generation lives in requests.bak.
        assert_eq!(store.load(), first);
    }

    #[test]
    fn save_keeps_previous_generation_as_backup() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let first = vec![request(1, "Song X")];
        let second = vec![request(1, "Song X"), request(2, "Song Y")];

        store.save(&first).unwrap();
        store.save(&second).unwrap();

        assert_eq!(store.load(), second);
        let backup: Vec<Request> =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("requests.bak")).unwrap())
                .unwrap();
        assert_eq!(backup, first);
    }

    #[test]
    fn interrupted_write_leaves_previous_generation_readable() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let first = vec![request(1, "Song X")];
        store.save(&first).unwrap();

        // A crash between the backup rename and the final rename leaves only
        // the backup plus a stray temp file.
        std::fs::rename(
            dir.path().join("requests.json"),
            dir.path().join("requests.bak"),
        )
        .unwrap();
        std::fs::write(dir.path().join("requests.json.tmp"), "partial garbage").unwrap();

        assert_eq!(store.load(), first);
    }

    #[test]
    fn load_backfills_missing_created_at() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"[{"artist":"Carti","name":"Song X","link":"http://x","message_id":1,"requested_by":"user#0"}]"#,
        )
        .unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].created_at > 0);
    }

    #[test]
    fn load_accepts_legacy_fractional_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        std::fs::write(
            store.path(),
            r#"[{"artist":"Carti","name":"Song X","link":"http://x","message_id":1,"created_at":1700000000.75,"requested_by":"user#0"}]"#,
        )
        .unwrap();

        assert_eq!(store.load()[0].created_at, 1_700_000_000);
    }
}
