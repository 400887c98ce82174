//! Display-oriented view over one torrent record returned by `torrents/info`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::format::{format_eta, format_size, format_speed};

/// One torrent record exactly as the daemon returned it.
pub type RawTorrent = Map<String, Value>;

/// The `torrents/properties` object exactly as the daemon returned it.
pub type RawProperties = Map<String, Value>;

const DOWNLOADING_STATES: [&str; 4] = ["downloading", "stalledDL", "metaDL", "forcedDL"];
const UPLOADING_STATES: [&str; 3] = ["uploading", "stalledUP", "forcedUP"];
const PAUSED_STATES: [&str; 2] = ["pausedDL", "pausedUP"];

/// Progress at or above which a torrent counts as complete.
const COMPLETE_THRESHOLD: f64 = 0.999;

/// Anything that can rename a torrent on the daemon.
pub trait Rename {
    /// Renames the torrent identified by `hash`. Returns `true` on success.
    fn rename_torrent(&self, hash: &str, new_name: &str) -> Result<bool>;
}

/// A snapshot of one torrent.
///
/// Every field is read once at construction; missing or mistyped keys fall back to zero or
/// the empty string. Only [`Torrent::rename`] changes the view afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Torrent {
    /// Info hash, unique per torrent on the daemon.
    pub hash: String,
    /// Display name.
    pub name: String,
    /// Total size in bytes.
    pub size: u64,
    /// Fraction downloaded, 0.0 to 1.0.
    pub progress: f64,
    /// Download speed in bytes per second.
    pub dlspeed: u64,
    /// Upload speed in bytes per second.
    pub upspeed: u64,
    /// Connected seeds.
    pub num_seeds: i64,
    /// Connected leechers.
    pub num_leechs: i64,
    /// Daemon state string, e.g. `stalledUP`.
    pub state: String,
    /// Seconds remaining. `8640000` means unknown.
    pub eta: i64,
    /// Category, empty when unset.
    pub category: String,
    /// Comma-joined tags.
    pub tags: String,
    /// When the torrent was added.
    pub added_on: DateTime<Utc>,
    /// When the torrent completed, if it has.
    pub completion_on: Option<DateTime<Utc>>,
    raw: RawTorrent,
}

impl Torrent {
    /// Builds the view from a raw record. Never fails.
    pub fn new(raw: RawTorrent) -> Self {
        let completion = int(&raw, "completion_on");
        Self {
            hash: string(&raw, "hash"),
            name: string(&raw, "name"),
            size: unsigned(&raw, "size"),
            progress: float(&raw, "progress"),
            dlspeed: unsigned(&raw, "dlspeed"),
            upspeed: unsigned(&raw, "upspeed"),
            num_seeds: int(&raw, "num_seeds"),
            num_leechs: int(&raw, "num_leechs"),
            state: string(&raw, "state"),
            eta: int(&raw, "eta"),
            category: string(&raw, "category"),
            tags: string(&raw, "tags"),
            added_on: timestamp(int(&raw, "added_on")),
            completion_on: (completion > 0).then(|| timestamp(completion)),
            raw,
        }
    }

    /// The record this view was built from.
    pub fn raw(&self) -> &RawTorrent {
        &self.raw
    }

    /// Progress as a percentage, 0 to 100.
    pub fn progress_percent(&self) -> f64 {
        self.progress * 100.0
    }

    /// Whether the torrent has finished downloading.
    pub fn is_complete(&self) -> bool {
        self.progress >= COMPLETE_THRESHOLD
    }

    /// Whether the daemon reports a downloading state.
    pub fn is_downloading(&self) -> bool {
        DOWNLOADING_STATES.contains(&self.state.as_str())
    }

    /// Whether the daemon reports an uploading or seeding state.
    pub fn is_uploading(&self) -> bool {
        UPLOADING_STATES.contains(&self.state.as_str())
    }

    /// Whether the torrent is paused.
    pub fn is_paused(&self) -> bool {
        PAUSED_STATES.contains(&self.state.as_str())
    }

    /// Size, e.g. `1.50 GB`.
    pub fn size_formatted(&self) -> String {
        format_size(self.size)
    }

    /// Download speed, e.g. `512.00 KB/s`.
    pub fn download_speed_formatted(&self) -> String {
        format_speed(self.dlspeed)
    }

    /// Upload speed, e.g. `0 B/s`.
    pub fn upload_speed_formatted(&self) -> String {
        format_speed(self.upspeed)
    }

    /// ETA, e.g. `1h 05m`, or `∞`.
    pub fn eta_formatted(&self) -> String {
        format_eta(self.eta)
    }

    /// Renames the torrent on the daemon and, on success, updates the local name.
    ///
    /// Errors from the client are returned unchanged and leave the view untouched.
    pub fn rename<R: Rename + ?Sized>(&mut self, client: &R, new_name: &str) -> Result<bool> {
        let renamed = client.rename_torrent(&self.hash, new_name)?;
        if renamed {
            self.name = new_name.to_string();
        }
        Ok(renamed)
    }
}

impl From<RawTorrent> for Torrent {
    fn from(raw: RawTorrent) -> Self {
        Self::new(raw)
    }
}

impl fmt::Display for Torrent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {:.1}% - {} - DL: {} - UL: {} - State: {}",
            self.name,
            self.progress_percent(),
            self.size_formatted(),
            self.download_speed_formatted(),
            self.upload_speed_formatted(),
            self.state
        )
    }
}

fn string(raw: &RawTorrent, key: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn int(raw: &RawTorrent, key: &str) -> i64 {
    raw.get(key)
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .unwrap_or(0)
}

fn unsigned(raw: &RawTorrent, key: &str) -> u64 {
    // negative and fractional values saturate through the f64 cast
    raw.get(key)
        .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f as u64)))
        .unwrap_or(0)
}

fn float(raw: &RawTorrent, key: &str) -> f64 {
    raw.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;
    use crate::error::{ApiError, ErrorDetail};

    fn raw(value: Value) -> RawTorrent {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected a JSON object"),
        }
    }

    fn with_state(state: &str) -> Torrent {
        Torrent::new(raw(json!({ "state": state })))
    }

    fn with_progress(progress: f64) -> Torrent {
        Torrent::new(raw(json!({ "progress": progress })))
    }

    fn sample() -> Torrent {
        Torrent::new(raw(json!({
            "hash": "abc123",
            "name": "ubuntu-24.04.iso",
            "size": 1_073_741_824_u64,
            "progress": 0.5,
            "dlspeed": 1_048_576,
            "upspeed": 0,
            "num_seeds": 12,
            "num_leechs": 3,
            "state": "downloading",
            "eta": 3600,
            "category": "linux",
            "tags": "iso,lts",
            "added_on": 1_700_000_000,
            "completion_on": -1,
        })))
    }

    #[test]
    fn fields_are_read_from_raw() {
        let torrent = sample();
        assert_eq!(torrent.hash, "abc123");
        assert_eq!(torrent.name, "ubuntu-24.04.iso");
        assert_eq!(torrent.size, 1_073_741_824);
        assert_eq!(torrent.num_seeds, 12);
        assert_eq!(torrent.num_leechs, 3);
        assert_eq!(torrent.category, "linux");
        assert_eq!(torrent.tags, "iso,lts");
        assert_eq!(torrent.added_on.timestamp(), 1_700_000_000);
        assert_eq!(torrent.completion_on, None);
        assert_eq!(torrent.raw().get("hash"), Some(&json!("abc123")));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let torrent = Torrent::new(RawTorrent::new());
        assert_eq!(torrent.hash, "");
        assert_eq!(torrent.name, "");
        assert_eq!(torrent.size, 0);
        assert_eq!(torrent.progress, 0.0);
        assert_eq!(torrent.eta, 0);
        assert_eq!(torrent.added_on.timestamp(), 0);
        assert!(torrent.completion_on.is_none());
        assert_eq!(torrent.size_formatted(), "0 B");
        assert_eq!(torrent.download_speed_formatted(), "0 B/s");
        assert_eq!(torrent.eta_formatted(), "∞");
    }

    #[test]
    fn mistyped_fields_use_defaults() {
        let torrent = Torrent::new(raw(json!({
            "name": 42,
            "size": "big",
            "progress": null,
            "eta": 120.9,
        })));
        assert_eq!(torrent.name, "");
        assert_eq!(torrent.size, 0);
        assert_eq!(torrent.progress, 0.0);
        assert_eq!(torrent.eta, 120);
    }

    #[test]
    fn unsigned_fields_cover_the_full_range() {
        let torrent = Torrent::new(raw(json!({
            "size": u64::MAX,
            "dlspeed": -5,
            "upspeed": 1024.7,
        })));
        assert_eq!(torrent.size, u64::MAX);
        assert_eq!(torrent.dlspeed, 0);
        assert_eq!(torrent.upspeed, 1024);
    }

    #[test]
    fn completion_timestamp() {
        let torrent = Torrent::new(raw(json!({ "completion_on": 1_700_000_500 })));
        assert_eq!(
            torrent.completion_on.map(|t| t.timestamp()),
            Some(1_700_000_500)
        );
    }

    #[test]
    fn progress_percent_and_completion() {
        assert_eq!(with_progress(0.25).progress_percent(), 25.0);
        assert_eq!(with_progress(1.0).progress_percent(), 100.0);
        assert!(!with_progress(0.998).is_complete());
        assert!(with_progress(0.999).is_complete());
        assert!(with_progress(1.0).is_complete());
    }

    #[test]
    fn state_classification() {
        for state in ["downloading", "stalledDL", "metaDL", "forcedDL"] {
            let torrent = with_state(state);
            assert!(torrent.is_downloading(), "{state}");
            assert!(!torrent.is_uploading(), "{state}");
            assert!(!torrent.is_paused(), "{state}");
        }
        for state in ["uploading", "stalledUP", "forcedUP"] {
            let torrent = with_state(state);
            assert!(torrent.is_uploading(), "{state}");
            assert!(!torrent.is_downloading(), "{state}");
        }
        for state in ["pausedDL", "pausedUP"] {
            let torrent = with_state(state);
            assert!(torrent.is_paused(), "{state}");
            assert!(!torrent.is_downloading(), "{state}");
        }
        for state in ["queuedDL", "checkingUP", "error", "missingFiles", ""] {
            let torrent = with_state(state);
            assert!(!torrent.is_downloading(), "{state}");
            assert!(!torrent.is_uploading(), "{state}");
            assert!(!torrent.is_paused(), "{state}");
        }
    }

    #[test]
    fn display() {
        assert_eq!(
            sample().to_string(),
            "ubuntu-24.04.iso - 50.0% - 1.00 GB - DL: 1.00 MB/s - UL: 0 B/s - State: downloading"
        );
        assert_eq!(sample().eta_formatted(), "1h 00m");
    }

    struct FakeClient {
        calls: RefCell<Vec<(String, String)>>,
        fail: bool,
    }

    impl Rename for FakeClient {
        fn rename_torrent(&self, hash: &str, new_name: &str) -> Result<bool> {
            self.calls
                .borrow_mut()
                .push((hash.to_string(), new_name.to_string()));
            if self.fail {
                Err(ApiError::request_failed(
                    "POST",
                    "torrents/rename",
                    ErrorDetail::Text("Conflict".to_string()),
                ))
            } else {
                Ok(true)
            }
        }
    }

    #[test]
    fn rename_updates_name() {
        let client = FakeClient {
            calls: RefCell::new(Vec::new()),
            fail: false,
        };
        let mut torrent = sample();

        assert!(torrent.rename(&client, "ubuntu").unwrap());
        assert_eq!(torrent.name, "ubuntu");
        assert_eq!(
            client.calls.borrow().as_slice(),
            &[("abc123".to_string(), "ubuntu".to_string())]
        );
    }

    #[test]
    fn rename_failure_keeps_name() {
        let client = FakeClient {
            calls: RefCell::new(Vec::new()),
            fail: true,
        };
        let mut torrent = sample();

        let err = torrent.rename(&client, "ubuntu").unwrap_err();
        assert!(matches!(err, ApiError::RequestFailed { .. }));
        assert_eq!(torrent.name, "ubuntu-24.04.iso");
    }
}
