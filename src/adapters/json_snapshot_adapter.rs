//! JSON file adapter for the holdings snapshot.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::domain::error::FxdcaError;
use crate::domain::snapshot::HoldingsSnapshot;
use crate::ports::snapshot_port::SnapshotPort;

pub struct JsonSnapshotAdapter {
    path: PathBuf,
}

impl JsonSnapshotAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SnapshotPort for JsonSnapshotAdapter {
    fn load(&self) -> Result<Option<HoldingsSnapshot>, FxdcaError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(FxdcaError::Snapshot {
                    file: self.path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        };

        serde_json::from_str(content.trim_start_matches('\u{feff}'))
            .map(Some)
            .map_err(|e| FxdcaError::Snapshot {
                file: self.path.display().to_string(),
                reason: e.to_string(),
            })
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}
