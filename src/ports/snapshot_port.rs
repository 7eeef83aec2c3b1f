//! Holdings snapshot port trait.

use crate::domain::error::FxdcaError;
use crate::domain::snapshot::HoldingsSnapshot;

pub trait SnapshotPort {
    /// `Ok(None)` when no snapshot has been recorded.
    fn load(&self) -> Result<Option<HoldingsSnapshot>, FxdcaError>;

    /// Human-readable location, shown when the snapshot is missing.
    fn location(&self) -> String;
}
