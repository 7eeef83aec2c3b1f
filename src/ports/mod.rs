//! Port traits at the boundary of the simulation core.

pub mod config_port;
pub mod data_port;
pub mod report_port;
pub mod snapshot_port;
