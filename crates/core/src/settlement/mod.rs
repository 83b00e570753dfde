//! Settlement entry construction.

pub mod recorder;

pub use recorder::{SettlementInput, SettlementRecorder};
