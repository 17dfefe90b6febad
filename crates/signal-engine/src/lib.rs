//! Signal detection engine.
//!
//! Turns a candle window into a decision for one tracked series:
//! - [`snapshot`] computes the indicator points the decision needs
//! - [`detector`] classifies crossovers, breakouts and range re-entry
//! - [`machine`] applies the confirmation policy to the per-key state
//! - [`engine::SignalEngine`] owns one state per tracked key
//!
//! Nothing in this crate performs I/O.

pub mod config;
pub mod detector;
pub mod engine;
pub mod format;
pub mod machine;
pub mod policy;
pub mod registry;
pub mod snapshot;
pub mod state;
pub mod targets;

pub use config::{EngineConfig, IndicatorPeriods};
pub use engine::{Evaluation, EvaluationReport, SignalEngine, SkipReason};
pub use format::{format_price, format_signal};
pub use machine::{Observation, Transition};
pub use policy::{PolicyConfig, PolicyKind, Trigger};
pub use registry::{PolicyRegistry, PresetInfo};
pub use snapshot::{IndicatorSnapshot, LinePair};
pub use state::{Phase, SignalState};
pub use targets::{compute_targets, TargetConfig};
