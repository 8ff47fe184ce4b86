//! Repayment simulation engine for single contracts

mod state;
mod engine;
mod series;

pub use state::{Payment, SimulationState};
pub use engine::{clamp_estimate, RunMode, SimulationEngine, ValueSource};
pub use series::{PassThrough, PeriodRecord, ResultSeries, SeriesTransform};

/// Margin kept below 100% when an estimate is clamped
pub const DEFAULT_CLAMP_EPSILON: f64 = 1e-8;

/// Pay-unit tolerance for consecutive grace-period payments
pub const DEFAULT_GRACE_TOLERANCE: f64 = 1e-3;
