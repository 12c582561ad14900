//! The predictor sites. Each is a [`Policy`](crate::core::Policy) plus a typed entry
//! point on [`Predictor`](crate::core::Predictor).

pub mod anomaly;
pub mod block;
pub mod regress;
pub mod schedule;

pub use anomaly::{AnomalyConfig, AnomalyPolicy, SecurityPolicy, SyscallSample, ThresholdRule, Verdict};
pub use block::{BlockPolicy, BlockState, CachePolicy, IoPolicy};
pub use regress::RegressPolicy;
pub use schedule::{Candidate, SchedulePolicy, MAX_CANDIDATES};
