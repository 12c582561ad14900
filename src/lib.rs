#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod core;
pub mod policies;

/// Prelude for convenient imports of primary API types.
pub mod prelude {
    pub use crate::core::{
        Activation, FeedForward, Fixed, GateWeights, LayerConfig, LayerWeights, LstmWeights,
        ModelError, NetworkConfig, Policy, Predictor,
    };
    pub use crate::policies::{
        AnomalyConfig, Candidate, CachePolicy, IoPolicy, RegressPolicy, SchedulePolicy,
        SecurityPolicy, SyscallSample, ThresholdRule, Verdict,
    };
}

// Re-export primary types at crate root for convenience.
pub use crate::core::{Fixed, ModelError, Policy, Predictor};
pub use crate::policies::Verdict;
