//! The engine. Fixed-point math, evaluators, statistics, and the policy seam.

pub mod activation;
pub mod dense;
pub mod error;
pub mod fixed;
pub mod metrics;
pub mod policy;
pub mod predictor;
pub mod recurrent;
pub mod stats;
pub mod weights;

pub use activation::{relu, sigmoid, tanh, Activation};
pub use dense::{argmax, DenseLayer, FeedForward, LayerConfig, LayerWeights, NetworkConfig, MAX_LAYERS, MAX_WIDTH};
pub use error::{ModelError, Table};
pub use fixed::{Fixed, FRAC_BITS};
pub use metrics::{MetricsSnapshot, PredictorMetrics};
pub use policy::Policy;
pub use predictor::Predictor;
pub use recurrent::{GateWeights, History, LstmCell, LstmWeights, RecurrentState};
pub use stats::{reconstruction_error, RunningStats};
