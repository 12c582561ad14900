//! Construction errors. Predict calls never return these: if the weights bind, the
//! predictor is ready; if they don't, the host finds out at init.

use core::fmt;

/// Which table of a layer or gate was mis-sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Table {
    Weights = 0,
    Bias = 1,
    /// LSTM input-to-gate matrix.
    InputWeights = 2,
    /// LSTM hidden-to-gate matrix.
    RecurrentWeights = 3,
}

/// Why a predictor refused its weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelError {
    /// A table's length doesn't match the declared shape.
    DimensionMismatch {
        layer: u8,
        table: Table,
        expected: usize,
        actual: usize,
    },
    /// Layer `layer` reads a different width than the previous layer produces.
    LayerChain { layer: u8, expected: usize, actual: usize },
    /// Network declares no layers.
    EmptyNetwork,
    /// More layers than `MAX_LAYERS`.
    TooManyLayers { max: usize, actual: usize },
    /// A layer wider than the scratch buffers.
    WidthExceeded { max: usize, actual: usize },
    /// Weight count doesn't match the config's weight layers.
    LayerCount { expected: usize, actual: usize },
    /// Network's input or output width doesn't fit the predictor site.
    SiteWidth { expected: usize, actual: usize },
    /// Blob isn't a whole number of aligned i32s.
    MalformedTable,
    /// Fingerprint of the bound tables doesn't match the shipped one.
    FingerprintMismatch,
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ModelError::DimensionMismatch {
                layer,
                table,
                expected,
                actual,
            } => write!(
                f,
                "layer {layer} {table:?}: expected {expected} entries, got {actual}"
            ),
            ModelError::LayerChain {
                layer,
                expected,
                actual,
            } => write!(
                f,
                "layer {layer} reads {actual} inputs but previous layer yields {expected}"
            ),
            ModelError::EmptyNetwork => f.write_str("network declares no layers"),
            ModelError::TooManyLayers { max, actual } => {
                write!(f, "{actual} layers exceeds limit of {max}")
            }
            ModelError::WidthExceeded { max, actual } => {
                write!(f, "layer width {actual} exceeds limit of {max}")
            }
            ModelError::LayerCount { expected, actual } => {
                write!(f, "expected weights for {expected} layers, got {actual}")
            }
            ModelError::SiteWidth { expected, actual } => {
                write!(f, "site expects width {expected}, network has {actual}")
            }
            ModelError::MalformedTable => f.write_str("weight blob is misaligned or truncated"),
            ModelError::FingerprintMismatch => f.write_str("weight fingerprint mismatch"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ModelError {}
