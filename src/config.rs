//! Construction parameters for `LinHashMap`.

use thiserror::Error;

/// Tunables fixed at construction. Bucket capacity is the map's const
/// parameter and is checked alongside these.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LinHashConfig {
    /// Chains in the first round; also the first low modulus.
    pub initial_modulus: usize,
    /// A `put` splits once `insertions / size()` exceeds this.
    pub load_threshold: f64,
}

/// Rejected configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("bucket capacity must be at least one slot")]
    ZeroCapacity,
    #[error("initial modulus must be at least one chain")]
    ZeroModulus,
    #[error("load threshold must be finite and positive, got {0}")]
    InvalidThreshold(f64),
}

impl LinHashConfig {
    pub const DEFAULT_MODULUS: usize = 4;
    pub const DEFAULT_THRESHOLD: f64 = 1.2;

    pub const fn new() -> Self {
        Self {
            initial_modulus: Self::DEFAULT_MODULUS,
            load_threshold: Self::DEFAULT_THRESHOLD,
        }
    }

    pub fn initial_modulus(mut self, modulus: usize) -> Self {
        self.initial_modulus = modulus;
        self
    }

    pub fn load_threshold(mut self, threshold: f64) -> Self {
        self.load_threshold = threshold;
        self
    }

    /// Checks the parameters for a map whose buckets hold `slots` entries.
    pub fn validate(&self, slots: usize) -> Result<(), ConfigError> {
        if slots == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.initial_modulus == 0 {
            return Err(ConfigError::ZeroModulus);
        }
        if !self.load_threshold.is_finite() || self.load_threshold <= 0.0 {
            return Err(ConfigError::InvalidThreshold(self.load_threshold));
        }
        Ok(())
    }
}

impl Default for LinHashConfig {
    fn default() -> Self {
        Self::new()
    }
}
