//! Numerical utilities and stability checks.

pub mod stability;
pub mod vector_ops;

// Re-export numerical utilities
pub use stability::*;
pub use vector_ops::*;
