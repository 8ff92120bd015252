//! Collaborators injected into the optimization loop.

pub mod callback;
pub mod checkpoint;

// Re-export optimization components
pub use callback::*;
pub use checkpoint::*;
