pub mod amortization;
pub mod error;
pub mod time_value;
pub mod types;

#[cfg(feature = "mortgage")]
pub mod mortgage;

#[cfg(feature = "consolidation")]
pub mod consolidation;

pub use error::AmortizationError;
pub use types::*;

/// Standard result type for all engine operations
pub type EngineResult<T> = Result<T, AmortizationError>;
