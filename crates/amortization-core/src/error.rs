use thiserror::Error;

#[derive(Debug, Error)]
pub enum AmortizationError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Non-finite result in {context}: the value cannot be represented")]
    NonFiniteResult { context: String },

    #[error("Schedule does not converge: {reason} (walked {periods_walked} of at most {bound} periods)")]
    NonConvergingSchedule {
        periods_walked: u32,
        bound: u32,
        reason: String,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl AmortizationError {
    /// True when the payment cannot service the loan's interest.
    pub fn is_non_converging(&self) -> bool {
        matches!(self, AmortizationError::NonConvergingSchedule { .. })
    }

    /// Stable machine-readable name of the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AmortizationError::InvalidInput { .. } => "invalid_input",
            AmortizationError::NonFiniteResult { .. } => "non_finite_result",
            AmortizationError::NonConvergingSchedule { .. } => "non_converging_schedule",
            AmortizationError::SerializationError(_) => "serialization_error",
        }
    }

    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        AmortizationError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn non_finite(context: impl Into<String>) -> Self {
        AmortizationError::NonFiniteResult {
            context: context.into(),
        }
    }
}

impl From<serde_json::Error> for AmortizationError {
    fn from(e: serde_json::Error) -> Self {
        AmortizationError::SerializationError(e.to_string())
    }
}
