use chrono::{Days, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// How often a payment falls due.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Weekly,
    Biweekly,
    #[default]
    Monthly,
    Quarterly,
    SemiAnnual,
    Annual,
}

impl PaymentFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Weekly => 52,
            PaymentFrequency::Biweekly => 26,
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Quarterly => 4,
            PaymentFrequency::SemiAnnual => 2,
            PaymentFrequency::Annual => 1,
        }
    }

    /// Date of the payment `index` periods after `first` (index 0 is `first`).
    ///
    /// Month-based frequencies are stepped from the first date every time so
    /// a schedule starting on the 31st does not drift to the 28th after February.
    pub fn payment_date(self, first: NaiveDate, index: u32) -> Option<NaiveDate> {
        match self {
            PaymentFrequency::Weekly => first.checked_add_days(Days::new(7 * u64::from(index))),
            PaymentFrequency::Biweekly => first.checked_add_days(Days::new(14 * u64::from(index))),
            PaymentFrequency::Monthly => first.checked_add_months(Months::new(index)),
            PaymentFrequency::Quarterly => first.checked_add_months(Months::new(3 * index)),
            PaymentFrequency::SemiAnnual => first.checked_add_months(Months::new(6 * index)),
            PaymentFrequency::Annual => first.checked_add_months(Months::new(12 * index)),
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_dates_do_not_drift_after_short_month() {
        let first = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let feb = PaymentFrequency::Monthly.payment_date(first, 1).unwrap();
        let mar = PaymentFrequency::Monthly.payment_date(first, 2).unwrap();
        assert_eq!(feb, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(mar, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    }

    #[test]
    fn test_biweekly_step() {
        let first = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        let third = PaymentFrequency::Biweekly.payment_date(first, 2).unwrap();
        assert_eq!(third, NaiveDate::from_ymd_opt(2025, 6, 30).unwrap());
    }

    #[test]
    fn test_frequency_deserializes_snake_case() {
        let f: PaymentFrequency = serde_json::from_str("\"semi_annual\"").unwrap();
        assert_eq!(f, PaymentFrequency::SemiAnnual);
        assert_eq!(f.periods_per_year(), 2);
    }
}
