pub mod consolidation;
pub mod loan;
pub mod mortgage;
