//! Tax liability calculation and deduction suggestions.
//!
//! Both components read from a shared [`RuleTableStore`](crate::RuleTableStore)
//! or a fixed rule list and never mutate anything, so they can be called
//! concurrently from any number of threads.

pub mod advisor;
pub mod calculator;
pub mod common;

pub use advisor::{DeductionAdvisor, DeductionRule, RuleTrigger};
pub use calculator::{TaxCalculator, TaxCalculatorError};
