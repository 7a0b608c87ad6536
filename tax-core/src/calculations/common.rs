//! Small decimal helpers shared by the calculator, the advisor and report
//! rendering.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds to cents, half away from zero.
///
/// The calculator never rounds its own results; this is for presenting
/// amounts to a person.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(5686.945)), dec!(5686.95));
/// assert_eq!(round_half_up(dec!(-0.005)), dec!(-0.01));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn max(
    a: Decimal,
    b: Decimal,
) -> Decimal {
    if a > b { a } else { b }
}

/// `amount * rate`, limited to `ceiling` and never below zero.
///
/// ```
/// use rust_decimal_macros::dec;
/// use tax_core::calculations::common::capped_share;
///
/// assert_eq!(capped_share(dec!(50000), dec!(0.02), dec!(1500)), dec!(1000));
/// assert_eq!(capped_share(dec!(100000), dec!(0.02), dec!(1500)), dec!(1500));
/// ```
pub fn capped_share(
    amount: Decimal,
    rate: Decimal,
    ceiling: Decimal,
) -> Decimal {
    max((amount * rate).min(ceiling), Decimal::ZERO)
}
