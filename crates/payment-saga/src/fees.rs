//! Processing fee computation.

use domain::Money;

/// Computes the processor fee for a gross amount: 2.9% rounded to the
/// nearest cent, plus a 30 cent flat fee.
pub fn processing_fee(amount: Money) -> Money {
    let percentage = (amount.cents() * 29 + 500) / 1000;
    Money::from_cents(percentage + 30)
}

/// Computes the amount settled to the merchant after fees.
pub fn net_amount(amount: Money) -> Money {
    amount - processing_fee(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fee_for_59_98() {
        // 2.9% of $59.98 is $1.73942, rounds to $1.74, plus $0.30.
        assert_eq!(processing_fee(Money::from_cents(5998)), Money::from_cents(204));
        assert_eq!(net_amount(Money::from_cents(5998)), Money::from_cents(5794));
    }

    #[test]
    fn percentage_rounds_to_nearest_cent() {
        // 2.9% of $10.00 is exactly 29 cents.
        assert_eq!(processing_fee(Money::from_cents(1000)), Money::from_cents(59));
        // 2.9% of $0.50 is 1.45 cents, rounds to 1.
        assert_eq!(processing_fee(Money::from_cents(50)), Money::from_cents(31));
        // 2.9% of $0.60 is 1.74 cents, rounds to 2.
        assert_eq!(processing_fee(Money::from_cents(60)), Money::from_cents(32));
    }

    #[test]
    fn gross_splits_into_fee_and_net() {
        for cents in [1, 50, 999, 5998, 123_456] {
            let amount = Money::from_cents(cents);
            assert_eq!(processing_fee(amount) + net_amount(amount), amount);
        }
    }
}
