//! Small numeric helpers shared by the report calculators.

/// Round to two decimal places. Money outputs in the reports are fixed to
/// two decimals.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to four decimal places. Exchange-rate averages keep four.
pub(crate) fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round2() {
        assert_eq!(round2(4.545454), 4.55);
        assert_eq!(round2(183.60000000000002), 183.6);
        assert_eq!(round2(-0.005), -0.01);
    }

    #[test]
    fn test_round4() {
        assert_eq!(round4(7.123456), 7.1235);
        assert_eq!(round4(7.2), 7.2);
    }
}
