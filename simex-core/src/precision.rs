//! Fixed-precision decimal arithmetic over a scaled-integer domain.
//!
//! Balance and fee math must never over-credit: every operation here rounds
//! toward zero at a configurable number of decimal digits, so a computed
//! amount is always less than or equal to the mathematically exact value.
//! The working representation is an `i128` holding `value * 10^precision`,
//! floored.
//!
//! - `scale_up` / `scale_down` — convert between `f64` and the scaled domain
//! - `truncate` — the defining round-trip (floor at `precision` digits)
//! - `multiply_truncated` / `divide_truncated` — truncate, then drop one
//!   further fractional digit as headroom against double-rounding

use thiserror::Error;

/// Decimal digits kept by default. Covers satoshi-scale quantities with
/// room to spare.
pub const DEFAULT_PRECISION: u32 = 12;

/// Errors from the arithmetic layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrecisionError {
    #[error("division by zero")]
    DivisionByZero,
}

fn pow10(precision: u32) -> f64 {
    10f64.powi(precision as i32)
}

/// Map a decimal value into the scaled-integer domain: `floor(value * 10^p)`.
///
/// The cast saturates at the `i128` range bounds and maps NaN to zero, so no
/// input panics; callers are expected to supply finite values.
pub fn scale_up(value: f64, precision: u32) -> i128 {
    (value * pow10(precision)).floor() as i128
}

/// Inverse of [`scale_up`]: recover a decimal value from the scaled domain.
pub fn scale_down(scaled: i128, precision: u32) -> f64 {
    scaled as f64 / pow10(precision)
}

/// Floor `value` at `precision` decimal digits.
///
/// `truncate(4324.32423141234123123, 12) == 4324.324231412341`. The scaled
/// round-trip rounds to nearest twice and can land one step above `value`;
/// the clamp keeps `truncate(v, p) <= v` for every non-negative `v`.
pub fn truncate(value: f64, precision: u32) -> f64 {
    scale_down(scale_up(value, precision), precision).min(value)
}

/// Drop the final digit of the fractional part of `value`'s shortest
/// round-trip rendering. Integer-valued inputs pass through unchanged.
///
/// `Display` for `f64` is always positional, never scientific, so values
/// below 1e-6 take the same path as everything else.
fn strip_fraction_digit(value: f64) -> f64 {
    let rendered = value.to_string();
    match rendered.split_once('.') {
        Some((whole, frac)) => {
            let kept = &frac[..frac.len() - 1];
            let stripped = if kept.is_empty() {
                whole.parse()
            } else {
                format!("{whole}.{kept}").parse()
            };
            stripped.unwrap_or(value)
        }
        None => value,
    }
}

/// Multiply with a one-digit safety margin: `a * b` truncated to `precision`
/// digits, minus one further fractional digit.
///
/// The result never exceeds the plain `f64` product. Stripping a digit from
/// a negative rendering moves the value toward zero, so the bound needs its
/// own clamp here.
pub fn multiply_truncated(a: f64, b: f64, precision: u32) -> f64 {
    let product = a * b;
    strip_fraction_digit(truncate(product, precision)).min(product)
}

/// Divide with the same contract as [`multiply_truncated`].
///
/// A zero divisor is the layer's only hard error.
pub fn divide_truncated(a: f64, b: f64, precision: u32) -> Result<f64, PrecisionError> {
    if b == 0.0 {
        return Err(PrecisionError::DivisionByZero);
    }
    let quotient = a / b;
    Ok(strip_fraction_digit(truncate(quotient, precision)).min(quotient))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Scaling round-trip ───────────────────────────────────────────────

    #[test]
    fn scale_up_is_exact_integer() {
        assert_eq!(scale_up(4324.32423141234123123, 12), 4324324231412341);
        assert_eq!(scale_up(0.99925, 12), 999_250_000_000);
        assert_eq!(scale_up(0.0, 12), 0);
    }

    #[test]
    fn scale_down_inverts_scale_up() {
        assert_eq!(scale_down(4324324231412341, 12), 4324.324231412341);
        assert_eq!(scale_down(999_250_000_000, 12), 0.99925);
    }

    #[test]
    fn scale_up_saturates_instead_of_panicking() {
        assert_eq!(scale_up(f64::NAN, 12), 0);
        assert_eq!(scale_up(f64::INFINITY, 12), i128::MAX);
        assert_eq!(scale_up(f64::NEG_INFINITY, 12), i128::MIN);
    }

    // ── Truncation ───────────────────────────────────────────────────────

    #[test]
    fn truncate_floors_at_precision() {
        assert_eq!(truncate(4324.32423141234123123, 12), 4324.324231412341);
        assert_eq!(truncate(1.0000000000001, 12), 1.0);
        assert_eq!(truncate(0.30000000000000004, 12), 0.3);
    }

    #[test]
    fn truncate_preserves_representable_values() {
        assert_eq!(truncate(9600.0, 12), 9600.0);
        assert_eq!(truncate(0.99925, 12), 0.99925);
        assert_eq!(truncate(4996.25, 12), 4996.25);
    }

    #[test]
    fn truncate_never_exceeds_input() {
        for v in [
            0.1,
            0.30000000000000004,
            4324.32423141234123123,
            9999.999999999999,
            // Scaled past 2^53 the bare round-trip lands one step high.
            1276526758288.9998,
            1e-9,
        ] {
            assert!(truncate(v, 12) <= v, "truncate({v}) exceeded its input");
        }
    }

    // ── Multiply / divide with headroom ──────────────────────────────────

    #[test]
    fn multiply_strips_one_fraction_digit() {
        // 2.0 * 0.15 floors to 0.3; the headroom digit is the final "3".
        assert_eq!(multiply_truncated(2.0, 0.15, 12), 0.0);
        // Integer-valued products have no fraction digit to strip.
        assert_eq!(multiply_truncated(8000.0, 1.2, 12), 9600.0);
    }

    #[test]
    fn multiply_never_exceeds_product() {
        for (a, b) in [
            (0.7320710494843074, 0.28876564873250693),
            (3245123.0, 5231512.0),
            (0.00042, 991.5),
            (1.000001, 1.000001),
        ] {
            let m = multiply_truncated(a, b, 12);
            assert!(m <= a * b, "multiply_truncated({a}, {b}) = {m} > {}", a * b);
            assert!(!m.is_nan());
        }
    }

    #[test]
    fn divide_matches_truncated_quotient() {
        assert_eq!(divide_truncated(1.0, 3.0, 12), Ok(0.33333333333));
        // 10 / 4 = 2.5; stripping the ".5" leaves the whole part.
        assert_eq!(divide_truncated(10.0, 4.0, 12), Ok(2.0));
    }

    #[test]
    fn divide_by_zero_is_an_error() {
        assert_eq!(
            divide_truncated(1.0, 0.0, 12),
            Err(PrecisionError::DivisionByZero)
        );
    }

    #[test]
    fn tiny_operands_produce_no_nan() {
        let a = 0.09208126315006449;
        let b = 0.000010223056155833632;

        let m = multiply_truncated(a, b, 12);
        assert_eq!(m, 9.4135e-7);
        assert!(m <= a * b);

        let d = divide_truncated(a, b, 12).unwrap();
        assert_eq!(d, 9007.21484323645);
        assert!(d <= a / b);
    }
}
