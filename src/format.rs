// Magnitudes below this print in scientific notation.
const SCIENTIFIC_BELOW: f64 = 1e-4;

/// Renders an evaluation result for display.
///
/// Integral values drop the fractional part (`2.0` prints as `2`). Everything
/// else uses the shortest representation that round-trips, switching to
/// scientific notation (`1.5e-07`) for magnitudes below `1e-4`.
pub fn format_number(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value == f64::INFINITY {
        return "inf".to_string();
    }
    if value == f64::NEG_INFINITY {
        return "-inf".to_string();
    }
    if value == 0.0 {
        // -0.0 included
        return "0".to_string();
    }
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else if value.abs() < SCIENTIFIC_BELOW {
        scientific(value)
    } else {
        format!("{}", value)
    }
}

/// `1.5e-7` becomes `1.5e-07`: signed exponent, at least two digits.
fn scientific(value: f64) -> String {
    let formatted = format!("{:e}", value);
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => formatted,
    }
}
