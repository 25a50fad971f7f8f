//! Calorie amount parsing and display

/// Whole-string numeric parse used by the form gate: surrounding
/// whitespace is ignored, anything else must be a finite number.
pub fn parse_strict(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Leading-number parse: skips leading whitespace and reads the longest
/// numeric prefix, so `"750kcal"` reads as 750. Returns `None` when no
/// digits are found.
pub fn parse_leading(raw: &str) -> Option<f64> {
    let s = raw.trim_start().as_bytes();
    let mut end = 0;

    if matches!(s.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < s.len() && s[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < s.len() && s[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < s.len() && s[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when digits follow it
    if end < s.len() && matches!(s[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if exp_end < s.len() && matches!(s[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < s.len() && s[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    std::str::from_utf8(&s[..end]).ok()?.parse::<f64>().ok()
}

/// A usable amount is finite and strictly positive
pub fn is_valid(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

/// Shortest decimal form: `500`, `2.5`. Magnitudes from 1e21 up or below
/// 1e-6 switch to exponent form with a signed exponent: `1e+21`, `1.5e-7`.
pub fn format_amount(amount: f64) -> String {
    let magnitude = amount.abs();
    if amount.is_finite() && magnitude != 0.0 && !(1e-6..1e21).contains(&magnitude) {
        let formatted = format!("{:e}", amount);
        match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        }
    } else {
        format!("{}", amount)
    }
}

/// Round a running total to two decimals for display
pub fn round_total(total: f64) -> f64 {
    (total * 100.0).round() / 100.0
}
