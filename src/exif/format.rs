//! Per-field canonicalization rules.
//!
//! Every formatter is total: it takes whatever text a tag (or a user edit)
//! produced and returns either a finished display string or the empty
//! sentinel. Re-applying a formatter to its own output is a no-op, which is
//! what lets edits run the same rule over an already formatted value.

/// The "unknown" value for every field.
pub const EMPTY: &str = "";

/// Format a focal length as `"<n>mm"`.
///
/// Accepts plain numbers (`"50"`), rationals (`"50/1"`) and already
/// formatted values (`"50 mm"`, `"50mm"`). The result is rounded to the
/// nearest whole millimetre.
///
/// ```rust
/// use exif_frame::exif::format_focal_length;
///
/// assert_eq!(format_focal_length("50/1"), "50mm");
/// assert_eq!(format_focal_length("23.5 mm"), "24mm");
/// assert_eq!(format_focal_length(""), "");
/// ```
pub fn format_focal_length(raw: &str) -> String {
    if raw.is_empty() {
        return EMPTY.to_string();
    }

    let cleaned: String = raw
        .to_lowercase()
        .replace("mm", "")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let value = if cleaned.contains('/') {
        let mut parts = cleaned.split('/');
        let num = parts.next().and_then(parse_float_prefix);
        let den = parts.next().and_then(parse_float_prefix);
        match (num, den) {
            (Some(n), Some(d)) if d != 0.0 => Some(n / d),
            _ => parse_float_prefix(&cleaned),
        }
    } else {
        parse_float_prefix(&cleaned)
    };

    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{}mm", display_number(round_half_up(v))),
        None => EMPTY.to_string(),
    }
}

/// Format an aperture as `"f/<n>"`, keeping the decimal as given.
pub fn format_f_number(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return EMPTY.to_string();
    }

    let lower = trimmed.to_lowercase();
    let number = lower.strip_prefix("f/").unwrap_or(&lower).trim();

    match parse_float_prefix(number).filter(|v| v.is_finite()) {
        Some(v) => format!("f/{}", display_number(v)),
        None => EMPTY.to_string(),
    }
}

/// Format a sensitivity as `"ISO <n>"`.
pub fn format_iso(raw: &str) -> String {
    if raw.is_empty() {
        return EMPTY.to_string();
    }

    let stripped = remove_ignore_ascii_case(raw, "iso");
    match parse_int_prefix(stripped.trim()) {
        Some(v) => format!("ISO {v}"),
        None => EMPTY.to_string(),
    }
}

/// Format an exposure time as `"1/<n>s"` or `"<n>s"`.
///
/// Fractions are kept verbatim. Decimal seconds below one are inverted and
/// rounded to a whole denominator; zero, negative or unparseable input gives
/// the empty sentinel.
pub fn format_shutter(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return EMPTY.to_string();
    }

    if trimmed.contains('/') {
        let fraction = trimmed.strip_suffix('s').unwrap_or(trimmed).trim_end();
        return format!("{fraction}s");
    }

    match parse_float_prefix(trimmed).filter(|v| v.is_finite()) {
        Some(v) if v >= 1.0 => format!("{}s", display_number(v)),
        Some(v) if v > 0.0 && (1.0 / v).is_finite() => {
            format!("1/{}s", display_number(round_half_up(1.0 / v)))
        }
        _ => EMPTY.to_string(),
    }
}

/// Reformat an EXIF date-time (`"YYYY:MM:DD HH:MM:SS"`) as `"YYYY.MM.DD"`.
///
/// Input that is not shaped like an EXIF date is returned unchanged rather
/// than blanked, so hand-typed dates survive edits.
pub fn format_date(raw: &str) -> String {
    if raw.is_empty() {
        return EMPTY.to_string();
    }

    let date = raw.split(' ').next().unwrap_or_default();
    let parts: Vec<&str> = date.split(':').collect();
    if parts.len() == 3 {
        format!("{}.{}.{}", parts[0], parts[1], parts[2])
    } else {
        raw.to_string()
    }
}

/// Parse the longest leading decimal number, ignoring leading whitespace.
///
/// Trailing garbage is ignored (`"1.8abc"` → `1.8`), matching how camera
/// descriptions like `"50 mm"` or `"2s"` carry units after the value.
fn parse_float_prefix(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Optional exponent, only consumed when it is complete.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && matches!(bytes[exp_end], b'+' | b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}

/// Parse the longest leading base-10 integer, ignoring leading whitespace.
fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }

    s[..end].parse::<i64>().ok()
}

/// Round half-up (towards positive infinity on ties).
fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Shortest decimal rendering; integers print without a fractional part.
fn display_number(v: f64) -> String {
    // Normalize -0 so "0mm" never turns into "-0mm".
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{v}")
}

fn remove_ignore_ascii_case(haystack: &str, needle: &str) -> String {
    let mut out = String::with_capacity(haystack.len());
    let mut rest = haystack;
    while !rest.is_empty() {
        if rest.len() >= needle.len()
            && rest.is_char_boundary(needle.len())
            && rest[..needle.len()].eq_ignore_ascii_case(needle)
        {
            rest = &rest[needle.len()..];
            continue;
        }
        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── focal length ─────────────────────────────────────────────────

    #[test]
    fn focal_length_plain_and_rational() {
        assert_eq!(format_focal_length("50"), "50mm");
        assert_eq!(format_focal_length("50/1"), "50mm");
        assert_eq!(format_focal_length("235/10"), "24mm");
        assert_eq!(format_focal_length("50 mm"), "50mm");
        assert_eq!(format_focal_length("35MM"), "35mm");
    }

    #[test]
    fn focal_length_zero_divisor_falls_back_to_prefix() {
        assert_eq!(format_focal_length("50/0"), "50mm");
    }

    #[test]
    fn focal_length_empty_and_garbage() {
        assert_eq!(format_focal_length(""), "");
        assert_eq!(format_focal_length("wide"), "");
        assert_eq!(format_focal_length("/"), "");
    }

    // ── aperture ─────────────────────────────────────────────────────

    #[test]
    fn f_number_adds_prefix() {
        assert_eq!(format_f_number("1.8"), "f/1.8");
        assert_eq!(format_f_number("2"), "f/2");
        assert_eq!(format_f_number("2.80"), "f/2.8");
    }

    #[test]
    fn f_number_keeps_existing_prefix() {
        assert_eq!(format_f_number("f/2.8"), "f/2.8");
        assert_eq!(format_f_number("F/4"), "f/4");
    }

    #[test]
    fn f_number_rejects_garbage() {
        assert_eq!(format_f_number(""), "");
        assert_eq!(format_f_number("f/"), "");
        assert_eq!(format_f_number("open"), "");
    }

    // ── iso ──────────────────────────────────────────────────────────

    #[test]
    fn iso_variants() {
        assert_eq!(format_iso("ISO 100"), "ISO 100");
        assert_eq!(format_iso("400"), "ISO 400");
        assert_eq!(format_iso("iso3200"), "ISO 3200");
        assert_eq!(format_iso(""), "");
        assert_eq!(format_iso("auto"), "");
    }

    // ── shutter ──────────────────────────────────────────────────────

    #[test]
    fn shutter_decimal_seconds() {
        assert_eq!(format_shutter("0.005"), "1/200s");
        assert_eq!(format_shutter("2"), "2s");
        assert_eq!(format_shutter("1"), "1s");
        assert_eq!(format_shutter("2.5"), "2.5s");
        assert_eq!(format_shutter("0.3"), "1/3s");
    }

    #[test]
    fn shutter_fraction_is_verbatim() {
        assert_eq!(format_shutter("1/250"), "1/250s");
        assert_eq!(format_shutter("1/250s"), "1/250s");
        assert_eq!(format_shutter("10/2000"), "10/2000s");
    }

    #[test]
    fn shutter_non_positive_is_empty() {
        assert_eq!(format_shutter("0"), "");
        assert_eq!(format_shutter("-1"), "");
        assert_eq!(format_shutter("bulb"), "");
        assert_eq!(format_shutter(""), "");
    }

    // ── date ─────────────────────────────────────────────────────────

    #[test]
    fn date_reformats_exif_shape() {
        assert_eq!(format_date("2024:05:01 12:30:00"), "2024.05.01");
        assert_eq!(format_date("2024:05:01"), "2024.05.01");
    }

    #[test]
    fn date_passes_through_other_shapes() {
        assert_eq!(format_date("May 1st"), "May 1st");
        assert_eq!(format_date("2024-05-01 12:30:00"), "2024-05-01 12:30:00");
        assert_eq!(format_date(""), "");
    }

    // ── idempotence ──────────────────────────────────────────────────

    #[test]
    fn every_formatter_is_idempotent() {
        let inputs = [
            "", "50", "50/1", "23.5 mm", "1.8", "f/2.8", "ISO 100", "400", "0.005", "2",
            "1/250", "1/250s", "2024:05:01 12:30:00", "2024.05.01", "garbage", "-3", "0",
            "1e3", "0.3",
        ];
        let formatters: [(&str, fn(&str) -> String); 5] = [
            ("focal", format_focal_length),
            ("aperture", format_f_number),
            ("iso", format_iso),
            ("shutter", format_shutter),
            ("date", format_date),
        ];

        for (name, f) in formatters {
            for input in inputs {
                let once = f(input);
                assert_eq!(f(&once), once, "{name} not idempotent for {input:?}");
            }
        }
    }

    // ── helpers ──────────────────────────────────────────────────────

    #[test]
    fn float_prefix_parsing() {
        assert_eq!(parse_float_prefix("1.8abc"), Some(1.8));
        assert_eq!(parse_float_prefix("  .5"), Some(0.5));
        assert_eq!(parse_float_prefix("5."), Some(5.0));
        assert_eq!(parse_float_prefix("1e3x"), Some(1000.0));
        assert_eq!(parse_float_prefix("2e"), Some(2.0));
        assert_eq!(parse_float_prefix("."), None);
        assert_eq!(parse_float_prefix("-"), None);
        assert_eq!(parse_float_prefix("x1"), None);
    }

    #[test]
    fn int_prefix_parsing() {
        assert_eq!(parse_int_prefix("100 "), Some(100));
        assert_eq!(parse_int_prefix("1e3"), Some(1));
        assert_eq!(parse_int_prefix("abc"), None);
    }

    #[test]
    fn round_half_up_matches_ties_upward() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(16.4), 16.0);
    }
}
