//! Parsing of duration strings such as `"15m"`, `"1h30m"` or `"168h"`.

use std::time::Duration;

use crate::error::AppError;

/// Parse a duration string made of one or more `<number><unit>` pairs.
///
/// Units: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. Numbers may carry a
/// fractional part (`"1.5h"`). A bare `"0"` is accepted.
pub fn parse_duration(input: &str) -> Result<Duration, AppError> {
    let s = input.trim();
    if s.is_empty() {
        return Err(AppError::validation("empty duration"));
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let invalid = || AppError::validation(format!("invalid duration '{input}'"));

    let mut rest = s;
    let mut total_nanos: f64 = 0.0;

    while !rest.is_empty() {
        let number_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| AppError::validation(format!("missing unit in duration '{input}'")))?;
        if number_end == 0 {
            return Err(invalid());
        }
        let value: f64 = rest[..number_end].parse().map_err(|_| invalid())?;
        rest = &rest[number_end..];

        let unit_end = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_end] {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1_000.0,
            "ms" => 1_000_000.0,
            "s" => 1_000_000_000.0,
            "m" => 60.0 * 1_000_000_000.0,
            "h" => 3_600.0 * 1_000_000_000.0,
            other => {
                return Err(AppError::validation(format!(
                    "unknown unit '{other}' in duration '{input}'"
                )));
            }
        };
        rest = &rest[unit_end..];
        total_nanos += value * nanos_per_unit;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(invalid());
    }
    Ok(Duration::from_nanos(total_nanos as u64))
}

/// Parse `input`, falling back to `default` when it is unparseable or zero.
pub fn parse_duration_or(input: &str, default: Duration, setting: &str) -> Duration {
    match parse_duration(input) {
        Ok(d) if !d.is_zero() => d,
        Ok(_) => {
            tracing::warn!(setting, value = input, "Zero duration configured, using default");
            default
        }
        Err(e) => {
            tracing::warn!(setting, value = input, error = %e, "Invalid duration, using default");
            default
        }
    }
}
