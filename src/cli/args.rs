//! Command-line argument value parsers

use clap_num::number_range;

use crate::domain::model::validate_chroma;

/// Strictly positive integer such as a width or a framerate
pub fn positive_u32(value: &str) -> Result<u32, String> {
    number_range(value, 1, u32::MAX)
}

/// Strictly positive, finite rate
pub fn positive_rate(value: &str) -> Result<f64, String> {
    let rate: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(format!("{} must be greater than 0", value));
    }
    Ok(rate)
}

/// `0x`-prefixed hex colour
pub fn chroma_color(value: &str) -> Result<String, String> {
    validate_chroma(value).map_err(|e| e.to_string())?;
    Ok(value.to_string())
}
