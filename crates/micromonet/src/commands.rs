//! microMONET command builders and response parsers.
//!
//! All functions are pure: they produce command text or consume a response
//! line without performing any I/O. [`MicroMonet`](crate::MicroMonet) glues
//! them to a transport.
//!
//! # Response grammars
//!
//! Each response shape is a literal prefix anchored at the start of the
//! line, followed by decimal fields. A decimal field is a run of ASCII
//! digits and `.`; signs and exponents are not part of the grammar, and a
//! run that does not form a number (`1.2.3`, `.`) is a parse failure.
//! Anything after the last field (units such as `°C`) is ignored.
//!
//! | Pattern                               | Produces    |
//! |---------------------------------------|-------------|
//! | `ALT: <f> AZ: <f>`                    | position    |
//! | `Aborted at ALT: <f> AZ: <f>`         | position    |
//! | `Temperature: <f>`                    | temperature |
//! | `Humidity: <f>`                       | humidity    |

use monet_core::types::{MAX_SPEED_RPM, MIN_SPEED_RPM, Position, format_decimal};
use monet_core::{Error, Result};

// ---------------------------------------------------------------
// Fixed commands
// ---------------------------------------------------------------

/// Query the current (or last aborted) position.
pub const GET_POSITION: &str = "GET_POS";
/// Turn the status LED on.
pub const LED_ON: &str = "LED_ON";
/// Turn the status LED off.
pub const LED_OFF: &str = "LED_OFF";
/// Turn the imaging-sensor illumination on.
pub const CCD_ON: &str = "CCD_ON";
/// Turn the imaging-sensor illumination off.
pub const CCD_OFF: &str = "CCD_OFF";
/// Query the temperature sensor.
pub const GET_TEMPERATURE: &str = "GET_TEMP";
/// Query the humidity sensor.
pub const GET_HUMIDITY: &str = "GET_HUMI";
/// Cancel an in-progress slew.
pub const ABORT: &str = "ABORT";

// ---------------------------------------------------------------
// Command builders
// ---------------------------------------------------------------

/// Build a slew command (`ALT:<altitude> AZ:<azimuth>`).
///
/// The firmware does not range-check, so neither does this; only values that
/// cannot be written as a decimal (NaN, infinities) are rejected.
///
/// ```
/// use micromonet::commands::cmd_set_position;
///
/// assert_eq!(cmd_set_position(45.0, 90.0).unwrap(), "ALT:45.0 AZ:90.0");
/// assert_eq!(cmd_set_position(39.9, 246.45).unwrap(), "ALT:39.9 AZ:246.45");
/// ```
pub fn cmd_set_position(altitude: f64, azimuth: f64) -> Result<String> {
    for (axis, value) in [("altitude", altitude), ("azimuth", azimuth)] {
        if !value.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "{axis} must be a finite number of degrees, got {value}"
            )));
        }
    }
    Ok(format!(
        "ALT:{} AZ:{}",
        format_decimal(altitude),
        format_decimal(azimuth)
    ))
}

/// Build a motor speed command (`SET_SPEED <rpm>`).
///
/// The speed must be within `1..=15` RPM.
pub fn cmd_set_speed(rpm: u8) -> Result<String> {
    if !(MIN_SPEED_RPM..=MAX_SPEED_RPM).contains(&rpm) {
        return Err(Error::InvalidParameter(format!(
            "speed {rpm} RPM out of range {MIN_SPEED_RPM}..={MAX_SPEED_RPM}"
        )));
    }
    Ok(format!("SET_SPEED {rpm}"))
}

// ---------------------------------------------------------------
// Response grammar
// ---------------------------------------------------------------

/// Split a leading decimal field off `text`.
///
/// Returns the parsed value and the unconsumed remainder.
fn take_decimal(text: &str) -> Option<(f64, &str)> {
    let end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(text.len());
    if end == 0 {
        return None;
    }
    let value = text[..end].parse::<f64>().ok()?;
    Some((value, &text[end..]))
}

/// Position report prefixes, tried in order. The firmware answers `GET_POS`
/// with the second form after a slew has been aborted.
const POSITION_PREFIXES: [&str; 2] = ["ALT: ", "Aborted at ALT: "];

/// Separator between the two position fields.
const AZIMUTH_SEPARATOR: &str = " AZ: ";

fn match_position(line: &str, prefix: &str) -> Option<Position> {
    let rest = line.strip_prefix(prefix)?;
    let (altitude, rest) = take_decimal(rest)?;
    let rest = rest.strip_prefix(AZIMUTH_SEPARATOR)?;
    let (azimuth, _) = take_decimal(rest)?;
    Some(Position::new(altitude, azimuth))
}

fn match_reading(line: &str, prefix: &str) -> Option<f64> {
    let rest = line.strip_prefix(prefix)?;
    take_decimal(rest).map(|(value, _)| value)
}

// ---------------------------------------------------------------
// Response parsers
// ---------------------------------------------------------------

/// Parse a `GET_POS` response.
///
/// Accepts both the normal report and the post-abort report; the first
/// grammar that matches wins.
///
/// ```
/// use micromonet::commands::parse_position_response;
///
/// let p = parse_position_response("Aborted at ALT: 39.90 AZ: 246.45").unwrap();
/// assert_eq!((p.altitude, p.azimuth), (39.9, 246.45));
/// ```
pub fn parse_position_response(line: &str) -> Result<Position> {
    POSITION_PREFIXES
        .iter()
        .find_map(|prefix| match_position(line, prefix))
        .ok_or_else(|| Error::parse("position", line))
}

/// Parse a `GET_TEMP` response (`Temperature: <f>`), in degrees Celsius.
pub fn parse_temperature_response(line: &str) -> Result<f64> {
    match_reading(line, "Temperature: ").ok_or_else(|| Error::parse("temperature", line))
}

/// Parse a `GET_HUMI` response (`Humidity: <f>`), in percent.
pub fn parse_humidity_response(line: &str) -> Result<f64> {
    match_reading(line, "Humidity: ").ok_or_else(|| Error::parse("humidity", line))
}
