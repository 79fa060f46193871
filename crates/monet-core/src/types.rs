//! Value types shared by the protocol client and its callers.

use std::fmt;

/// Lowest motor speed the firmware accepts, in RPM.
pub const MIN_SPEED_RPM: u8 = 1;

/// Highest motor speed the firmware accepts, in RPM.
pub const MAX_SPEED_RPM: u8 = 15;

/// Default tolerance, in degrees, for deciding that a slew has arrived.
pub const DEFAULT_SLEW_TOLERANCE_DEG: f64 = 0.1;

/// Phrase contained in the line the firmware prints once it has booted.
pub const READY_PHRASE: &str = "microMONET is ready for some stargazing!";

/// Format a reading as plain decimal text that always has a decimal point
/// (`45.0`, `246.45`), never exponent notation.
///
/// ```
/// use monet_core::format_decimal;
///
/// assert_eq!(format_decimal(45.0), "45.0");
/// assert_eq!(format_decimal(246.45), "246.45");
/// ```
pub fn format_decimal(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') || !value.is_finite() {
        text
    } else {
        format!("{text}.0")
    }
}

/// Mount pointing as reported by the firmware, in degrees.
///
/// Both axes are conventionally in `[0, 360)`, but the wire protocol does
/// not enforce bounds and neither does this type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Position {
    /// Altitude above the horizon.
    pub altitude: f64,
    /// Azimuth measured from north.
    pub azimuth: f64,
}

impl Position {
    pub fn new(altitude: f64, azimuth: f64) -> Self {
        Position { altitude, azimuth }
    }

    /// Whether both axes are strictly within `tolerance` degrees of `target`.
    ///
    /// ```
    /// use monet_core::Position;
    ///
    /// let here = Position::new(44.95, 90.02);
    /// assert!(here.within(&Position::new(45.0, 90.0), 0.1));
    /// assert!(!here.within(&Position::new(46.0, 90.0), 0.1));
    /// ```
    pub fn within(&self, target: &Position, tolerance: f64) -> bool {
        (self.altitude - target.altitude).abs() < tolerance
            && (self.azimuth - target.azimuth).abs() < tolerance
    }
}

/// Always shows a decimal point (`ALT: 45.0, AZ: 90.0`).
impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ALT: {}, AZ: {}",
            format_decimal(self.altitude),
            format_decimal(self.azimuth)
        )
    }
}

impl From<(f64, f64)> for Position {
    fn from((altitude, azimuth): (f64, f64)) -> Self {
        Position { altitude, azimuth }
    }
}

/// Two-state lifecycle of a protocol client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Constructed and not yet closed; all operations are valid.
    Open,
    /// Terminal. Every further operation fails with `Error::Closed`.
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_is_strict() {
        let target = Position::new(10.0, 20.0);
        assert!(Position::new(10.05, 19.95).within(&target, 0.1));
        assert!(!Position::new(10.5, 20.0).within(&target, 0.1));
        assert!(!Position::new(10.0, 20.5).within(&target, 0.1));
    }

    #[test]
    fn within_checks_both_axes() {
        let target = Position::new(45.0, 90.0);
        assert!(!Position::new(45.0, 180.0).within(&target, DEFAULT_SLEW_TOLERANCE_DEG));
    }

    #[test]
    fn display_matches_operator_format() {
        assert_eq!(Position::new(45.5, 90.25).to_string(), "ALT: 45.5, AZ: 90.25");
        assert_eq!(Position::new(45.0, 0.0).to_string(), "ALT: 45.0, AZ: 0.0");
    }

    #[test]
    fn decimal_text_never_uses_exponents() {
        assert_eq!(format_decimal(1e16), "10000000000000000.0");
        assert_eq!(format_decimal(1e-7), "0.0000001");
        assert_eq!(format_decimal(-5.0), "-5.0");
        assert_eq!(
            Position::new(1e16, 1e-7).to_string(),
            "ALT: 10000000000000000.0, AZ: 0.0000001"
        );
    }

    #[test]
    fn from_tuple() {
        let p: Position = (39.9, 246.45).into();
        assert_eq!(p.altitude, 39.9);
        assert_eq!(p.azimuth, 246.45);
    }

    #[test]
    fn speed_bounds() {
        assert!(MIN_SPEED_RPM < MAX_SPEED_RPM);
        assert_eq!(MAX_SPEED_RPM, 15);
    }
}
