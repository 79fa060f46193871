//! Interactive numbered menu, the mount's traditional operator interface.
//!
//! The loop is generic over its input and output so tests can script a
//! session against a simulated mount.

use std::io::{BufRead, Write};

use anyhow::Result;

use micromonet::MicroMonet;
use monet_core::types::DEFAULT_SLEW_TOLERANCE_DEG;
use monet_core::{Error, Position, format_decimal};

const MENU: &str = "\
--- MicroMONET Control Menu ---
1. Get Current Position
2. Set New Position
3. Turn LED On
4. Turn LED Off
5. Turn CCD LED On
6. Turn CCD LED Off
7. Get Temperature
8. Get Humidity
9. Abort Slew
10. Exit";

/// Print `message`, flush, and read one trimmed line. `None` at end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
    message: &str,
) -> Result<Option<String>> {
    write!(out, "{message}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Print a recoverable error and carry on; anything else ends the session.
///
/// A reply that fails its grammar or an argument the client rejected leaves
/// the link usable. Transport failures, timeouts and a closed client do not.
fn recoverable(out: &mut impl Write, err: Error) -> Result<()> {
    match err {
        Error::Parse { .. } | Error::InvalidParameter(_) => {
            writeln!(out, "Error: {err}")?;
            Ok(())
        }
        other => Err(other.into()),
    }
}

/// Menu option 2: read a target, start the slew, and poll until it arrives
/// or the operator types `ABORT`.
///
/// End of input during the poll aborts the slew rather than leaving the
/// mount moving unattended.
async fn slew_interactive<R: BufRead, W: Write>(
    mount: &MicroMonet,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    let Some(altitude) = prompt(input, out, "Enter target altitude (degrees): ")? else {
        return Ok(());
    };
    let Some(azimuth) = prompt(input, out, "Enter target azimuth (degrees): ")? else {
        return Ok(());
    };
    let target = match (altitude.parse::<f64>(), azimuth.parse::<f64>()) {
        (Ok(alt), Ok(az)) => Position::new(alt, az),
        _ => {
            writeln!(
                out,
                "Invalid input! Please enter numeric values for altitude and azimuth."
            )?;
            return Ok(());
        }
    };

    if let Err(e) = mount.set_position(target.altitude, target.azimuth).await {
        return recoverable(out, e);
    }
    writeln!(out, "Slewing to new position...")?;

    loop {
        let here = match mount.get_position().await {
            Ok(here) => here,
            Err(e) => return recoverable(out, e),
        };
        writeln!(out, "Current Position - {here}")?;
        if here.within(&target, DEFAULT_SLEW_TOLERANCE_DEG) {
            writeln!(out, "Slew completed successfully!")?;
            return Ok(());
        }

        let answer = prompt(
            input,
            out,
            "Type 'ABORT' to stop the slew or press Enter to continue: ",
        )?;
        let abort = match answer {
            Some(text) => text.eq_ignore_ascii_case("abort"),
            None => true,
        };
        if abort {
            mount.abort_slew().await?;
            writeln!(out, "Slew aborted!")?;
            return Ok(());
        }
    }
}

/// Run the menu until the operator chooses Exit or input ends.
///
/// The caller owns the client and closes it afterwards.
pub async fn run_menu<R: BufRead, W: Write>(
    mount: &MicroMonet,
    input: &mut R,
    out: &mut W,
) -> Result<()> {
    loop {
        writeln!(out)?;
        writeln!(out, "{MENU}")?;
        let Some(choice) = prompt(input, out, "Enter your choice (1-10): ")? else {
            writeln!(out, "Exiting...")?;
            return Ok(());
        };

        match choice.as_str() {
            "1" => match mount.get_position().await {
                Ok(here) => writeln!(out, "Current Position - {here}")?,
                Err(e) => recoverable(out, e)?,
            },
            "2" => slew_interactive(mount, input, out).await?,
            "3" => {
                mount.led_on().await?;
                writeln!(out, "LED turned on.")?;
            }
            "4" => {
                mount.led_off().await?;
                writeln!(out, "LED turned off.")?;
            }
            "5" => {
                mount.ccd_on().await?;
                writeln!(out, "CCD LED turned on.")?;
            }
            "6" => {
                mount.ccd_off().await?;
                writeln!(out, "CCD LED turned off.")?;
            }
            "7" => match mount.get_temperature().await {
                Ok(celsius) => writeln!(out, "Temperature: {} °C", format_decimal(celsius))?,
                Err(e) => recoverable(out, e)?,
            },
            "8" => match mount.get_humidity().await {
                Ok(percent) => writeln!(out, "Humidity: {} %", format_decimal(percent))?,
                Err(e) => recoverable(out, e)?,
            },
            "9" => {
                mount.abort_slew().await?;
                writeln!(out, "Slew aborted!")?;
            }
            "10" => {
                writeln!(out, "Exiting...")?;
                return Ok(());
            }
            _ => writeln!(
                out,
                "Invalid choice! Please enter a number between 1 and 10."
            )?,
        }
    }
}
