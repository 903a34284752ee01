//! Sexagesimal coordinate parsing.
//!
//! Right ascension is read as hours-minutes-seconds (1h = 15°), declination as
//! degrees-minutes-seconds. Accepted notations:
//!
//! ```text
//! Colon-separated:  12:34:56.78     -05:30:15
//! Space-separated:  12 34 56.78     -05 30 15
//! Letter markers:   12h34m56.78s    -05d30m15s
//! Symbols:                          -05°30'15"
//! Decimal:          12.5824 (hours) -5.5042 (degrees)
//! ```
//!
//! The sign may only lead the string and applies to the whole value, so
//! `-00:30:00` is half a degree south. Minutes and seconds must be below 60.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::portal::repository::{PortalError, PortalResult};

static HMS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?x)
        ^([+-])?\s*
        (\d{1,3})                            # hours
        (?:\s*[:hH]\s*|\s+)
        (\d{1,2})                            # minutes
        (?:
            (?:\s*[:mM]\s*|\s+)
            (\d{1,2}(?:\.\d+)?)              # seconds
        )?
        \s*[mMsS]?$
        "#,
    )
    .expect("valid HMS pattern")
});

static DMS_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?x)
        ^([+-])?\s*
        (\d{1,3})                            # degrees
        (?:\s*[:dD°]\s*|\s+)
        (\d{1,2})                            # arcminutes
        (?:
            (?:\s*[:mM']\s*|\s+)
            (\d{1,2}(?:\.\d+)?)              # arcseconds
        )?
        \s*(?:''|[mMsS"'])?$
        "#,
    )
    .expect("valid DMS pattern")
});

struct Sexagesimal {
    negative: bool,
    whole: f64,
    minutes: f64,
    seconds: f64,
}

impl Sexagesimal {
    fn value(&self) -> f64 {
        let magnitude = self.whole + self.minutes / 60.0 + self.seconds / 3600.0;
        if self.negative {
            -magnitude
        } else {
            magnitude
        }
    }
}

fn split_sexagesimal(regex: &Regex, input: &str, what: &str) -> PortalResult<Option<Sexagesimal>> {
    let caps = match regex.captures(input) {
        Some(caps) => caps,
        None => return Ok(None),
    };

    let number = |idx: usize| -> PortalResult<f64> {
        match caps.get(idx) {
            Some(m) => m.as_str().parse::<f64>().map_err(|_| {
                PortalError::format(format!("Cannot parse '{}' as {}", input, what))
            }),
            None => Ok(0.0),
        }
    };

    let parts = Sexagesimal {
        negative: caps.get(1).map(|m| m.as_str() == "-").unwrap_or(false),
        whole: number(2)?,
        minutes: number(3)?,
        seconds: number(4)?,
    };

    if parts.minutes >= 60.0 || parts.seconds >= 60.0 {
        return Err(PortalError::format(format!(
            "Minutes and seconds must be below 60 in {} '{}'",
            what, input
        )));
    }
    Ok(Some(parts))
}

fn parse_decimal(input: &str, what: &str) -> PortalResult<f64> {
    input
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| PortalError::format(format!("Cannot parse '{}' as {}", input, what)))
}

/// Parse a right ascension in hours and return decimal degrees in [0, 360).
pub fn parse_ra_hms(s: &str) -> PortalResult<f64> {
    let input = s.trim();
    if input.is_empty() {
        return Err(PortalError::format("Right ascension is empty"));
    }

    let hours = match split_sexagesimal(&HMS_REGEX, input, "right ascension")? {
        Some(parts) => {
            if parts.whole >= 24.0 {
                return Err(PortalError::format(format!(
                    "Right ascension '{}' has more than 23 hours",
                    input
                )));
            }
            parts.value()
        }
        None => parse_decimal(input, "right ascension")?,
    };

    if hours.abs() >= 24.0 {
        return Err(PortalError::format(format!(
            "Right ascension '{}' is outside (-24h, 24h)",
            input
        )));
    }

    let degrees = (hours * 15.0).rem_euclid(360.0);
    // rem_euclid can round a tiny negative up to exactly 360
    Ok(if degrees >= 360.0 { 0.0 } else { degrees })
}

/// Parse a declination in degrees and return decimal degrees in [-90, 90].
pub fn parse_dec_dms(s: &str) -> PortalResult<f64> {
    let input = s.trim();
    if input.is_empty() {
        return Err(PortalError::format("Declination is empty"));
    }

    let degrees = match split_sexagesimal(&DMS_REGEX, input, "declination")? {
        Some(parts) => parts.value(),
        None => parse_decimal(input, "declination")?,
    };

    if !(-90.0..=90.0).contains(&degrees) {
        return Err(PortalError::format(format!(
            "Declination '{}' is outside [-90, 90] degrees",
            input
        )));
    }
    Ok(degrees)
}
