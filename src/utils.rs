use crate::types::Coordinates;
use anyhow::{Context, Result, bail};
use tracing_subscriber::{EnvFilter, fmt};

#[macro_export]
macro_rules! dlog {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*);
    };
}

/// Initialize colorful logging.
///
/// Default level is INFO.
/// - `-v` => DEBUG
/// - `-vv` => TRACE
/// - `-q` => WARN
/// - `-qq` => ERROR
///
/// `RUST_LOG` overrides everything (e.g. `RUST_LOG=trace`).
pub fn init_logging(verbose: u8, quiet: u8) {
    let net = i16::from(verbose) - i16::from(quiet);
    let level = match net {
        i16::MIN..=-2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        2..=i16::MAX => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,mapty={level}")));

    let show_src = matches!(level, "debug" | "trace");

    fmt()
        .with_env_filter(filter)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_target(true)
        .with_level(true)
        .with_file(show_src)
        .with_line_number(show_src)
        .compact()
        .init();
}

/// Parse `LAT,LNG` (e.g. `69,69` or `48.137, 11.575`).
pub fn parse_coordinates(s: &str) -> Result<Coordinates> {
    let (lat, lng) = s
        .split_once(',')
        .with_context(|| format!("expected LAT,LNG, got {s:?}"))?;

    let lat: f64 = lat
        .trim()
        .parse()
        .with_context(|| format!("bad latitude in {s:?}"))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .with_context(|| format!("bad longitude in {s:?}"))?;

    if !(-90.0..=90.0).contains(&lat) {
        bail!("latitude out of range: {lat}");
    }
    if !(-180.0..=180.0).contains(&lng) {
        bail!("longitude out of range: {lng}");
    }

    Ok(Coordinates::new(lat, lng))
}
