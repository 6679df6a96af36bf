//! Accelerometer color background
//!
//! Reads the raw x/y/z acceleration of an IIO accelerometer every frame and
//! fills the LED panel with the matching color: x drives red, y green and
//! z blue. Tilting the board sweeps through the color cube.
//!
//! ## Usage
//! ```sh
//! sudo ./target/release/accel-color --range 2
//! ./target/release/accel-color --headless --fixture test.txt --max-frames 10 --json
//! ```

use accel_color::config::{DeviceRange, FullScale, SourceConfig};
use accel_color::display::{LogScreen, Screen};
use accel_color::pipeline::{ErrorPolicy, Frame, FrameLoop, LoopConfig};
use accel_color::sensor::DEFAULT_DEVICE_DIR;
use accel_color::{PanelConfig, setup_signal_handler};
use clap::Parser;
use std::io::{self, Write};
use std::ops::ControlFlow;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Paint the LED panel with the current acceleration
#[derive(Parser)]
#[command(name = "accel-color")]
#[command(about = "Map raw accelerometer readings to a full-screen color")]
#[command(version)]
struct Args {
    /// IIO device directory holding in_accel_{x,y,z}_raw
    #[arg(long, default_value = DEFAULT_DEVICE_DIR)]
    device_dir: PathBuf,

    /// Read every axis from this single file instead of the device
    #[arg(long, conflicts_with = "device_dir")]
    fixture: Option<PathBuf>,

    /// Full-scale range preset in g (2, 4, 8 or 16)
    #[arg(long, default_value = "2", value_parser = parse_full_scale, conflicts_with = "lsb_per_g")]
    range: FullScale,

    /// Custom sensitivity in LSB/g (requires --range-g)
    #[arg(long, requires = "range_g")]
    lsb_per_g: Option<u32>,

    /// Custom full-scale range in g (requires --lsb-per-g)
    #[arg(long, requires = "lsb_per_g")]
    range_g: Option<u32>,

    /// Delay between frames in milliseconds
    #[arg(long, default_value = "16")]
    frame_ms: u64,

    /// Brightness (0-100) applied to the computed color
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u8).range(0..=100))]
    brightness: u8,

    /// What to do when a sensor read fails
    #[arg(long, value_enum, default_value_t = ErrorPolicy::Skip)]
    on_error: ErrorPolicy,

    /// Stop after this many frames
    #[arg(long)]
    max_frames: Option<u64>,

    /// Print each frame as a JSON line on stdout
    #[arg(long)]
    json: bool,

    /// Log colors instead of driving the LED panel
    #[arg(long)]
    headless: bool,

    /// Number of rows on the LED panel
    #[arg(long, default_value = "64")]
    rows: u32,

    /// Number of columns on the LED panel
    #[arg(long, default_value = "64")]
    cols: u32,
}

fn parse_full_scale(s: &str) -> Result<FullScale, String> {
    let g: u32 = s.parse().map_err(|_| format!("not a number: {s}"))?;
    FullScale::from_range_g(g).ok_or_else(|| format!("unsupported range {g}g (expected 2, 4, 8 or 16)"))
}

impl Args {
    fn device_range(&self) -> Result<DeviceRange, String> {
        match (self.lsb_per_g, self.range_g) {
            (Some(lsb_per_g), Some(range_g)) => DeviceRange::new(lsb_per_g, range_g)
                .ok_or_else(|| format!("invalid device range {lsb_per_g} LSB/g x {range_g}g")),
            _ => Ok(self.range.into()),
        }
    }

    fn source(&self) -> SourceConfig {
        match &self.fixture {
            Some(path) => SourceConfig::Fixture(path.clone()),
            None => SourceConfig::Sysfs(self.device_dir.clone()),
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_ansi(false) // Disable ANSI color codes for systemd/journald
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let range = args.device_range()?;
    let source = args.source();
    let panel = PanelConfig::new(args.rows, args.cols);

    tracing::info!("Accel color v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Source: {}", source);
    tracing::info!("Range: {}", range);

    let config = LoopConfig {
        range,
        brightness: args.brightness,
        policy: args.on_error,
        frame_duration: Duration::from_millis(args.frame_ms),
        max_frames: args.max_frames,
    };

    let running = setup_signal_handler()?;
    let screen = open_screen(panel, args.headless)?;
    let mut frames = FrameLoop::new(source.open(), screen, config);

    let json = args.json;
    let stdout = io::stdout();
    frames.run(&running, |frame| {
        if json {
            emit_frame(&mut stdout.lock(), frame)
        } else {
            ControlFlow::Continue(())
        }
    })?;

    tracing::info!("Shutting down cleanly.");
    Ok(())
}

/// Write one frame as a JSON line.
fn write_frame<W: Write>(out: &mut W, frame: &Frame) -> io::Result<()> {
    serde_json::to_writer(&mut *out, frame)?;
    writeln!(out)?;
    out.flush()
}

/// Emit a frame on `out`, stopping the loop once the reader has gone away
/// (e.g. `accel-color --json | head -1`).
fn emit_frame<W: Write>(out: &mut W, frame: &Frame) -> ControlFlow<()> {
    match write_frame(out, frame) {
        Ok(()) => ControlFlow::Continue(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            tracing::info!("Output closed after frame {}, stopping", frame.index);
            ControlFlow::Break(())
        }
        Err(e) => {
            tracing::warn!("Could not write frame {}: {}", frame.index, e);
            ControlFlow::Continue(())
        }
    }
}

#[cfg(feature = "hardware")]
fn open_screen(panel: PanelConfig, headless: bool) -> Result<Box<dyn Screen>, Box<dyn std::error::Error>> {
    use accel_color::display::MatrixScreen;

    if headless {
        tracing::info!("Headless: colors are logged at debug level");
        return Ok(Box::new(LogScreen::new()));
    }

    tracing::info!("Panel: {}x{} ({} pixels)", panel.cols, panel.rows, panel.pixel_count());
    Ok(Box::new(MatrixScreen::open(panel)?))
}

#[cfg(not(feature = "hardware"))]
fn open_screen(_panel: PanelConfig, headless: bool) -> Result<Box<dyn Screen>, Box<dyn std::error::Error>> {
    if !headless {
        tracing::warn!("Built without the 'hardware' feature; running headless");
    }
    Ok(Box::new(LogScreen::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use accel_color::Color;
    use accel_color::sensor::Sample;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[rstest]
    #[case("2", FullScale::G2)]
    #[case("16", FullScale::G16)]
    fn range_presets_parse(#[case] input: &str, #[case] expected: FullScale) {
        assert_eq!(parse_full_scale(input).unwrap(), expected);
    }

    #[rstest]
    #[case("3")]
    #[case("two")]
    fn bad_range_presets_are_rejected(#[case] input: &str) {
        assert!(parse_full_scale(input).is_err());
    }

    #[test]
    fn custom_range_overrides_preset() {
        let args = Args::parse_from(["accel-color", "--lsb-per-g", "10000", "--range-g", "2"]);
        assert_eq!(args.device_range().unwrap().max_magnitude(), 20000);
    }

    #[test]
    fn explicit_preset_conflicts_with_custom_range() {
        let result = Args::try_parse_from([
            "accel-color",
            "--range",
            "16",
            "--lsb-per-g",
            "1",
            "--range-g",
            "1",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn zero_custom_range_is_an_error() {
        let args = Args::parse_from(["accel-color", "--lsb-per-g", "0", "--range-g", "2"]);
        assert!(args.device_range().is_err());
    }

    #[test]
    fn fixture_replaces_device_dir() {
        let args = Args::parse_from(["accel-color", "--fixture", "test.txt"]);
        assert_eq!(args.source(), SourceConfig::Fixture(PathBuf::from("test.txt")));

        let args = Args::parse_from(["accel-color"]);
        assert_eq!(args.source(), SourceConfig::Sysfs(PathBuf::from(DEFAULT_DEVICE_DIR)));
    }

    #[test]
    fn brightness_above_100_is_rejected() {
        assert!(Args::try_parse_from(["accel-color", "--brightness", "101"]).is_err());
    }

    #[test]
    fn on_error_accepts_exit() {
        let args = Args::parse_from(["accel-color", "--on-error", "exit"]);
        assert_eq!(args.on_error, ErrorPolicy::Exit);
    }

    fn sample_frame() -> Frame {
        Frame {
            index: 3,
            raw: Sample { x: 1, y: 2, z: 3 },
            color: Color::new(4, 5, 6),
        }
    }

    /// Writer whose reader has hung up.
    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
    }

    #[test]
    fn frame_is_written_as_one_json_line() {
        let mut out = Vec::new();
        assert_eq!(emit_frame(&mut out, &sample_frame()), ControlFlow::Continue(()));
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\"index\":3,\"raw\":{\"x\":1,\"y\":2,\"z\":3},\"color\":{\"r\":4,\"g\":5,\"b\":6}}\n"
        );
    }

    #[test]
    fn broken_pipe_stops_instead_of_panicking() {
        let err = write_frame(&mut ClosedPipe, &sample_frame()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(emit_frame(&mut ClosedPipe, &sample_frame()), ControlFlow::Break(()));
    }
}
