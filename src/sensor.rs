//! Sensor reader: raw accelerometer axes from Linux IIO sysfs files.
//!
//! The kernel exposes each axis as a small text file (`in_accel_x_raw`,
//! ...) holding the latest reading in LSB counts. The value is refreshed by
//! the driver between reads; we just open, read, and parse it once per frame.

use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default IIO device directory for the accelerometer on our board.
pub const DEFAULT_DEVICE_DIR: &str = "/sys/bus/iio/devices/iio:device2/";

/// A raw reading in native device units (LSB counts).
pub type RawSample = i32;

/// Errors raised while reading an axis.
///
/// # Rust concept: thiserror
/// `#[derive(Error)]` writes the `Display` and `std::error::Error` impls for
/// us. The `#[error(...)]` attribute is the message, and `#[source]` marks
/// the underlying `io::Error` so `Error::source()` hands it to whoever logs
/// the chain.
#[derive(Debug, Error)]
pub enum SensorError {
    #[error("sensor source {} unavailable: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("sensor source {} holds {content:?}, not an integer", .path.display())]
    MalformedValue { path: PathBuf, content: String },
}

/// Convenience result type for sensor reads.
pub type Result<T> = std::result::Result<T, SensorError>;

/// One of the three spatial axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Name of the sysfs attribute holding this axis' raw reading.
    pub fn raw_attribute(self) -> &'static str {
        match self {
            Axis::X => "in_accel_x_raw",
            Axis::Y => "in_accel_y_raw",
            Axis::Z => "in_accel_z_raw",
        }
    }
}

/// The three raw readings taken in one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Sample {
    pub x: RawSample,
    pub y: RawSample,
    pub z: RawSample,
}

/// Anything that can produce the current reading for a named axis.
pub trait AxisSource {
    fn read_axis(&mut self, axis: Axis) -> Result<RawSample>;
}

/// # Rust concept: `?Sized` blanket impls
/// Generic parameters are `Sized` by default. Relaxing that with `?Sized`
/// lets this one impl cover `Box<dyn AxisSource>` as well as boxed concrete
/// sources, so a boxed source can go anywhere a source is expected.
impl<S: AxisSource + ?Sized> AxisSource for Box<S> {
    fn read_axis(&mut self, axis: Axis) -> Result<RawSample> {
        (**self).read_axis(axis)
    }
}

/// Reads each axis from its attribute file in an IIO device directory.
#[derive(Clone, Debug)]
pub struct SysfsSource {
    dir: PathBuf,
}

impl SysfsSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn axis_path(&self, axis: Axis) -> PathBuf {
        self.dir.join(axis.raw_attribute())
    }
}

impl AxisSource for SysfsSource {
    fn read_axis(&mut self, axis: Axis) -> Result<RawSample> {
        read_int_file(&self.axis_path(axis))
    }
}

/// Redirects every axis to one fixed file, for deterministic runs
/// without hardware.
#[derive(Clone, Debug)]
pub struct FixtureSource {
    path: PathBuf,
}

impl FixtureSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl AxisSource for FixtureSource {
    fn read_axis(&mut self, _axis: Axis) -> Result<RawSample> {
        read_int_file(&self.path)
    }
}

/// Read a file holding a single base-10 integer.
///
/// Surrounding whitespace (sysfs values end in a newline) is ignored;
/// anything else that is not an `i32` is rejected.
pub fn read_int_file(path: &Path) -> Result<RawSample> {
    let bytes = fs::read(path).map_err(|source| SensorError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let parsed = std::str::from_utf8(&bytes)
        .ok()
        .and_then(|text| text.trim().parse().ok());

    parsed.ok_or_else(|| SensorError::MalformedValue {
        path: path.to_path_buf(),
        content: String::from_utf8_lossy(&bytes).into_owned(),
    })
}

/// Read x, y and z in order, stopping at the first failure.
pub fn read_sample<S: AxisSource + ?Sized>(source: &mut S) -> Result<Sample> {
    Ok(Sample {
        x: source.read_axis(Axis::X)?,
        y: source.read_axis(Axis::Y)?,
        z: source.read_axis(Axis::Z)?,
    })
}
