//! Startup configuration: device range, sensor source, asset directory.
//!
//! Everything here is resolved once in `main` and passed down explicitly.

use crate::sensor::{AxisSource, FixtureSource, SysfsSource};
use std::fmt;
use std::path::{Path, PathBuf};

// ── Device range ───────────────────────────────────────────────────

/// Accelerometer full-scale range presets.
///
/// Each setting trades resolution for headroom; the LSB/g sensitivity halves
/// every time the range doubles, so all of them span ±32768 counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FullScale {
    #[default]
    G2,
    G4,
    G8,
    G16,
}

impl FullScale {
    /// Range in units of g.
    pub fn range_g(self) -> u32 {
        match self {
            Self::G2 => 2,
            Self::G4 => 4,
            Self::G8 => 8,
            Self::G16 => 16,
        }
    }

    /// Sensitivity in LSB/g.
    pub fn lsb_per_g(self) -> u32 {
        match self {
            Self::G2 => 16384,
            Self::G4 => 8192,
            Self::G8 => 4096,
            Self::G16 => 2048,
        }
    }

    /// Look up the preset for a range given in g.
    pub fn from_range_g(range_g: u32) -> Option<Self> {
        match range_g {
            2 => Some(Self::G2),
            4 => Some(Self::G4),
            8 => Some(Self::G8),
            16 => Some(Self::G16),
            _ => None,
        }
    }
}

/// Maximum magnitude a raw sample can represent, as `(lsb_per_g, range_g)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeviceRange {
    lsb_per_g: u32,
    range_g: u32,
}

impl DeviceRange {
    /// A custom range. Returns `None` if either component is zero or the
    /// product does not fit in a `u32`.
    pub fn new(lsb_per_g: u32, range_g: u32) -> Option<Self> {
        if lsb_per_g == 0 || range_g == 0 {
            return None;
        }
        lsb_per_g.checked_mul(range_g)?;
        Some(Self { lsb_per_g, range_g })
    }

    pub fn lsb_per_g(&self) -> u32 {
        self.lsb_per_g
    }

    pub fn range_g(&self) -> u32 {
        self.range_g
    }

    /// `lsb_per_g * range_g`, the clamp bound used by the scaler.
    pub fn max_magnitude(&self) -> u32 {
        self.lsb_per_g * self.range_g
    }
}

impl From<FullScale> for DeviceRange {
    fn from(scale: FullScale) -> Self {
        Self {
            lsb_per_g: scale.lsb_per_g(),
            range_g: scale.range_g(),
        }
    }
}

impl Default for DeviceRange {
    fn default() -> Self {
        FullScale::default().into()
    }
}

impl fmt::Display for DeviceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "±{}g @ {} LSB/g (±{})",
            self.range_g,
            self.lsb_per_g,
            self.max_magnitude()
        )
    }
}

// ── Sensor source ──────────────────────────────────────────────────

/// Where raw readings come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceConfig {
    /// One attribute file per axis in an IIO device directory.
    Sysfs(PathBuf),
    /// Every axis reads the same fixed file.
    Fixture(PathBuf),
}

impl SourceConfig {
    /// Build the configured source.
    ///
    /// # Rust concept: trait objects
    /// The two sources are different types, but both implement
    /// `AxisSource`. `Box<dyn AxisSource>` erases the concrete type so
    /// `main` can pick one at runtime and the frame loop stays generic over
    /// a single type.
    pub fn open(&self) -> Box<dyn AxisSource> {
        match self {
            Self::Sysfs(dir) => Box::new(SysfsSource::new(dir)),
            Self::Fixture(path) => Box::new(FixtureSource::new(path)),
        }
    }
}

impl fmt::Display for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sysfs(dir) => write!(f, "sysfs {}", dir.display()),
            Self::Fixture(path) => write!(f, "fixture {}", path.display()),
        }
    }
}

// ── Assets ─────────────────────────────────────────────────────────

/// Directory holding images and other runtime assets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetDir(PathBuf);

impl AssetDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self(dir.into())
    }

    /// Resolve the asset directory from the executable's location.
    ///
    /// Under a cargo build tree (`<repo>/target/<profile>/...`) the `target`
    /// component and everything below it is replaced by `assets`. Otherwise
    /// `assets` next to the executable is used.
    pub fn from_exe_path(exe: &Path) -> Self {
        let exe_dir = exe.parent().unwrap_or(Path::new("."));

        let repo_root = exe_dir
            .ancestors()
            .find(|dir| dir.file_name().is_some_and(|name| name == "target"))
            .and_then(Path::parent);

        match repo_root {
            Some(root) => Self(root.join("assets")),
            None => Self(exe_dir.join("assets")),
        }
    }

    /// Resolve from the running executable.
    pub fn locate() -> std::io::Result<Self> {
        let exe = std::env::current_exe()?;
        Ok(Self::from_exe_path(&exe))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Full path of a named asset.
    pub fn asset(&self, name: &str) -> PathBuf {
        self.0.join(name)
    }
}
