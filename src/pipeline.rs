//! The frame loop: sample → scale → paint, once per frame.
//!
//! Single-threaded and synchronous. The only thing that can block is the
//! sensor read, and the quit flag is checked between frames, never in the
//! middle of one.

use crate::config::DeviceRange;
use crate::display::Screen;
use crate::scale::scale_sample;
use crate::sensor::{AxisSource, Sample, SensorError, read_sample};
use crate::{Color, is_running};
use serde::Serialize;
use std::ops::ControlFlow;
use std::sync::atomic::AtomicBool;
use std::thread;
use std::time::{Duration, Instant};

/// What to do when a sensor read fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum ErrorPolicy {
    /// Keep the previous color on screen and try again next frame.
    #[default]
    Skip,
    /// Stop the loop and hand the error back to the caller.
    Exit,
}

/// Loop settings resolved at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoopConfig {
    pub range: DeviceRange,
    /// Brightness (0-100) applied after scaling.
    pub brightness: u8,
    pub policy: ErrorPolicy,
    /// Target time per frame. Zero runs as fast as the sensor allows.
    pub frame_duration: Duration,
    /// Stop after this many frames (presented or skipped).
    pub max_frames: Option<u64>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            range: DeviceRange::default(),
            brightness: 100,
            policy: ErrorPolicy::default(),
            frame_duration: Duration::from_millis(16),
            max_frames: None,
        }
    }
}

/// One presented frame: the raw reading and the color it produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Frame {
    pub index: u64,
    pub raw: Sample,
    pub color: Color,
}

/// Counters reported when the loop stops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LoopStats {
    pub presented: u64,
    pub skipped: u64,
    pub slow: u64,
}

impl LoopStats {
    pub fn frames(&self) -> u64 {
        self.presented + self.skipped
    }
}

/// Drives a sensor source and a screen.
pub struct FrameLoop<S, D> {
    source: S,
    screen: D,
    config: LoopConfig,
    last_color: Option<Color>,
    stats: LoopStats,
}

impl<S: AxisSource, D: Screen> FrameLoop<S, D> {
    pub fn new(source: S, screen: D, config: LoopConfig) -> Self {
        Self {
            source,
            screen,
            config,
            last_color: None,
            stats: LoopStats::default(),
        }
    }

    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    pub fn screen(&self) -> &D {
        &self.screen
    }

    /// Run a single frame.
    ///
    /// Returns the presented frame, or `None` if the read failed and the
    /// policy is [`ErrorPolicy::Skip`], in which case the previous color
    /// (black before the first good frame) is presented again.
    pub fn step(&mut self) -> Result<Option<Frame>, SensorError> {
        let index = self.stats.frames();

        let raw = match read_sample(&mut self.source) {
            Ok(raw) => raw,
            Err(e) => match self.config.policy {
                ErrorPolicy::Exit => return Err(e),
                ErrorPolicy::Skip => {
                    tracing::warn!("Frame {} skipped: {}", index, e);
                    self.screen.fill(self.last_color.unwrap_or(Color::BLACK));
                    self.screen.present();
                    self.stats.skipped += 1;
                    return Ok(None);
                }
            },
        };

        let color = scale_sample(raw, self.config.range).apply_brightness(self.config.brightness);
        self.screen.fill(color);
        self.screen.present();

        tracing::debug!(
            "{},{},{}; {},{},{}",
            raw.x,
            raw.y,
            raw.z,
            color.r,
            color.g,
            color.b
        );

        self.last_color = Some(color);
        self.stats.presented += 1;
        Ok(Some(Frame { index, raw, color }))
    }

    /// Run frames until `running` is cleared, `max_frames` is reached,
    /// `on_frame` breaks, or a read fails under [`ErrorPolicy::Exit`].
    ///
    /// `on_frame` sees every presented frame.
    ///
    /// # Rust concept: ControlFlow
    /// `std::ops::ControlFlow` is a tiny enum (`Continue` / `Break`) meant for
    /// exactly this: a callback telling its caller whether to keep looping.
    /// It reads better than a bare `bool` whose meaning you have to remember.
    pub fn run<F>(&mut self, running: &AtomicBool, mut on_frame: F) -> Result<LoopStats, SensorError>
    where
        F: FnMut(&Frame) -> ControlFlow<()>,
    {
        let target = self.config.frame_duration;

        tracing::info!(
            "Frame loop started (range {}, brightness {}, {:?} on read errors)",
            self.config.range,
            self.config.brightness,
            self.config.policy
        );

        while is_running(running) {
            if self
                .config
                .max_frames
                .is_some_and(|max| self.stats.frames() >= max)
            {
                break;
            }

            let frame_start = Instant::now();
            let index = self.stats.frames();

            if let Some(frame) = self.step()? {
                if on_frame(&frame).is_break() {
                    break;
                }
            }

            let frame_time = frame_start.elapsed();
            if !target.is_zero() && frame_time > target {
                self.stats.slow += 1;
                if self.stats.slow <= 5 {
                    tracing::warn!(
                        "Frame {} took {}ms (target: {}ms)",
                        index,
                        frame_time.as_millis(),
                        target.as_millis()
                    );
                }
            }

            thread::sleep(target.saturating_sub(frame_time));
        }

        tracing::info!(
            "Frame loop stopped: {} presented, {} skipped, {} slow",
            self.stats.presented,
            self.stats.skipped,
            self.stats.slow
        );

        Ok(self.stats)
    }
}
