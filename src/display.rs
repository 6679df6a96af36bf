//! Screens the frame loop paints onto.
//!
//! The loop only needs two things from a screen: take a draw color and put
//! the frame on the glass. The LED matrix backend double-buffers with
//! `swap()`; the headless backend just logs what would have been shown.

use crate::Color;
#[cfg(feature = "hardware")]
use crate::{PanelConfig, create_matrix};
#[cfg(feature = "hardware")]
use image::RgbImage;
#[cfg(feature = "hardware")]
use rpi_led_matrix::{LedCanvas, LedMatrix};

/// A full-screen drawing target.
pub trait Screen {
    /// Set the whole back buffer to `color`.
    fn fill(&mut self, color: Color);
    /// Show the back buffer.
    fn present(&mut self);
}

impl<S: Screen + ?Sized> Screen for Box<S> {
    fn fill(&mut self, color: Color) {
        (**self).fill(color)
    }

    fn present(&mut self) {
        (**self).present()
    }
}

// ── Headless ─────────────────────────────────────────────────────────

/// Screen used when no panel is attached. Each presented frame is logged
/// at debug level.
#[derive(Debug, Default)]
pub struct LogScreen {
    back: Color,
    front: Option<Color>,
    presented: u64,
}

impl LogScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Color currently "on screen", if anything has been presented.
    pub fn current(&self) -> Option<Color> {
        self.front
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl Screen for LogScreen {
    fn fill(&mut self, color: Color) {
        self.back = color;
    }

    fn present(&mut self) {
        self.front = Some(self.back);
        self.presented += 1;
        tracing::debug!(
            r = self.back.r,
            g = self.back.g,
            b = self.back.b,
            "frame {} presented",
            self.presented
        );
    }
}

// ── LED matrix ───────────────────────────────────────────────────────

/// The LED panel used as a full-screen background.
///
/// Owns the matrix and its offscreen canvas. Dropping it blanks the panel
/// before the matrix itself is released, so every exit path leaves the
/// LEDs dark.
///
/// # Rust concept: Drop
/// `Drop::drop` runs when the value goes out of scope, including when `?`
/// returns early with an error. Fields are then dropped in declaration
/// order, which is why `canvas` comes before `matrix`.
#[cfg(feature = "hardware")]
pub struct MatrixScreen {
    // Declared before `matrix` so it is dropped first.
    canvas: Option<LedCanvas>,
    matrix: LedMatrix,
}

#[cfg(feature = "hardware")]
impl MatrixScreen {
    pub fn open(panel: PanelConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let matrix = create_matrix(panel)?;
        let canvas = matrix.offscreen_canvas();
        Ok(Self {
            canvas: Some(canvas),
            matrix,
        })
    }

    /// Draw an image pixel by pixel into the back buffer.
    pub fn draw_image(&mut self, img: &RgbImage) {
        if let Some(canvas) = self.canvas.as_mut() {
            for (x, y, pixel) in img.enumerate_pixels() {
                let c = Color::new(pixel[0], pixel[1], pixel[2]);
                canvas.set(x as i32, y as i32, &c.into());
            }
        }
    }
}

#[cfg(feature = "hardware")]
impl Screen for MatrixScreen {
    fn fill(&mut self, color: Color) {
        if let Some(canvas) = self.canvas.as_mut() {
            canvas.fill(&color.into());
        }
    }

    fn present(&mut self) {
        if let Some(canvas) = self.canvas.take() {
            self.canvas = Some(self.matrix.swap(canvas));
        }
    }
}

#[cfg(feature = "hardware")]
impl Drop for MatrixScreen {
    fn drop(&mut self) {
        if let Some(mut canvas) = self.canvas.take() {
            canvas.clear();
            let _ = self.matrix.swap(canvas);
        }
        tracing::debug!("LED panel blanked");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn log_screen_starts_blank() {
        let screen = LogScreen::new();
        assert_eq!(screen.current(), None);
        assert_eq!(screen.presented(), 0);
    }

    #[test]
    fn fill_is_invisible_until_present() {
        let mut screen = LogScreen::new();
        screen.fill(Color::new(1, 2, 3));
        assert_eq!(screen.current(), None);

        screen.present();
        assert_eq!(screen.current(), Some(Color::new(1, 2, 3)));
        assert_eq!(screen.presented(), 1);
    }

    #[test]
    fn present_without_fill_repeats_back_buffer() {
        let mut screen = LogScreen::new();
        screen.fill(Color::new(9, 9, 9));
        screen.present();
        screen.present();
        assert_eq!(screen.current(), Some(Color::new(9, 9, 9)));
        assert_eq!(screen.presented(), 2);
    }

    #[test]
    fn boxed_screen_delegates() {
        let mut screen: Box<LogScreen> = Box::new(LogScreen::new());
        Screen::fill(&mut screen, Color::new(4, 5, 6));
        Screen::present(&mut screen);
        assert_eq!(screen.current(), Some(Color::new(4, 5, 6)));
    }
}
