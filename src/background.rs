//! Static background images for the panel.

use crate::PanelConfig;
use image::imageops::FilterType;
use image::{ImageError, ImageReader, RgbImage};
use std::path::Path;

/// Default background file name inside the asset directory.
pub const DEFAULT_BACKGROUND: &str = "background.png";

/// Load an image from disk and stretch it to exactly cover the panel.
pub fn load_background(path: &Path, panel: PanelConfig) -> Result<RgbImage, ImageError> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    let resized = img
        .resize_exact(panel.cols, panel.rows, FilterType::Lanczos3)
        .to_rgb8();
    Ok(resized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn background_is_resized_to_panel() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_BACKGROUND);
        RgbImage::from_pixel(10, 5, Rgb([0, 0, 200])).save(&path).unwrap();

        let panel = PanelConfig::new(32, 64);
        let img = load_background(&path, panel).unwrap();
        assert_eq!(img.dimensions(), (64, 32));

        let center = img.get_pixel(32, 16);
        assert_eq!(center[0], 0);
        assert!(center[2] >= 195, "blue channel was {}", center[2]);
    }

    #[test]
    fn missing_background_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let result = load_background(&tmp.path().join("nope.png"), PanelConfig::default());
        assert!(matches!(result, Err(ImageError::IoError(_))));
    }

    #[test]
    fn non_image_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("background.png");
        std::fs::write(&path, b"not really a png").unwrap();
        assert!(load_background(&path, PanelConfig::default()).is_err());
    }
}
