//! # Background Image Demo
//!
//! The static predecessor of `accel-color`: shows one image as the
//! full-screen background until Ctrl+C.
//!
//! Without an argument the image is `background.png` from the asset
//! directory (`assets/` next to the cargo `target/` directory).
//!
//! ## Run it
//! ```sh
//! cargo build --release --example background
//! sudo ./target/release/examples/background [path/to/image.png]
//! ```

#[cfg(not(feature = "hardware"))]
fn main() {
    eprintln!("This example requires the 'hardware' feature.");
}

#[cfg(feature = "hardware")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use accel_color::background::{DEFAULT_BACKGROUND, load_background};
    use accel_color::config::AssetDir;
    use accel_color::display::{MatrixScreen, Screen};
    use accel_color::{PanelConfig, is_running, setup_signal_handler};
    use clap::Parser;
    use std::path::PathBuf;
    use std::thread;
    use std::time::Duration;

    #[derive(Parser)]
    #[command(name = "background")]
    #[command(about = "Display a background image on the LED matrix")]
    struct Args {
        /// Image file (PNG or JPEG); defaults to the asset directory's background
        image_path: Option<PathBuf>,

        /// Asset directory, overriding the one derived from the executable
        #[arg(long)]
        assets_dir: Option<PathBuf>,
    }

    tracing_subscriber::fmt()
        .with_target(false)
        .with_ansi(false)
        .compact()
        .init();

    let args = Args::parse();
    let panel = PanelConfig::default();

    let image_path = match args.image_path {
        Some(path) => path,
        None => {
            let assets = match args.assets_dir {
                Some(dir) => AssetDir::new(dir),
                None => AssetDir::locate()?,
            };
            tracing::info!("Assets: {}", assets.path().display());
            assets.asset(DEFAULT_BACKGROUND)
        }
    };

    tracing::info!("Loading image: {}", image_path.display());
    let img = load_background(&image_path, panel)?;

    let running = setup_signal_handler()?;
    let mut screen = MatrixScreen::open(panel)?;
    screen.draw_image(&img);
    screen.present();
    tracing::info!("Background displayed ({}x{}). Press Ctrl+C to exit.", panel.cols, panel.rows);

    while is_running(&running) {
        thread::sleep(Duration::from_millis(100));
    }

    tracing::info!("Shutting down cleanly.");
    Ok(())
}
