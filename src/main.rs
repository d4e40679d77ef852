mod app;
mod config;
mod model;
mod output;
mod prompt;
mod session;
mod surface;

use anyhow::{anyhow, bail, Result};
use eframe::egui;
use std::path::PathBuf;
use std::rc::Rc;

use app::{Outcome, QuadLabelApp, SharedOutcome};
use config::Config;
use surface::ImageSurface;

const USAGE: &str = "Usage: quad-label <image.jpg|png|...>";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"];

fn image_path_from_args() -> Result<PathBuf> {
    let mut args = std::env::args_os().skip(1);
    match (args.next(), args.next()) {
        (Some(path), None) => Ok(PathBuf::from(path)),
        (Some(_), Some(_)) => bail!(USAGE),
        (None, _) => rfd::FileDialog::new()
            .set_title("Image to annotate")
            .add_filter("Image", IMAGE_EXTENSIONS)
            .pick_file()
            .ok_or_else(|| anyhow!(USAGE)),
    }
}

fn print_instructions() {
    println!();
    println!("Double-click a spot on the image to create a point.");
    println!("The quad is created when the 4th point is on the screen.");
    println!("Upon creation you will be asked for its label, e.g. the plate number.");
    println!("To select a quad, click one of its points.");
    println!("Once a quad is selected, reshape it by clicking and dragging its points.");
    println!("Delete the selected quad with BACKSPACE.");
    println!("Press ENTER to save the annotation or ESC to discard your work.");
    println!();
}

// ── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let image_path = image_path_from_args()?;
    let config = Config::load(&Config::default_path())?;
    let surface = ImageSurface::open(&image_path)?;

    let title = format!(
        "quad-label — {}",
        image_path
            .file_name()
            .unwrap_or_default()
            .to_str()
            .unwrap_or("")
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_resizable(true)
            .with_title(&title),
        ..Default::default()
    };

    print_instructions();

    let outcome: SharedOutcome = Rc::default();
    let app_outcome = Rc::clone(&outcome);
    let app_config = config.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(QuadLabelApp::new(surface, &app_config, app_outcome)))),
    )
    .map_err(|e| anyhow!("failed to run the labeling window: {e}"))?;

    let outcome = outcome.borrow_mut().take();
    match outcome {
        Some(Outcome::Confirmed(quads)) => {
            if let Some(path) =
                output::save_annotations(&image_path, &quads, &config.record_separator)?
            {
                log::info!("saved {} quad(s) to {}", quads.len(), path.display());
            }
        }
        Some(Outcome::Cancelled) | None => {
            println!("Exiting without saving annotation.");
        }
    }

    Ok(())
}
