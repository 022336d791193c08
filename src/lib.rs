pub mod archive;
pub mod backup;
pub mod canvas;
pub mod command;
pub mod config;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod health;
pub mod logging;
pub mod palette;
pub mod raster;
pub mod snapshot;

pub use error::{AppError, AppResult};

use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use archive::{DirStore, SnapshotStore};
use canvas::Canvas;
use config::Settings;
use engine::Engine;

/// Entrypoint used by the binary and higher-level integrations.
///
/// Restores the canvas from the archive, starts the liveness endpoint and
/// the backup worker, then processes commands line by line from stdin,
/// one at a time, so mutations never interleave. Semicolons in a line
/// separate payload lines for the multi-point `add` form.
pub fn run() -> AppResult<()> {
    logging::init();
    tracing::info!("starting pixelboard");

    let config = config::load()?;
    let store: Arc<DirStore> = Arc::new(DirStore::create(
        config.archive_dir.clone(),
        config.settings.restore_scan_limit,
    )?);

    let canvas = restore_canvas(store.as_ref(), &config.settings);
    let mut engine = Engine::with_canvas(canvas).with_zoom(
        config.settings.zoom_half_extent,
        config.settings.zoom_target_size,
    );

    health::spawn(config.port).map_err(AppError::Health)?;
    let backup = backup::spawn(store, config.settings.snapshot_label.clone());

    let renders_dir = config.archive_dir.join("renders");
    fs::create_dir_all(&renders_dir).map_err(AppError::Render)?;

    tracing::info!(size = engine.canvas().size(), "canvas ready");

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(?err, "stdin closed");
                break;
            }
        };
        let text = line.replace(';', "\n");
        if text.trim().is_empty() {
            continue;
        }

        let dispatch = engine.dispatch(&text)?;
        println!("{}", dispatch.reply);
        if let Some(bytes) = dispatch.image {
            let path = write_render(&renders_dir, &bytes).map_err(AppError::Render)?;
            println!("saved {}", path.display());
        }
        if dispatch.mutated {
            backup.submit(engine.snapshot()?);
        }
    }

    backup.shutdown();
    Ok(())
}

/// Fetches and decodes the most recent snapshot; any failure falls back to
/// a blank canvas rather than aborting startup.
fn restore_canvas(store: &dyn SnapshotStore, settings: &Settings) -> Canvas {
    match store.fetch_latest(&settings.snapshot_label) {
        Ok(Some(bytes)) => match snapshot::decode(&bytes) {
            Ok(canvas) => {
                tracing::info!(size = canvas.size(), "canvas restored from snapshot");
                canvas
            }
            Err(err) => {
                tracing::warn!(?err, "snapshot decode failed; starting blank");
                Canvas::new(settings.canvas_size)
            }
        },
        Ok(None) => {
            tracing::info!("no snapshot in the archive; starting blank");
            Canvas::new(settings.canvas_size)
        }
        Err(err) => {
            tracing::warn!(?err, "snapshot fetch failed; starting blank");
            Canvas::new(settings.canvas_size)
        }
    }
}

fn write_render(dir: &Path, bytes: &[u8]) -> io::Result<PathBuf> {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(io::Error::other)?
        .as_nanos();
    let path = dir.join(format!("render-{nanos}.png"));
    fs::write(&path, bytes)?;
    Ok(path)
}
