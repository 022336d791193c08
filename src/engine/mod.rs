//! Command execution over the single shared canvas.
//!
//! The engine owns the canvas; the transport loop holds the only `&mut`
//! handle and feeds it one command at a time, so mutations never
//! interleave. Each dispatch yields a [`Dispatch`]: the user-facing status
//! line, an optional rendered PNG, and whether the canvas changed (the
//! caller's cue to enqueue a backup of a freshly encoded snapshot).

use crate::canvas::Canvas;
use crate::command::{self, Command, ParseError};
use crate::palette;
use crate::raster;
use crate::snapshot::{self, SnapshotResult};

pub const DEFAULT_ZOOM_HALF_EXTENT: u32 = 50;
pub const DEFAULT_ZOOM_TARGET_SIZE: u32 = 500;

#[derive(Debug)]
pub struct Engine {
    canvas: Canvas,
    zoom_half_extent: u32,
    zoom_target_size: u32,
}

/// Outcome of one dispatched command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub reply: String,
    /// PNG bytes for view/zoom responses.
    pub image: Option<Vec<u8>>,
    pub mutated: bool,
}

impl Dispatch {
    fn status(reply: String, mutated: bool) -> Self {
        Self {
            reply,
            image: None,
            mutated,
        }
    }
}

impl Engine {
    /// Blank engine over a fresh `size` × `size` canvas.
    pub fn new(size: u32) -> Self {
        Self::with_canvas(Canvas::new(size))
    }

    /// Engine over a restored canvas.
    pub fn with_canvas(canvas: Canvas) -> Self {
        Self {
            canvas,
            zoom_half_extent: DEFAULT_ZOOM_HALF_EXTENT,
            zoom_target_size: DEFAULT_ZOOM_TARGET_SIZE,
        }
    }

    pub fn with_zoom(mut self, half_extent: u32, target_size: u32) -> Self {
        self.zoom_half_extent = half_extent;
        self.zoom_target_size = target_size;
        self
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Encodes the canvas as it stands right now.
    ///
    /// Called synchronously between dispatches, so the backup worker always
    /// receives a consistent snapshot, never a half-applied mutation.
    pub fn snapshot(&self) -> SnapshotResult<Vec<u8>> {
        snapshot::encode(&self.canvas)
    }

    /// Parses and executes one command payload.
    ///
    /// Malformed input is a normal outcome (an error reply with a usage
    /// hint), never an `Err`; only snapshot encoding can fail here.
    pub fn dispatch(&mut self, text: &str) -> SnapshotResult<Dispatch> {
        match command::parse(text, self.canvas.size()) {
            Ok(cmd) => self.execute(cmd),
            Err(err) => {
                tracing::debug!(%err, "command rejected");
                Ok(Dispatch::status(render_error(text, &err), false))
            }
        }
    }

    fn execute(&mut self, cmd: Command) -> SnapshotResult<Dispatch> {
        match cmd {
            Command::AddPoints { points, skipped } => {
                for entry in &points {
                    raster::draw_point(&mut self.canvas, entry.at, entry.color);
                }
                tracing::info!(applied = points.len(), skipped, "pixels added");
                let mut reply = format!("✅ Added {} pixel(s)", points.len());
                if skipped > 0 {
                    reply.push_str(&format!(", skipped {skipped}"));
                }
                Ok(Dispatch::status(reply, true))
            }
            Command::Line {
                token,
                color,
                from,
                to,
            } => {
                raster::draw_line(&mut self.canvas, from, to, color);
                tracing::info!(?from, ?to, "line drawn");
                Ok(Dispatch::status(format!("📏 Line ({token}) drawn!"), true))
            }
            Command::Circle {
                token,
                color,
                center,
                radius,
            } => {
                raster::draw_circle_outline(&mut self.canvas, center, radius, color);
                tracing::info!(?center, radius, "circle drawn");
                Ok(Dispatch::status(format!("⭕ Circle ({token}) drawn!"), true))
            }
            Command::Fill { token, color, a, b } => {
                raster::fill_rect(&mut self.canvas, a, b, color);
                tracing::info!(?a, ?b, "rectangle filled");
                Ok(Dispatch::status(
                    format!("✅ Fill {} complete!", palette::emoji(&token)),
                    true,
                ))
            }
            Command::Zoom { center } => {
                let region = raster::crop_and_magnify(
                    &self.canvas,
                    center,
                    self.zoom_half_extent,
                    self.zoom_target_size,
                );
                Ok(Dispatch {
                    reply: "🔍 Zoomed view".to_string(),
                    image: Some(snapshot::encode(&region)?),
                    mutated: false,
                })
            }
            Command::View => Ok(Dispatch {
                reply: "🖼 Current canvas".to_string(),
                image: Some(self.snapshot()?),
                mutated: false,
            }),
            Command::Probe { at, user } => {
                let color = self.canvas.get(at);
                Ok(Dispatch::status(
                    format!(
                        "📍 Point {}:{}\nRGB: ({}, {}, {})",
                        user.0, user.1, color.r, color.g, color.b
                    ),
                    false,
                ))
            }
        }
    }
}

fn render_error(text: &str, err: &ParseError) -> String {
    let name = text.trim().split_whitespace().next().unwrap_or_default();
    match command::usage(name) {
        Some(usage) => format!("⚠️ {err}. Usage: {usage}"),
        None => format!("⚠️ {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::BACKGROUND;
    use crate::geometry::{Color, Point};

    #[test]
    fn add_applies_valid_entries_and_reports_the_count() {
        let mut engine = Engine::new(1024);
        let dispatch = engine
            .dispatch("add red 0 0\nblue 5 5\nbogus 1 1")
            .expect("dispatch succeeds");

        assert!(dispatch.mutated);
        assert!(dispatch.reply.contains("2 pixel(s)"));
        assert_eq!(
            engine.canvas().get(Point::new(0, 1023)),
            Color::new(255, 0, 0)
        );
        assert_eq!(
            engine.canvas().get(Point::new(5, 1018)),
            Color::new(0, 0, 255)
        );
    }

    #[test]
    fn add_with_no_valid_entries_mutates_nothing() {
        let mut engine = Engine::new(1024);
        let before = engine.canvas().clone();
        let dispatch = engine.dispatch("add bogus 1 1").expect("dispatch succeeds");

        assert!(!dispatch.mutated);
        assert!(dispatch.reply.contains("no drawable entries"));
        assert_eq!(engine.canvas(), &before);
    }

    #[test]
    fn out_of_range_line_leaves_the_canvas_untouched() {
        let mut engine = Engine::new(1024);
        let before = engine.canvas().clone();
        let dispatch = engine
            .dispatch("line red 0 0 1024 5")
            .expect("dispatch succeeds");

        assert!(!dispatch.mutated);
        assert!(dispatch.reply.contains("Usage: line"));
        assert_eq!(engine.canvas(), &before);
    }

    #[test]
    fn out_of_range_fill_leaves_the_canvas_untouched() {
        let mut engine = Engine::new(1024);
        let before = engine.canvas().clone();
        let dispatch = engine
            .dispatch("fill red 5 5 8 -1")
            .expect("dispatch succeeds");

        assert!(!dispatch.mutated);
        assert_eq!(engine.canvas(), &before);
    }

    #[test]
    fn fill_reports_the_color_glyph() {
        let mut engine = Engine::new(64);
        let dispatch = engine
            .dispatch("fill green 0 0 63 63")
            .expect("dispatch succeeds");

        assert!(dispatch.mutated);
        assert!(dispatch.reply.contains("🟩"));
        assert_eq!(
            engine.canvas().get(Point::new(32, 32)),
            Color::new(0, 128, 0)
        );
    }

    #[test]
    fn view_returns_a_decodable_image_of_the_whole_canvas() {
        let mut engine = Engine::new(32);
        engine
            .dispatch("add red 1 1")
            .expect("dispatch succeeds");
        let dispatch = engine.dispatch("view").expect("dispatch succeeds");

        assert!(!dispatch.mutated);
        let bytes = dispatch.image.expect("view carries an image");
        let decoded = crate::snapshot::decode(&bytes).expect("view image decodes");
        assert_eq!(decoded, *engine.canvas());
    }

    #[test]
    fn zoom_returns_the_magnified_target_size() {
        let mut engine = Engine::new(64).with_zoom(4, 16);
        let dispatch = engine.dispatch("zoom 0 0").expect("dispatch succeeds");

        assert!(!dispatch.mutated);
        let bytes = dispatch.image.expect("zoom carries an image");
        let decoded = crate::snapshot::decode(&bytes).expect("zoom image decodes");
        assert_eq!(decoded.size(), 16);
    }

    #[test]
    fn probe_reads_back_a_previously_added_pixel() {
        let mut engine = Engine::new(1024);
        engine
            .dispatch("add orange 12 34")
            .expect("dispatch succeeds");
        let dispatch = engine.dispatch("point 12 34").expect("dispatch succeeds");

        assert!(!dispatch.mutated);
        assert!(dispatch.reply.contains("12:34"));
        assert!(dispatch.reply.contains("(255, 165, 0)"));
    }

    #[test]
    fn probe_on_a_fresh_canvas_reports_the_background() {
        let mut engine = Engine::new(64);
        let dispatch = engine.dispatch("point 10 10").expect("dispatch succeeds");
        assert!(dispatch.reply.contains("(255, 255, 255)"));
        assert_eq!(engine.canvas().get(Point::new(10, 53)), BACKGROUND);
    }

    #[test]
    fn snapshot_matches_a_view_render_of_the_same_state() {
        let mut engine = Engine::new(16);
        engine
            .dispatch("fill navy 2 2 5 5")
            .expect("dispatch succeeds");

        let snapshot = engine.snapshot().expect("snapshot encodes");
        let view = engine
            .dispatch("view")
            .expect("dispatch succeeds")
            .image
            .expect("view carries an image");
        assert_eq!(snapshot, view);
    }

    #[test]
    fn unknown_commands_get_a_plain_error_reply() {
        let mut engine = Engine::new(16);
        let dispatch = engine.dispatch("scribble 1 2").expect("dispatch succeeds");
        assert!(!dispatch.mutated);
        assert!(dispatch.reply.contains("unknown command"));
        assert!(!dispatch.reply.contains("Usage:"));
    }
}
