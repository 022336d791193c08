//! Text command parsing and validation.
//!
//! Turns a raw command payload into a typed, bounds-checked [`Command`] in
//! buffer space, or a typed [`ParseError`]. Single-shape commands (line,
//! circle, fill) validate atomically: any bad token or out-of-range
//! coordinate rejects the whole command before a single pixel is written.
//! The multi-point `add` form is lenient instead, skipping entries that do
//! not validate.

use crate::geometry::{to_buffer_y, Color, Point};
use crate::palette::{self, PaletteError};
use thiserror::Error;

/// One validated pixel write from an `add` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelEntry {
    pub color: Color,
    pub at: Point,
}

/// A fully validated drawing request in buffer space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AddPoints {
        points: Vec<PixelEntry>,
        skipped: usize,
    },
    Line {
        token: String,
        color: Color,
        from: Point,
        to: Point,
    },
    Circle {
        token: String,
        color: Color,
        center: Point,
        radius: i32,
    },
    Fill {
        token: String,
        color: Color,
        a: Point,
        b: Point,
    },
    /// Center may lie anywhere; the rasterizer clamps the crop box.
    Zoom { center: Point },
    View,
    /// Read-only pixel query. `user` keeps the original coordinates for
    /// the reply.
    Probe { at: Point, user: (i32, i32) },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty input")]
    Empty,
    #[error("unknown command: {name}")]
    UnknownCommand { name: String },
    #[error("expected {expected} arguments, found {found}")]
    WrongArgCount { expected: usize, found: usize },
    #[error("not an integer: {token}")]
    InvalidInteger { token: String },
    #[error(transparent)]
    UnknownColor(#[from] PaletteError),
    #[error("coordinate ({x}, {y}) is outside the {size}x{size} canvas")]
    OutOfBounds { x: i32, y: i32, size: u32 },
    #[error("circle of radius {radius} at ({x}, {y}) exceeds the canvas")]
    CircleExceedsBounds { x: i32, y: i32, radius: i32 },
    #[error("radius must be non-negative, got {radius}")]
    NegativeRadius { radius: i32 },
    #[error("no drawable entries in payload")]
    NoValidPoints,
}

/// Usage hint for a command name, rendered alongside parse errors.
pub fn usage(name: &str) -> Option<&'static str> {
    match normalize_name(name) {
        "add" => Some("add <color> <x> <y> [one entry per line]"),
        "line" => Some("line <color> <x1> <y1> <x2> <y2>"),
        "circle" => Some("circle <color> <x> <y> <radius>"),
        "fill" => Some("fill <color> <x1> <y1> <x2> <y2>"),
        "zoom" => Some("zoom <x> <y>"),
        "view" => Some("view"),
        "point" => Some("point <x> <y>"),
        _ => None,
    }
}

/// Parses one command payload against a canvas of side `size`.
pub fn parse(text: &str, size: u32) -> Result<Command, ParseError> {
    let trimmed = text.trim();
    let name = trimmed.split_whitespace().next().ok_or(ParseError::Empty)?;

    match normalize_name(name) {
        "add" => parse_add(trimmed, size),
        "line" => parse_line(args_of(trimmed), size),
        "circle" => parse_circle(args_of(trimmed), size),
        "fill" => parse_fill(args_of(trimmed), size),
        "zoom" => parse_zoom(args_of(trimmed), size),
        "view" => {
            expect_args(&args_of(trimmed), 0)?;
            Ok(Command::View)
        }
        "point" => parse_probe(args_of(trimmed), size),
        other => Err(ParseError::UnknownCommand {
            name: other.to_string(),
        }),
    }
}

fn normalize_name(token: &str) -> &str {
    token.trim().trim_start_matches('/')
}

fn args_of(text: &str) -> Vec<&str> {
    text.split_whitespace().skip(1).collect()
}

fn expect_args(args: &[&str], expected: usize) -> Result<(), ParseError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(ParseError::WrongArgCount {
            expected,
            found: args.len(),
        })
    }
}

fn parse_int(token: &str) -> Result<i32, ParseError> {
    token.parse().map_err(|_| ParseError::InvalidInteger {
        token: token.to_string(),
    })
}

/// Transforms a user-space coordinate pair and bounds-checks the result.
fn checked_point(x: i32, y_user: i32, size: u32) -> Result<Point, ParseError> {
    let point = Point::new(x, to_buffer_y(size, y_user));
    let side = size as i32;
    if (0..side).contains(&point.x) && (0..side).contains(&point.y) {
        Ok(point)
    } else {
        Err(ParseError::OutOfBounds {
            x,
            y: y_user,
            size,
        })
    }
}

fn parse_add(text: &str, size: u32) -> Result<Command, ParseError> {
    let mut points = Vec::new();
    let mut skipped = 0;

    for (index, line) in text.lines().enumerate() {
        let mut tokens: Vec<&str> = line.split_whitespace().collect();
        if index == 0 {
            tokens.remove(0);
            if tokens.is_empty() {
                continue;
            }
        }
        let [token, x_raw, y_raw] = tokens.as_slice() else {
            if !tokens.is_empty() {
                skipped += 1;
            }
            continue;
        };

        let parsed = palette::resolve(token).map_err(ParseError::from).and_then(|color| {
            let x = parse_int(x_raw)?;
            let y = parse_int(y_raw)?;
            Ok(PixelEntry {
                color,
                at: checked_point(x, y, size)?,
            })
        });
        match parsed {
            Ok(entry) => points.push(entry),
            Err(_) => skipped += 1,
        }
    }

    if points.is_empty() {
        return Err(ParseError::NoValidPoints);
    }
    Ok(Command::AddPoints { points, skipped })
}

fn parse_line(args: Vec<&str>, size: u32) -> Result<Command, ParseError> {
    expect_args(&args, 5)?;
    let color = palette::resolve(args[0])?;
    let x1 = parse_int(args[1])?;
    let y1 = parse_int(args[2])?;
    let x2 = parse_int(args[3])?;
    let y2 = parse_int(args[4])?;
    Ok(Command::Line {
        token: args[0].to_string(),
        color,
        from: checked_point(x1, y1, size)?,
        to: checked_point(x2, y2, size)?,
    })
}

fn parse_circle(args: Vec<&str>, size: u32) -> Result<Command, ParseError> {
    expect_args(&args, 4)?;
    let color = palette::resolve(args[0])?;
    let cx = parse_int(args[1])?;
    let cy = parse_int(args[2])?;
    let radius = parse_int(args[3])?;
    if radius < 0 {
        return Err(ParseError::NegativeRadius { radius });
    }

    let center = checked_point(cx, cy, size)?;
    // The whole bounding box must fit so the outline never clips.
    let (x, y, r) = (center.x as i64, center.y as i64, radius as i64);
    let side = size as i64;
    let clipped = x - r < 0 || x + r >= side || y - r < 0 || y + r >= side;
    if clipped {
        return Err(ParseError::CircleExceedsBounds {
            x: cx,
            y: cy,
            radius,
        });
    }

    Ok(Command::Circle {
        token: args[0].to_string(),
        color,
        center,
        radius,
    })
}

fn parse_fill(args: Vec<&str>, size: u32) -> Result<Command, ParseError> {
    expect_args(&args, 5)?;
    let color = palette::resolve(args[0])?;
    let x1 = parse_int(args[1])?;
    let y1 = parse_int(args[2])?;
    let x2 = parse_int(args[3])?;
    let y2 = parse_int(args[4])?;
    Ok(Command::Fill {
        token: args[0].to_string(),
        color,
        a: checked_point(x1, y1, size)?,
        b: checked_point(x2, y2, size)?,
    })
}

fn parse_zoom(args: Vec<&str>, size: u32) -> Result<Command, ParseError> {
    expect_args(&args, 2)?;
    let cx = parse_int(args[0])?;
    let cy = parse_int(args[1])?;
    Ok(Command::Zoom {
        center: Point::new(cx, to_buffer_y(size, cy)),
    })
}

fn parse_probe(args: Vec<&str>, size: u32) -> Result<Command, ParseError> {
    expect_args(&args, 2)?;
    let x = parse_int(args[0])?;
    let y = parse_int(args[1])?;
    Ok(Command::Probe {
        at: checked_point(x, y, size)?,
        user: (x, y),
    })
}
