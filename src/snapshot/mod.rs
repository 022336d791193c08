//! Lossless PNG boundary between the canvas and the persistence gateway.

use std::io::Cursor;

use crate::canvas::Canvas;
use image::{ImageFormat, ImageReader};
use thiserror::Error;

/// Label under which the authoritative snapshot is stored and located.
pub const SNAPSHOT_LABEL: &str = "board.png";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to encode canvas snapshot: {0}")]
    Encode(#[source] image::ImageError),
    #[error("snapshot bytes are not a decodable image: {0}")]
    Decode(#[source] image::ImageError),
}

pub type SnapshotResult<T> = std::result::Result<T, SnapshotError>;

/// Serializes the canvas as PNG. Lossless: exact RGB values survive the
/// round trip.
pub fn encode(canvas: &Canvas) -> SnapshotResult<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    canvas
        .image()
        .write_to(&mut bytes, ImageFormat::Png)
        .map_err(SnapshotError::Encode)?;
    Ok(bytes.into_inner())
}

/// Rebuilds a canvas from snapshot bytes, replacing the buffer wholesale.
///
/// Corrupt or foreign bytes yield [`SnapshotError::Decode`]; the caller
/// decides the fallback (startup restores fall back to a blank canvas).
pub fn decode(bytes: &[u8]) -> SnapshotResult<Canvas> {
    let decoded = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|err| SnapshotError::Decode(image::ImageError::IoError(err)))?
        .decode()
        .map_err(SnapshotError::Decode)?;
    Ok(Canvas::from_image(decoded.to_rgb8()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Color, Point};

    #[test]
    fn encode_then_decode_preserves_every_pixel() {
        let mut canvas = Canvas::new(32);
        canvas.set(Point::new(0, 0), Color::new(1, 2, 3));
        canvas.set(Point::new(31, 31), Color::new(254, 253, 252));
        canvas.set(Point::new(17, 5), Color::new(0, 128, 255));

        let bytes = encode(&canvas).expect("canvas encodes");
        let restored = decode(&bytes).expect("snapshot decodes");

        assert_eq!(restored, canvas);
    }

    #[test]
    fn decode_rejects_corrupt_bytes() {
        let err = decode(b"not a png at all").expect_err("garbage must not decode");
        assert!(matches!(err, SnapshotError::Decode(_)));
    }

    #[test]
    fn decode_accepts_snapshots_of_any_size() {
        let canvas = Canvas::new(7);
        let bytes = encode(&canvas).expect("canvas encodes");
        let restored = decode(&bytes).expect("snapshot decodes");
        assert_eq!(restored.size(), 7);
    }
}
