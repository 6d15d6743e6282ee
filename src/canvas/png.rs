use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

use crate::canvas::Canvas;

/// Render the canvas as PNG bytes, one image pixel per cell
pub fn render_png(canvas: &Canvas) -> Result<Vec<u8>, image::ImageError> {
    let side = canvas.size as u32;
    let img = RgbImage::from_fn(side, side, |x, y| {
        let rgb = canvas
            .cell(x as usize, y as usize)
            .map(|cell| cell.color.rgb())
            .unwrap_or([255, 255, 255]);
        Rgb(rgb)
    });

    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)?;
    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Cell, Color};

    #[test]
    fn test_export_png() {
        let canvas = Canvas::new(8, &Color::parse("#FFFFFF").unwrap(), 0);
        let png = render_png(&canvas).unwrap();

        // PNG magic bytes
        assert_eq!(&png[0..8], &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_png_pixels_follow_cells() {
        let mut canvas = Canvas::new(4, &Color::parse("#FFFFFF").unwrap(), 0);
        canvas.set_cell(
            1,
            2,
            Cell {
                color: Color::parse("#FF0000").unwrap(),
                last_updated: 1,
                last_updated_by: "alice".into(),
            },
        );

        let png = render_png(&canvas).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgb8();
        assert_eq!(decoded.dimensions(), (4, 4));
        assert_eq!(decoded.get_pixel(1, 2), &Rgb([255, 0, 0]));
        assert_eq!(decoded.get_pixel(2, 1), &Rgb([255, 255, 255]));
    }
}
