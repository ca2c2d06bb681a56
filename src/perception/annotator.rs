/// Draws the resolved bounding box onto a screenshot copy, for diagnostics.
/// Not part of the functional contract; callers log failures and move on.
use image::ImageError;

const BOX_COLOUR: [u8; 4] = [255, 68, 68, 255]; // red
const BOX_THICKNESS: i32 = 2;

/// Pixel-space rectangle, `(x_min, y_min, x_max, y_max)`.
pub type PixelRect = (i32, i32, i32, i32);

/// Annotates `src_bytes` (PNG/JPEG) with the resolved rectangle.
/// Returns PNG-encoded bytes.
pub fn annotate_screenshot(src_bytes: &[u8], rect: PixelRect) -> Result<Vec<u8>, ImageError> {
    let img = image::load_from_memory(src_bytes)?;
    let mut canvas = img.to_rgba8();

    let (x1, y1, x2, y2) = rect;
    draw_rect(&mut canvas, x1, y1, x2, y2, BOX_COLOUR, BOX_THICKNESS);

    let mut out = Vec::new();
    image::DynamicImage::ImageRgba8(canvas)
        .write_to(&mut std::io::Cursor::new(&mut out), image::ImageFormat::Png)?;
    Ok(out)
}

fn draw_rect(
    canvas: &mut image::RgbaImage,
    x1: i32,
    y1: i32,
    x2: i32,
    y2: i32,
    col: [u8; 4],
    thickness: i32,
) {
    let (w, h) = canvas.dimensions();
    let (iw, ih) = (w as i32, h as i32);

    // Top & bottom edges
    for t in 0..thickness {
        let ty = y1 + t;
        let by = y2 - t;
        for x in x1..=x2 {
            if x >= 0 && x < iw {
                if ty >= 0 && ty < ih {
                    canvas.put_pixel(x as u32, ty as u32, image::Rgba(col));
                }
                if by >= 0 && by < ih {
                    canvas.put_pixel(x as u32, by as u32, image::Rgba(col));
                }
            }
        }
    }
    // Left & right edges
    for t in 0..thickness {
        let lx = x1 + t;
        let rx = x2 - t;
        for y in y1..=y2 {
            if y >= 0 && y < ih {
                if lx >= 0 && lx < iw {
                    canvas.put_pixel(lx as u32, y as u32, image::Rgba(col));
                }
                if rx >= 0 && rx < iw {
                    canvas.put_pixel(rx as u32, y as u32, image::Rgba(col));
                }
            }
        }
    }
}
