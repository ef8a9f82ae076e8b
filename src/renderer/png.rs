//! PNG rasterization of generated SVG
//!
//! The SVG text is parsed back with usvg and painted by resvg onto a
//! tiny-skia pixmap, so PNG output always matches the SVG output.

use tracing::debug;

use crate::RenderError;

/// Rasterize an SVG document at `scale` pixels per user unit and encode it as PNG
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rasterize(svg: &str, scale: f32) -> Result<Vec<u8>, RenderError> {
    if !(scale.is_finite() && scale > 0.0) {
        return Err(RenderError::Raster(format!(
            "scale must be a positive number, got {scale}"
        )));
    }

    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| RenderError::Raster(format!("SVG parsing failed: {e}")))?;

    let size = tree.size();
    let px_w = (size.width() * scale).ceil();
    let px_h = (size.height() * scale).ceil();
    if px_w > u32::MAX as f32 || px_h > u32::MAX as f32 {
        return Err(RenderError::Raster(format!(
            "scaled size {px_w}x{px_h} exceeds supported limits"
        )));
    }
    let (px_w, px_h) = ((px_w as u32).max(1), (px_h as u32).max(1));

    let mut pixmap = tiny_skia::Pixmap::new(px_w, px_h)
        .ok_or_else(|| RenderError::Raster(format!("failed to allocate {px_w}x{px_h} pixmap")))?;

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    debug!(width = px_w, height = px_h, "rasterized drawing");

    pixmap
        .encode_png()
        .map_err(|e| RenderError::Raster(format!("PNG encoding failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="8" height="4" viewBox="0 0 8 4"><rect x="0" y="0" width="8" height="4" fill="red"/></svg>"#;

    fn png_size(png: &[u8]) -> (u32, u32) {
        let w = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        let h = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
        (w, h)
    }

    #[test]
    fn test_rasterize_produces_png() {
        let png = rasterize(SQUARE, 1.0).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(png_size(&png), (8, 4));
    }

    #[test]
    fn test_rasterize_scales_output() {
        let png = rasterize(SQUARE, 2.5).unwrap();
        assert_eq!(png_size(&png), (20, 10));
    }

    #[test]
    fn test_invalid_scale_rejected() {
        assert!(matches!(rasterize(SQUARE, 0.0), Err(RenderError::Raster(_))));
        assert!(matches!(rasterize(SQUARE, f32::NAN), Err(RenderError::Raster(_))));
    }

    #[test]
    fn test_invalid_svg_rejected() {
        assert!(matches!(rasterize("not svg", 1.0), Err(RenderError::Raster(_))));
    }
}
