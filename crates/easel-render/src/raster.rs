//! CPU raster renderer.
//!
//! Paths are flattened to line segments and filled with a scanline sweep
//! (nonzero winding, four sub-scanlines per pixel row, exact horizontal
//! coverage). Strokes are converted to fill outlines with `kurbo::stroke`.

use crate::encode;
use crate::renderer::{ImageFormat, RenderContext, RenderError, RenderResult, Renderer};
use easel_core::canvas::Canvas;
use easel_core::document::MAX_DIMENSION;
use easel_core::shapes::{Shape, ShapeStyle, Text};
use kurbo::{Affine, BezPath, PathEl, Point, Rect, Shape as KurboShape, Stroke, StrokeOpts};
use peniko::Color;

/// Curve flattening tolerance in device pixels.
const TOLERANCE: f64 = 0.1;
/// Sub-scanlines per pixel row.
const SUBSAMPLES: usize = 4;

/// An RGBA8 image (straight alpha).
#[derive(Debug, Clone, PartialEq)]
pub struct Pixmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Pixmap {
    /// Create a pixmap filled with `background`. Each side must be within
    /// `1..=MAX_DIMENSION`.
    pub fn new(width: u32, height: u32, background: Color) -> RenderResult<Self> {
        let side = 1..=MAX_DIMENSION;
        let len = Some(width)
            .filter(|w| side.contains(w) && side.contains(&height))
            .and_then(|w| (w as usize).checked_mul(height as usize))
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or(RenderError::InvalidSize { width, height })?;
        let rgba = background.to_rgba8();
        let data = [rgba.r, rgba.g, rgba.b, rgba.a]
            .into_iter()
            .cycle()
            .take(len)
            .collect();
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        Some([self.data[i], self.data[i + 1], self.data[i + 2], self.data[i + 3]])
    }

    /// Source-over blend of `color` at `coverage` (0..=1).
    fn blend(&mut self, x: usize, y: usize, color: [u8; 4], coverage: f32) {
        let i = (y * self.width as usize + x) * 4;
        let src_a = f32::from(color[3]) / 255.0 * coverage.min(1.0);
        if src_a <= 0.0 {
            return;
        }
        let dst_a = f32::from(self.data[i + 3]) / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        for c in 0..3 {
            let src = f32::from(color[c]);
            let dst = f32::from(self.data[i + c]);
            let out = (src * src_a + dst * dst_a * (1.0 - src_a)) / out_a;
            self.data[i + c] = out.round().clamp(0.0, 255.0) as u8;
        }
        self.data[i + 3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    }

    /// Fill a device-space path with the nonzero rule.
    pub fn fill_path(&mut self, path: &BezPath, color: Color) {
        let edges = collect_edges(path);
        if edges.is_empty() || self.width == 0 || self.height == 0 {
            return;
        }
        let rgba = color.to_rgba8();
        let rgba = [rgba.r, rgba.g, rgba.b, rgba.a];

        let top = edges.iter().map(|e| e.y0).fold(f64::INFINITY, f64::min);
        let bottom = edges.iter().map(|e| e.y1).fold(f64::NEG_INFINITY, f64::max);
        let first_row = top.floor().max(0.0) as usize;
        let end_row = (bottom.ceil().max(0.0) as usize).min(self.height as usize);

        let width = self.width as usize;
        let weight = 1.0 / SUBSAMPLES as f64;
        let mut coverage = vec![0f32; width];
        let mut crossings: Vec<(f64, i32)> = Vec::new();

        for row in first_row..end_row {
            coverage.iter_mut().for_each(|c| *c = 0.0);
            let mut touched = false;

            for sub in 0..SUBSAMPLES {
                let y = row as f64 + (sub as f64 + 0.5) * weight;
                crossings.clear();
                crossings.extend(
                    edges
                        .iter()
                        .filter(|e| y >= e.y0 && y < e.y1)
                        .map(|e| (e.x_at(y), e.winding)),
                );
                crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

                let mut winding = 0;
                for pair in 0..crossings.len() {
                    winding += crossings[pair].1;
                    if winding != 0 {
                        if let Some(next) = crossings.get(pair + 1) {
                            touched |= add_span(&mut coverage, crossings[pair].0, next.0, weight);
                        }
                    }
                }
            }

            if touched {
                for (x, cov) in coverage.iter().enumerate() {
                    if *cov > 0.0 {
                        self.blend(x, row, rgba, *cov);
                    }
                }
            }
        }
    }

    /// Stroke a path given in local coordinates, then map it to the device.
    pub fn stroke_path(&mut self, path: &BezPath, width: f64, transform: Affine, color: Color) {
        if width <= 0.0 {
            return;
        }
        let outline =
            kurbo::stroke(path.iter(), &Stroke::new(width), &StrokeOpts::default(), TOLERANCE);
        self.fill_path(&(transform * outline), color);
    }
}

/// A non-horizontal segment, oriented top to bottom.
struct Edge {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    winding: i32,
}

impl Edge {
    fn new(a: Point, b: Point) -> Option<Self> {
        if (a.y - b.y).abs() < f64::EPSILON {
            return None;
        }
        let (top, bottom, winding) = if a.y < b.y { (a, b, 1) } else { (b, a, -1) };
        Some(Self {
            x0: top.x,
            y0: top.y,
            x1: bottom.x,
            y1: bottom.y,
            winding,
        })
    }

    fn x_at(&self, y: f64) -> f64 {
        self.x0 + (y - self.y0) * (self.x1 - self.x0) / (self.y1 - self.y0)
    }
}

/// Flatten a path into edges. Every subpath is treated as closed.
fn collect_edges(path: &BezPath) -> Vec<Edge> {
    let mut edges = Vec::new();
    let mut start: Option<Point> = None;
    let mut last: Option<Point> = None;
    let close = |edges: &mut Vec<Edge>, last: Option<Point>, start: Option<Point>| {
        if let (Some(a), Some(b)) = (last, start) {
            edges.extend(Edge::new(a, b));
        }
    };
    kurbo::flatten(path, TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => {
            close(&mut edges, last, start);
            start = Some(p);
            last = Some(p);
        }
        PathEl::LineTo(p) => {
            if let Some(prev) = last {
                edges.extend(Edge::new(prev, p));
            }
            last = Some(p);
        }
        PathEl::ClosePath => {
            close(&mut edges, last, start);
            last = start;
        }
        _ => {}
    });
    close(&mut edges, last, start);
    edges
}

/// Accumulate horizontal coverage of `[x0, x1)`. Returns true if any pixel was hit.
fn add_span(coverage: &mut [f32], x0: f64, x1: f64, weight: f64) -> bool {
    let x0 = x0.max(0.0);
    let x1 = x1.min(coverage.len() as f64);
    if x1 <= x0 {
        return false;
    }
    let first = x0.floor() as usize;
    let end = (x1.ceil() as usize).min(coverage.len());
    for (x, cov) in coverage.iter_mut().enumerate().take(end).skip(first) {
        let overlap = x1.min(x as f64 + 1.0) - x0.max(x as f64);
        if overlap > 0.0 {
            *cov += (overlap * weight) as f32;
        }
    }
    true
}

/// Draw one object through `view`.
fn draw_shape(pixmap: &mut Pixmap, shape: &Shape, view: Affine) {
    let transform = view * shape.object_transform();
    match shape {
        Shape::Text(text) => draw_text(pixmap, text, transform),
        _ => {
            let path = shape.local_path();
            draw_styled(pixmap, &path, shape.style(), shape.is_closed(), transform);
        }
    }
}

fn draw_styled(
    pixmap: &mut Pixmap,
    path: &BezPath,
    style: &ShapeStyle,
    closed: bool,
    transform: Affine,
) {
    if closed {
        if let Some(fill) = style.fill_with_opacity() {
            pixmap.fill_path(&(transform * path.clone()), fill);
        }
    }
    if let Some(stroke) = style.stroke_with_opacity() {
        pixmap.stroke_path(path, style.stroke_width, transform, stroke);
    }
}

/// Text without a font engine: each visible character becomes a glyph-sized
/// block on its line.
fn draw_text(pixmap: &mut Pixmap, text: &Text, transform: Affine) {
    let Some(color) = text.style.fill_with_opacity() else {
        return;
    };
    let advance = text.glyph_advance();
    let glyph_height = text.font_size * 0.7;
    let inset = advance * 0.1;

    let mut glyphs = BezPath::new();
    for (line_index, line) in text.content.lines().enumerate() {
        let baseline = text.position.y + text.font_size + line_index as f64 * text.line_height();
        for (column, ch) in line.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let x = text.position.x + column as f64 * advance;
            let cell = Rect::new(x + inset, baseline - glyph_height, x + advance - inset, baseline);
            glyphs.extend(cell.path_elements(TOLERANCE));
        }
    }
    pixmap.fill_path(&(transform * glyphs), color);
}

/// Draw the whole canvas through its camera.
pub fn rasterize(ctx: &RenderContext) -> RenderResult<Pixmap> {
    let document = &ctx.canvas.document;
    let mut pixmap = Pixmap::new(document.width, document.height, document.background.into())?;
    let view = ctx.canvas.camera.transform();
    for shape in &document.objects {
        draw_shape(&mut pixmap, shape, view);
    }

    if ctx.show_selection {
        if let Some(selected) = ctx.canvas.selected() {
            let outline = (view * selected.world_path()).bounding_box().inflate(2.0, 2.0);
            let outline = outline.to_path(TOLERANCE);
            pixmap.stroke_path(&outline, 1.0, Affine::IDENTITY, ctx.selection_color);
        }
    }
    Ok(pixmap)
}

/// Software renderer producing RGBA frames.
#[derive(Debug, Default)]
pub struct RasterRenderer {
    frame: Option<Pixmap>,
    disposed: bool,
}

impl RasterRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently rendered frame.
    pub fn frame(&self) -> Option<&Pixmap> {
        self.frame.as_ref()
    }

    fn ensure_live(&self) -> RenderResult<()> {
        if self.disposed {
            Err(RenderError::Disposed)
        } else {
            Ok(())
        }
    }
}

impl Renderer for RasterRenderer {
    fn render(&mut self, ctx: &RenderContext) -> RenderResult<()> {
        self.ensure_live()?;
        self.frame = Some(rasterize(ctx)?);
        Ok(())
    }

    fn export(&mut self, canvas: &Canvas, format: ImageFormat) -> RenderResult<Vec<u8>> {
        self.ensure_live()?;
        let pixmap = rasterize(&RenderContext::for_export(canvas))?;
        let bytes = encode::encode(&pixmap, format)?;
        log::info!(
            "Exported {}x{} {} ({} bytes)",
            pixmap.width(),
            pixmap.height(),
            format,
            bytes.len()
        );
        Ok(bytes)
    }

    fn dispose(&mut self) {
        if !self.disposed {
            log::debug!("Disposing raster renderer");
        }
        self.frame = None;
        self.disposed = true;
    }

    fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_core::shapes::{ShapeKind, ShapeParams, TextStyle};
    use kurbo::Vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const WHITE: [u8; 4] = [255, 255, 255, 255];

    fn place(canvas: &mut Canvas, kind: ShapeKind, left: f64, top: f64) -> usize {
        let params = ShapeParams {
            left: Some(left),
            top: Some(top),
            ..ShapeParams::default()
        };
        canvas.add_shape(kind, &params, &mut StdRng::seed_from_u64(0))
    }

    #[test]
    fn test_empty_canvas_is_background() {
        let canvas = Canvas::new();
        let pixmap = rasterize(&RenderContext::new(&canvas)).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (600, 400));
        assert_eq!(pixmap.pixel(0, 0), Some(WHITE));
        assert_eq!(pixmap.pixel(599, 399), Some(WHITE));
        assert_eq!(pixmap.pixel(600, 0), None);
    }

    #[test]
    fn test_filled_rectangle() {
        let mut canvas = Canvas::new();
        place(&mut canvas, ShapeKind::Rectangle, 10.0, 10.0);
        let pixmap = rasterize(&RenderContext::new(&canvas)).unwrap();
        assert_eq!(pixmap.pixel(50, 50), Some([0, 128, 0, 255]));
        assert_eq!(pixmap.pixel(5, 5), Some(WHITE));
        assert_eq!(pixmap.pixel(115, 50), Some(WHITE));
    }

    #[test]
    fn test_circle_is_round() {
        let mut canvas = Canvas::new();
        place(&mut canvas, ShapeKind::Circle, 0.0, 0.0);
        let pixmap = rasterize(&RenderContext::new(&canvas)).unwrap();
        assert_eq!(pixmap.pixel(40, 40), Some([0, 0, 255, 255]));
        assert_eq!(pixmap.pixel(2, 2), Some(WHITE));
    }

    #[test]
    fn test_later_objects_paint_over_earlier() {
        let mut canvas = Canvas::new();
        place(&mut canvas, ShapeKind::Rectangle, 0.0, 0.0);
        place(&mut canvas, ShapeKind::Circle, 0.0, 0.0);
        let pixmap = rasterize(&RenderContext::new(&canvas)).unwrap();
        assert_eq!(pixmap.pixel(40, 40), Some([0, 0, 255, 255]));
        assert_eq!(pixmap.pixel(95, 75), Some([0, 128, 0, 255]));
    }

    #[test]
    fn test_camera_is_applied() {
        let mut canvas = Canvas::new();
        place(&mut canvas, ShapeKind::Rectangle, 0.0, 0.0);
        canvas.camera.pan(Vec2::new(200.0, 0.0));
        let pixmap = rasterize(&RenderContext::new(&canvas)).unwrap();
        assert_eq!(pixmap.pixel(50, 40), Some(WHITE));
        assert_eq!(pixmap.pixel(250, 40), Some([0, 128, 0, 255]));
    }

    #[test]
    fn test_stroked_line() {
        let mut canvas = Canvas::new();
        place(&mut canvas, ShapeKind::Line, 10.0, 100.0);
        let pixmap = rasterize(&RenderContext::new(&canvas)).unwrap();
        let on_line = pixmap.pixel(80, 100).unwrap();
        assert!(on_line[0] < 128);
        assert_eq!(pixmap.pixel(80, 110), Some(WHITE));
    }

    #[test]
    fn test_text_leaves_ink() {
        let mut canvas = Canvas::new();
        let mut rng = StdRng::seed_from_u64(0);
        canvas.add_text("Hi", &TextStyle::default(), Some(Point::new(20.0, 20.0)), &mut rng);
        let pixmap = rasterize(&RenderContext::new(&canvas)).unwrap();
        let inked = (20..60)
            .flat_map(|x| (20..50).map(move |y| (x, y)))
            .filter(|&(x, y)| pixmap.pixel(x, y) != Some(WHITE))
            .count();
        assert!(inked > 0);
    }

    #[test]
    fn test_selection_outline_only_in_render() {
        let mut canvas = Canvas::new();
        let index = place(&mut canvas, ShapeKind::Rectangle, 100.0, 100.0);
        canvas.select(index);
        let live = rasterize(&RenderContext::new(&canvas)).unwrap();
        let export = rasterize(&RenderContext::for_export(&canvas)).unwrap();
        assert_ne!(live, export);
        assert_eq!(export.pixel(98, 150), Some(WHITE));
    }

    #[test]
    fn test_export_does_not_mutate() {
        let mut canvas = Canvas::new();
        place(&mut canvas, ShapeKind::Triangle, 30.0, 30.0);
        let before = canvas.document.clone();
        let mut renderer = RasterRenderer::new();
        let bytes = renderer.export(&canvas, ImageFormat::Png).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(canvas.document, before);
    }

    #[test]
    fn test_zero_size_is_rejected() {
        let mut canvas = Canvas::new();
        canvas.document.width = 0;
        assert!(matches!(
            rasterize(&RenderContext::new(&canvas)),
            Err(RenderError::InvalidSize { .. })
        ));
    }

    #[test]
    fn test_oversized_canvas_is_rejected() {
        let mut canvas = Canvas::new();
        canvas.document.width = u32::MAX;
        canvas.document.height = u32::MAX;
        assert!(matches!(
            rasterize(&RenderContext::new(&canvas)),
            Err(RenderError::InvalidSize { .. })
        ));
        let mut renderer = RasterRenderer::new();
        assert!(renderer.export(&canvas, ImageFormat::Png).is_err());
    }

    #[test]
    fn test_pixmap_size_limits() {
        assert!(Pixmap::new(u32::MAX, u32::MAX, Color::WHITE).is_err());
        assert!(Pixmap::new(MAX_DIMENSION + 1, 1, Color::WHITE).is_err());
        assert!(Pixmap::new(3, 0, Color::WHITE).is_err());
        let pixmap = Pixmap::new(3, 2, Color::WHITE).unwrap();
        assert_eq!(pixmap.data().len(), 24);
    }

    #[test]
    fn test_disposed_renderer_refuses_work() {
        let canvas = Canvas::new();
        let mut renderer = RasterRenderer::new();
        renderer.render(&RenderContext::new(&canvas)).unwrap();
        assert!(renderer.frame().is_some());
        renderer.dispose();
        renderer.dispose();
        assert!(renderer.is_disposed());
        assert!(renderer.frame().is_none());
        assert!(matches!(
            renderer.export(&canvas, ImageFormat::Png),
            Err(RenderError::Disposed)
        ));
    }
}
