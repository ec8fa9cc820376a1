use image::{Rgba, RgbaImage};

use crate::coords::Vec2;
use crate::geometry::StrokeGeometryBuilder;
use crate::ink::Stroke;

use super::{page_to_tile, TileKey};

/// CPU rasterizer for cached stroke tiles.
///
/// Each stroke's triangles are first resolved into a coverage mask and then
/// blended once, so overlapping triangles inside one stroke never darken
/// translucent ink.
#[derive(Debug)]
pub struct TileRasterizer {
    tile_size: u32,
    builder: StrokeGeometryBuilder,
    coverage: Vec<bool>,
    touched: Vec<u32>,
}

impl TileRasterizer {
    pub fn new(tile_size: u32) -> Self {
        let pixels = tile_size as usize * tile_size as usize;
        Self {
            tile_size,
            builder: StrokeGeometryBuilder::new(),
            coverage: vec![false; pixels],
            touched: Vec::new(),
        }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Renders `strokes`, in the order given, into a transparent tile.
    pub fn rasterize<'a, I>(&mut self, key: &TileKey, strokes: I) -> RgbaImage
    where
        I: IntoIterator<Item = &'a Stroke>,
    {
        let ts = self.tile_size;
        let mut image = RgbaImage::new(ts, ts);
        let area = key.page_rect(ts);

        for stroke in strokes {
            if !stroke.bounds.overlaps(area) {
                continue;
            }
            let Some(geometry) = self.builder.build(&stroke.points, &stroke.style) else {
                continue;
            };
            for tri in geometry.vertices.chunks_exact(3) {
                let [a, b, c] = [tri[0], tri[1], tri[2]]
                    .map(|v| page_to_tile(key, ts, Vec2::new(v.pos[0], v.pos[1])));
                self.cover_triangle(a, b, c);
            }
            let color = stroke.style.color.to_rgba8(stroke.style.render_alpha());
            self.flush(&mut image, color);
        }
        image
    }

    fn cover_triangle(&mut self, a: Vec2, b: Vec2, c: Vec2) {
        let area = edge(a, b, c);
        if area == 0.0 || !area.is_finite() {
            return;
        }
        let max = self.tile_size as f32;
        let x0 = a.x.min(b.x).min(c.x).floor().clamp(0.0, max) as u32;
        let x1 = a.x.max(b.x).max(c.x).ceil().clamp(0.0, max) as u32;
        let y0 = a.y.min(b.y).min(c.y).floor().clamp(0.0, max) as u32;
        let y1 = a.y.max(b.y).max(c.y).ceil().clamp(0.0, max) as u32;

        for y in y0..y1 {
            for x in x0..x1 {
                let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(b, c, p);
                let w1 = edge(c, a, p);
                let w2 = edge(a, b, p);
                let inside = if area > 0.0 {
                    w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0
                } else {
                    w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0
                };
                if !inside {
                    continue;
                }
                let i = (y * self.tile_size + x) as usize;
                if !self.coverage[i] {
                    self.coverage[i] = true;
                    self.touched.push(i as u32);
                }
            }
        }
    }

    /// Blends covered pixels with `color` (straight-alpha sRGB) and resets the mask.
    fn flush(&mut self, image: &mut RgbaImage, color: [u8; 4]) {
        let ts = self.tile_size;
        for i in self.touched.drain(..) {
            self.coverage[i as usize] = false;
            let pixel = image.get_pixel_mut(i % ts, i / ts);
            *pixel = source_over(*pixel, color);
        }
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

fn source_over(dst: Rgba<u8>, src: [u8; 4]) -> Rgba<u8> {
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    Rgba(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ink::{StrokeId, StrokePoint, StrokeStyle, Tool};
    use crate::paint::Argb;
    use crate::tile::{ScaleBucket, SurfaceId};

    fn line(y: f32, style: StrokeStyle) -> Stroke {
        let points = (0..8).map(|i| StrokePoint::at(4.0 + i as f32 * 8.0, y, i)).collect();
        Stroke::from_points(StrokeId::new(), points, style, style.base_width, 0).expect("stroke")
    }

    fn key(tx: i32, bucket: ScaleBucket) -> TileKey {
        TileKey::new(SurfaceId(1), tx, 0, bucket)
    }

    #[test]
    fn draws_strokes_inside_the_tile() {
        let mut r = TileRasterizer::new(64);
        let stroke = line(32.0, StrokeStyle::default().with_width(6.0));
        let img = r.rasterize(&key(0, ScaleBucket::X1), [&stroke]);
        assert_eq!(img.get_pixel(30, 32)[3], 255);
        assert_eq!(img.get_pixel(30, 2)[3], 0);
    }

    #[test]
    fn skips_strokes_outside_the_tile() {
        let mut r = TileRasterizer::new(64);
        let stroke = line(32.0, StrokeStyle::default().with_width(6.0));
        let img = r.rasterize(&key(3, ScaleBucket::X1), [&stroke]);
        assert!(img.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn higher_bucket_magnifies() {
        let mut r = TileRasterizer::new(64);
        let stroke = line(16.0, StrokeStyle::default().with_width(6.0));
        // At 2x the tile spans page 0..32, so page y 16 lands on tile row 32.
        let img = r.rasterize(&key(0, ScaleBucket::X2), [&stroke]);
        assert_eq!(img.get_pixel(20, 32)[3], 255);
        assert_eq!(img.get_pixel(20, 16)[3], 0);
    }

    #[test]
    fn translucent_ink_blends_once_per_stroke() {
        let mut r = TileRasterizer::new(64);
        let style = StrokeStyle::default()
            .with_tool(Tool::Highlighter)
            .with_color(Argb(0xFFFF_0000))
            .with_width(10.0);
        let stroke = line(32.0, style);
        let img = r.rasterize(&key(0, ScaleBucket::X1), [&stroke]);
        let expected = (crate::ink::HIGHLIGHTER_ALPHA * 255.0).round() as u8;
        let alphas: Vec<u8> = img.pixels().map(|p| p[3]).filter(|a| *a > 0).collect();
        assert!(!alphas.is_empty());
        assert!(alphas.iter().all(|a| *a == expected));
    }
}
