//! Glyph geometry: TTF outlines flattened to contours, triangulated caps,
//! extruded walls and a single chamfer ring in place of a rounded bevel.
//!
//! The animation core only consumes the [`GlyphSource`] trait (bounding box
//! per character); frontends additionally pull the full [`GlyphMesh`] to
//! upload vertex data.

use crate::error::GlyphError;
use crate::tessellate::{point_in_polygon, signed_area, triangulate};
use fnv::FnvHashMap;
use glam::{Vec2, Vec3};
use rusttype::{point, Font, OutlineBuilder, Scale};
use std::cell::RefCell;
use std::rc::Rc;

/// Geometry parameters for letter meshes.
#[derive(Clone, Copy, Debug)]
pub struct GlyphStyle {
    pub size: f32,
    pub depth: f32,
    /// Maximum chord deviation when flattening bezier outline segments.
    pub curve_tolerance: f32,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
}

impl Default for GlyphStyle {
    fn default() -> Self {
        Self {
            size: crate::GLYPH_SIZE,
            depth: crate::GLYPH_DEPTH,
            curve_tolerance: crate::GLYPH_CURVE_TOLERANCE,
            bevel_thickness: crate::GLYPH_BEVEL_THICKNESS,
            bevel_size: crate::GLYPH_BEVEL_SIZE,
        }
    }
}

/// Axis-aligned bounds of a centered glyph mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphBounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl GlyphBounds {
    #[inline]
    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn is_degenerate(&self) -> bool {
        !(self.height() > f32::EPSILON)
    }
}

/// Flat-shaded vertex as uploaded to the GPU.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Non-indexed triangle list plus its bounds, centered on the bounds center.
#[derive(Clone, Debug)]
pub struct GlyphMesh {
    pub vertices: Vec<MeshVertex>,
    pub bounds: GlyphBounds,
}

/// What the animation core needs from a font/geometry provider.
pub trait GlyphSource {
    fn bounds(&self, ch: char) -> Option<GlyphBounds>;
}

/// Production glyph source backed by a parsed TTF, with a per-character
/// mesh cache (letters repeat every cycle).
pub struct FontGlyphSource {
    font: Font<'static>,
    style: GlyphStyle,
    cache: RefCell<FnvHashMap<char, Rc<GlyphMesh>>>,
}

impl FontGlyphSource {
    pub fn from_vec(data: Vec<u8>, style: GlyphStyle) -> Result<Self, GlyphError> {
        let font = Font::try_from_vec(data).ok_or(GlyphError::FontParse)?;
        Ok(Self {
            font,
            style,
            cache: RefCell::new(FnvHashMap::default()),
        })
    }

    pub fn style(&self) -> &GlyphStyle {
        &self.style
    }

    /// Build (or fetch from cache) the extruded mesh for one character.
    pub fn mesh(&self, ch: char) -> Result<Rc<GlyphMesh>, GlyphError> {
        if let Some(m) = self.cache.borrow().get(&ch) {
            return Ok(m.clone());
        }
        let contours = self.outline_contours(ch)?;
        let mesh = extrude_contours(&contours, &self.style)
            .ok_or(GlyphError::DegenerateOutline(ch))?;
        let mesh = Rc::new(mesh);
        self.cache.borrow_mut().insert(ch, mesh.clone());
        Ok(mesh)
    }

    fn outline_contours(&self, ch: char) -> Result<Vec<Vec<Vec2>>, GlyphError> {
        let glyph = self.font.glyph(ch);
        if glyph.id().0 == 0 {
            return Err(GlyphError::MissingGlyph(ch));
        }
        let positioned = glyph
            .scaled(Scale::uniform(self.style.size))
            .positioned(point(0.0, 0.0));
        let mut sink = ContourSink::new(self.style.curve_tolerance);
        if !positioned.build_outline(&mut sink) {
            return Err(GlyphError::MissingGlyph(ch));
        }
        let contours = sink.finish();
        if contours.is_empty() {
            return Err(GlyphError::DegenerateOutline(ch));
        }
        Ok(contours)
    }
}

impl GlyphSource for FontGlyphSource {
    fn bounds(&self, ch: char) -> Option<GlyphBounds> {
        match self.mesh(ch) {
            Ok(m) => Some(m.bounds),
            Err(e) => {
                log::error!("[glyph] {e}");
                None
            }
        }
    }
}

// ---------------- outline flattening ----------------

/// Collects flattened contours from the font's curve callbacks. Font space
/// is y-down; vertices are flipped to y-up as they arrive.
struct ContourSink {
    tolerance: f32,
    contours: Vec<Vec<Vec2>>,
    current: Vec<Vec2>,
    cursor: Vec2,
}

impl ContourSink {
    fn new(tolerance: f32) -> Self {
        Self {
            tolerance: tolerance.max(1e-4),
            contours: Vec::new(),
            current: Vec::new(),
            cursor: Vec2::ZERO,
        }
    }

    fn push(&mut self, p: Vec2) {
        if self.current.last().map_or(true, |&q| q != p) {
            self.current.push(p);
        }
        self.cursor = p;
    }

    fn flatten_steps(&self, net_len: f32) -> usize {
        ((net_len / self.tolerance).sqrt().ceil() as usize).clamp(2, 24)
    }

    fn finish(mut self) -> Vec<Vec<Vec2>> {
        if self.current.len() >= 3 {
            self.contours.push(std::mem::take(&mut self.current));
        }
        self.contours
    }
}

impl OutlineBuilder for ContourSink {
    fn move_to(&mut self, x: f32, y: f32) {
        if self.current.len() >= 3 {
            self.contours.push(std::mem::take(&mut self.current));
        } else {
            self.current.clear();
        }
        self.push(Vec2::new(x, -y));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.push(Vec2::new(x, -y));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let p0 = self.cursor;
        let c = Vec2::new(x1, -y1);
        let p1 = Vec2::new(x, -y);
        let steps = self.flatten_steps(p0.distance(c) + c.distance(p1));
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let a = p0.lerp(c, t);
            let b = c.lerp(p1, t);
            self.push(a.lerp(b, t));
        }
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let p0 = self.cursor;
        let c0 = Vec2::new(x1, -y1);
        let c1 = Vec2::new(x2, -y2);
        let p1 = Vec2::new(x, -y);
        let steps =
            self.flatten_steps(p0.distance(c0) + c0.distance(c1) + c1.distance(p1));
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            let a = p0.lerp(c0, t);
            let b = c0.lerp(c1, t);
            let c = c1.lerp(p1, t);
            let ab = a.lerp(b, t);
            let bc = b.lerp(c, t);
            self.push(ab.lerp(bc, t));
        }
    }

    fn close(&mut self) {
        if self.current.len() >= 3 {
            if self.current.first() == self.current.last() {
                self.current.pop();
            }
            self.contours.push(std::mem::take(&mut self.current));
        } else {
            self.current.clear();
        }
    }
}

// ---------------- extrusion ----------------

const MIN_CONTOUR_AREA: f32 = 1e-4;

/// Build the extruded mesh from flattened contours. Returns `None` when the
/// contours carry no usable area. Public so tests can drive it with
/// synthetic contours instead of a real font.
pub fn extrude_contours(contours: &[Vec<Vec2>], style: &GlyphStyle) -> Option<GlyphMesh> {
    let groups = group_contours(contours);
    if groups.is_empty() {
        return None;
    }

    let half = style.depth * 0.5;
    let bevel_on = style.bevel_thickness > 0.0 && style.bevel_size > 0.0;
    let cap_z = if bevel_on {
        half + style.bevel_thickness
    } else {
        half
    };

    let mut tris: Vec<[Vec3; 3]> = Vec::new();
    for (outer, holes) in &groups {
        let caps = triangulate(outer, holes);
        for t in &caps {
            // front cap (+z) keeps CCW order, back cap mirrors it
            tris.push([lift(t[0], cap_z), lift(t[1], cap_z), lift(t[2], cap_z)]);
            tris.push([lift(t[0], -cap_z), lift(t[2], -cap_z), lift(t[1], -cap_z)]);
        }

        let mut loops: Vec<&Vec<Vec2>> = Vec::with_capacity(1 + holes.len());
        loops.push(outer);
        loops.extend(holes.iter());
        for contour in loops {
            let silhouette = if bevel_on {
                offset_contour(contour, style.bevel_size)
            } else {
                contour.clone()
            };
            let n = contour.len();
            for i in 0..n {
                let j = (i + 1) % n;
                let (p, q) = (silhouette[i], silhouette[j]);
                // side wall, back to front so the face normal points away
                // from the solid
                tris.push([lift(p, -half), lift(q, -half), lift(q, half)]);
                tris.push([lift(p, -half), lift(q, half), lift(p, half)]);
                if bevel_on {
                    let (cp, cq) = (contour[i], contour[j]);
                    // front chamfer: silhouette at +half up to the cap ring
                    tris.push([lift(p, half), lift(q, half), lift(cq, cap_z)]);
                    tris.push([lift(p, half), lift(cq, cap_z), lift(cp, cap_z)]);
                    // back chamfer, mirrored winding
                    tris.push([lift(q, -half), lift(p, -half), lift(cp, -cap_z)]);
                    tris.push([lift(q, -half), lift(cp, -cap_z), lift(cq, -cap_z)]);
                }
            }
        }
    }

    if tris.is_empty() {
        return None;
    }

    // Center on the bounding-box center.
    let (mut min, mut max) = (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN));
    for t in &tris {
        for v in t {
            min = min.min(*v);
            max = max.max(*v);
        }
    }
    let center = (min + max) * 0.5;

    let mut vertices = Vec::with_capacity(tris.len() * 3);
    for t in &tris {
        let a = t[0] - center;
        let b = t[1] - center;
        let c = t[2] - center;
        let n = (b - a).cross(c - a);
        if n.length_squared() < 1e-12 {
            continue; // sliver from a bridge edge
        }
        let n = n.normalize().to_array();
        for v in [a, b, c] {
            vertices.push(MeshVertex {
                position: v.to_array(),
                normal: n,
            });
        }
    }
    if vertices.is_empty() {
        return None;
    }

    Some(GlyphMesh {
        vertices,
        bounds: GlyphBounds {
            min: min - center,
            max: max - center,
        },
    })
}

#[inline]
fn lift(p: Vec2, z: f32) -> Vec3 {
    Vec3::new(p.x, p.y, z)
}

/// Pair every outer contour (even containment depth, normalized CCW) with
/// its holes (odd depth, normalized CW).
fn group_contours(contours: &[Vec<Vec2>]) -> Vec<(Vec<Vec2>, Vec<Vec<Vec2>>)> {
    let usable: Vec<&[Vec2]> = contours
        .iter()
        .filter(|c| c.len() >= 3 && signed_area(c).abs() > MIN_CONTOUR_AREA)
        .map(|c| c.as_slice())
        .collect();

    let depth: Vec<usize> = (0..usable.len())
        .map(|i| {
            let probe = usable[i][0];
            (0..usable.len())
                .filter(|&j| j != i && point_in_polygon(probe, usable[j]))
                .count()
        })
        .collect();

    let mut groups: Vec<(Vec<Vec2>, Vec<Vec<Vec2>>)> = Vec::new();
    let mut outer_indices: Vec<usize> = Vec::new();
    for i in 0..usable.len() {
        if depth[i] % 2 == 0 {
            groups.push((wind(usable[i], true), Vec::new()));
            outer_indices.push(i);
        }
    }
    for i in 0..usable.len() {
        if depth[i] % 2 == 1 {
            // attach to the smallest enclosing outer
            let mut best: Option<(usize, f32)> = None;
            for (gi, &oi) in outer_indices.iter().enumerate() {
                if point_in_polygon(usable[i][0], usable[oi]) {
                    let area = signed_area(usable[oi]).abs();
                    match best {
                        Some((_, ba)) if ba <= area => {}
                        _ => best = Some((gi, area)),
                    }
                }
            }
            if let Some((gi, _)) = best {
                groups[gi].1.push(wind(usable[i], false));
            }
        }
    }
    groups
}

/// Force counter-clockwise (`ccw = true`) or clockwise winding.
fn wind(contour: &[Vec2], ccw: bool) -> Vec<Vec2> {
    let mut c = contour.to_vec();
    if (signed_area(&c) > 0.0) != ccw {
        c.reverse();
    }
    c
}

/// Push every vertex away from the solid by `amount` along the averaged
/// adjacent-edge normal. With solid-on-the-left winding, "away" is the same
/// right-of-travel direction for outers and holes alike.
fn offset_contour(contour: &[Vec2], amount: f32) -> Vec<Vec2> {
    let n = contour.len();
    let edge_normal = |i: usize| -> Vec2 {
        let d = (contour[(i + 1) % n] - contour[i]).normalize_or_zero();
        Vec2::new(d.y, -d.x)
    };
    (0..n)
        .map(|i| {
            let avg = edge_normal((i + n - 1) % n) + edge_normal(i);
            let dir = if avg.length_squared() > 1e-12 {
                avg.normalize()
            } else {
                edge_normal(i)
            };
            contour[i] + dir * amount
        })
        .collect()
}
