//! Polygon triangulation for glyph caps.
//!
//! Ear clipping over a simple polygon, with holes merged into the outer
//! contour through bridge edges beforehand (rightmost-vertex visibility,
//! the classic approach). Inputs are expected as an outer contour in
//! counter-clockwise order and holes in clockwise order; glyph contours are
//! normalized to that convention before they reach this module.

use glam::Vec2;

/// Twice-signed-area cross product of `ab` and `bc`.
#[inline]
fn corner_cross(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (b - a).perp_dot(c - b)
}

/// Signed area; positive for counter-clockwise winding.
pub fn signed_area(poly: &[Vec2]) -> f32 {
    let n = poly.len();
    let mut acc = 0.0;
    for i in 0..n {
        let p = poly[i];
        let q = poly[(i + 1) % n];
        acc += p.x * q.y - q.x * p.y;
    }
    0.5 * acc
}

/// Even-odd ray-cast containment test.
pub fn point_in_polygon(p: Vec2, poly: &[Vec2]) -> bool {
    let n = poly.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = poly[i];
        let b = poly[j];
        if (a.y > p.y) != (b.y > p.y) {
            let x = a.x + (p.y - a.y) / (b.y - a.y) * (b.x - a.x);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

#[inline]
fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = (b - a).perp_dot(p - a);
    let d2 = (c - b).perp_dot(p - b);
    let d3 = (a - c).perp_dot(p - c);
    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
    !(has_neg && has_pos)
}

/// Triangulate `outer` (CCW) with `holes` (each CW). Returns triangles in
/// CCW order. Degenerate slivers from bridge edges may appear with near-zero
/// area; callers that care filter by area.
pub fn triangulate(outer: &[Vec2], holes: &[Vec<Vec2>]) -> Vec<[Vec2; 3]> {
    if outer.len() < 3 {
        return Vec::new();
    }
    let mut merged: Vec<Vec2> = outer.to_vec();
    // Merge holes right-to-left so earlier bridges cannot occlude later ones.
    let mut order: Vec<usize> = (0..holes.len()).collect();
    order.sort_by(|&a, &b| {
        let xa = holes[a].iter().map(|p| p.x).fold(f32::MIN, f32::max);
        let xb = holes[b].iter().map(|p| p.x).fold(f32::MIN, f32::max);
        xb.partial_cmp(&xa).unwrap_or(std::cmp::Ordering::Equal)
    });
    for &h in &order {
        if holes[h].len() >= 3 {
            merged = bridge_hole(&merged, &holes[h]);
        }
    }
    ear_clip(&merged)
}

/// Splice `hole` into `poly` via a bridge from the hole's rightmost vertex to
/// a visible vertex of `poly`.
fn bridge_hole(poly: &[Vec2], hole: &[Vec2]) -> Vec<Vec2> {
    let m_idx = hole
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let m = hole[m_idx];

    // Closest intersection of the +x ray from M with an outer edge.
    let n = poly.len();
    let mut best: Option<(usize, Vec2)> = None; // (edge start index, intersection)
    for i in 0..n {
        let a = poly[i];
        let b = poly[(i + 1) % n];
        if (a.y > m.y) == (b.y > m.y) {
            continue;
        }
        let t = (m.y - a.y) / (b.y - a.y);
        let x = a.x + t * (b.x - a.x);
        if x >= m.x {
            match best {
                Some((_, bi)) if bi.x <= x => {}
                _ => best = Some((i, Vec2::new(x, m.y))),
            }
        }
    }

    let bridge_idx = match best {
        Some((edge_i, hit)) => {
            // Prefer the rightmost endpoint of the hit edge; fall back to a
            // reflex vertex inside triangle (M, hit, candidate) if one blocks
            // visibility.
            let e0 = poly[edge_i];
            let e1 = poly[(edge_i + 1) % n];
            let mut candidate = if e0.x >= e1.x { edge_i } else { (edge_i + 1) % n };
            let mut best_metric = f32::MAX;
            for j in 0..n {
                let p = poly[j];
                if p.x < m.x || j == candidate {
                    continue;
                }
                let prev = poly[(j + n - 1) % n];
                let next = poly[(j + 1) % n];
                let reflex = corner_cross(prev, p, next) < 0.0;
                if !reflex {
                    continue;
                }
                if point_in_triangle(p, m, hit, poly[candidate]) {
                    // Closest angular blocker wins.
                    let dx = p.x - m.x;
                    let dy = (p.y - m.y).abs();
                    let metric = if dx > 0.0 { dy / dx } else { f32::MAX };
                    if metric < best_metric {
                        best_metric = metric;
                        candidate = j;
                    }
                }
            }
            candidate
        }
        // M has no edge to its right: degenerate input, join to the nearest
        // outer vertex so triangulation can still proceed.
        None => {
            let mut nearest = 0;
            let mut nearest_d = f32::MAX;
            for (j, p) in poly.iter().enumerate() {
                let d = p.distance_squared(m);
                if d < nearest_d {
                    nearest_d = d;
                    nearest = j;
                }
            }
            nearest
        }
    };

    let mut merged = Vec::with_capacity(poly.len() + hole.len() + 2);
    merged.extend_from_slice(&poly[..=bridge_idx]);
    for k in 0..=hole.len() {
        merged.push(hole[(m_idx + k) % hole.len()]);
    }
    merged.push(poly[bridge_idx]);
    merged.extend_from_slice(&poly[bridge_idx + 1..]);
    merged
}

/// Ear-clip a simple (bridged) polygon in CCW order.
fn ear_clip(poly: &[Vec2]) -> Vec<[Vec2; 3]> {
    let n = poly.len();
    if n < 3 {
        return Vec::new();
    }
    let mut idx: Vec<usize> = (0..n).collect();
    let mut tris = Vec::with_capacity(n - 2);

    while idx.len() > 3 {
        let m = idx.len();
        let mut clipped = false;
        for k in 0..m {
            let (a, b, c) = corner(poly, &idx, k);
            if corner_cross(a, b, c) <= 0.0 {
                continue; // reflex or collinear corner, not an ear
            }
            if ear_blocked(poly, &idx, k, a, b, c) {
                continue;
            }
            tris.push([a, b, c]);
            idx.remove(k);
            clipped = true;
            break;
        }
        if !clipped {
            // Numerically degenerate remainder (collinear slivers around
            // bridge edges). Clip the widest corner anyway; each pass removes
            // a vertex, so this always terminates.
            let widest = (0..idx.len())
                .max_by(|&p, &q| {
                    let (a, b, c) = corner(poly, &idx, p);
                    let (d, e, f) = corner(poly, &idx, q);
                    corner_cross(a, b, c)
                        .partial_cmp(&corner_cross(d, e, f))
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .unwrap_or(0);
            let (a, b, c) = corner(poly, &idx, widest);
            tris.push([a, b, c]);
            idx.remove(widest);
        }
    }
    let (a, b, c) = corner(poly, &idx, 1);
    tris.push([a, b, c]);
    tris
}

#[inline]
fn corner(poly: &[Vec2], idx: &[usize], k: usize) -> (Vec2, Vec2, Vec2) {
    let m = idx.len();
    (
        poly[idx[(k + m - 1) % m]],
        poly[idx[k]],
        poly[idx[(k + 1) % m]],
    )
}

fn ear_blocked(poly: &[Vec2], idx: &[usize], k: usize, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let m = idx.len();
    let skip = [idx[(k + m - 1) % m], idx[k], idx[(k + 1) % m]];
    for &j in idx {
        if skip.contains(&j) {
            continue;
        }
        let p = poly[j];
        // Bridge duplicates coincide with corner vertices; they never block.
        if p == a || p == b || p == c {
            continue;
        }
        if point_in_triangle(p, a, b, c) {
            return true;
        }
    }
    false
}
