// Host-side tests for cap triangulation and glyph extrusion, driven with
// synthetic contours (no font file needed).

use app_core::glyph::{extrude_contours, GlyphStyle};
use app_core::tessellate::{point_in_polygon, signed_area, triangulate};
use glam::Vec2;

fn v(x: f32, y: f32) -> Vec2 {
    Vec2::new(x, y)
}

fn square_ccw(lo: f32, hi: f32) -> Vec<Vec2> {
    vec![v(lo, lo), v(hi, lo), v(hi, hi), v(lo, hi)]
}

fn square_cw(lo: f32, hi: f32) -> Vec<Vec2> {
    vec![v(lo, lo), v(lo, hi), v(hi, hi), v(hi, lo)]
}

fn triangles_area(tris: &[[Vec2; 3]]) -> f32 {
    tris.iter()
        .map(|t| 0.5 * (t[1] - t[0]).perp_dot(t[2] - t[0]).abs())
        .sum()
}

#[test]
fn signed_area_follows_winding() {
    assert!(signed_area(&square_ccw(0.0, 1.0)) > 0.0);
    assert!(signed_area(&square_cw(0.0, 1.0)) < 0.0);
    assert!((signed_area(&square_ccw(0.0, 2.0)) - 4.0).abs() < 1e-6);
}

#[test]
fn point_in_polygon_basics() {
    let sq = square_ccw(0.0, 1.0);
    assert!(point_in_polygon(v(0.5, 0.5), &sq));
    assert!(!point_in_polygon(v(1.5, 0.5), &sq));
    assert!(!point_in_polygon(v(-0.1, -0.1), &sq));
}

#[test]
fn triangulates_a_convex_quad() {
    let tris = triangulate(&square_ccw(0.0, 1.0), &[]);
    assert_eq!(tris.len(), 2);
    assert!((triangles_area(&tris) - 1.0).abs() < 1e-5);
    // CCW input produces CCW ears
    for t in &tris {
        assert!((t[1] - t[0]).perp_dot(t[2] - t[0]) > 0.0);
    }
}

#[test]
fn triangulates_a_concave_polygon() {
    // L-shape, area 3
    let l = vec![
        v(0.0, 0.0),
        v(2.0, 0.0),
        v(2.0, 1.0),
        v(1.0, 1.0),
        v(1.0, 2.0),
        v(0.0, 2.0),
    ];
    let tris = triangulate(&l, &[]);
    assert_eq!(tris.len(), 4);
    assert!((triangles_area(&tris) - 3.0).abs() < 1e-5);
}

#[test]
fn triangulates_a_polygon_with_a_hole() {
    let outer = square_ccw(0.0, 1.0);
    let hole = square_cw(0.25, 0.75);
    let tris = triangulate(&outer, &[hole]);
    // area conservation is the real contract here
    assert!((triangles_area(&tris) - (1.0 - 0.25)).abs() < 1e-4);
    // nothing may land inside the hole
    for t in &tris {
        let centroid = (t[0] + t[1] + t[2]) / 3.0;
        assert!(
            !(centroid.x > 0.26 && centroid.x < 0.74 && centroid.y > 0.26 && centroid.y < 0.74),
            "triangle centroid {centroid:?} fell inside the hole"
        );
    }
}

#[test]
fn extrudes_a_square_prism() {
    let style = GlyphStyle {
        size: 1.0,
        depth: 2.0,
        curve_tolerance: 0.02,
        bevel_thickness: 0.0,
        bevel_size: 0.0,
    };
    let mesh = extrude_contours(&[square_ccw(0.0, 1.0)], &style).expect("mesh");

    assert_eq!(mesh.vertices.len() % 3, 0);
    // centered on the bounds center
    assert!((mesh.bounds.min.x + mesh.bounds.max.x).abs() < 1e-5);
    assert!((mesh.bounds.min.y + mesh.bounds.max.y).abs() < 1e-5);
    assert!((mesh.bounds.min.z + mesh.bounds.max.z).abs() < 1e-5);
    // unit footprint, configured depth
    assert!((mesh.bounds.height() - 1.0).abs() < 1e-5);
    assert!((mesh.bounds.max.z - mesh.bounds.min.z - 2.0).abs() < 1e-5);
    assert!(!mesh.bounds.is_degenerate());

    for vert in &mesh.vertices {
        let n = glam::Vec3::from_array(vert.normal);
        assert!((n.length() - 1.0).abs() < 1e-4, "unnormalized normal {n:?}");
    }
}

#[test]
fn bevel_grows_depth_and_silhouette() {
    let plain = GlyphStyle {
        size: 1.0,
        depth: 2.0,
        curve_tolerance: 0.02,
        bevel_thickness: 0.0,
        bevel_size: 0.0,
    };
    let beveled = GlyphStyle {
        bevel_thickness: 0.25,
        bevel_size: 0.1,
        ..plain
    };
    let contours = vec![square_ccw(0.0, 1.0)];
    let a = extrude_contours(&contours, &plain).expect("plain mesh");
    let b = extrude_contours(&contours, &beveled).expect("beveled mesh");

    let depth_a = a.bounds.max.z - a.bounds.min.z;
    let depth_b = b.bounds.max.z - b.bounds.min.z;
    assert!((depth_b - depth_a - 2.0 * 0.25).abs() < 1e-5);

    let width_a = a.bounds.max.x - a.bounds.min.x;
    let width_b = b.bounds.max.x - b.bounds.min.x;
    assert!((width_b - width_a - 2.0 * 0.1).abs() < 1e-4);
}

#[test]
fn extrusion_with_hole_keeps_both_shells() {
    let style = GlyphStyle {
        size: 1.0,
        depth: 1.0,
        curve_tolerance: 0.02,
        bevel_thickness: 0.0,
        bevel_size: 0.0,
    };
    let solid = extrude_contours(&[square_ccw(0.0, 1.0)], &style).expect("solid");
    let ringed = extrude_contours(
        &[square_ccw(0.0, 1.0), square_cw(0.25, 0.75)],
        &style,
    )
    .expect("ring");
    // the hole adds inner walls, so the ring carries more triangles than the
    // plain prism even though its caps are smaller
    assert!(ringed.vertices.len() > solid.vertices.len());
}

#[test]
fn degenerate_contours_produce_no_mesh() {
    let style = GlyphStyle {
        size: 1.0,
        depth: 1.0,
        curve_tolerance: 0.02,
        bevel_thickness: 0.0,
        bevel_size: 0.0,
    };
    assert!(extrude_contours(&[], &style).is_none());
    // collinear sliver has no area
    let sliver = vec![v(0.0, 0.0), v(1.0, 0.0), v(2.0, 0.0)];
    assert!(extrude_contours(&[sliver], &style).is_none());
}
