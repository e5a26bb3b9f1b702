use csgrs_topology::{
    FaceProcessor, HookChain, PolygonFace, TopologyError,
    float_types::{Real, TAU},
    geom3d::newell_normal,
    mesh::vertex::Vertex,
};
use nalgebra::{Point3, Vector3};

mod support;

use crate::support::approx_eq;

/// Regular polygon of `n` corners (alternating radii when `inner` is set) in the
/// plane through `center` with normal `normal`, wound anticlockwise about it.
fn polygon(center: Point3<Real>, normal: Vector3<Real>, n: usize, inner: Option<Real>) -> Vec<Vertex> {
    let normal = normal.normalize();
    let helper = if normal.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
    let u = normal.cross(&helper).normalize();
    let v = normal.cross(&u);
    (0..n)
        .map(|i| {
            let t = i as Real * TAU / n as Real;
            let r = match inner {
                Some(r) if i % 2 == 1 => r,
                _ => 1.0,
            };
            Vertex::new(center + (u * t.cos() + v * t.sin()) * r)
        })
        .collect()
}

fn face_normal(face: &PolygonFace<&str>, points: &[Vertex]) -> Vector3<Real> {
    let pts: Vec<Point3<Real>> = face.vertices.iter().map(|&v| points[v].pos).collect();
    newell_normal(&pts)
}

fn total_area(faces: &[PolygonFace<&str>], points: &[Vertex]) -> Real {
    faces.iter().map(|f| f.area(points).unwrap()).sum()
}

#[test]
fn tilted_octagon_becomes_six_triangles() {
    let points = polygon(Point3::new(1.0, -2.0, 3.0), Vector3::new(1.0, 2.0, 3.0), 8, None);
    let face = PolygonFace::new((0..8).collect(), &points, Some("octagon")).unwrap();
    let area = face.area(&points).unwrap();
    assert!(approx_eq(area, 2.0 * (2.0 as Real).sqrt(), 1e-9));

    let mut faces = vec![face.clone()];
    let report = FaceProcessor::Triangulate.process(&mut faces, &face, false, &points);
    assert!(report.is_clean());
    assert_eq!(report.triangles_created, 6);
    assert_eq!(faces.len(), 6);
    assert!(approx_eq(total_area(&faces, &points), area, 1e-9));
    for tri in &faces {
        assert!(tri.is_triangle());
        assert_eq!(tri.metadata, Some("octagon"));
        assert!(face_normal(tri, &points).dot(&face.plane.normal) > 0.0);
    }
}

#[test]
fn concave_star_facing_down() {
    // Ten-point star seen from below: the projection drops z with swapped axes
    let points = polygon(Point3::new(0.0, 0.0, 2.0), -Vector3::z(), 10, Some(0.4));
    let face = PolygonFace::new((0..10).collect(), &points, Some("star")).unwrap();
    assert!(!face.projection.positive_facing);

    let mut faces = vec![face.clone()];
    let report = FaceProcessor::Triangulate.process(&mut faces, &face, false, &points);
    assert!(report.is_clean());
    assert_eq!(faces.len(), 8);
    assert!(approx_eq(total_area(&faces, &points), face.area(&points).unwrap(), 1e-9));
    for tri in &faces {
        assert!(face_normal(tri, &points).dot(&face.plane.normal) > 0.0);
    }
}

#[test]
fn triangles_pass_through() {
    let points = polygon(Point3::origin(), Vector3::z(), 3, None);
    let face = PolygonFace::new(vec![0, 1, 2], &points, Some("tri")).unwrap();
    for processor in [
        FaceProcessor::Passthrough,
        FaceProcessor::Triangulate,
        FaceProcessor::TriangulateImproved,
    ] {
        let mut faces = vec![face.clone()];
        let report = processor.process(&mut faces, &face, false, &points);
        assert_eq!(faces, vec![face.clone()]);
        assert_eq!(report.triangles_created, 0);
        assert!(report.is_clean());
    }
}

#[test]
fn degenerate_face_is_reported_and_kept() {
    let points = vec![
        Vertex::from_coords(0.0, 0.0, 0.0),
        Vertex::from_coords(1.0, 0.0, 0.0),
        Vertex::from_coords(1.0, 1.0, 0.0),
        Vertex::from_coords(0.0, 1.0, 0.0),
        Vertex::from_coords(2.0, 0.0, 0.0),
        Vertex::from_coords(3.0, 0.0, 0.0),
    ];
    let square = PolygonFace::new(vec![0, 1, 2, 3], &points, Some("square")).unwrap();
    let collinear = square.create(vec![0, 1, 4, 5]);

    let mut faces = vec![collinear.clone(), square.clone()];
    let report = FaceProcessor::Triangulate.process(&mut faces, &square, false, &points);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].index, 0);
    assert!(matches!(
        report.skipped[0].error,
        TopologyError::DegenerateProjection { .. }
    ));
    assert!(report.skipped[0].error.is_degenerate_input());
    assert_eq!(report.triangles_created, 2);
    assert_eq!(faces.len(), 3);
    assert_eq!(faces[0], collinear);
}

fn wide_rhombus() -> Vec<Vertex> {
    vec![
        Vertex::from_coords(0.0, 0.0, 0.0),
        Vertex::from_coords(2.0, -0.2, 0.0),
        Vertex::from_coords(4.0, 0.0, 0.0),
        Vertex::from_coords(2.0, 0.2, 0.0),
    ]
}

#[test]
fn improve_hook_flips_sliver_fan() {
    let points = wide_rhombus();
    let orig = PolygonFace::new(vec![0, 1, 2, 3], &points, Some("source")).unwrap();
    let mut faces = vec![
        orig.create(vec![0, 1, 2]),
        orig.create(vec![0, 2, 3]),
    ];
    for face in &mut faces {
        face.metadata = Some("stale");
    }

    let report = FaceProcessor::ImproveTriangulation.process(&mut faces, &orig, false, &points);
    assert!(report.is_clean());
    assert_eq!(report.flips, 1);
    assert_eq!(faces.len(), 2);
    for tri in &faces {
        assert!(tri.vertices.contains(&1) && tri.vertices.contains(&3));
        assert_eq!(tri.metadata, Some("source"));
        assert!(face_normal(tri, &points).z > 0.0);
    }
}

#[test]
fn triangulate_improved_picks_short_diagonal() {
    let points = wide_rhombus();
    let face = PolygonFace::new(vec![0, 1, 2, 3], &points, Some("quad")).unwrap();
    let mut faces = vec![face.clone()];
    let report = FaceProcessor::TriangulateImproved.process(&mut faces, &face, false, &points);
    assert!(report.is_clean());
    assert_eq!(report.triangles_created, 2);
    assert!(faces
        .iter()
        .all(|t| t.vertices.contains(&1) && t.vertices.contains(&3)));
    assert!(approx_eq(total_area(&faces, &points), 0.8, 1e-9));
}

#[test]
fn chain_runs_stages_in_order() {
    let points = polygon(Point3::origin(), Vector3::new(0.0, 1.0, 1.0), 12, None);
    let face = PolygonFace::new((0..12).collect(), &points, Some("dodecagon")).unwrap();
    let mut faces = vec![face.clone()];
    let chain = HookChain::new()
        .with(FaceProcessor::Passthrough)
        .with(FaceProcessor::Triangulate)
        .with(FaceProcessor::ImproveTriangulation);
    let report = chain.process(&mut faces, &face, false, &points);
    assert!(report.is_clean());
    assert_eq!(faces.len(), 10);
    assert!(faces.iter().all(PolygonFace::is_triangle));
    assert!(approx_eq(total_area(&faces, &points), face.area(&points).unwrap(), 1e-9));
}
