//! Post-processing hooks for the polygons a CSG operation emits.
//!
//! A CSG kernel hands each output polygon, together with the face it was cut
//! from, to a [`FaceProcessor`] (or a [`HookChain`] of them). The processors
//! rewrite the list of output faces in place: ear-clip them into triangles,
//! improve an existing triangulation by edge flips, or both.

use crate::errors::TopologyError;
use crate::float_types::Real;
use crate::geom3d::newell_normal;
use crate::mesh::{plane::Plane, projection::Projection, vertex::Vertex};
use hashbrown::HashMap;
use nalgebra::{Point2, Point3};

mod earcut;
mod improve;

pub use earcut::triangulate_polygon;
pub use improve::{improve, improve_with_cap};

/// An output polygon over a shared vertex pool, carrying user metadata `S`.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonFace<S: Clone> {
    pub vertices: Vec<usize>,
    pub plane: Plane,
    pub projection: Projection,
    pub metadata: Option<S>,
}

impl<S: Clone> PolygonFace<S> {
    /// Build a face over `points`, fitting its plane to the loop.
    pub fn new(
        vertices: Vec<usize>,
        points: &[Vertex],
        metadata: Option<S>,
    ) -> Result<Self, TopologyError> {
        let positions = positions(&vertices, points)?;
        if positions.len() < 3 {
            return Err(TopologyError::TooFewVertices {
                count: positions.len(),
            });
        }
        let plane = Plane::fit(&positions).ok_or_else(|| TopologyError::DegenerateProjection {
            area: newell_normal(&positions).norm() * 0.5,
        })?;
        Ok(PolygonFace {
            vertices,
            plane,
            projection: Projection::for_plane(&plane),
            metadata,
        })
    }

    /// A face on the same plane over different vertices; metadata is inherited.
    pub fn create(&self, vertices: Vec<usize>) -> Self {
        PolygonFace {
            vertices,
            plane: self.plane,
            projection: self.projection,
            metadata: self.metadata.clone(),
        }
    }

    pub fn n_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_triangle(&self) -> bool {
        self.vertices.len() == 3
    }

    /// Vertex positions in this face's 2D projection.
    pub fn projected(&self, points: &[Vertex]) -> Result<Vec<Point2<Real>>, TopologyError> {
        Ok(positions(&self.vertices, points)?
            .iter()
            .map(|p| self.projection.project(p))
            .collect())
    }

    /// Unsigned area in 3D.
    pub fn area(&self, points: &[Vertex]) -> Result<Real, TopologyError> {
        Ok(newell_normal(&positions(&self.vertices, points)?).norm() * 0.5)
    }

    /// Reverse winding and plane.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.plane.flip();
        self.projection = Projection::for_plane(&self.plane);
    }
}

fn positions(vertices: &[usize], points: &[Vertex]) -> Result<Vec<Point3<Real>>, TopologyError> {
    vertices
        .iter()
        .map(|&v| {
            points
                .get(v)
                .map(|vertex| vertex.pos)
                .ok_or(TopologyError::VertexOutOfRange {
                    index: v,
                    len: points.len(),
                })
        })
        .collect()
}

/// A face a processor left untouched, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedFace {
    /// Position in the face list the processor received
    pub index: usize,
    pub error: TopologyError,
}

/// What a processor did to a batch of faces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HookReport {
    pub skipped: Vec<SkippedFace>,
    pub triangles_created: usize,
    pub flips: usize,
}

impl HookReport {
    pub fn merge(&mut self, other: HookReport) {
        self.skipped.extend(other.skipped);
        self.triangles_created += other.triangles_created;
        self.flips += other.flips;
    }

    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// The output-face processors a CSG operation can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaceProcessor {
    /// Leave faces as they are
    #[default]
    Passthrough,
    /// Ear-clip every face with more than three vertices
    Triangulate,
    /// Ear-clip, then improve each face's triangles by edge flips
    TriangulateImproved,
    /// Treat all triangles of the batch as one triangulation and improve it.
    /// Every face is assumed to share the projection of the first face.
    ImproveTriangulation,
}

impl FaceProcessor {
    /// Rewrite `faces`, the output produced from `orig`. `flipped` tells whether the
    /// output faces are wound opposite to `orig`. Faces that cannot be processed are
    /// kept unchanged and listed in the report.
    pub fn process<S: Clone>(
        &self,
        faces: &mut Vec<PolygonFace<S>>,
        orig: &PolygonFace<S>,
        flipped: bool,
        points: &[Vertex],
    ) -> HookReport {
        match self {
            FaceProcessor::Passthrough => HookReport::default(),
            FaceProcessor::Triangulate => triangulate_faces(faces, points, false),
            FaceProcessor::TriangulateImproved => triangulate_faces(faces, points, true),
            FaceProcessor::ImproveTriangulation => improve_faces(faces, orig, flipped, points),
        }
    }
}

fn triangulate_faces<S: Clone>(
    faces: &mut Vec<PolygonFace<S>>,
    points: &[Vertex],
    with_improvement: bool,
) -> HookReport {
    let mut report = HookReport::default();
    let capacity = faces.iter().map(|f| f.n_vertices().saturating_sub(2).max(1)).sum();
    let mut out = Vec::with_capacity(capacity);

    for (index, face) in std::mem::take(faces).into_iter().enumerate() {
        if face.is_triangle() {
            out.push(face);
            continue;
        }
        let triangles = face.projected(points).and_then(|projected| {
            let mut triangles = triangulate_polygon(&projected)?;
            if with_improvement {
                report.flips += improve(&projected, &mut triangles);
            }
            Ok(triangles)
        });
        match triangles {
            Ok(triangles) => {
                report.triangles_created += triangles.len();
                out.extend(triangles.iter().map(|t| {
                    face.create(vec![face.vertices[t[0]], face.vertices[t[1]], face.vertices[t[2]]])
                }));
            },
            Err(error) => {
                log::warn!("skipping face {} during triangulation: {}", index, error);
                report.skipped.push(SkippedFace { index, error });
                out.push(face);
            },
        }
    }

    *faces = out;
    report
}

fn improve_faces<S: Clone>(
    faces: &mut Vec<PolygonFace<S>>,
    orig: &PolygonFace<S>,
    flipped: bool,
    points: &[Vertex],
) -> HookReport {
    let mut report = HookReport::default();
    let Some(first) = faces.first() else {
        return report;
    };
    let (plane, projection) = (first.plane, first.projection);

    let source = if flipped { orig.plane.flipped() } else { orig.plane };
    if source.normal.dot(&plane.normal) < 0.0 {
        log::warn!("output faces disagree with the orientation of their source face");
    }

    // Pool index -> local index, in first-seen order
    let mut vert_map: HashMap<usize, usize> = HashMap::new();
    let mut verts: Vec<usize> = Vec::new();
    let mut triangles: Vec<[usize; 3]> = Vec::new();
    let mut out = Vec::with_capacity(faces.len());

    for (index, face) in std::mem::take(faces).into_iter().enumerate() {
        if !face.is_triangle() {
            out.push(face);
            continue;
        }
        if let Some(&index_out) = face.vertices.iter().find(|&&v| v >= points.len()) {
            report.skipped.push(SkippedFace {
                index,
                error: TopologyError::VertexOutOfRange {
                    index: index_out,
                    len: points.len(),
                },
            });
            out.push(face);
            continue;
        }
        if face.projection != projection {
            log::warn!("face {} does not share the batch projection", index);
        }
        let mut tri = [0; 3];
        for (slot, &v) in tri.iter_mut().zip(&face.vertices) {
            *slot = *vert_map.entry(v).or_insert_with(|| {
                verts.push(v);
                verts.len() - 1
            });
        }
        triangles.push(tri);
    }

    let projected: Vec<Point2<Real>> = verts
        .iter()
        .map(|&v| projection.project(&points[v].pos))
        .collect();
    report.flips = improve(&projected, &mut triangles);
    report.triangles_created = triangles.len();

    out.extend(triangles.iter().map(|t| PolygonFace {
        vertices: t.iter().map(|&i| verts[i]).collect(),
        plane,
        projection,
        metadata: orig.metadata.clone(),
    }));

    *faces = out;
    report
}

/// Processors applied one after another to the same batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookChain {
    pub stages: Vec<FaceProcessor>,
}

impl HookChain {
    pub const fn new() -> Self {
        HookChain { stages: Vec::new() }
    }

    pub fn with(mut self, stage: FaceProcessor) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn process<S: Clone>(
        &self,
        faces: &mut Vec<PolygonFace<S>>,
        orig: &PolygonFace<S>,
        flipped: bool,
        points: &[Vertex],
    ) -> HookReport {
        let mut report = HookReport::default();
        for stage in &self.stages {
            report.merge(stage.process(faces, orig, flipped, points));
        }
        report
    }
}
