use meshmark_base::{HexColor, MeshId};
use meshmark_io::SceneMesh;
use std::collections::BTreeMap;
use truck_base::cgmath64::{InnerSpace, Point3, Vector3};
use truck_polymesh::PolygonMesh;

use super::bounds::Aabb;
use super::pick::Ray;

/// Adjacent faces meeting at more than this angle get an outline edge.
const CREASE_ANGLE_DEG: f64 = 8.0;

/// Pick- and paint-ready copy of one scene mesh.
#[derive(Clone, Debug)]
pub struct ViewerMesh {
    pub id: MeshId,
    pub base_color: HexColor,
    pub positions: Vec<Point3>,
    pub tri_faces: Vec<[usize; 3]>,
    /// Unit normal per triangle; `None` for degenerate triangles.
    pub tri_normals: Vec<Option<Vector3>>,
    /// Boundary and crease edges, used for outlines.
    pub edges: Vec<[usize; 2]>,
    pub bounds: Option<Aabb>,
}

impl ViewerMesh {
    pub fn from_scene_mesh(scene_mesh: &SceneMesh) -> Self {
        Self::from_mesh(
            scene_mesh.id.clone(),
            scene_mesh.base_color.clone(),
            &scene_mesh.mesh,
        )
    }

    pub fn from_mesh(id: MeshId, base_color: HexColor, mesh: &PolygonMesh) -> Self {
        let positions = mesh.positions().to_vec();
        let bounds = Aabb::from_points(positions.iter().copied());

        // Every face is fanned around its first vertex; quads split along 0-2.
        let faces = mesh.faces();
        let tri_faces: Vec<[usize; 3]> = faces
            .tri_faces()
            .iter()
            .map(|face| face.as_slice())
            .chain(faces.quad_faces().iter().map(|face| face.as_slice()))
            .chain(faces.other_faces().iter().map(Vec::as_slice))
            .filter(|face| face.len() >= 3)
            .flat_map(|face| {
                (1..face.len() - 1).map(move |i| [face[0].pos, face[i].pos, face[i + 1].pos])
            })
            .collect();
        let tri_normals: Vec<Option<Vector3>> = tri_faces
            .iter()
            .map(|&[a, b, c]| {
                let normal = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
                (normal.magnitude2() > f64::EPSILON).then(|| normal.normalize())
            })
            .collect();
        let edges = outline_edges(&tri_faces, &tri_normals);

        Self {
            id,
            base_color,
            positions,
            tri_faces,
            tri_normals,
            edges,
            bounds,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tri_faces.is_empty()
    }

    pub fn center(&self) -> Option<Point3> {
        self.bounds.map(|aabb| aabb.center())
    }

    fn triangle(&self, [a, b, c]: [usize; 3]) -> [Point3; 3] {
        [self.positions[a], self.positions[b], self.positions[c]]
    }

    /// Ray parameter of the nearest hit. Meshes are tested triangle by
    /// triangle once the ray is known to cross their bounds.
    pub fn ray_pick(&self, ray: &Ray) -> Option<f64> {
        ray.enters(self.bounds.as_ref()?)?;
        self.tri_faces
            .iter()
            .filter_map(|tri| ray.hit_triangle(self.triangle(*tri)))
            .min_by(f64::total_cmp)
    }
}

/// Edges used by one face, by more than two, or by two faces that meet at a
/// crease. Normals are compared unsigned since winding may be inconsistent.
fn outline_edges(tri_faces: &[[usize; 3]], tri_normals: &[Option<Vector3>]) -> Vec<[usize; 2]> {
    let cos_crease = CREASE_ANGLE_DEG.to_radians().cos();
    let mut faces_by_edge: BTreeMap<[usize; 2], Vec<Vector3>> = BTreeMap::new();

    for (&[a, b, c], normal) in tri_faces.iter().zip(tri_normals) {
        let Some(normal) = normal else { continue };
        for (from, to) in [(a, b), (b, c), (c, a)] {
            faces_by_edge
                .entry([from.min(to), from.max(to)])
                .or_default()
                .push(*normal);
        }
    }

    faces_by_edge
        .into_iter()
        .filter(|(_, normals)| match normals.as_slice() {
            [n0, n1] => n0.dot(*n1).abs() < cos_crease,
            _ => true,
        })
        .map(|(edge, _)| edge)
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use truck_polymesh::{Faces, StandardAttributes, StandardVertex};

    fn vertex(pos: usize) -> StandardVertex {
        StandardVertex {
            pos,
            uv: None,
            nor: None,
        }
    }

    /// Flat `cells` x `cells` grid of unit quads on the z = `z` plane, offset by `x0`.
    pub(crate) fn grid_mesh(name: &str, cells: usize, x0: f64, z: f64) -> ViewerMesh {
        let side = cells + 1;
        let positions = (0..side * side)
            .map(|idx| Point3::new(x0 + (idx % side) as f64, (idx / side) as f64, z))
            .collect();
        let mut quads = Vec::new();
        for row in 0..cells {
            for col in 0..cells {
                let i = row * side + col;
                quads.push([vertex(i), vertex(i + 1), vertex(i + side + 1), vertex(i + side)]);
            }
        }
        let attributes = StandardAttributes {
            positions,
            uv_coords: Vec::new(),
            normals: Vec::new(),
        };
        let mesh = PolygonMesh::new(attributes, Faces::from_tri_and_quad_faces(Vec::new(), quads));
        ViewerMesh::from_mesh(MeshId::new(name), HexColor::white(), &mesh)
    }

    #[test]
    fn quads_are_split_and_outlined_on_the_boundary() {
        let mesh = grid_mesh("Plate", 1, 0.0, 0.0);
        assert_eq!(mesh.tri_faces.len(), 2);
        assert_eq!(mesh.edges.len(), 4);
        let aabb = mesh.bounds.expect("bounds");
        assert_eq!((aabb.min.x, aabb.max.x, aabb.max.y), (0.0, 1.0, 1.0));
        for normal in &mesh.tri_normals {
            let normal = normal.expect("flat quad has a normal");
            assert!((normal.z.abs() - 1.0).abs() < 1.0e-12);
        }
    }

    #[test]
    fn interior_grid_edges_are_not_outlined() {
        let mesh = grid_mesh("Floor", 3, 0.0, 0.0);
        // 12 boundary segments; diagonals and inner grid lines are coplanar.
        assert_eq!(mesh.edges.len(), 12);
    }

    #[test]
    fn pick_reports_nearest_hit_and_misses_outside_bounds() {
        let mesh = grid_mesh("Floor", 6, 0.0, 2.0);
        let dir = Vector3::new(0.0, 0.0, -1.0);
        let t = mesh
            .ray_pick(&Ray::new(Point3::new(3.3, 4.6, 10.0), dir))
            .expect("ray crosses the grid");
        assert!((t - 8.0).abs() < 1.0e-9);
        assert!(mesh.ray_pick(&Ray::new(Point3::new(30.0, 30.0, 10.0), dir)).is_none());
    }
}
