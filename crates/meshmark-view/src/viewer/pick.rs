use truck_base::cgmath64::{InnerSpace, Point3, Vector3};

use super::bounds::Aabb;

/// Hits closer than this are treated as starting inside the surface.
const MIN_HIT_DISTANCE: f64 = 1.0e-9;
/// Direction components below this are treated as parallel to a slab.
const PARALLEL_EPS: f64 = 1.0e-12;

/// Half-line from `origin` along `dir`. `dir` need not be unit length;
/// hit parameters are in multiples of it.
#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Point3,
    pub dir: Vector3,
}

impl Ray {
    pub fn new(origin: Point3, dir: Vector3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Point3 {
        self.origin + self.dir * t
    }

    /// Parameter where the ray enters the box (0 when it starts inside).
    pub fn enters(&self, aabb: &Aabb) -> Option<f64> {
        let mut near = 0.0_f64;
        let mut far = f64::INFINITY;
        for axis in 0..3 {
            let origin = self.origin[axis];
            let dir = self.dir[axis];
            let (lo, hi) = (aabb.min[axis], aabb.max[axis]);
            if dir.abs() < PARALLEL_EPS {
                if origin < lo || origin > hi {
                    return None;
                }
                continue;
            }
            let t0 = (lo - origin) / dir;
            let t1 = (hi - origin) / dir;
            near = near.max(t0.min(t1));
            far = far.min(t0.max(t1));
            if near > far {
                return None;
            }
        }
        Some(near)
    }

    /// Intersects the triangle's plane, then keeps the hit if it lies on the
    /// inner side of all three edges. Either winding is accepted.
    pub fn hit_triangle(&self, [a, b, c]: [Point3; 3]) -> Option<f64> {
        let normal = (b - a).cross(c - a);
        let area2 = normal.magnitude2();
        let facing = normal.dot(self.dir);
        if area2 <= f64::EPSILON || facing.abs() < PARALLEL_EPS * area2.sqrt() {
            return None;
        }
        let t = normal.dot(a - self.origin) / facing;
        if t <= MIN_HIT_DISTANCE {
            return None;
        }
        let hit = self.at(t);
        let tolerance = -1.0e-9 * area2;
        let inside = [(a, b), (b, c), (c, a)]
            .into_iter()
            .all(|(from, to)| (to - from).cross(hit - from).dot(normal) >= tolerance);
        inside.then_some(t)
    }
}
