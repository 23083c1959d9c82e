use truck_base::cgmath64::{Point3, Vector3};

/// Axis-aligned box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    /// Smallest box holding every point, or `None` for an empty set.
    pub fn from_points(points: impl IntoIterator<Item = Point3>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        Some(points.fold(Self { min: first, max: first }, |aabb, point| {
            aabb.union(Self { min: point, max: point })
        }))
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            min: Point3::new(
                self.min.x.min(other.min.x),
                self.min.y.min(other.min.y),
                self.min.z.min(other.min.z),
            ),
            max: Point3::new(
                self.max.x.max(other.max.x),
                self.max.y.max(other.max.y),
                self.max.z.max(other.max.z),
            ),
        }
    }

    pub fn center(&self) -> Point3 {
        self.min + self.size() * 0.5
    }

    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    pub fn longest_side(&self) -> f64 {
        let size = self.size();
        size.x.max(size.y).max(size.z)
    }
}
