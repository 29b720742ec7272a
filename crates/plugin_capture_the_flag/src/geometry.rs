//! Distance helpers and the arena boundary.

use script_api::Vec3;

/// Distance between two points.
pub fn distance(a: Vec3, b: Vec3) -> f64 {
    (a - b).length()
}

/// Distance between two points projected onto the ground plane.
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f64 {
    (a.horizontal() - b.horizontal()).length()
}

/// Exact component-wise equality.
pub fn positions_equal(a: Vec3, b: Vec3) -> bool {
    a.x == b.x && a.y == b.y && a.z == b.z
}

/// Circular play area derived from the two flag poles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArenaBounds {
    /// Horizontal midpoint of the poles (z is always 0).
    pub center: Vec3,
    pub radius: f64,
}

impl ArenaBounds {
    /// Center is the midpoint of the poles on the ground plane; the radius
    /// is twice the horizontal distance between them.
    pub fn from_poles(red: Vec3, blue: Vec3) -> Self {
        let center = (red.horizontal() + blue.horizontal()) * 0.5;
        let radius = horizontal_distance(red, blue) * 2.0;
        Self { center, radius }
    }

    /// Whether a position lies outside the circle. A zero radius means the
    /// poles share a location and no boundary is enforced.
    pub fn is_outside(&self, position: Vec3) -> bool {
        self.radius > 0.0 && horizontal_distance(position, self.center) > self.radius
    }

    /// Horizontal point `step` units from `position` toward the center.
    /// Never overshoots the center. z is left at 0 for the caller to snap
    /// to the terrain.
    pub fn nudge_toward_center(&self, position: Vec3, step: f64) -> Vec3 {
        let offset = self.center - position.horizontal();
        let length = offset.length();
        if length <= step || length == 0.0 {
            return self.center;
        }
        position.horizontal() + offset * (step / length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distances() {
        let a = Vec3::new(0.0, 0.0, 10.0);
        let b = Vec3::new(3.0, 4.0, 0.0);
        assert_eq!(horizontal_distance(a, b), 5.0);
        assert!(distance(a, b) > 11.0);
        assert!(positions_equal(a, a));
        assert!(!positions_equal(a, b));
    }

    #[test]
    fn test_arena_bounds() {
        let bounds = ArenaBounds::from_poles(Vec3::new(-100.0, 0.0, 5.0), Vec3::new(100.0, 0.0, 9.0));
        assert_eq!(bounds.center, Vec3::ZERO);
        assert_eq!(bounds.radius, 400.0);
        assert!(!bounds.is_outside(Vec3::new(399.0, 0.0, 0.0)));
        assert!(bounds.is_outside(Vec3::new(0.0, 401.0, 0.0)));

        let nudged = bounds.nudge_toward_center(Vec3::new(0.0, 500.0, 77.0), 100.0);
        assert_eq!(nudged, Vec3::new(0.0, 400.0, 0.0));
        assert_eq!(bounds.nudge_toward_center(Vec3::new(0.0, 50.0, 0.0), 100.0), Vec3::ZERO);
    }

    #[test]
    fn test_shared_pole_position_has_no_boundary() {
        let pole = Vec3::new(7.0, 7.0, 0.0);
        let bounds = ArenaBounds::from_poles(pole, pole);
        assert!(!bounds.is_outside(Vec3::new(1e9, 1e9, 0.0)));
    }
}
