/// A closed parametric range `[min, max]`.
///
/// Used for slab-test results and for the `[t_enter, t_exit]` span a ray
/// spends inside a kd-tree cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    /// Create a new interval given min and max values.
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Returns the size of the interval (max - min).
    pub fn size(&self) -> f32 {
        self.max - self.min
    }

    /// Returns true if x is within the interval [min, max] (inclusive).
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Returns true if the two intervals share at least one point.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    /// Grows both ends by `delta`.
    pub fn expand(&self, delta: f32) -> Interval {
        Interval::new(self.min - delta, self.max + delta)
    }

    /// Creates an interval that surrounds two other intervals.
    pub fn surrounding(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.min(b.min), a.max.max(b.max))
    }

    /// Intersection of two intervals; empty when they do not overlap.
    pub fn intersection(a: &Interval, b: &Interval) -> Interval {
        Interval::new(a.min.max(b.min), a.max.min(b.max))
    }

    /// An empty interval (min > max, contains nothing).
    pub const EMPTY: Interval = Interval {
        min: f32::INFINITY,
        max: f32::NEG_INFINITY,
    };

    /// A universe interval (contains everything).
    pub const UNIVERSE: Interval = Interval {
        min: f32::NEG_INFINITY,
        max: f32::INFINITY,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_contains() {
        let interval = Interval::new(0.0, 10.0);

        // Inclusive bounds
        assert!(interval.contains(0.0));
        assert!(interval.contains(10.0));
        assert!(interval.contains(5.0));

        assert!(!interval.contains(-0.1));
        assert!(!interval.contains(10.1));
    }

    #[test]
    fn test_interval_overlaps() {
        let a = Interval::new(0.0, 1.0);
        assert!(a.overlaps(&Interval::new(1.0, 2.0)));
        assert!(a.overlaps(&Interval::new(-1.0, 0.5)));
        assert!(!a.overlaps(&Interval::new(1.5, 2.0)));
        assert!(!a.overlaps(&Interval::EMPTY));
    }

    #[test]
    fn test_interval_expand() {
        let expanded = Interval::new(0.0, 10.0).expand(2.0);

        assert_eq!(expanded.min, -2.0);
        assert_eq!(expanded.max, 12.0);
        assert_eq!(expanded.size(), 14.0);
    }

    #[test]
    fn test_interval_intersection() {
        let a = Interval::new(0.0, 5.0);
        let b = Interval::new(3.0, 8.0);
        assert_eq!(Interval::intersection(&a, &b), Interval::new(3.0, 5.0));
        assert_eq!(Interval::surrounding(&a, &b), Interval::new(0.0, 8.0));

        let disjoint = Interval::intersection(&a, &Interval::new(6.0, 7.0));
        assert!(disjoint.size() < 0.0);
    }

    #[test]
    fn test_interval_universe() {
        let universe = Interval::UNIVERSE;

        assert!(universe.contains(0.0));
        assert!(universe.contains(1e10));
        assert!(universe.contains(-1e10));
        assert_eq!(universe.size(), f32::INFINITY);
        assert!(!Interval::EMPTY.contains(0.0));
    }
}
