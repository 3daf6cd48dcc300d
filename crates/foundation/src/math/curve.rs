use super::Vec3;

/// Number of chords used to approximate curve length.
const LENGTH_DIVISIONS: usize = 200;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CubicBezier3 {
    pub p0: Vec3,
    pub p1: Vec3,
    pub p2: Vec3,
    pub p3: Vec3,
}

impl CubicBezier3 {
    pub fn new(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        Self { p0, p1, p2, p3 }
    }

    pub fn point(&self, t: f64) -> Vec3 {
        let u = 1.0 - t;
        self.p0 * (u * u * u) + self.p1 * (3.0 * u * u * t) + self.p2 * (3.0 * u * t * t)
            + self.p3 * (t * t * t)
    }

    /// Arc length approximated by summing chords.
    pub fn length(&self) -> f64 {
        let mut total = 0.0;
        let mut prev = self.p0;
        for i in 1..=LENGTH_DIVISIONS {
            let p = self.point(i as f64 / LENGTH_DIVISIONS as f64);
            total += prev.distance(p);
            prev = p;
        }
        total
    }
}
