/// A closed range of ray parameters, used as the `[t_min, t_max]` clip range.
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

    /// Returns true if x is within the interval [min, max] (inclusive).
    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    /// Clamps x to be within the interval [min, max].
    pub fn clamp(&self, x: f32) -> f32 {
        x.clamp(self.min, self.max)
    }

    /// True if no value satisfies `contains`. NaN bounds count as empty.
    pub fn is_empty(&self) -> bool {
        self.min.is_nan() || self.max.is_nan() || self.min > self.max
    }

    /// The unit interval [0, 1], the valid range of a color channel.
    pub const UNIT: Interval = Interval { min: 0.0, max: 1.0 };
}
