use std::fmt::Display;

/// Closed interval `[lo, hi]`, used to bracket roots.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    lo: f64,
    hi: f64,
}

impl Interval {
    pub fn new(lo: f64, hi: f64) -> Interval {
        if lo <= hi {
            Self { lo, hi }
        } else {
            Self { lo: hi, hi: lo }
        }
    }

    fn new_unchecked(lo: f64, hi: f64) -> Interval {
        debug_assert!(lo <= hi);
        Self { lo, hi }
    }

    /// Interval of the given half-width around `center`.
    pub fn around(center: f64, half_width: f64) -> Interval {
        Self::new(center - half_width, center + half_width)
    }

    pub fn lo(&self) -> f64 {
        self.lo
    }

    pub fn hi(&self) -> f64 {
        self.hi
    }

    pub fn split_left(&self, mid: f64) -> Self {
        assert!(self.contains(mid));
        Self::new_unchecked(self.lo, mid)
    }

    pub fn split_right(&self, mid: f64) -> Self {
        assert!(self.contains(mid));
        Self::new_unchecked(mid, self.hi)
    }

    pub fn midpoint(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }

    pub fn contains(&self, value: f64) -> bool {
        self.lo <= value && value <= self.hi
    }

    /// True once the interval can no longer be split in floating point.
    #[allow(clippy::float_cmp)]
    pub fn is_exhausted(&self) -> bool {
        let mid = self.midpoint();
        mid == self.lo || mid == self.hi
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.lo, self.hi)
    }
}
