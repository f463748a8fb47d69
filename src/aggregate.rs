use std::fmt;
use std::ops::Add;

/// A numeric domain that measurements are accumulated in.
///
/// `SCALE` converts a stored value back to natural units: `1.0` for plain
/// floats, `10.0` for fixed-point tenths.
pub trait Measure: Copy + PartialOrd + Add<Output = Self> + fmt::Debug + Send + Sync + 'static {
    const SCALE: f64;

    fn to_f64(self) -> f64;
}

impl Measure for f64 {
    const SCALE: f64 = 1.0;

    fn to_f64(self) -> f64 {
        self
    }
}

/// Running min/max/sum/count for one key.
///
/// Both `observe` and `merge` are order-independent, so any grouping of
/// records into chunks yields the same aggregate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aggregate<V> {
    min: V,
    max: V,
    sum: V,
    count: u64,
}

impl<V: Measure> Aggregate<V> {
    pub fn new(value: V) -> Self {
        Self {
            min: value,
            max: value,
            sum: value,
            count: 1,
        }
    }

    pub fn observe(&mut self, value: V) {
        if value < self.min {
            self.min = value;
        }
        if value > self.max {
            self.max = value;
        }
        self.sum = self.sum + value;
        self.count += 1;
    }

    pub fn merge(&mut self, other: &Self) {
        if other.min < self.min {
            self.min = other.min;
        }
        if other.max > self.max {
            self.max = other.max;
        }
        self.sum = self.sum + other.sum;
        self.count += other.count;
    }

    pub fn min(&self) -> V {
        self.min
    }

    pub fn max(&self) -> V {
        self.max
    }

    pub fn sum(&self) -> V {
        self.sum
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    /// Average in natural units.
    pub fn mean(&self) -> f64 {
        self.sum.to_f64() / V::SCALE / self.count as f64
    }

    /// Triplet in natural units. Negative zero is folded into zero so both
    /// numeric domains print `0.00` for it.
    pub fn summary(&self) -> Summary {
        Summary {
            min: self.min.to_f64() / V::SCALE + 0.0,
            max: self.max.to_f64() / V::SCALE + 0.0,
            mean: self.mean() + 0.0,
        }
    }
}

/// The reported triplet, displayed as `min/max/avg` with two fractional digits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}/{:.2}/{:.2}", self.min, self.max, self.mean)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aggregate_of(values: &[f64]) -> Aggregate<f64> {
        let mut agg = Aggregate::new(values[0]);
        for &v in &values[1..] {
            agg.observe(v);
        }
        agg
    }

    #[test]
    fn new_starts_with_single_observation() {
        let agg = Aggregate::new(-3.8);
        assert_eq!(agg.min(), -3.8);
        assert_eq!(agg.max(), -3.8);
        assert_eq!(agg.sum(), -3.8);
        assert_eq!(agg.count(), 1);
    }

    #[test]
    fn observe_tracks_extremes_and_mean() {
        let agg = aggregate_of(&[27.5, 20.0]);
        assert_eq!(agg.min(), 20.0);
        assert_eq!(agg.max(), 27.5);
        assert_eq!(agg.count(), 2);
        assert_eq!(agg.mean(), 23.75);
    }

    #[test]
    fn observe_updates_min_and_max_independently() {
        // a descending then ascending run touches both bounds
        let agg = aggregate_of(&[5.0, 1.0, 9.0]);
        assert_eq!(agg.min(), 1.0);
        assert_eq!(agg.max(), 9.0);
    }

    #[test]
    fn merge_matches_observing_everything() {
        let mut left = aggregate_of(&[1.5, -2.0]);
        let right = aggregate_of(&[4.0, 0.5, -7.25]);
        left.merge(&right);
        assert_eq!(left, aggregate_of(&[1.5, -2.0, 4.0, 0.5, -7.25]));
    }

    #[test]
    fn merge_is_commutative() {
        let a = aggregate_of(&[1.0, 2.0]);
        let b = aggregate_of(&[-4.5]);
        let mut ab = a;
        ab.merge(&b);
        let mut ba = b;
        ba.merge(&a);
        assert_eq!(ab, ba);
    }

    #[test]
    fn summary_formats_two_decimals() {
        let agg = aggregate_of(&[27.5, 20.0]);
        assert_eq!(agg.summary().to_string(), "20.00/27.50/23.75");
        assert_eq!(Aggregate::new(-3.8).summary().to_string(), "-3.80/-3.80/-3.80");
    }

    #[test]
    fn negative_zero_prints_as_zero() {
        assert_eq!(Aggregate::new(-0.0).summary().to_string(), "0.00/0.00/0.00");
        assert_eq!(aggregate_of(&[-0.0, -0.0]).summary().to_string(), "0.00/0.00/0.00");
    }

    #[test]
    fn summary_formatting_is_idempotent() {
        let agg = aggregate_of(&[0.1, 0.2, 0.35]);
        assert_eq!(agg.summary().to_string(), agg.summary().to_string());
    }
}
