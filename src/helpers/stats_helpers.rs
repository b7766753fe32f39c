/// Rounds to two decimals, ties to even
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// `count / total * 100` rounded to two decimals; 0 when `total` is 0
pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(count as f64 / total as f64 * 100.0)
}

/// Running sum and count for a mean
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MeanAccumulator {
    sum: f64,
    count: usize,
}

impl MeanAccumulator {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// Mean rounded to two decimals; 0 when nothing was pushed
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        round2(self.sum / self.count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(2, 4), 50.0);
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
    }

    #[test]
    fn test_round2_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(0.375), 0.38);
        assert_eq!(round2(12.5), 12.5);
    }

    #[test]
    fn test_mean() {
        let mut acc = MeanAccumulator::default();
        assert_eq!(acc.mean(), 0.0);
        acc.push(10.0);
        acc.push(20.0);
        acc.push(25.0);
        assert_eq!(acc.mean(), 18.33);
    }
}
