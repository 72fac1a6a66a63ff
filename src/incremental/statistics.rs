//! Sufficient statistics of a stream of `(x, y)` pairs.
use std::ops::{AddAssign, SubAssign};


/// Counts and sums of `x`, `y` and their products.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegressionStatistics {
    n: f64,
    sum_x: f64,
    sum_xx: f64,
    sum_y: f64,
    sum_yy: f64,
    sum_xy: f64,
}


impl RegressionStatistics {
    /// Adds one observation.
    #[inline]
    pub fn add(&mut self, x: f64, y: f64) {
        self.n += 1.0;
        self.sum_x += x;
        self.sum_xx += x * x;
        self.sum_y += y;
        self.sum_yy += y * y;
        self.sum_xy += x * y;
    }


    /// Number of observations.
    #[inline]
    pub fn count(&self) -> f64 {
        self.n
    }


    /// Mean of `y`, `0` if empty.
    pub fn mean_y(&self) -> f64 {
        if self.n > 0.0 { self.sum_y / self.n } else { 0.0 }
    }


    /// Population standard deviation of `y`.
    pub fn std_dev_y(&self) -> f64 {
        if self.n <= 1.0 {
            return 0.0;
        }
        let centered = self.sum_yy - self.sum_y * self.sum_y / self.n;
        (centered.max(0.0) / self.n).sqrt()
    }


    /// Standard deviation of the residuals of
    /// the least squares line of `y` on `x`.
    pub fn residual_std_dev(&self) -> f64 {
        if self.n <= 1.0 {
            return 0.0;
        }
        (self.residual_sum_of_squares() / self.n).sqrt()
    }


    /// Sum of the squared residuals of
    /// the least squares line of `y` on `x`.
    pub fn residual_sum_of_squares(&self) -> f64 {
        if self.n <= 1.0 {
            return 0.0;
        }
        let syy = self.sum_yy - self.sum_y * self.sum_y / self.n;
        let sxx = self.sum_xx - self.sum_x * self.sum_x / self.n;
        let sxy = self.sum_xy - self.sum_x * self.sum_y / self.n;

        let explained = if sxx > f64::EPSILON * self.n {
            sxy * sxy / sxx
        } else {
            0.0
        };
        (syy - explained).max(0.0)
    }
}


impl AddAssign<&RegressionStatistics> for RegressionStatistics {
    fn add_assign(&mut self, other: &Self) {
        self.n += other.n;
        self.sum_x += other.sum_x;
        self.sum_xx += other.sum_xx;
        self.sum_y += other.sum_y;
        self.sum_yy += other.sum_yy;
        self.sum_xy += other.sum_xy;
    }
}


impl SubAssign<&RegressionStatistics> for RegressionStatistics {
    fn sub_assign(&mut self, other: &Self) {
        self.n -= other.n;
        self.sum_x -= other.sum_x;
        self.sum_xx -= other.sum_xx;
        self.sum_y -= other.sum_y;
        self.sum_yy -= other.sum_yy;
        self.sum_xy -= other.sum_xy;
    }
}
