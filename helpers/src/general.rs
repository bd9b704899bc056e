use std::cmp::Ordering;

/// argmax returns the index of the first maximum value in the array x, or `None` if x is empty.
/// Values that cannot be compared (e.g. NaN) never replace the current maximum.
pub fn argmax<T: std::cmp::PartialOrd + std::marker::Copy>(x: &[T]) -> Option<usize> {
    let mut val_max = *x.first()?;
    let mut idx_max = 0;

    for (i, &val) in x.iter().enumerate().skip(1) {
        if val > val_max {
            val_max = val;
            idx_max = i;
        }
    }

    Some(idx_max)
}

#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// argsort returns the indices that would sort an array. The sort is stable, i.e. equal values
/// keep their original order. Incomparable values are treated as equal.
pub fn argsort<T: std::cmp::PartialOrd>(x: &[T], order: SortOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..x.len()).collect();
    match order {
        SortOrder::Ascending => indices
            .sort_by(|&a, &b| x[a].partial_cmp(&x[b]).unwrap_or(Ordering::Equal)),
        SortOrder::Descending => indices
            .sort_by(|&a, &b| x[b].partial_cmp(&x[a]).unwrap_or(Ordering::Equal)),
    }
    indices
}

/// lin_interp returns the linearly interpolated value at x for given discrete data points xp, fp.
/// xp must be increasing and of the same length as fp. Beyond the last data point the function
/// continues with the slope `slope_right`, below the first one it returns fp[0].
pub fn lin_interp(x: f64, xp: &[f64], fp: &[f64], slope_right: f64) -> f64 {
    debug_assert_eq!(xp.len(), fp.len(), "Number of items in xp and fp must be equal!");

    let (x_first, f_first) = match (xp.first(), fp.first()) {
        (Some(&x0), Some(&f0)) => (x0, f0),
        _ => return 0.0,
    };

    if x <= x_first {
        return f_first;
    }

    for i in 1..xp.len().min(fp.len()) {
        if x <= xp[i] {
            return fp[i - 1] + (x - xp[i - 1]) * (fp[i] - fp[i - 1]) / (xp[i] - xp[i - 1]);
        }
    }

    let i_last = xp.len().min(fp.len()) - 1;
    fp[i_last] + (x - xp[i_last]) * slope_right
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_keeps_first_of_equal_maxima() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 2.0]), Some(1));
        assert_eq!(argmax(&[0.0, 0.0]), Some(0));
        assert_eq!(argmax::<f64>(&[]), None);
    }

    #[test]
    fn argsort_is_stable() {
        let x = [2.0, 1.0, 2.0, 0.5];
        assert_eq!(argsort(&x, SortOrder::Ascending), vec![3, 1, 0, 2]);
        assert_eq!(argsort(&x, SortOrder::Descending), vec![0, 2, 1, 3]);
    }

    #[test]
    fn lin_interp_interpolates_and_extrapolates() {
        let xp = [0.0, 10.0, 20.0];
        let fp = [0.0, 1.0, 3.0];
        assert_eq!(lin_interp(-5.0, &xp, &fp, 1.0), 0.0);
        assert_eq!(lin_interp(5.0, &xp, &fp, 1.0), 0.5);
        assert_eq!(lin_interp(15.0, &xp, &fp, 1.0), 2.0);
        assert_eq!(lin_interp(25.0, &xp, &fp, 1.0), 8.0);
    }
}
