// Descriptive statistics over numeric samples
use super::error::StatisticsError;

type Result<T> = std::result::Result<T, StatisticsError>;

fn non_empty(xs: &[f64]) -> Result<()> {
    if xs.is_empty() {
        return Err(StatisticsError::EmptyInput);
    }
    Ok(())
}

/// Sorted copy of `xs`, ascending. Ties keep their input order.
pub fn asc(xs: &[f64]) -> Result<Vec<f64>> {
    non_empty(xs)?;
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    Ok(sorted)
}

pub fn sum(xs: &[f64]) -> Result<f64> {
    non_empty(xs)?;
    Ok(xs.iter().sum())
}

pub fn mean(xs: &[f64]) -> Result<f64> {
    Ok(sum(xs)? / xs.len() as f64)
}

/// Population standard deviation (divides by `n`).
pub fn std(xs: &[f64]) -> Result<f64> {
    let mu = mean(xs)?;
    let variance = xs.iter().map(|x| (x - mu).powi(2)).sum::<f64>() / xs.len() as f64;
    Ok(variance.sqrt())
}

/// Quantile with linear interpolation between the two closest order statistics.
pub fn quantile(p: f64, xs: &[f64]) -> Result<f64> {
    let sorted = asc(xs)?;
    let idx = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    let frac = idx - lo as f64;
    Ok(sorted[lo] + frac * (sorted[hi] - sorted[lo]))
}

pub fn q25(xs: &[f64]) -> Result<f64> {
    quantile(0.25, xs)
}

pub fn median(xs: &[f64]) -> Result<f64> {
    quantile(0.5, xs)
}

pub fn q75(xs: &[f64]) -> Result<f64> {
    quantile(0.75, xs)
}

/// Box-plot summary `[min, q25, median, q75, max]`.
pub fn five_number_summary(xs: &[f64]) -> Result<[f64; 5]> {
    let sorted = asc(xs)?;
    Ok([
        sorted[0],
        q25(&sorted)?,
        median(&sorted)?,
        q75(&sorted)?,
        sorted[sorted.len() - 1],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUARTILE_SAMPLE: [f64; 11] = [6.0, 7.0, 15.0, 36.0, 39.0, 40.0, 41.0, 42.0, 43.0, 47.0, 49.0];

    #[test]
    fn test_asc_sorts_without_mutating_input() {
        let unsorted = vec![4.0, 2.0, 5.0, 1.0, 0.0, 3.0];
        assert_eq!(asc(&unsorted).unwrap(), vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(unsorted, vec![4.0, 2.0, 5.0, 1.0, 0.0, 3.0]);
    }

    #[test]
    fn test_asc_is_non_decreasing_permutation() {
        for input in [
            vec![1.0, 2.0, 3.0, 4.0],
            vec![4.0, 3.0, 2.0, 1.0],
            vec![3.0, 3.0, -1.0, 7.5, 0.0, 3.0],
            vec![42.0],
        ] {
            let sorted = asc(&input).unwrap();
            assert_eq!(sorted.len(), input.len());
            assert!(sorted.windows(2).all(|w| w[0] <= w[1]));

            let mut expected = input.clone();
            expected.sort_by(|a, b| a.partial_cmp(b).unwrap());
            assert_eq!(sorted, expected);
        }
    }

    #[test]
    fn test_sum_mean_std() {
        let numbers: Vec<f64> = (0..=10).map(f64::from).collect();
        assert_eq!(sum(&numbers).unwrap(), 55.0);
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap(), 3.0);
        assert_eq!(std(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap(), 2.0);
    }

    #[test]
    fn test_quartiles() {
        assert_eq!(q25(&QUARTILE_SAMPLE).unwrap(), 25.5);
        assert_eq!(median(&QUARTILE_SAMPLE).unwrap(), 40.0);
        assert_eq!(q75(&QUARTILE_SAMPLE).unwrap(), 42.5);
    }

    #[test]
    fn test_quantile_of_unsorted_input() {
        assert_eq!(median(&[20.0, 10.0]).unwrap(), 15.0);
        assert_eq!(quantile(0.0, &[3.0, 1.0, 2.0]).unwrap(), 1.0);
        assert_eq!(quantile(1.0, &[3.0, 1.0, 2.0]).unwrap(), 3.0);
    }

    #[test]
    fn test_five_number_summary() {
        assert_eq!(
            five_number_summary(&[20.0, 10.0]).unwrap(),
            [10.0, 12.5, 15.0, 17.5, 20.0]
        );
        assert_eq!(five_number_summary(&[7.0]).unwrap(), [7.0; 5]);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        assert_eq!(asc(&[]), Err(StatisticsError::EmptyInput));
        assert_eq!(sum(&[]), Err(StatisticsError::EmptyInput));
        assert_eq!(mean(&[]), Err(StatisticsError::EmptyInput));
        assert_eq!(std(&[]), Err(StatisticsError::EmptyInput));
        assert_eq!(median(&[]), Err(StatisticsError::EmptyInput));
        assert_eq!(five_number_summary(&[]), Err(StatisticsError::EmptyInput));
    }
}
