/// Arithmetic mean, `None` for an empty series
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`)
pub fn standard_deviation(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    let variance = values
        .iter()
        .map(|x| {
            let diff = x - avg;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;
    Some(variance.sqrt())
}

/// Standard deviation divided by the mean.
///
/// Returns `None` when the series is empty or its mean is not positive,
/// callers substitute their own neutral default in that case.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    let avg = mean(values)?;
    if avg <= 0.0 {
        return None;
    }
    standard_deviation(values).map(|std| std / avg)
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Clamp a risk score into the `[1, 10]` domain
pub fn clamp_risk(value: f64) -> f64 {
    if value.is_nan() {
        return 1.0;
    }
    value.max(1.0).min(10.0)
}

/// TVL size factor shared by the protocol risk models.
///
/// `10 - min(9, tvl_millions * 0.5)` floored at 1.0, so larger pools read as safer.
pub fn tvl_size_factor(total_tvl: f64) -> f64 {
    let reduction = (total_tvl / 1_000_000.0 * 0.5).min(9.0);
    (10.0 - reduction).max(1.0)
}

/// Stability score `10 - min(9, cv * scale)`, or 5.0 when no variation can be computed
pub fn stability_score(values: &[f64], scale: f64) -> f64 {
    match coefficient_of_variation(values) {
        Some(cv) => round_to(10.0 - (cv * scale).min(9.0), 1),
        None => 5.0,
    }
}
