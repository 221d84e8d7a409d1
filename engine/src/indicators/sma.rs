// Trailing simple moving average over a series that may contain undefined entries

/// Mean of the trailing `window` entries at each index, inclusive of the index itself.
///
/// An output entry is defined only when every entry in its window is defined, so the
/// result stays aligned with `values`. Each window is summed on its own, so a large value
/// leaving the window does not disturb the means that follow it.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            values[i + 1 - window..=i]
                .iter()
                .copied()
                .sum::<Option<f64>>()
                .map(|sum| sum / window as f64)
        })
        .collect()
}
