/// Evenly spaced values covering `[start, end]` inclusive of both endpoints.
pub fn linspace(start: f64, end: f64, steps: usize) -> Vec<f64> {
    match steps {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let span = end - start;
            let last = (steps - 1) as f64;
            (0..steps)
                .map(|i| start + i as f64 * span / last)
                .collect()
        }
    }
}

/// Linear interpolation of the abscissa where the sampled curve equals `level`.
///
/// Only a strict sign change between two consecutive samples counts; a sample
/// sitting exactly on `level` does not by itself produce a crossing.
pub fn first_crossing(samples: &[(f64, Option<f64>)], level: f64) -> Option<f64> {
    samples.windows(2).find_map(|pair| {
        let (x1, y1) = pair[0];
        let (x2, y2) = pair[1];
        let (y1, y2) = (y1?, y2?);
        if (y1 - level) * (y2 - level) < 0.0 {
            let ratio = (level - y1) / (y2 - y1);
            Some(x1 + ratio * (x2 - x1))
        } else {
            None
        }
    })
}
