use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::error::{PipelineError, PipelineResult};

/// L2 segment cost over a fixed signal, O(1) per query.
struct L2Cost {
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl L2Cost {
    fn fit(signal: &[f64]) -> Self {
        let mut sum = Vec::with_capacity(signal.len() + 1);
        let mut sum_sq = Vec::with_capacity(signal.len() + 1);
        sum.push(0.0);
        sum_sq.push(0.0);
        for x in signal {
            sum.push(sum[sum.len() - 1] + x);
            sum_sq.push(sum_sq[sum_sq.len() - 1] + x * x);
        }
        Self { sum, sum_sq }
    }

    /// Sum of squared deviations from the mean of `signal[start..end]`.
    fn error(&self, start: usize, end: usize) -> f64 {
        let n = (end - start) as f64;
        if n <= 0.0 {
            return 0.0;
        }
        let s = self.sum[end] - self.sum[start];
        let sq = self.sum_sq[end] - self.sum_sq[start];
        (sq - s * s / n).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinsegParams {
    pub jump: usize,
    pub min_size: usize,
}

impl Default for BinsegParams {
    fn default() -> Self {
        Self { jump: 5, min_size: 2 }
    }
}

impl From<&AnalysisConfig> for BinsegParams {
    fn from(cfg: &AnalysisConfig) -> Self {
        Self {
            jump: cfg.binseg_jump.max(1),
            min_size: cfg.binseg_min_size.max(1),
        }
    }
}

/// Best split of `[start, end)`: maximal gain, ties to the larger index.
fn single_bkp(cost: &L2Cost, start: usize, end: usize, params: BinsegParams) -> Option<(usize, f64)> {
    let segment = cost.error(start, end);
    let mut best: Option<(usize, f64)> = None;
    for bkp in (start..end).step_by(params.jump.max(1)) {
        if bkp - start < params.min_size || end - bkp < params.min_size {
            continue;
        }
        let gain = segment - cost.error(start, bkp) - cost.error(bkp, end);
        match best {
            Some((_, g)) if gain < g => {}
            _ => best = Some((bkp, gain)),
        }
    }
    best
}

/// Greedy binary segmentation. Returns sorted breakpoints followed by the
/// signal length, or fewer breakpoints when no admissible split remains.
pub fn binseg_predict(signal: &[f64], n_bkps: usize, params: BinsegParams) -> PipelineResult<Vec<usize>> {
    let n = signal.len();
    let needed = 2 * params.min_size;
    if n < needed {
        return Err(PipelineError::NotEnoughSamples { needed, got: n });
    }
    if let Some(index) = signal.iter().position(|x| !x.is_finite()) {
        return Err(PipelineError::NonFiniteWorkload { index });
    }

    let cost = L2Cost::fit(signal);
    let mut bkps = vec![n];
    while bkps.len() - 1 < n_bkps {
        let mut best: Option<(usize, f64)> = None;
        let mut start = 0;
        for &end in &bkps {
            if let Some((bkp, gain)) = single_bkp(&cost, start, end, params)
                && best.is_none_or(|(_, g)| gain > g)
            {
                best = Some((bkp, gain));
            }
            start = end;
        }
        let Some((bkp, _)) = best else { break };
        bkps.push(bkp);
        bkps.sort_unstable();
    }
    Ok(bkps)
}

/// Suggested substitution window, in absolute series-index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FatigueWindow {
    /// Split index inside the gated series.
    pub breakpoint: usize,
    pub start: usize,
    pub end: usize,
}

/// Gate `series` on `time_sec > warm-up`, split it once, and shift the split
/// back by the warm-up offset. Leading and trailing gaps in the gated signal
/// are dropped; a gap in between is an error.
pub fn detect(series: &[f64], time_sec: &[f64], cfg: &AnalysisConfig) -> PipelineResult<FatigueWindow> {
    if series.len() != time_sec.len() {
        return Err(PipelineError::LengthMismatch {
            series: series.len(),
            clock: time_sec.len(),
        });
    }
    let warmup = cfg.fatigue_warmup;
    let gated: Vec<(usize, f64)> = series
        .iter()
        .zip(time_sec.iter())
        .enumerate()
        .filter(|(_, (_, t))| **t > warmup as f64)
        .map(|(i, (x, _))| (i, *x))
        .collect();

    let lead = gated.iter().take_while(|(_, x)| !x.is_finite()).count();
    let tail = gated.iter().rev().take_while(|(_, x)| !x.is_finite()).count();
    let usable = if lead == gated.len() {
        &gated[..0]
    } else {
        &gated[lead..gated.len() - tail]
    };
    if let Some((index, _)) = usable.iter().find(|(_, x)| !x.is_finite()) {
        return Err(PipelineError::NonFiniteWorkload { index: *index });
    }

    let signal: Vec<f64> = usable.iter().map(|(_, x)| *x).collect();
    let bkps = binseg_predict(&signal, 1, BinsegParams::from(cfg))?;
    let breakpoint = lead + bkps.first().copied().unwrap_or(signal.len());
    let n = gated.len();
    debug!(breakpoint, gated = n, "fatigue split");
    Ok(FatigueWindow {
        breakpoint,
        start: breakpoint + warmup,
        end: n + warmup,
    })
}
