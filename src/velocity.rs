use crate::config::AnalysisConfig;
use crate::tracking::{PlayerTrack, TrackingTable};

/// Per-sample velocity for one tracked player, aligned with the tracking rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerVelocity {
    pub tag: u32,
    pub vx: Vec<Option<f64>>,
    pub vy: Vec<Option<f64>>,
    pub speed: Vec<Option<f64>>,
}

pub trait VelocityEstimator: Sync {
    fn estimate(&self, table: &TrackingTable, track: &PlayerTrack) -> PlayerVelocity;
}

/// Finite differences, glitch removal above `max_speed`, then a linear
/// Savitzky-Golay pass inside each period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothedVelocity {
    pub max_speed: f64,
    pub window: usize,
    pub hz: u32,
}

impl Default for SmoothedVelocity {
    fn default() -> Self {
        Self::from(&AnalysisConfig::default())
    }
}

impl From<&AnalysisConfig> for SmoothedVelocity {
    fn from(cfg: &AnalysisConfig) -> Self {
        Self {
            max_speed: cfg.max_speed,
            window: cfg.smoothing_window,
            hz: cfg.tracking_hz,
        }
    }
}

impl SmoothedVelocity {
    fn dt(&self, table: &TrackingTable, i: usize) -> f64 {
        let fallback = 1.0 / self.hz.max(1) as f64;
        let Some(times) = table.times.as_ref() else { return fallback };
        match (times.get(i), times.get(i - 1)) {
            (Some(t1), Some(t0)) if t1.is_finite() && t0.is_finite() => t1 - t0,
            _ => fallback,
        }
    }

    fn raw(&self, table: &TrackingTable, track: &PlayerTrack) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
        let n = track.x.len();
        let mut vx = vec![None; n];
        let mut vy = vec![None; n];
        for i in 1..n {
            let dt = self.dt(table, i);
            if dt <= 0.0 {
                continue;
            }
            let (Some(x1), Some(x0), Some(y1), Some(y0)) = (track.x[i], track.x[i - 1], track.y[i], track.y[i - 1])
            else {
                continue;
            };
            let (dx, dy) = ((x1 - x0) / dt, (y1 - y0) / dt);
            if (dx * dx + dy * dy).sqrt() > self.max_speed {
                continue;
            }
            vx[i] = Some(dx);
            vy[i] = Some(dy);
        }
        (vx, vy)
    }
}

impl VelocityEstimator for SmoothedVelocity {
    fn estimate(&self, table: &TrackingTable, track: &PlayerTrack) -> PlayerVelocity {
        let (mut vx, mut vy) = self.raw(table, track);
        for range in period_ranges(&table.periods) {
            smooth_linear(&mut vx[range.clone()], self.window);
            smooth_linear(&mut vy[range], self.window);
        }
        let speed = vx
            .iter()
            .zip(vy.iter())
            .map(|(x, y)| Some((x.as_ref()?.powi(2) + y.as_ref()?.powi(2)).sqrt()))
            .collect();
        PlayerVelocity {
            tag: track.tag,
            vx,
            vy,
            speed,
        }
    }
}

/// Contiguous runs of equal period value.
pub fn period_ranges(periods: &[u8]) -> Vec<std::ops::Range<usize>> {
    let mut out = Vec::new();
    let mut start = 0;
    for i in 1..=periods.len() {
        if i == periods.len() || periods[i] != periods[start] {
            if i > start {
                out.push(start..i);
            }
            start = i;
        }
    }
    out
}

/// Least-squares line through `window`, evaluated at offset `t`.
fn line_at(window: &[f64], t: f64) -> f64 {
    let n = window.len() as f64;
    let t_mean = (n - 1.0) / 2.0;
    let v_mean = window.iter().sum::<f64>() / n;
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, v) in window.iter().enumerate() {
        let dt = i as f64 - t_mean;
        num += dt * (v - v_mean);
        den += dt * dt;
    }
    let slope = if den > 0.0 { num / den } else { 0.0 };
    v_mean + slope * (t - t_mean)
}

fn complete(values: &[Option<f64>]) -> Option<Vec<f64>> {
    values.iter().copied().collect()
}

/// Polyorder-1 Savitzky-Golay in place. Interior points are centred means;
/// the first and last half-window come off a line fitted to the edge window.
/// Segments shorter than the window are left untouched.
pub fn smooth_linear(values: &mut [Option<f64>], window: usize) {
    let window = window | 1;
    let n = values.len();
    if window < 3 || n < window {
        return;
    }
    let half = window / 2;
    let src = values.to_vec();
    for i in half..n - half {
        values[i] = complete(&src[i - half..=i + half]).map(|w| w.iter().sum::<f64>() / window as f64);
    }
    let head = complete(&src[..window]);
    let tail = complete(&src[n - window..]);
    for i in 0..half {
        values[i] = head.as_ref().map(|w| line_at(w, i as f64));
        let j = n - half + i;
        values[j] = tail.as_ref().map(|w| line_at(w, (window - half + i) as f64));
    }
}
