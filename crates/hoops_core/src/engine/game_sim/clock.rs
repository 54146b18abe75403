//! Possession length sampling.

use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::engine::config::ClockConfig;

/// Planned possession length. Near the end of a period the offense hurries
/// and the draw is bounded by the time left.
pub(crate) fn sample_possession_secs<R: Rng + ?Sized>(
    cfg: &ClockConfig,
    pace_factor: f32,
    remaining: f32,
    rng: &mut R,
) -> f32 {
    if remaining <= cfg.quick_shot_window_secs {
        let lo = cfg.quick_shot_min_secs;
        let hi = remaining.max(lo);
        return rng.gen_range(lo..=hi);
    }
    let band = Uniform::new_inclusive(cfg.possession_min_secs, cfg.possession_max_secs);
    band.sample(rng) * pace_factor
}
