//! Search and session configuration.

use crate::{PfError, PfResult};

/// Tunables shared by the graph builder, the session and the driver.
///
/// Typically loaded from a JSON file by the application crate (enable the
/// `serde` feature) and passed down unchanged.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Frontier pops performed per driver tick.  1 animates every expansion;
    /// larger values trade smoothness for speed on big graphs.
    pub steps_per_tick: usize,

    /// Multiplier applied to geographic edge lengths (metres) when the
    /// builder derives a weight from distance.  Default: 1.0.
    pub weight_scale: f64,

    /// Radius in kilometres of the area fetched around a chosen start point.
    pub selection_radius_km: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            steps_per_tick: 1,
            weight_scale: 1.0,
            selection_radius_km: 2.0,
        }
    }
}

impl SearchConfig {
    /// Reject values the engine cannot honour.
    pub fn validate(&self) -> PfResult<()> {
        if self.steps_per_tick == 0 {
            return Err(PfError::Config("steps_per_tick must be at least 1".into()));
        }
        if !self.weight_scale.is_finite() || self.weight_scale < 0.0 {
            return Err(PfError::Config(format!(
                "weight_scale must be finite and non-negative, got {}",
                self.weight_scale
            )));
        }
        if !self.selection_radius_km.is_finite() || self.selection_radius_km <= 0.0 {
            return Err(PfError::Config(format!(
                "selection_radius_km must be positive, got {}",
                self.selection_radius_km
            )));
        }
        Ok(())
    }
}
