//! Energy/valence curve profiles
//!
//! A curve profile maps a normalized position through the output playlist
//! to the energy and valence the mix should aim for at that point.
//!
//! Four closed-form profiles:
//! - Steady: constant (0.60, 0.60)
//! - Build: rising from (0.25, 0.30) to (0.90, 0.85)
//! - Cooldown: falling from (0.85, 0.75) to (0.25, 0.30)
//! - Wave: one full sine cycle over the playlist

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

/// Target energy/valence pair for one position in the mix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveTarget {
    pub energy: f64,
    pub valence: f64,
}

/// Curve profile shaping how the mix "feels" over its duration
///
/// Profiles are stateless: the target depends on position only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveProfile {
    /// Constant target: energy = valence = 0.60
    #[default]
    Steady,

    /// Rising: energy = 0.25 + 0.65t, valence = 0.30 + 0.55t
    Build,

    /// Falling: energy = 0.85 - 0.60t, valence = 0.75 - 0.45t
    Cooldown,

    /// Periodic: w = 0.5 + 0.5 × sin(2πt),
    /// energy = 0.30 + 0.55w, valence = 0.35 + 0.50w
    Wave,
}

impl CurveProfile {
    /// Calculate target energy/valence at given position
    ///
    /// # Arguments
    /// * `t` - Normalized position through the mix (0.0 = first track, 1.0 = last)
    ///
    /// # Returns
    /// Target pair. Values are not re-clamped; for t in [0.0, 1.0] every
    /// profile stays within [0.0, 1.0] by construction.
    pub fn target_at(&self, t: f64) -> CurveTarget {
        match self {
            CurveProfile::Steady => CurveTarget {
                energy: 0.60,
                valence: 0.60,
            },
            CurveProfile::Build => CurveTarget {
                energy: 0.25 + 0.65 * t,
                valence: 0.30 + 0.55 * t,
            },
            CurveProfile::Cooldown => CurveTarget {
                energy: 0.85 - 0.60 * t,
                valence: 0.75 - 0.45 * t,
            },
            CurveProfile::Wave => {
                let w = 0.5 + 0.5 * (TAU * t).sin();
                CurveTarget {
                    energy: 0.30 + 0.55 * w,
                    valence: 0.35 + 0.50 * w,
                }
            }
        }
    }

    /// Parse profile from its name (case-insensitive)
    ///
    /// Accepts "steady", "build", "cooldown" (also "cool-down", "cool_down")
    /// and "wave".
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "steady" => Some(CurveProfile::Steady),
            "build" => Some(CurveProfile::Build),
            "cooldown" | "cool-down" | "cool_down" => Some(CurveProfile::Cooldown),
            "wave" => Some(CurveProfile::Wave),
            _ => None,
        }
    }

    /// Canonical lowercase name (as used in config files and descriptions)
    pub fn as_str(&self) -> &'static str {
        match self {
            CurveProfile::Steady => "steady",
            CurveProfile::Build => "build",
            CurveProfile::Cooldown => "cooldown",
            CurveProfile::Wave => "wave",
        }
    }

    /// Get human-readable display name
    pub fn display_name(&self) -> &'static str {
        match self {
            CurveProfile::Steady => "Steady",
            CurveProfile::Build => "Build",
            CurveProfile::Cooldown => "Cooldown",
            CurveProfile::Wave => "Wave",
        }
    }

    /// Get all available profiles
    pub fn all_variants() -> &'static [CurveProfile] {
        &[
            CurveProfile::Steady,
            CurveProfile::Build,
            CurveProfile::Cooldown,
            CurveProfile::Wave,
        ]
    }
}

impl std::fmt::Display for CurveProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
