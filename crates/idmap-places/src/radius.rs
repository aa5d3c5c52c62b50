//! Search radius ladder.
//!
//! Derives the ordered radii (meters) a point search walks through before
//! giving up: the requested radius, then ×2, ×5 and ×10 of it when
//! progressive expansion is on. Every rung is clamped to
//! [`MIN_RADIUS_M`, `MAX_RADIUS_M`] and rungs never repeat.

use serde::Serialize;

pub const MIN_RADIUS_M: u32 = 1_000;
pub const MAX_RADIUS_M: u32 = 500_000;
pub const DEFAULT_START_KM: f64 = 100.0;

const MULTIPLIERS: [u32; 3] = [2, 5, 10];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RadiusLadder(Vec<u32>);

impl RadiusLadder {
    /// Builds the ladder. A missing, non-finite or non-positive `start_km`
    /// falls back to [`DEFAULT_START_KM`].
    #[must_use]
    pub fn build(start_km: Option<f64>, progressive: bool) -> Self {
        let start_km = start_km
            .filter(|km| km.is_finite() && *km > 0.0)
            .unwrap_or(DEFAULT_START_KM);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let first = (start_km * 1000.0)
            .round()
            .clamp(f64::from(MIN_RADIUS_M), f64::from(MAX_RADIUS_M)) as u32;

        let mut rungs = vec![first];
        if progressive {
            for multiplier in MULTIPLIERS {
                let next = first.saturating_mul(multiplier).min(MAX_RADIUS_M);
                if rungs.last().is_some_and(|last| next > *last) {
                    rungs.push(next);
                }
            }
        }
        Self(rungs)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    #[must_use]
    pub fn first(&self) -> u32 {
        self.0[0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parses a user-typed radius in kilometres. Anything that is not a
/// positive finite number yields `None`, which the ladder treats as "use the
/// default".
#[must_use]
pub fn parse_start_km(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|km| km.is_finite() && *km > 0.0)
}
