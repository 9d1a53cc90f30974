use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete signal-quality bucket for a measured strength in dBm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalTier {
    Excellent,
    Good,
    Weak,
    Marginal,
    NoSignal,
    Invalid,
}

impl SignalTier {
    /// Lower bounds (inclusive) of each tier, strongest first.
    const BOUNDS: [(f64, SignalTier); 4] = [
        (-85.0, SignalTier::Excellent),
        (-100.0, SignalTier::Good),
        (-115.0, SignalTier::Weak),
        (-125.0, SignalTier::Marginal),
    ];

    pub fn classify(strength: Option<f64>) -> Self {
        let Some(value) = strength.filter(|v| !v.is_nan()) else {
            return SignalTier::Invalid;
        };
        Self::BOUNDS
            .iter()
            .find(|(lower, _)| value >= *lower)
            .map(|(_, tier)| *tier)
            .unwrap_or(SignalTier::NoSignal)
    }

    /// Display colour used by the map legend.
    pub fn color(&self) -> &'static str {
        match self {
            SignalTier::Excellent => "darkgreen",
            SignalTier::Good => "limegreen",
            SignalTier::Weak => "orange",
            SignalTier::Marginal => "red",
            SignalTier::NoSignal => "darkred",
            SignalTier::Invalid => "grey",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SignalTier::Excellent => "excellent",
            SignalTier::Good => "good",
            SignalTier::Weak => "weak",
            SignalTier::Marginal => "marginal",
            SignalTier::NoSignal => "no_signal",
            SignalTier::Invalid => "invalid",
        }
    }
}

impl fmt::Display for SignalTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_are_exact() {
        assert_eq!(SignalTier::classify(Some(-85.0)), SignalTier::Excellent);
        assert_eq!(SignalTier::classify(Some(-85.0001)), SignalTier::Good);
        assert_eq!(SignalTier::classify(Some(-100.0)), SignalTier::Good);
        assert_eq!(SignalTier::classify(Some(-100.5)), SignalTier::Weak);
        assert_eq!(SignalTier::classify(Some(-115.0)), SignalTier::Weak);
        assert_eq!(SignalTier::classify(Some(-125.0)), SignalTier::Marginal);
        assert_eq!(SignalTier::classify(Some(-125.0001)), SignalTier::NoSignal);
    }

    #[test]
    fn strong_signal_is_excellent() {
        assert_eq!(SignalTier::classify(Some(-40.0)), SignalTier::Excellent);
        assert_eq!(SignalTier::classify(Some(5.0)), SignalTier::Excellent);
    }

    #[test]
    fn missing_or_nan_strength_is_invalid() {
        assert_eq!(SignalTier::classify(None), SignalTier::Invalid);
        assert_eq!(SignalTier::classify(Some(f64::NAN)), SignalTier::Invalid);
    }

    #[test]
    fn tiers_have_legend_colors() {
        assert_eq!(SignalTier::Excellent.color(), "darkgreen");
        assert_eq!(SignalTier::Invalid.color(), "grey");
        assert_eq!(SignalTier::NoSignal.to_string(), "no_signal");
    }
}
