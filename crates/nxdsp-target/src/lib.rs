#![warn(missing_docs)]
//! Target descriptions for nxdsp.
//!
//! A [`Target`] records the host's natural vector width and the wide-vector
//! DSP modes the device supports. Passes consult it for the lane counts and
//! alignments the hardware prefers.

use std::fmt;
use std::str::FromStr;

use nxdsp_ir::Scalar;

/// A device capability flag.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Feature {
    /// Wide-vector DSP running in 64-byte vector mode.
    Hvx64,
    /// Wide-vector DSP running in 128-byte vector mode.
    Hvx128,
}

impl Feature {
    const ALL: [Feature; 2] = [Feature::Hvx64, Feature::Hvx128];

    fn bit(self) -> u32 {
        match self {
            Self::Hvx64 => 1,
            Self::Hvx128 => 2,
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Hvx64 => "hvx_64",
            Self::Hvx128 => "hvx_128",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bitflags for a set of [`Feature`]s.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
pub struct Features(u32);

impl Features {
    /// Empty set (no flags set).
    pub const EMPTY: Self = Self(0);

    /// Returns `true` if `self` contains `feature`.
    pub fn contains(self, feature: Feature) -> bool {
        self.0 & feature.bit() != 0
    }

    /// Returns `true` if no flags are set.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr<Feature> for Features {
    type Output = Self;
    fn bitor(self, rhs: Feature) -> Self {
        Self(self.0 | rhs.bit())
    }
}

/// Errors from parsing a target string.
#[derive(Debug, thiserror::Error)]
pub enum ParseTargetError {
    /// The feature list names a capability this crate does not know.
    #[error("unknown target feature '{0}' (expected hvx_64 or hvx_128)")]
    UnknownFeature(String),
}

/// A compilation target: host vector width plus device features.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Target {
    vector_bits: u32,
    features: Features,
}

impl Default for Target {
    fn default() -> Self {
        Self::new()
    }
}

impl Target {
    /// A host-only target with 128-bit vectors and no device features.
    pub fn new() -> Self {
        Self {
            vector_bits: 128,
            features: Features::EMPTY,
        }
    }

    /// Adds a device feature.
    pub fn with_feature(mut self, feature: Feature) -> Self {
        self.features = self.features | feature;
        self
    }

    /// Returns `true` if the target carries `feature`.
    pub fn has_feature(&self, feature: Feature) -> bool {
        self.features.contains(feature)
    }

    /// Byte width of the host's natural vector.
    pub fn natural_vector_bytes(&self) -> u32 {
        self.vector_bits / 8
    }

    /// The lane count the target prefers for loads of `scalar`.
    ///
    /// For a one-byte element this equals the natural vector byte width.
    pub fn natural_vector_size(&self, scalar: Scalar) -> u32 {
        self.natural_vector_bytes() / scalar.width as u32
    }
}

impl FromStr for Target {
    type Err = ParseTargetError;

    /// Parses a comma-separated feature list, e.g. `"hvx_128"` or
    /// `"hvx_64,hvx_128"`. The empty string is the host-only target.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut target = Target::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let feature = Feature::ALL
                .into_iter()
                .find(|f| f.name() == part)
                .ok_or_else(|| ParseTargetError::UnknownFeature(part.to_string()))?;
            target = target.with_feature(feature);
        }
        Ok(target)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for feature in Feature::ALL {
            if self.features.contains(feature) {
                if !first {
                    f.write_str(",")?;
                }
                write!(f, "{feature}")?;
                first = false;
            }
        }
        Ok(())
    }
}
