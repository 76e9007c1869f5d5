use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Liquidity protocols supported on Injective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolKind {
    Helix,
    Hydro,
    Neptune,
}

impl ProtocolKind {
    pub const ALL: [ProtocolKind; 3] = [ProtocolKind::Helix, ProtocolKind::Hydro, ProtocolKind::Neptune];

    /// Identifier used as registry key, config file name and pool id prefix
    pub fn id(&self) -> &'static str {
        match self {
            ProtocolKind::Helix => "helix",
            ProtocolKind::Hydro => "hydro",
            ProtocolKind::Neptune => "neptune",
        }
    }

    /// Name reported as a pool's `provider`
    pub fn provider_name(&self) -> &'static str {
        match self {
            ProtocolKind::Helix => "Helix",
            ProtocolKind::Hydro => "Hydro",
            ProtocolKind::Neptune => "Neptune",
        }
    }

    pub fn default_api_url(&self) -> String {
        format!("https://{}.injective.network/api", self.id())
    }

    /// Daily volume as a fraction of TVL, `(low, high)`
    pub fn volume_fraction_range(&self) -> (f64, f64) {
        match self {
            ProtocolKind::Helix => (0.05, 0.15),
            ProtocolKind::Hydro => (0.02, 0.12),
            ProtocolKind::Neptune => (0.06, 0.18),
        }
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProtocolKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "helix" => Ok(ProtocolKind::Helix),
            "hydro" => Ok(ProtocolKind::Hydro),
            "neptune" => Ok(ProtocolKind::Neptune),
            other => Err(AppError::UnknownProtocol(other.to_string())),
        }
    }
}
