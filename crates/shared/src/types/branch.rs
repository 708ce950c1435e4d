//! Branch catalogue.

use serde::{Deserialize, Serialize};

/// A location of the organization.
///
/// `Pusat` is the central office: it owns the main treasury and never holds
/// petty cash of its own. Every other variant is an outlet with its own
/// petty-cash drawer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Branch {
    /// Box production outlet.
    BoxFactory,
    /// Maintenance outlet.
    MaintenanceAlfa,
    /// Online shop outlet.
    SaufaOlshop,
    /// Central office.
    Pusat,
}

impl Branch {
    /// Outlets that carry a petty-cash balance.
    pub const OUTLETS: [Self; 3] = [Self::BoxFactory, Self::MaintenanceAlfa, Self::SaufaOlshop];

    /// Every branch, central office last.
    pub const ALL: [Self; 4] = [
        Self::BoxFactory,
        Self::MaintenanceAlfa,
        Self::SaufaOlshop,
        Self::Pusat,
    ];

    /// Returns true for the central office.
    #[must_use]
    pub const fn is_central(self) -> bool {
        matches!(self, Self::Pusat)
    }

    /// Stable storage code, e.g. `BOX_FACTORY`.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::BoxFactory => "BOX_FACTORY",
            Self::MaintenanceAlfa => "MAINTENANCE_ALFA",
            Self::SaufaOlshop => "SAUFA_OLSHOP",
            Self::Pusat => "PUSAT",
        }
    }

    /// Human readable name, e.g. `Box Factory`.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::BoxFactory => "Box Factory",
            Self::MaintenanceAlfa => "Maintenance Alfa",
            Self::SaufaOlshop => "Saufa Olshop",
            Self::Pusat => "Pusat",
        }
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Branch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|branch| branch.code() == normalized)
            .ok_or_else(|| format!("Unknown branch: {s}"))
    }
}
