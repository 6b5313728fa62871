//! Extrusion roles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What an extrusion is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ExtrusionRole {
    #[default]
    None,
    /// Internal perimeter.
    Perimeter,
    /// External (outer) perimeter.
    ExternalPerimeter,
    /// Perimeter printed over air.
    OverhangPerimeter,
    /// Sparse infill.
    InternalInfill,
    /// Solid infill.
    SolidInfill,
    /// Top solid infill (visible surface).
    TopSolidInfill,
    Ironing,
    /// Bridge over air, visible from below.
    BridgeInfill,
    /// Bridge over sparse infill.
    InternalBridgeInfill,
    /// Variable-width wall too thin for a perimeter loop.
    ThinWall,
    /// Variable-width fill between perimeters.
    GapFill,
    /// Skirt/brim.
    Skirt,
    SupportMaterial,
    SupportMaterialInterface,
    WipeTower,
    Milling,
    Custom,
    /// A collection holding more than one role.
    Mixed,
}

impl ExtrusionRole {
    pub fn is_perimeter(&self) -> bool {
        matches!(
            self,
            ExtrusionRole::Perimeter | ExtrusionRole::ExternalPerimeter | ExtrusionRole::OverhangPerimeter
        )
    }

    pub fn is_external_perimeter(&self) -> bool {
        matches!(self, ExtrusionRole::ExternalPerimeter | ExtrusionRole::OverhangPerimeter)
    }

    pub fn is_infill(&self) -> bool {
        matches!(
            self,
            ExtrusionRole::InternalInfill
                | ExtrusionRole::SolidInfill
                | ExtrusionRole::TopSolidInfill
                | ExtrusionRole::Ironing
                | ExtrusionRole::BridgeInfill
                | ExtrusionRole::InternalBridgeInfill
        )
    }

    pub fn is_solid_infill(&self) -> bool {
        self.is_infill() && *self != ExtrusionRole::InternalInfill
    }

    pub fn is_bridge(&self) -> bool {
        matches!(
            self,
            ExtrusionRole::BridgeInfill | ExtrusionRole::InternalBridgeInfill | ExtrusionRole::OverhangPerimeter
        )
    }

    pub fn is_support(&self) -> bool {
        matches!(
            self,
            ExtrusionRole::SupportMaterial | ExtrusionRole::SupportMaterialInterface
        )
    }

    /// Role of a container holding `a` and `b`.
    pub fn mixed_of(a: ExtrusionRole, b: ExtrusionRole) -> ExtrusionRole {
        match (a, b) {
            (a, b) if a == b => a,
            (ExtrusionRole::None, other) | (other, ExtrusionRole::None) => other,
            _ => ExtrusionRole::Mixed,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExtrusionRole::None => "none",
            ExtrusionRole::Perimeter => "perimeter",
            ExtrusionRole::ExternalPerimeter => "external perimeter",
            ExtrusionRole::OverhangPerimeter => "overhang perimeter",
            ExtrusionRole::InternalInfill => "internal infill",
            ExtrusionRole::SolidInfill => "solid infill",
            ExtrusionRole::TopSolidInfill => "top solid infill",
            ExtrusionRole::Ironing => "ironing",
            ExtrusionRole::BridgeInfill => "bridge infill",
            ExtrusionRole::InternalBridgeInfill => "internal bridge infill",
            ExtrusionRole::ThinWall => "thin wall",
            ExtrusionRole::GapFill => "gap fill",
            ExtrusionRole::Skirt => "skirt",
            ExtrusionRole::SupportMaterial => "support material",
            ExtrusionRole::SupportMaterialInterface => "support interface",
            ExtrusionRole::WipeTower => "wipe tower",
            ExtrusionRole::Milling => "milling",
            ExtrusionRole::Custom => "custom",
            ExtrusionRole::Mixed => "mixed",
        }
    }
}

impl fmt::Display for ExtrusionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why a loop exists; drives seam and ordering choices downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ExtrusionLoopRole {
    #[default]
    Default,
    /// Perimeter around a hole, printed from the inside.
    ContourInternalPerimeter,
    Skirt,
    /// Closed thin wall produced by the medial axis.
    ThinWall,
}
