//! Extrusion flow model.
//!
//! A [`Flow`] describes one extruded bead: its width, its height (the layer
//! height), the nozzle it comes out of and whether it is a bridge. From
//! those it derives the centerline spacing between neighbouring beads and
//! the volumetric rate per millimetre of travel.
//!
//! Non-bridge beads are modelled as a rectangle with semicircular ends:
//!
//! ```text
//!   spacing   = width - overlap * height * (1 - π/4)
//!   mm3_per_mm = height * (width - height * (1 - π/4))
//! ```
//!
//! Bridges are round threads of diameter `width`, laid out with a fixed
//! extra gap of [`BRIDGE_EXTRA_SPACING`] between neighbours.
//!
//! Invalid inputs (non-positive height, width, spacing or nozzle diameter)
//! are caller bugs and come back as a [`FlowError`] straight away; nothing
//! here tries to patch them up.

use crate::config::ExtrusionWidth;
use crate::{scale, Coord, CoordF, EPSILON};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Extra gap between neighbouring bridge threads, in mm.
pub const BRIDGE_EXTRA_SPACING: CoordF = 0.05;

/// Area lost at the two rounded ends of a bead, per unit height squared.
const ROUNDED_CORNER_FACTOR: CoordF = 1.0 - PI / 4.0;

/// Maximum widening allowed by [`solid_spacing`].
const SOLID_SPACING_MAX_FACTOR: CoordF = 1.2;

/// The kind of extrusion a flow is sized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlowRole {
    ExternalPerimeter,
    Perimeter,
    Infill,
    SolidInfill,
    TopSolidInfill,
    SupportMaterial,
    SupportMaterialInterface,
    GapFill,
}

/// Precondition violations when building or combining flows.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FlowError {
    #[error("invalid layer height {0} (must be > 0)")]
    InvalidHeight(CoordF),

    #[error("invalid extrusion width {0} (must be > 0)")]
    InvalidWidth(CoordF),

    #[error("invalid spacing {0} (must be > 0)")]
    InvalidSpacing(CoordF),

    #[error("invalid nozzle diameter {0} (must be > 0)")]
    InvalidNozzleDiameter(CoordF),

    #[error("width {width} at height {height} gives a non-positive spacing")]
    NegativeSpacing { width: CoordF, height: CoordF },

    #[error("cannot combine flows: {0}")]
    MismatchedFlows(String),
}

pub type FlowResult<T> = std::result::Result<T, FlowError>;

/// One extruded bead. All values are in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    width: CoordF,
    height: CoordF,
    nozzle_diameter: CoordF,
    bridge: bool,
    /// How much neighbouring beads overlap their rounded ends, 0..=1.
    spacing_ratio: CoordF,
}

impl Flow {
    /// Create a non-bridge flow with full overlap between neighbours.
    ///
    /// A height larger than the width is clamped down to the width.
    pub fn new(width: CoordF, height: CoordF, nozzle_diameter: CoordF) -> FlowResult<Self> {
        Self::with_params(width, height, nozzle_diameter, 1.0, false)
    }

    fn with_params(
        width: CoordF,
        height: CoordF,
        nozzle_diameter: CoordF,
        spacing_ratio: CoordF,
        bridge: bool,
    ) -> FlowResult<Self> {
        if !(width > 0.0) {
            return Err(FlowError::InvalidWidth(width));
        }
        if !(height > 0.0) {
            return Err(FlowError::InvalidHeight(height));
        }
        if !(nozzle_diameter > 0.0) {
            return Err(FlowError::InvalidNozzleDiameter(nozzle_diameter));
        }
        let height = if height > width {
            log::debug!(
                "Flow height {:.4} exceeds width {:.4}, clamping height to width",
                height,
                width
            );
            width
        } else {
            height
        };
        Ok(Self {
            width,
            height,
            nozzle_diameter,
            bridge,
            spacing_ratio: spacing_ratio.clamp(0.0, 1.0),
        })
    }

    /// A round bridge thread of the given diameter.
    pub fn bridging_flow(diameter: CoordF, nozzle_diameter: CoordF) -> Self {
        Self {
            width: diameter,
            height: diameter,
            nozzle_diameter,
            bridge: true,
            spacing_ratio: 1.0,
        }
    }

    /// Size a flow from a configured width.
    ///
    /// With `bridge_flow_ratio > 0` the bead is a round thread of diameter
    /// `sqrt(bridge_flow_ratio) * nozzle_diameter`. Otherwise an auto width
    /// (`0`) is derived from the nozzle and layer height, and an explicit
    /// width is taken as absolute mm or as a percentage of the nozzle.
    pub fn new_from_config_width(
        role: FlowRole,
        width: ExtrusionWidth,
        nozzle_diameter: CoordF,
        height: CoordF,
        overlap_ratio: CoordF,
        bridge_flow_ratio: CoordF,
    ) -> FlowResult<Self> {
        if !(nozzle_diameter > 0.0) {
            return Err(FlowError::InvalidNozzleDiameter(nozzle_diameter));
        }
        if bridge_flow_ratio > 0.0 {
            let diameter = bridge_flow_ratio.sqrt() * nozzle_diameter;
            return Ok(Self::bridging_flow(diameter, nozzle_diameter));
        }
        if !(height > 0.0) {
            return Err(FlowError::InvalidHeight(height));
        }

        let w = if width.is_auto() {
            auto_extrusion_width(role, nozzle_diameter, height)
        } else {
            width.get_abs_value(nozzle_diameter)
        };
        Self::with_params(w, height, nozzle_diameter, overlap_ratio, false)
    }

    /// Inverse of [`spacing`](Self::spacing): the flow whose spacing is `spacing`.
    pub fn new_from_spacing(
        spacing: CoordF,
        nozzle_diameter: CoordF,
        height: CoordF,
        overlap_ratio: CoordF,
        bridge: bool,
    ) -> FlowResult<Self> {
        if !(spacing > 0.0) {
            return Err(FlowError::InvalidSpacing(spacing));
        }
        if bridge {
            let width = spacing - BRIDGE_EXTRA_SPACING;
            if !(width > 0.0) {
                return Err(FlowError::InvalidSpacing(spacing));
            }
            let mut flow = Self::bridging_flow(width, nozzle_diameter);
            flow.spacing_ratio = overlap_ratio.clamp(0.0, 1.0);
            return Ok(flow);
        }
        if !(height > 0.0) {
            return Err(FlowError::InvalidHeight(height));
        }
        let ratio = overlap_ratio.clamp(0.0, 1.0);
        let width = spacing + ratio * height * ROUNDED_CORNER_FACTOR;
        Self::with_params(width, height, nozzle_diameter, ratio, false)
    }

    #[inline]
    pub fn width(&self) -> CoordF {
        self.width
    }

    #[inline]
    pub fn height(&self) -> CoordF {
        self.height
    }

    #[inline]
    pub fn nozzle_diameter(&self) -> CoordF {
        self.nozzle_diameter
    }

    #[inline]
    pub fn is_bridge(&self) -> bool {
        self.bridge
    }

    #[inline]
    pub fn spacing_ratio(&self) -> CoordF {
        self.spacing_ratio
    }

    /// Centerline distance between two neighbouring beads of this flow.
    pub fn spacing(&self) -> CoordF {
        if self.bridge {
            self.width + BRIDGE_EXTRA_SPACING
        } else {
            self.width - self.spacing_ratio * self.height * ROUNDED_CORNER_FACTOR
        }
    }

    /// Centerline distance between a bead of this flow and one of `other`.
    pub fn spacing_with(&self, other: &Flow) -> FlowResult<CoordF> {
        if (self.height - other.height).abs() > EPSILON {
            return Err(FlowError::MismatchedFlows(format!(
                "heights {} and {} differ",
                self.height, other.height
            )));
        }
        if self.bridge != other.bridge {
            return Err(FlowError::MismatchedFlows(
                "cannot mix bridge and non-bridge flows".into(),
            ));
        }
        Ok(if self.bridge {
            0.5 * self.width + 0.5 * other.width + BRIDGE_EXTRA_SPACING
        } else {
            0.5 * self.spacing() + 0.5 * other.spacing()
        })
    }

    /// Cross-section area in mm², i.e. mm³ extruded per mm of travel.
    pub fn mm3_per_mm(&self) -> FlowResult<CoordF> {
        let area = self.mm3_per_mm_unchecked();
        if area > 0.0 {
            Ok(area)
        } else {
            Err(FlowError::NegativeSpacing {
                width: self.width,
                height: self.height,
            })
        }
    }

    /// Like [`mm3_per_mm`](Self::mm3_per_mm) without the positivity check.
    pub fn mm3_per_mm_unchecked(&self) -> CoordF {
        if self.bridge {
            self.width * self.width * PI / 4.0
        } else {
            self.height * (self.width - self.height * ROUNDED_CORNER_FACTOR)
        }
    }

    pub fn with_width(&self, width: CoordF) -> FlowResult<Self> {
        if self.bridge {
            if !(width > 0.0) {
                return Err(FlowError::InvalidWidth(width));
            }
            let mut flow = *self;
            flow.width = width;
            flow.height = width;
            return Ok(flow);
        }
        Self::with_params(
            width,
            self.height,
            self.nozzle_diameter,
            self.spacing_ratio,
            false,
        )
    }

    pub fn with_height(&self, height: CoordF) -> FlowResult<Self> {
        Self::with_params(
            self.width,
            height,
            self.nozzle_diameter,
            self.spacing_ratio,
            self.bridge,
        )
    }

    /// Same flow resized so that its spacing becomes `spacing`.
    pub fn with_spacing(&self, spacing: CoordF) -> FlowResult<Self> {
        Self::new_from_spacing(
            spacing,
            self.nozzle_diameter,
            self.height,
            self.spacing_ratio,
            self.bridge,
        )
    }

    pub fn with_spacing_ratio(&self, ratio: CoordF) -> Self {
        let mut flow = *self;
        flow.spacing_ratio = ratio.clamp(0.0, 1.0);
        flow
    }

    #[inline]
    pub fn scaled_width(&self) -> Coord {
        scale(self.width)
    }

    #[inline]
    pub fn scaled_spacing(&self) -> Coord {
        scale(self.spacing())
    }

    /// Spacing of a rounded-rectangle bead with full overlap.
    pub fn rounded_rectangle_extrusion_spacing(width: CoordF, height: CoordF) -> FlowResult<CoordF> {
        let spacing = width - height * ROUNDED_CORNER_FACTOR;
        if spacing <= 0.0 {
            return Err(FlowError::NegativeSpacing { width, height });
        }
        Ok(spacing)
    }

    /// Width of a rounded-rectangle bead whose full-overlap spacing is `spacing`.
    pub fn rounded_rectangle_extrusion_width_from_spacing(spacing: CoordF, height: CoordF) -> CoordF {
        spacing + height * ROUNDED_CORNER_FACTOR
    }
}

/// Default width for a role when the configured width is "auto".
///
/// Solves for the flattened bead whose cross-section matches a round thread
/// of nozzle diameter, then clamps it per role. External perimeters and
/// support are pinned to the nozzle diameter and sparse infill is left
/// uncapped; everything else stays within `[1.05, 1.7] × nozzle`.
pub fn auto_extrusion_width(role: FlowRole, nozzle_diameter: CoordF, height: CoordF) -> CoordF {
    let width = (nozzle_diameter * nozzle_diameter * PI + height * height * (4.0 - PI))
        / (4.0 * height);

    let (min, max) = match role {
        FlowRole::ExternalPerimeter
        | FlowRole::SupportMaterial
        | FlowRole::SupportMaterialInterface => (nozzle_diameter, Some(nozzle_diameter)),
        FlowRole::Infill => (nozzle_diameter * 1.05, None),
        _ => (nozzle_diameter * 1.05, Some(nozzle_diameter * 1.7)),
    };

    let width = match max {
        Some(max) if width > max => max,
        _ => width,
    };
    width.max(min)
}

/// Adjust `spacing` (mm) so an integer number of beads spans `total_width`
/// exactly, with the end beads centred on the interval boundaries.
///
/// The result never shrinks the spacing and never widens it by more than
/// 20%; past that the beads under-fill and the caller accepts the gap.
pub fn solid_spacing(total_width: CoordF, spacing: CoordF) -> FlowResult<CoordF> {
    if !(spacing > 0.0) {
        return Err(FlowError::InvalidSpacing(spacing));
    }
    if total_width < 0.0 {
        return Err(FlowError::InvalidWidth(total_width));
    }
    let intervals = ((total_width - EPSILON) / spacing).floor();
    if intervals < 1.0 {
        return Ok(spacing);
    }
    let spacing_new = total_width / intervals;
    if spacing_new / spacing > SOLID_SPACING_MAX_FACTOR {
        return Ok(spacing * SOLID_SPACING_MAX_FACTOR);
    }
    Ok(spacing_new.max(spacing))
}

/// Scaled-integer version of [`solid_spacing`].
pub fn solid_spacing_scaled(total_width: Coord, spacing: Coord) -> FlowResult<Coord> {
    if spacing <= 0 {
        return Err(FlowError::InvalidSpacing(spacing as CoordF));
    }
    if total_width < 0 {
        return Err(FlowError::InvalidWidth(total_width as CoordF));
    }
    let intervals = (total_width as CoordF - EPSILON) / spacing as CoordF;
    let intervals = intervals.max(0.0) as Coord;
    if intervals == 0 {
        return Ok(spacing);
    }
    let spacing_new = total_width / intervals;
    let factor = spacing_new as CoordF / spacing as CoordF;
    if factor > SOLID_SPACING_MAX_FACTOR {
        return Ok((spacing as CoordF * SOLID_SPACING_MAX_FACTOR + 0.5).floor() as Coord);
    }
    Ok(spacing_new)
}
