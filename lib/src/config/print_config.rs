//! Region configuration for flow sizing and thin-feature extraction.
//!
//! [`FlowConfig`] carries the extrusion width settings of a print region and
//! turns them into [`Flow`]s. [`ThinWallConfig`] carries the thin wall and
//! gap fill knobs and resolves them into scaled [`MedialAxisParams`].

use super::ExtrusionWidth;
use crate::flow::{Flow, FlowResult, FlowRole};
use crate::medial_axis::MedialAxisParams;
use crate::{scale, CoordF, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Flow sizing inputs for one print region.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    // === Machine / layer ===
    /// Nozzle diameter (mm).
    pub nozzle_diameter: CoordF,
    /// Layer height (mm).
    pub layer_height: CoordF,

    // === Widths (absolute mm, % of nozzle, or auto) ===
    pub external_perimeter_extrusion_width: ExtrusionWidth,
    pub perimeter_extrusion_width: ExtrusionWidth,
    pub infill_extrusion_width: ExtrusionWidth,
    pub solid_infill_extrusion_width: ExtrusionWidth,
    pub top_infill_extrusion_width: ExtrusionWidth,
    pub support_material_extrusion_width: ExtrusionWidth,
    pub support_material_interface_extrusion_width: ExtrusionWidth,
    pub gap_fill_extrusion_width: ExtrusionWidth,

    // === Overlap ===
    /// How much neighbouring perimeters overlap their rounded ends (0..=1).
    pub perimeter_overlap: CoordF,
    /// Same for the external perimeter against its inner neighbour.
    pub external_perimeter_overlap: CoordF,
    /// Same for infill lines.
    pub infill_overlap: CoordF,

    /// Bridge thread diameter as a fraction of the nozzle area; 0 disables.
    pub bridge_flow_ratio: CoordF,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            nozzle_diameter: 0.4,
            layer_height: 0.2,
            external_perimeter_extrusion_width: ExtrusionWidth::auto(),
            perimeter_extrusion_width: ExtrusionWidth::auto(),
            infill_extrusion_width: ExtrusionWidth::auto(),
            solid_infill_extrusion_width: ExtrusionWidth::auto(),
            top_infill_extrusion_width: ExtrusionWidth::auto(),
            support_material_extrusion_width: ExtrusionWidth::auto(),
            support_material_interface_extrusion_width: ExtrusionWidth::auto(),
            gap_fill_extrusion_width: ExtrusionWidth::auto(),
            perimeter_overlap: 1.0,
            external_perimeter_overlap: 1.0,
            infill_overlap: 1.0,
            bridge_flow_ratio: 0.0,
        }
    }
}

impl FlowConfig {
    /// Create a new FlowConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set nozzle diameter.
    pub fn nozzle_diameter(mut self, diameter: CoordF) -> Self {
        self.nozzle_diameter = diameter;
        self
    }

    /// Builder method: set layer height.
    pub fn layer_height(mut self, height: CoordF) -> Self {
        self.layer_height = height;
        self
    }

    /// Builder method: set the width used for `role`.
    pub fn width(mut self, role: FlowRole, width: ExtrusionWidth) -> Self {
        *self.width_mut(role) = width;
        self
    }

    /// Builder method: set the perimeter overlap ratio.
    pub fn perimeter_overlap(mut self, ratio: CoordF) -> Self {
        self.perimeter_overlap = ratio;
        self
    }

    /// Builder method: set the bridge flow ratio.
    pub fn bridge_flow_ratio(mut self, ratio: CoordF) -> Self {
        self.bridge_flow_ratio = ratio;
        self
    }

    pub fn width_for(&self, role: FlowRole) -> ExtrusionWidth {
        match role {
            FlowRole::ExternalPerimeter => self.external_perimeter_extrusion_width,
            FlowRole::Perimeter => self.perimeter_extrusion_width,
            FlowRole::Infill => self.infill_extrusion_width,
            FlowRole::SolidInfill => self.solid_infill_extrusion_width,
            FlowRole::TopSolidInfill => self.top_infill_extrusion_width,
            FlowRole::SupportMaterial => self.support_material_extrusion_width,
            FlowRole::SupportMaterialInterface => self.support_material_interface_extrusion_width,
            FlowRole::GapFill => self.gap_fill_extrusion_width,
        }
    }

    fn width_mut(&mut self, role: FlowRole) -> &mut ExtrusionWidth {
        match role {
            FlowRole::ExternalPerimeter => &mut self.external_perimeter_extrusion_width,
            FlowRole::Perimeter => &mut self.perimeter_extrusion_width,
            FlowRole::Infill => &mut self.infill_extrusion_width,
            FlowRole::SolidInfill => &mut self.solid_infill_extrusion_width,
            FlowRole::TopSolidInfill => &mut self.top_infill_extrusion_width,
            FlowRole::SupportMaterial => &mut self.support_material_extrusion_width,
            FlowRole::SupportMaterialInterface => {
                &mut self.support_material_interface_extrusion_width
            }
            FlowRole::GapFill => &mut self.gap_fill_extrusion_width,
        }
    }

    pub fn overlap_for(&self, role: FlowRole) -> CoordF {
        match role {
            FlowRole::ExternalPerimeter => self.external_perimeter_overlap,
            FlowRole::Perimeter | FlowRole::GapFill => self.perimeter_overlap,
            FlowRole::Infill | FlowRole::SolidInfill | FlowRole::TopSolidInfill => {
                self.infill_overlap
            }
            FlowRole::SupportMaterial | FlowRole::SupportMaterialInterface => 1.0,
        }
    }

    /// Non-bridge flow for `role`.
    pub fn flow(&self, role: FlowRole) -> FlowResult<Flow> {
        Flow::new_from_config_width(
            role,
            self.width_for(role),
            self.nozzle_diameter,
            self.layer_height,
            self.overlap_for(role),
            0.0,
        )
    }

    /// Bridge flow for `role`, using a ratio of 1 when none is configured.
    pub fn bridge_flow(&self, role: FlowRole) -> FlowResult<Flow> {
        let ratio = if self.bridge_flow_ratio > 0.0 {
            self.bridge_flow_ratio
        } else {
            1.0
        };
        Flow::new_from_config_width(
            role,
            self.width_for(role),
            self.nozzle_diameter,
            self.layer_height,
            self.overlap_for(role),
            ratio,
        )
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.layer_height <= 0.0 {
            return Err("Layer height must be positive".into());
        }
        if self.nozzle_diameter <= 0.0 {
            return Err("Nozzle diameter must be positive".into());
        }
        for (name, ratio) in [
            ("perimeter_overlap", self.perimeter_overlap),
            ("external_perimeter_overlap", self.external_perimeter_overlap),
            ("infill_overlap", self.infill_overlap),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(format!("{} must be within [0, 1], got {}", name, ratio));
            }
        }
        if self.bridge_flow_ratio < 0.0 {
            return Err("Bridge flow ratio must not be negative".into());
        }
        Ok(())
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate().map_err(Error::Config)?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for FlowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FlowConfig(nozzle={:.2}mm, layer={:.2}mm, perimeter={}, external={})",
            self.nozzle_diameter,
            self.layer_height,
            self.perimeter_extrusion_width,
            self.external_perimeter_extrusion_width
        )
    }
}

/// Thin wall and gap fill settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThinWallConfig {
    /// Generate centerline extrusions for walls too thin for a perimeter loop.
    pub thin_walls_enabled: bool,
    /// Fill the gaps left between perimeters.
    pub gap_fill_enabled: bool,
    /// Narrowest feature still extruded (absolute or % of nozzle).
    pub min_width: ExtrusionWidth,
    /// Widest feature treated as thin, as a multiple of the flow width.
    pub max_width_factor: CoordF,
    /// Length over which free ends ramp down in width (mm).
    pub taper_size: CoordF,
    /// Simplification tolerance for extracted centerlines (mm).
    pub resolution: CoordF,
    /// Gaps smaller than this are skipped (mm²); 0 uses the squared
    /// perimeter width.
    pub gap_fill_min_area: CoordF,
}

impl Default for ThinWallConfig {
    fn default() -> Self {
        Self {
            thin_walls_enabled: true,
            gap_fill_enabled: true,
            min_width: ExtrusionWidth::percent(33.0),
            max_width_factor: 2.0,
            taper_size: 0.2,
            resolution: 0.0125,
            gap_fill_min_area: 0.0,
        }
    }
}

impl ThinWallConfig {
    /// Create a new ThinWallConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: enable/disable thin walls.
    pub fn thin_walls(mut self, enabled: bool) -> Self {
        self.thin_walls_enabled = enabled;
        self
    }

    /// Builder method: enable/disable gap fill.
    pub fn gap_fill(mut self, enabled: bool) -> Self {
        self.gap_fill_enabled = enabled;
        self
    }

    /// Builder method: set the minimum printable width.
    pub fn min_width(mut self, width: ExtrusionWidth) -> Self {
        self.min_width = width;
        self
    }

    /// Builder method: set the maximum width factor.
    pub fn max_width_factor(mut self, factor: CoordF) -> Self {
        self.max_width_factor = factor;
        self
    }

    /// Builder method: set the taper length (mm).
    pub fn taper_size(mut self, size: CoordF) -> Self {
        self.taper_size = size;
        self
    }

    /// Builder method: set the centerline resolution (mm).
    pub fn resolution(mut self, resolution: CoordF) -> Self {
        self.resolution = resolution;
        self
    }

    /// Builder method: set the smallest gap worth filling (mm²).
    pub fn gap_fill_min_area(mut self, area: CoordF) -> Self {
        self.gap_fill_min_area = area;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.min_width.value < 0.0 {
            return Err("Minimum width must not be negative".into());
        }
        if self.max_width_factor <= 0.0 {
            return Err("Maximum width factor must be positive".into());
        }
        if self.taper_size < 0.0 {
            return Err("Taper size must not be negative".into());
        }
        if self.resolution <= 0.0 {
            return Err("Resolution must be positive".into());
        }
        if self.gap_fill_min_area < 0.0 {
            return Err("Gap fill minimum area must not be negative".into());
        }
        Ok(())
    }

    /// Resolve into scaled engine parameters for beads of `flow`.
    pub fn medial_axis_params(&self, flow: &Flow) -> MedialAxisParams {
        let nozzle = flow.nozzle_diameter();
        MedialAxisParams::new(
            scale(self.min_width.get_abs_value(nozzle)) as CoordF,
            scale(flow.width() * self.max_width_factor) as CoordF,
            scale(flow.height()) as CoordF,
        )
        .nozzle_diameter(scale(nozzle) as CoordF)
        .taper_size(scale(self.taper_size) as CoordF)
        .resolution(scale(self.resolution).max(1))
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate().map_err(Error::Config)?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for ThinWallConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ThinWallConfig(thin_walls={}, gap_fill={}, min={}, max={:.2}x)",
            self.thin_walls_enabled, self.gap_fill_enabled, self.min_width, self.max_width_factor
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_config_default() {
        let config = FlowConfig::default();
        assert!((config.layer_height - 0.2).abs() < 1e-6);
        assert!((config.nozzle_diameter - 0.4).abs() < 1e-6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_flow_config_builder() {
        let config = FlowConfig::new()
            .layer_height(0.15)
            .nozzle_diameter(0.6)
            .width(FlowRole::Perimeter, ExtrusionWidth::absolute(0.7));

        assert!((config.layer_height - 0.15).abs() < 1e-6);
        let flow = config.flow(FlowRole::Perimeter).unwrap();
        assert!((flow.width() - 0.7).abs() < 1e-9);
        assert!((flow.height() - 0.15).abs() < 1e-9);
    }

    #[test]
    fn test_flow_config_validation() {
        let mut config = FlowConfig::default();
        config.layer_height = 0.0;
        assert!(config.validate().is_err());

        config.layer_height = 0.2;
        config.infill_overlap = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_external_perimeter_auto_is_nozzle() {
        let config = FlowConfig::default();
        let flow = config.flow(FlowRole::ExternalPerimeter).unwrap();
        assert!((flow.width() - 0.4).abs() < 1e-9);
        assert!(!flow.is_bridge());
    }

    #[test]
    fn test_bridge_flow_defaults_to_nozzle() {
        let flow = FlowConfig::default().bridge_flow(FlowRole::Infill).unwrap();
        assert!(flow.is_bridge());
        assert_eq!(flow.width(), 0.4);
    }

    #[test]
    fn test_flow_config_json_round_trip() {
        let config = FlowConfig::new().layer_height(0.3);
        let json = config.to_json_string().unwrap();
        let back = FlowConfig::from_json_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_flow_config_json_partial_and_invalid() {
        let config = FlowConfig::from_json_str(r#"{"nozzle_diameter": 0.6}"#).unwrap();
        assert!((config.nozzle_diameter - 0.6).abs() < 1e-12);
        assert!((config.layer_height - 0.2).abs() < 1e-12);

        let err = FlowConfig::from_json_str(r#"{"layer_height": -1.0}"#).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        let err = FlowConfig::from_json_str("not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_thin_wall_params() {
        let flow = Flow::new(0.45, 0.2, 0.4).unwrap();
        let params = ThinWallConfig::new().max_width_factor(2.0).medial_axis_params(&flow);
        assert_eq!(params.min_width, scale(0.4 * 0.33) as CoordF);
        assert_eq!(params.max_width, scale(0.9) as CoordF);
        assert_eq!(params.height, scale(0.2) as CoordF);
        assert_eq!(params.nozzle_diameter, scale(0.4) as CoordF);
        assert_eq!(params.resolution, scale(0.0125));
    }

    #[test]
    fn test_thin_wall_validation() {
        assert!(ThinWallConfig::default().validate().is_ok());
        assert!(ThinWallConfig::new().resolution(0.0).validate().is_err());
        assert!(ThinWallConfig::new().taper_size(-1.0).validate().is_err());
    }
}
