//! Configuration types.
//!
//! Only the numeric inputs the flow model and the medial-axis engine need
//! live here. The engine itself never reads these structs: callers resolve
//! them into a [`Flow`](crate::Flow) and a
//! [`MedialAxisParams`](crate::MedialAxisParams) first.

mod print_config;

pub use print_config::{FlowConfig, ThinWallConfig};

use crate::CoordF;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An extrusion width setting: absolute millimetres or a percentage of a
/// reference value (usually the nozzle diameter). Zero means "auto".
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtrusionWidth {
    pub value: CoordF,
    pub percent: bool,
}

impl ExtrusionWidth {
    /// Let the flow model pick the width.
    pub const fn auto() -> Self {
        Self {
            value: 0.0,
            percent: false,
        }
    }

    pub const fn absolute(mm: CoordF) -> Self {
        Self {
            value: mm,
            percent: false,
        }
    }

    /// `percent` of the reference value, e.g. `150.0` for 150%.
    pub const fn percent(percent: CoordF) -> Self {
        Self {
            value: percent,
            percent: true,
        }
    }

    #[inline]
    pub fn is_auto(&self) -> bool {
        self.value <= 0.0
    }

    /// Resolve to millimetres against `reference`.
    pub fn get_abs_value(&self, reference: CoordF) -> CoordF {
        if self.percent {
            reference * self.value / 100.0
        } else {
            self.value
        }
    }
}

impl fmt::Display for ExtrusionWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_auto() {
            write!(f, "auto")
        } else if self.percent {
            write!(f, "{}%", self.value)
        } else {
            write!(f, "{}mm", self.value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extrusion_width_resolution() {
        assert!(ExtrusionWidth::auto().is_auto());
        assert!((ExtrusionWidth::percent(150.0).get_abs_value(0.4) - 0.6).abs() < 1e-12);
        assert_eq!(ExtrusionWidth::absolute(0.45).get_abs_value(0.4), 0.45);
    }

    #[test]
    fn test_extrusion_width_display_and_json() {
        assert_eq!(ExtrusionWidth::percent(33.0).to_string(), "33%");
        assert_eq!(ExtrusionWidth::auto().to_string(), "auto");
        let json = serde_json::to_string(&ExtrusionWidth::absolute(0.5)).unwrap();
        assert_eq!(json, r#"{"value":0.5,"percent":false}"#);
        let back: ExtrusionWidth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ExtrusionWidth::absolute(0.5));
    }
}
