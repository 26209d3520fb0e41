use serde::{Deserialize, Serialize};

use crate::api::error::ManifestError;
use crate::api::types::{BodyColor, BodyId};
use crate::core::hierarchy::{OrbitRadius, OrbitalBody, OrbitalHierarchy};
use crate::systems::decor::Pulse;

/// Body set for one animation, loaded from a JSON file at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemManifest {
    pub bodies: Vec<BodyDescriptor>,
}

/// Describes a single body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyDescriptor {
    pub id: u32,
    /// Parent id. Omitted for the root.
    #[serde(default)]
    pub parent_id: Option<u32>,
    /// Fixed orbit radius in pixels.
    #[serde(default)]
    pub orbit_radius: Option<f64>,
    /// Orbit radius as a fraction of the shorter viewport side.
    /// Takes precedence over `orbitRadius`.
    #[serde(default)]
    pub orbit_fraction: Option<f64>,
    #[serde(default)]
    pub angular_speed: f64,
    #[serde(default)]
    pub phase_offset: f64,
    #[serde(default = "default_visual_radius")]
    pub visual_radius: f32,
    #[serde(default)]
    pub color: BodyColor,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub pulse: Option<Pulse>,
}

fn default_visual_radius() -> f32 {
    5.0
}

impl BodyDescriptor {
    pub fn to_body(&self) -> OrbitalBody {
        let orbit_radius = match (self.orbit_fraction, self.orbit_radius) {
            (Some(fraction), Some(_)) => {
                log::warn!("body {} sets both orbitFraction and orbitRadius, using the fraction", self.id);
                OrbitRadius::ViewportFraction(fraction)
            }
            (Some(fraction), None) => OrbitRadius::ViewportFraction(fraction),
            (None, Some(radius)) => OrbitRadius::Fixed(radius),
            (None, None) => OrbitRadius::Fixed(0.0),
        };
        OrbitalBody {
            id: BodyId(self.id),
            parent: self.parent_id.map(BodyId),
            orbit_radius,
            angular_speed: self.angular_speed,
            phase_offset: self.phase_offset,
            visual_radius: self.visual_radius,
            color: self.color,
            label: self.label.clone(),
            pulse: self.pulse,
        }
    }
}

impl SystemManifest {
    /// Parse a manifest from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_bodies(&self) -> Vec<OrbitalBody> {
        self.bodies.iter().map(BodyDescriptor::to_body).collect()
    }

    /// Validate the bodies into a hierarchy.
    pub fn build(&self) -> Result<OrbitalHierarchy, ManifestError> {
        let hierarchy = OrbitalHierarchy::new(self.to_bodies())?;
        log::debug!("manifest loaded: {} bodies", hierarchy.len());
        Ok(hierarchy)
    }

    /// Parse and validate in one step.
    pub fn load(json: &str) -> Result<OrbitalHierarchy, ManifestError> {
        Self::from_json(json)?.build()
    }
}
