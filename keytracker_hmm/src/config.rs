// Key tracker configuration.
//
// Which transition (distance) profile and which key-profile pair to use, and
// optionally custom vectors replacing the named ones. Loaded from JSON or
// built in code, then resolved exactly once into numeric vectors by
// `resolve()`. Parsing rejects unknown fields. Resolution is where the
// remaining configuration errors surface: unknown names, wrong-length
// vectors, negative or non-finite weights. A
// resolved configuration can no longer fail, and `KeyModel` (in
// `pipeline.rs`) is built from it.
//
// Example file:
//
//   {
//     "transitions": "exponential-10",
//     "key_profile": "sapp"
//   }
//
// Custom vectors take precedence over the names:
//
//   {
//     "custom_distance": [ ...24 weights... ],
//     "custom_key_profile": { "major": [ ...12... ], "minor": [ ...12... ] }
//   }

use crate::error::Result;
use crate::profiles::{
    DistanceProfile, DistanceProfileName, KeyProfile, KeyProfileName, ModeProfiles,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Transition profile used when none is configured.
pub const DEFAULT_TRANSITIONS: DistanceProfileName = DistanceProfileName::Exponential10;

/// Key profile used when none is configured.
pub const DEFAULT_KEY_PROFILE: KeyProfileName = KeyProfileName::Sapp;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeyTrackerConfig {
    /// Name of the distance profile behind the pass-1 transition table.
    pub transitions: String,
    /// Name of the major/minor key-profile pair behind the emission table.
    pub key_profile: String,
    /// Replaces the named distance profile when present (24 weights).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_distance: Option<Vec<f64>>,
    /// Replaces the named key profiles when present (12 weights per mode).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_key_profile: Option<CustomKeyProfile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomKeyProfile {
    pub major: Vec<f64>,
    pub minor: Vec<f64>,
}

impl Default for KeyTrackerConfig {
    fn default() -> Self {
        KeyTrackerConfig {
            transitions: DEFAULT_TRANSITIONS.to_string(),
            key_profile: DEFAULT_KEY_PROFILE.to_string(),
            custom_distance: None,
            custom_key_profile: None,
        }
    }
}

impl KeyTrackerConfig {
    pub fn with_names(transitions: DistanceProfileName, key_profile: KeyProfileName) -> Self {
        KeyTrackerConfig {
            transitions: transitions.to_string(),
            key_profile: key_profile.to_string(),
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    /// Validate and turn names/custom vectors into numeric profiles.
    ///
    /// Names are checked even when a custom vector overrides them. Misspelled
    /// field names are already rejected when the JSON is parsed.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let transition_name: DistanceProfileName = self.transitions.parse()?;
        let key_profile_name: KeyProfileName = self.key_profile.parse()?;

        let distance = match &self.custom_distance {
            Some(weights) => DistanceProfile::from_weights(weights)?,
            None => DistanceProfile::named(transition_name),
        };
        let profiles = match &self.custom_key_profile {
            Some(custom) => ModeProfiles {
                major: KeyProfile::from_weights(&custom.major)?,
                minor: KeyProfile::from_weights(&custom.minor)?,
            },
            None => ModeProfiles::named(key_profile_name),
        };

        Ok(ResolvedConfig {
            distance,
            profiles,
            transition_label: label(transition_name.name(), self.custom_distance.is_some()),
            key_profile_label: label(key_profile_name.name(), self.custom_key_profile.is_some()),
        })
    }
}

fn label(name: &str, custom: bool) -> String {
    if custom {
        "custom".to_string()
    } else {
        name.to_string()
    }
}

/// Configuration after validation: concrete vectors plus human-readable
/// labels for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub distance: DistanceProfile,
    pub profiles: ModeProfiles,
    pub transition_label: String,
    pub key_profile_label: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KeyTrackerError;

    #[test]
    fn test_default_resolves() {
        let resolved = KeyTrackerConfig::default().resolve().unwrap();
        assert_eq!(
            resolved.distance,
            DistanceProfile::named(DEFAULT_TRANSITIONS)
        );
        assert_eq!(resolved.profiles, ModeProfiles::named(DEFAULT_KEY_PROFILE));
        assert_eq!(resolved.transition_label, "exponential-10");
        assert_eq!(resolved.key_profile_label, "sapp");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = KeyTrackerConfig::from_json_str(r#"{"key_profile": "temperley"}"#).unwrap();
        assert_eq!(config.transitions, DEFAULT_TRANSITIONS.name());
        let resolved = config.resolve().unwrap();
        assert_eq!(
            resolved.profiles,
            ModeProfiles::named(KeyProfileName::Temperley)
        );
    }

    #[test]
    fn test_unknown_name_is_configuration_error() {
        let config = KeyTrackerConfig {
            transitions: "quadratic".into(),
            ..Default::default()
        };
        let err = config.resolve().unwrap_err();
        assert!(err.is_configuration_error());
        assert!(matches!(err, KeyTrackerError::UnknownProfile { .. }));
    }

    #[test]
    fn test_custom_vectors_override_names() {
        let mut major = vec![0.0; 12];
        major[0] = 1.0;
        let config = KeyTrackerConfig {
            custom_distance: Some(vec![1.0 / 24.0; 24]),
            custom_key_profile: Some(CustomKeyProfile {
                major: major.clone(),
                minor: major,
            }),
            ..Default::default()
        };
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.distance.weights()[5], 1.0 / 24.0);
        assert_eq!(resolved.profiles.minor.weights()[0], 1.0);
        assert_eq!(resolved.transition_label, "custom");
        assert_eq!(resolved.key_profile_label, "custom");
    }

    #[test]
    fn test_custom_vector_length_checked() {
        let config = KeyTrackerConfig {
            custom_key_profile: Some(CustomKeyProfile {
                major: vec![0.1; 12],
                minor: vec![0.1; 7],
            }),
            ..Default::default()
        };
        assert!(matches!(
            config.resolve(),
            Err(KeyTrackerError::DimensionMismatch {
                expected: 12,
                actual: 7,
                ..
            })
        ));
    }

    #[test]
    fn test_malformed_json() {
        let err = KeyTrackerConfig::from_json_str("{ transitions: ").unwrap_err();
        assert!(matches!(err, KeyTrackerError::Json(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = KeyTrackerConfig::from_json_str(
            r#"{ "transition": "linear", "keyprofile": "temperley" }"#,
        )
        .unwrap_err();
        assert!(matches!(err, KeyTrackerError::Json(_)));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_unknown_custom_profile_field_rejected() {
        let major = vec![0.1; 12];
        let json = serde_json::json!({
            "custom_key_profile": { "major": major, "minor": major, "dorian": major }
        })
        .to_string();
        let err = KeyTrackerConfig::from_json_str(&json).unwrap_err();
        assert!(matches!(err, KeyTrackerError::Json(_)));
    }

    #[test]
    fn test_json_round_trip() {
        let config = KeyTrackerConfig::with_names(
            DistanceProfileName::Linear,
            KeyProfileName::BellmanBudge,
        );
        let json = serde_json::to_string_pretty(&config).unwrap();
        assert!(!json.contains("custom"));
        let restored = KeyTrackerConfig::from_json_str(&json).unwrap();
        assert_eq!(restored, config);
    }
}
