//! Network profile classification

use crate::platform::{ConnectionInfo, EffectiveType};

/// Snapshot of network conditions and user preferences, taken once at boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkProfile {
    pub save_data_requested: bool,
    pub effective_type: EffectiveType,
    /// Save-data requested, or a slow-2g/2g/3g connection
    pub is_slow: bool,
    pub prefers_reduced_motion: bool,
}

impl Default for NetworkProfile {
    /// What a platform without connection hints looks like
    fn default() -> Self {
        Self {
            save_data_requested: false,
            effective_type: EffectiveType::FourG,
            is_slow: false,
            prefers_reduced_motion: false,
        }
    }
}

/// Derive the profile from the connection hints, if the platform has any
pub fn classify(connection: Option<&ConnectionInfo>, prefers_reduced_motion: bool) -> NetworkProfile {
    let Some(info) = connection else {
        return NetworkProfile {
            prefers_reduced_motion,
            ..NetworkProfile::default()
        };
    };

    NetworkProfile {
        save_data_requested: info.save_data,
        effective_type: info.effective_type,
        is_slow: info.save_data || info.effective_type.is_constrained(),
        prefers_reduced_motion,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection(effective_type: EffectiveType, save_data: bool) -> ConnectionInfo {
        ConnectionInfo {
            effective_type,
            save_data,
        }
    }

    #[test]
    fn test_missing_facility_defaults_to_fast() {
        let profile = classify(None, true);
        assert_eq!(profile.effective_type, EffectiveType::FourG);
        assert!(!profile.is_slow);
        assert!(!profile.save_data_requested);
        assert!(profile.prefers_reduced_motion);
    }

    #[test]
    fn test_constrained_types_are_slow() {
        for ty in [EffectiveType::Slow2g, EffectiveType::TwoG, EffectiveType::ThreeG] {
            assert!(classify(Some(&connection(ty, false)), false).is_slow, "{:?}", ty);
        }
        assert!(!classify(Some(&connection(EffectiveType::FourG, false)), false).is_slow);
        assert!(!classify(Some(&connection(EffectiveType::Unknown, false)), false).is_slow);
    }

    #[test]
    fn test_save_data_forces_slow() {
        let profile = classify(Some(&connection(EffectiveType::FourG, true)), false);
        assert!(profile.is_slow);
        assert!(profile.save_data_requested);
        assert_eq!(profile.effective_type, EffectiveType::FourG);
    }
}
