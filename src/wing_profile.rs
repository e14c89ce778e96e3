use crate::errors::WindTunnelError;

pub const DEFAULT_PROFILE_ID: &str = "naca0012";

/// A wing profile that can be mounted in the tunnel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WingProfile {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Highest wind speed the test ramps to (m/s)
    pub max_speed: f64,
}

pub static WING_PROFILES: [WingProfile; 4] = [
    WingProfile {
        id: "naca0012",
        name: "NACA 0012",
        description: "Symmetric wing profile",
        max_speed: 30.,
    },
    WingProfile {
        id: "naca2412",
        name: "NACA 2412",
        description: "Cambered wing profile",
        max_speed: 30.,
    },
    WingProfile {
        id: "naca4412",
        name: "NACA 4412",
        description: "High-camber wing profile",
        max_speed: 30.,
    },
    WingProfile {
        id: "naca1408",
        name: "NACA 1408",
        description: "Low-camber wing profile",
        max_speed: 30.,
    },
];

pub fn find_profile(id: &str) -> Option<&'static WingProfile> {
    WING_PROFILES.iter().find(|profile| profile.id == id)
}

pub fn profile(id: &str) -> Result<&'static WingProfile, WindTunnelError> {
    find_profile(id).ok_or_else(|| WindTunnelError::UnknownWingProfile { id: id.to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(find_profile("naca4412").map(|p| p.name), Some("NACA 4412"));
        assert!(find_profile(DEFAULT_PROFILE_ID).is_some());
        assert!(find_profile("naca9999").is_none());
        assert!(matches!(
            profile("naca9999"),
            Err(WindTunnelError::UnknownWingProfile { .. })
        ));
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        for (i, a) in WING_PROFILES.iter().enumerate() {
            assert!(a.max_speed > 0.);
            for b in WING_PROFILES.iter().skip(i + 1) {
                assert_ne!(a.id, b.id);
            }
        }
    }
}
