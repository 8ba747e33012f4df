use serde::{Deserialize, Serialize};

/// Purchase platform submitted by the client.
///
/// Only `pico` is backed by the live verification service; every other
/// identifier (including the `native` default) is routed to the simulated
/// validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Pico,
    Simulated,
}

impl Platform {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pico" => Self::Pico,
            _ => Self::Simulated,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pico => "pico",
            Self::Simulated => "simulated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pico_maps_to_live_platform() {
        assert_eq!(Platform::from_str("pico"), Platform::Pico);
        assert_eq!(Platform::from_str("PICO"), Platform::Pico);
    }

    #[test]
    fn unknown_platforms_fall_back_to_simulated() {
        assert_eq!(Platform::from_str("native"), Platform::Simulated);
        assert_eq!(Platform::from_str("simulated"), Platform::Simulated);
        assert_eq!(Platform::from_str("quest"), Platform::Simulated);
        assert_eq!(Platform::from_str(""), Platform::Simulated);
    }
}
