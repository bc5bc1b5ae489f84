use serde::{Deserialize, Serialize};

/// One of the independently indexed record collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Festival,
    Attraction,
    Restaurant,
}

impl Domain {
    /// All domains, in tie-break priority order (festival wins over
    /// attraction wins over restaurant when combined scores are equal).
    pub const ALL: [Domain; 3] = [Domain::Festival, Domain::Attraction, Domain::Restaurant];

    pub fn priority(self) -> u8 {
        match self {
            Self::Festival => 0,
            Self::Attraction => 1,
            Self::Restaurant => 2,
        }
    }
}

impl std::fmt::Display for Domain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Festival => write!(f, "festival"),
            Self::Attraction => write!(f, "attraction"),
            Self::Restaurant => write!(f, "restaurant"),
        }
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "festival" => Ok(Self::Festival),
            "attraction" => Ok(Self::Attraction),
            "restaurant" => Ok(Self::Restaurant),
            _ => Err(format!("Unknown domain: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_roundtrip() {
        for domain in Domain::ALL {
            let parsed: Domain = domain.to_string().parse().expect("parse");
            assert_eq!(parsed, domain);
        }
    }

    #[test]
    fn domain_priority_order() {
        assert!(Domain::Festival.priority() < Domain::Attraction.priority());
        assert!(Domain::Attraction.priority() < Domain::Restaurant.priority());
    }

    #[test]
    fn domain_serializes_snake_case() {
        let json = serde_json::to_value(Domain::Attraction).expect("serialize");
        assert_eq!(json, "attraction");
    }
}
