use serde::{Deserialize, Serialize};

/// Lifecycle status of a product listing.
///
/// The catalog's change-status endpoint is a plain setter: any status may be
/// written over any other. Which transitions are legal is decided entirely by
/// the moderation engine at its call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Reported,
    Suspended,
    Banned,
    Deleted,
    Deactivated,
}

impl ProductStatus {
    /// A listing under moderation cannot be edited or reactivated by its owner.
    pub fn under_moderation(&self) -> bool {
        matches!(self, Self::Reported | Self::Suspended | Self::Banned)
    }
}

impl std::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProductStatus::Active => "active",
            ProductStatus::Reported => "reported",
            ProductStatus::Suspended => "suspended",
            ProductStatus::Banned => "banned",
            ProductStatus::Deleted => "deleted",
            ProductStatus::Deactivated => "deactivated",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for ProductStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(ProductStatus::Active),
            "reported" => Ok(ProductStatus::Reported),
            "suspended" => Ok(ProductStatus::Suspended),
            "banned" => Ok(ProductStatus::Banned),
            "deleted" => Ok(ProductStatus::Deleted),
            "deactivated" => Ok(ProductStatus::Deactivated),
            _ => Err(format!("unknown product status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trip() {
        for status in [
            ProductStatus::Active,
            ProductStatus::Reported,
            ProductStatus::Suspended,
            ProductStatus::Banned,
            ProductStatus::Deleted,
            ProductStatus::Deactivated,
        ] {
            assert_eq!(status.to_string().parse::<ProductStatus>().unwrap(), status);
        }
    }

    #[test]
    fn moderation_statuses() {
        assert!(ProductStatus::Reported.under_moderation());
        assert!(ProductStatus::Suspended.under_moderation());
        assert!(ProductStatus::Banned.under_moderation());
        assert!(!ProductStatus::Active.under_moderation());
        assert!(!ProductStatus::Deactivated.under_moderation());
    }
}
