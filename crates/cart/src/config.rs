use core::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_QUANTITY: u32 = 10;

/// What an optimistic projection does when its remote call fails.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RollbackPolicy {
    /// The projected state stays on screen next to the error.
    #[default]
    Keep,
    /// The failed action is dropped and the previous view comes back.
    Revert,
}

impl FromStr for RollbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keep" => Ok(Self::Keep),
            "revert" => Ok(Self::Revert),
            other => Err(format!("unknown rollback policy `{other}`, expected `keep` or `revert`")),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartConfig {
    #[serde(default = "default_max_quantity")]
    pub max_quantity: u32,
    #[serde(default)]
    pub rollback: RollbackPolicy,
}

const fn default_max_quantity() -> u32 {
    DEFAULT_MAX_QUANTITY
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            max_quantity: DEFAULT_MAX_QUANTITY,
            rollback: RollbackPolicy::default(),
        }
    }
}

impl CartConfig {
    #[must_use]
    pub const fn accepts_quantity(&self, quantity: u32) -> bool {
        quantity >= 1 && quantity <= self.max_quantity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_bounds_are_inclusive() {
        let config = CartConfig::default();

        assert!(!config.accepts_quantity(0));
        assert!(config.accepts_quantity(1));
        assert!(config.accepts_quantity(10));
        assert!(!config.accepts_quantity(11));
    }

    #[test]
    fn rollback_policy_parses_case_insensitively() {
        assert_eq!("Revert".parse::<RollbackPolicy>(), Ok(RollbackPolicy::Revert));
        assert_eq!(" keep ".parse::<RollbackPolicy>(), Ok(RollbackPolicy::Keep));
        assert!("undo".parse::<RollbackPolicy>().is_err());
    }

    #[test]
    fn missing_fields_take_defaults() {
        let config: CartConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config, CartConfig::default());
    }
}
