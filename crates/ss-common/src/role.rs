//! Sample roles.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Which aggregate a sample contributes to.
///
/// Only signal-role samples are scaled by the assumed branching fraction.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Signal,
    Background,
}

impl Role {
    /// Both roles, signal first.
    pub const ALL: [Role; 2] = [Role::Signal, Role::Background];

    pub fn is_signal(self) -> bool {
        matches!(self, Role::Signal)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Signal => write!(f, "signal"),
            Role::Background => write!(f, "background"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "signal" | "sig" | "s" => Ok(Role::Signal),
            "background" | "bkg" | "b" => Ok(Role::Background),
            _ => Err(format!("unknown sample role: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert_eq!("bkg".parse::<Role>().unwrap(), Role::Background);
        assert!("ghost".parse::<Role>().is_err());
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Signal).unwrap(), "\"signal\"");
    }
}
