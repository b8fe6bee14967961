use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseExpirationError;

/// What a flow's TTL is measured from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowExpiration {
    /// From the first packet of the flow. Later packets never extend it.
    #[default]
    Creation,
    /// From the most recent packet of the flow.
    Activity,
}

impl FlowExpiration {
    pub fn as_str(self) -> &'static str {
        match self {
            FlowExpiration::Creation => "creation",
            FlowExpiration::Activity => "activity",
        }
    }
}

impl fmt::Display for FlowExpiration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowExpiration {
    type Err = ParseExpirationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "creation" => Ok(FlowExpiration::Creation),
            "activity" => Ok(FlowExpiration::Activity),
            other => Err(ParseExpirationError(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip_through_from_str() {
        for policy in [FlowExpiration::Creation, FlowExpiration::Activity] {
            assert_eq!(policy.as_str().parse::<FlowExpiration>(), Ok(policy));
        }
        assert_eq!(
            "never".parse::<FlowExpiration>().unwrap_err().to_string(),
            "unknown flow expiration 'never' (expected creation or activity)"
        );
    }
}
