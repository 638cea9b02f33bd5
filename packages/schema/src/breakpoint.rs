use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::SchemaError;

/// Responsive editing context that overrides are authored under
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    #[default]
    Mobile,
    Desktop,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 2] = [Breakpoint::Mobile, Breakpoint::Desktop];

    pub fn as_str(&self) -> &'static str {
        match self {
            Breakpoint::Mobile => "mobile",
            Breakpoint::Desktop => "desktop",
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Breakpoint {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mobile" => Ok(Breakpoint::Mobile),
            "desktop" => Ok(Breakpoint::Desktop),
            other => Err(SchemaError::UnknownBreakpoint(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_breakpoint() {
        assert_eq!("mobile".parse::<Breakpoint>().unwrap(), Breakpoint::Mobile);
        assert_eq!("desktop".parse::<Breakpoint>().unwrap(), Breakpoint::Desktop);
        assert!("tablet".parse::<Breakpoint>().is_err());
    }

    #[test]
    fn test_breakpoint_serializes_lowercase() {
        let json = serde_json::to_string(&Breakpoint::Desktop).unwrap();
        assert_eq!(json, "\"desktop\"");
    }
}
