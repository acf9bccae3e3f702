use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// What the user wants done with their itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Intent {
    Remove,
    Modify,
    Suggest,
    Plan,
    General,
}

impl Intent {
    pub const ALL: [Intent; 5] = [
        Intent::Remove,
        Intent::Modify,
        Intent::Suggest,
        Intent::Plan,
        Intent::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Remove => "REMOVE",
            Intent::Modify => "MODIFY",
            Intent::Suggest => "SUGGEST",
            Intent::Plan => "PLAN",
            Intent::General => "GENERAL",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strict parse of a canonical upper-case token.
impl FromStr for Intent {
    type Err = String;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == token)
            .ok_or_else(|| format!("`{token}` is not an intent"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_exact() {
        assert_eq!("REMOVE".parse::<Intent>(), Ok(Intent::Remove));
        assert!("remove".parse::<Intent>().is_err());
        assert!("REMOVE.".parse::<Intent>().is_err());
    }
}
