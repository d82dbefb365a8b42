use std::fmt;
use std::str::FromStr;

/// Whether a site's enable link is expected to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteStatus {
    Active,
    Inactive,
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown site status: '{0}'")]
pub struct SiteStatusError(pub String);

impl SiteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Active => Self::Inactive,
            Self::Inactive => Self::Active,
        }
    }
}

impl FromStr for SiteStatus {
    type Err = SiteStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(SiteStatusError(other.to_string())),
        }
    }
}

impl fmt::Display for SiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_round_trip() {
        assert_eq!(SiteStatus::Active.toggled(), SiteStatus::Inactive);
        assert_eq!(SiteStatus::Active.toggled().toggled(), SiteStatus::Active);
    }

    #[test]
    fn test_parse() {
        assert_eq!("active".parse::<SiteStatus>().unwrap(), SiteStatus::Active);
        assert_eq!(
            "Inactive".parse::<SiteStatus>().unwrap(),
            SiteStatus::Inactive
        );
        assert!("unknown".parse::<SiteStatus>().is_err());
    }
}
