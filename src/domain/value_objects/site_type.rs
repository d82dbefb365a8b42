use std::fmt;
use std::str::FromStr;

/// Kind of site definition. Only reverse proxies are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SiteType {
    #[default]
    Proxy,
}

#[derive(Debug, thiserror::Error)]
#[error("Unsupported site type '{0}': only 'proxy' is supported")]
pub struct SiteTypeError(pub String);

impl SiteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Proxy => "proxy",
        }
    }
}

impl FromStr for SiteType {
    type Err = SiteTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("proxy") {
            Ok(Self::Proxy)
        } else {
            Err(SiteTypeError(s.trim().to_string()))
        }
    }
}

impl fmt::Display for SiteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("proxy".parse::<SiteType>().unwrap(), SiteType::Proxy);
        assert_eq!("PROXY".parse::<SiteType>().unwrap(), SiteType::Proxy);
        assert!("static".parse::<SiteType>().is_err());
    }
}
