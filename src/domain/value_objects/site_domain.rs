use std::fmt;

/// One or more server names a proxy site answers to.
///
/// The first name is the primary name: it names the generated site file
/// and its enable link. Additional names are rendered into `server_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SiteDomain(Vec<String>);

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("Domain parameter required")]
    Empty,

    #[error("Domain name too long: {0}")]
    TooLong(String),

    #[error("Domain name contains invalid characters: {0}")]
    InvalidCharacters(String),
}

const MAX_NAME_LEN: usize = 253;

impl SiteDomain {
    /// Parse a whitespace-separated list of server names.
    pub fn new(input: impl AsRef<str>) -> Result<Self, DomainError> {
        let names: Vec<String> = input
            .as_ref()
            .split_whitespace()
            .map(str::to_string)
            .collect();

        if names.is_empty() {
            return Err(DomainError::Empty);
        }

        for name in &names {
            validate_name(name)?;
        }

        Ok(Self(names))
    }

    pub fn primary(&self) -> &str {
        &self.0[0]
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Names are kept as written; comparisons ignore ASCII case.
    pub fn is_primary(&self, name: &str) -> bool {
        self.primary().eq_ignore_ascii_case(name)
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.len() > MAX_NAME_LEN {
        return Err(DomainError::TooLong(name.to_string()));
    }

    // `,` and `=` would break the index line format, `/` the file name.
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '*'))
    {
        return Err(DomainError::InvalidCharacters(name.to_string()));
    }

    if name.starts_with('-') || name.starts_with('.') || name.ends_with('-') || name.ends_with('.')
    {
        return Err(DomainError::InvalidCharacters(name.to_string()));
    }

    Ok(())
}

impl fmt::Display for SiteDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0.join(" "))
    }
}

impl serde::Serialize for SiteDomain {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for SiteDomain {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SiteDomain::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_domains() {
        assert!(SiteDomain::new("svc.test").is_ok());
        assert!(SiteDomain::new("my-app.example.com").is_ok());
        assert!(SiteDomain::new("*.example.com").is_ok());
    }

    #[test]
    fn test_keeps_case_as_written() {
        let domain = SiteDomain::new("APP.Test").unwrap();
        assert_eq!(domain.primary(), "APP.Test");
        assert!(domain.is_primary("app.test"));
        assert!(!domain.is_primary("www.app.test"));
    }

    #[test]
    fn test_multiple_names() {
        let domain = SiteDomain::new("  svc.test   www.svc.test ").unwrap();
        assert_eq!(domain.primary(), "svc.test");
        assert_eq!(domain.names().len(), 2);
        assert_eq!(domain.to_string(), "svc.test www.svc.test");
    }

    #[test]
    fn test_invalid_domains() {
        assert!(matches!(SiteDomain::new(""), Err(DomainError::Empty)));
        assert!(matches!(SiteDomain::new("   "), Err(DomainError::Empty)));
        assert!(SiteDomain::new("a,b.test").is_err());
        assert!(SiteDomain::new("a=b.test").is_err());
        assert!(SiteDomain::new("../etc/passwd").is_err());
        assert!(SiteDomain::new("-svc.test").is_err());
        assert!(SiteDomain::new("svc.test.").is_err());
    }
}
