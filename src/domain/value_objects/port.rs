use std::fmt;
use std::str::FromStr;

/// Backend port a proxy site forwards to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Port(u16);

#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Valid port number required, got: '{0}'")]
    NotNumeric(String),

    #[error("Port must be between 1 and 65535, got: {0}")]
    OutOfRange(u64),
}

impl Port {
    pub fn new(port: u16) -> Result<Self, PortError> {
        if port == 0 {
            return Err(PortError::OutOfRange(0));
        }
        Ok(Self(port))
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl FromStr for Port {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit()) {
            return Err(PortError::NotNumeric(s.to_string()));
        }

        let value: u64 = s.parse().map_err(|_| PortError::NotNumeric(s.to_string()))?;
        let port = u16::try_from(value).map_err(|_| PortError::OutOfRange(value))?;
        Port::new(port)
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for Port {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u16(self.0)
    }
}

impl<'de> serde::Deserialize<'de> for Port {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let port = u16::deserialize(deserializer)?;
        Port::new(port).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_ports() {
        assert_eq!("8080".parse::<Port>().unwrap().value(), 8080);
        assert_eq!(" 80 ".parse::<Port>().unwrap().value(), 80);
        assert_eq!("65535".parse::<Port>().unwrap().value(), 65535);
    }

    #[test]
    fn test_invalid_ports() {
        assert!(matches!("".parse::<Port>(), Err(PortError::NotNumeric(_))));
        assert!(matches!("abc".parse::<Port>(), Err(PortError::NotNumeric(_))));
        assert!(matches!("-1".parse::<Port>(), Err(PortError::NotNumeric(_))));
        assert!(matches!("0".parse::<Port>(), Err(PortError::OutOfRange(0))));
        assert!(matches!(
            "70000".parse::<Port>(),
            Err(PortError::OutOfRange(70000))
        ));
    }
}
