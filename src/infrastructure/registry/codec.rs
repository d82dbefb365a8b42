//! Line codec for the registry index.
//!
//! A record is one line of `key=value` pairs joined by `,`. Values are not
//! escaped, so neither separator may appear inside a value.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::{
    DomainError, LOOPBACK, Port, PortError, SiteDomain, SiteRecord, SiteStatus, SiteStatusError,
    SiteType, SiteTypeError, Spelling,
};

const FIELD_SEPARATOR: char = ',';
const KEY_VALUE_SEPARATOR: char = '=';

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Line contains no key=value pairs")]
    NoFields,

    #[error("Missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid domain: {0}")]
    Domain(#[from] DomainError),

    #[error("Invalid port: {0}")]
    Port(#[from] PortError),

    #[error(transparent)]
    SiteType(#[from] SiteTypeError),

    #[error(transparent)]
    Status(#[from] SiteStatusError),

    #[error("Invalid created timestamp: '{0}'")]
    Created(String),
}

/// Split a line into trimmed `(key, value)` pairs, keeping their order.
/// Segments without `=` are ignored.
fn split_pairs(line: &str) -> Vec<(String, String)> {
    line.split(FIELD_SEPARATOR)
        .filter_map(|segment| segment.split_once(KEY_VALUE_SEPARATOR))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .collect()
}

pub fn parse(line: &str) -> Result<SiteRecord, CodecError> {
    let pairs = split_pairs(line);
    if pairs.is_empty() {
        return Err(CodecError::NoFields);
    }

    let mut domain = None;
    let mut port = None;
    let mut host = None;
    let mut site_type = SiteType::default();
    let mut ip = None;
    let mut path = None;
    let mut status = SiteStatus::Active;
    let mut created = 0;
    let mut extra: Vec<(String, String)> = Vec::new();
    let mut spelling = Spelling::default();

    for (key, value) in pairs {
        match key.as_str() {
            "domain" => domain = Some(SiteDomain::new(&value)?),
            "port" => port = Some(value.parse::<Port>()?),
            "host" => host = Some(value).filter(|v| !v.is_empty()),
            "type" => {
                site_type = value.parse::<SiteType>()?;
                spelling.site_type = Some(value).filter(|v| v != site_type.as_str());
            }
            "ip" => ip = Some(value).filter(|v| !v.is_empty()),
            "path" => path = Some(PathBuf::from(value)).filter(|p| !p.as_os_str().is_empty()),
            "status" => {
                status = value.parse::<SiteStatus>()?;
                spelling.status = Some(value).filter(|v| v != status.as_str());
            }
            "created" => {
                created = value
                    .parse::<u64>()
                    .map_err(|_| CodecError::Created(value.clone()))?
            }
            _ => {
                if let Some(slot) = extra.iter_mut().find(|(k, _)| *k == key) {
                    slot.1 = value;
                } else {
                    extra.push((key, value));
                }
            }
        }
    }

    Ok(SiteRecord {
        domain: domain.ok_or(CodecError::MissingField("domain"))?,
        port: port.ok_or(CodecError::MissingField("port"))?,
        host,
        site_type,
        ip: ip.unwrap_or_else(|| LOOPBACK.to_string()),
        path: path.ok_or(CodecError::MissingField("path"))?,
        status,
        created,
        extra,
        spelling,
    })
}

pub fn serialize(record: &SiteRecord) -> String {
    let mut fields = vec![
        format!("domain={}", record.domain),
        format!("port={}", record.port),
    ];
    if let Some(host) = &record.host {
        fields.push(format!("host={}", host));
    }
    let spelling = &record.spelling;
    fields.push(format!(
        "type={}",
        Spelling::resolve(spelling.site_type.as_deref(), record.site_type.as_str())
    ));
    fields.push(format!("ip={}", record.ip));
    fields.push(format!("path={}", record.path.display()));
    fields.push(format!(
        "status={}",
        Spelling::resolve(spelling.status.as_deref(), record.status.as_str())
    ));
    fields.push(format!("created={}", record.created));
    for (key, value) in &record.extra {
        fields.push(format!("{}={}", key, value));
    }

    fields.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = "domain=svc.test,port=8080,type=proxy,ip=127.0.0.1,\
                        path=/etc/nginx/sites-available/svc.test,status=active,created=1717000000000";

    #[test]
    fn test_round_trip_seven_keys() {
        let record = parse(LINE).unwrap();
        assert_eq!(serialize(&record), LINE);
    }

    #[test]
    fn test_round_trip_keeps_case() {
        let line = "domain=SVC.test,port=8080,type=Proxy,ip=127.0.0.1,\
                    path=/etc/nginx/sites-available/SVC.test,status=Active,created=1";
        let record = parse(line).unwrap();
        assert_eq!(record.domain.primary(), "SVC.test");
        assert_eq!(record.status, SiteStatus::Active);
        assert_eq!(serialize(&record), line);
    }

    #[test]
    fn test_changed_status_drops_written_form() {
        let line = "domain=a.test,port=3000,path=/sites/a.test,status=ACTIVE";
        let mut record = parse(line).unwrap();
        record.status = record.status.toggled();
        assert!(serialize(&record).contains(",status=inactive,"));
    }

    #[test]
    fn test_parse_fields() {
        let record = parse(LINE).unwrap();
        assert_eq!(record.domain.primary(), "svc.test");
        assert_eq!(record.port.value(), 8080);
        assert_eq!(record.status, SiteStatus::Active);
        assert_eq!(record.created, 1_717_000_000_000);
        assert!(record.host.is_none());
    }

    #[test]
    fn test_orders_fields_and_keeps_unknown_keys() {
        let line = "status=inactive,path=/sites/a.test,owner=ops,port=3000,domain=a.test,host=10.0.0.5";
        let record = parse(line).unwrap();
        assert_eq!(
            serialize(&record),
            "domain=a.test,port=3000,host=10.0.0.5,type=proxy,ip=127.0.0.1,\
             path=/sites/a.test,status=inactive,created=0,owner=ops"
        );
    }

    #[test]
    fn test_multi_name_domain() {
        let line = "domain=a.test www.a.test,port=3000,path=/sites/a.test";
        let record = parse(line).unwrap();
        assert_eq!(record.domain.names().len(), 2);
        assert!(serialize(&record).starts_with("domain=a.test www.a.test,"));
    }

    #[test]
    fn test_malformed_lines() {
        assert!(matches!(parse("garbage"), Err(CodecError::NoFields)));
        assert!(matches!(parse(""), Err(CodecError::NoFields)));
        assert!(matches!(
            parse("domain=a.test,path=/x"),
            Err(CodecError::MissingField("port"))
        ));
        assert!(matches!(
            parse("domain=a.test,port=http,path=/x"),
            Err(CodecError::Port(_))
        ));
        assert!(matches!(
            parse("domain=a.test,port=80,path=/x,status=broken"),
            Err(CodecError::Status(_))
        ));
    }
}
