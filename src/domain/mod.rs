mod record;
pub mod value_objects;

pub use record::{LOOPBACK, SiteRecord, Spelling};
pub use value_objects::{
    DomainError, Port, PortError, SiteDomain, SiteStatus, SiteStatusError, SiteType,
    SiteTypeError,
};
