pub mod port;
mod site_domain;
mod site_status;
mod site_type;

pub use port::{Port, PortError};
pub use site_domain::{DomainError, SiteDomain};
pub use site_status::{SiteStatus, SiteStatusError};
pub use site_type::{SiteType, SiteTypeError};
