pub mod credential;
pub mod profile;
pub mod route;
pub mod session;

pub use credential::Credential;
pub use profile::ProfileMarker;
pub use route::{PathCategory, RouteRequest};
pub use session::{SessionContext, ACCESS_TOKEN_COOKIE, SELECTED_PROFILE_COOKIE};
