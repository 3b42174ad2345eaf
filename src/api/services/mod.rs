pub mod fallback;
pub mod health;
pub mod lookup;

pub use fallback::{json_error_handlers, not_found};
pub use health::{HealthService, health_routes};
pub use lookup::{LookupResponse, LookupService, locate, lookup_routes};
