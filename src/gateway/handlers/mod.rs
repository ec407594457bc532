pub mod auth;
pub mod campaign;
pub mod health;

pub use auth::{get_challenge, me, verify};
pub use campaign::{create_campaign, get_campaign, get_identifier, list_campaigns};
pub use health::{HealthResponse, ServiceInfo, health_check, service_info};
