//! HTTP routes outside the login exchange.

pub mod health;
pub mod pages;
pub mod preferences;

pub use health::{HealthResponse, health_routes};
pub use pages::{error_page, index};
pub use preferences::{get_theme_handler, put_theme_handler};
