pub mod auth_service;
pub mod dashboard_service;
pub mod media_service;
pub mod password_service;
pub mod registration_service;
pub mod session_service;
pub mod superuser_service;
