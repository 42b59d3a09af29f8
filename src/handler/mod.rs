pub(crate) mod auth_handler;
pub(crate) mod health_handler;
pub(crate) mod password_handler;
pub(crate) mod refresh_handler;
pub(crate) mod register_handler;
