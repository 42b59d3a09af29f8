pub(crate) mod cookie_service;
pub(crate) mod password_service;
pub(crate) mod refresh_token_service;
pub(crate) mod token_service;
pub(crate) mod user_service;
