pub(crate) mod api_error;
pub(crate) mod db_error;
pub(crate) mod request_error;
pub(crate) mod token_error;
pub(crate) mod user_error;
