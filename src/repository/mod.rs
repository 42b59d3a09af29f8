#[cfg(test)]
pub(crate) mod memory;
pub(crate) mod reset_token_repository;
pub(crate) mod user_repository;
