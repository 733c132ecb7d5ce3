pub mod http_client;
pub mod rotation_repository;

#[cfg(test)]
pub(crate) mod testing;
