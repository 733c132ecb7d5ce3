pub mod api;
pub mod rotation_store;
