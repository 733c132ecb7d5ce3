//! Client for the League of Legends free champion rotation.
//!
//! [`service::api`] talks to the backend, [`service::rotation_store`] owns
//! the load state and [`ui`] renders it in the terminal.

pub mod config;
pub mod model;
pub mod service;
pub mod ui;
