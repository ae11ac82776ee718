//! Configuration, domain models and in-process state.

pub mod config;
pub mod models;
pub mod reference;
pub mod sessions;
