pub mod app;
pub mod client;
pub mod config;
pub mod creation;
pub mod credentials;
pub mod error;
pub mod haptics;
pub mod model;
pub mod repository;
pub mod stream;
