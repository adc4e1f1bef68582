// Library for the three binaries and the tests

pub mod config;
pub mod consumer;
pub mod logging;
pub mod metrics_repo;
pub mod models;
pub mod producer;
pub mod transport;
