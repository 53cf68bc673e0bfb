pub mod catalog;
pub mod config;
pub mod ranking;
pub mod sampling;
