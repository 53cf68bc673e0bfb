pub mod command;
pub mod error;
pub mod projector;
pub mod query;
pub mod shared;
