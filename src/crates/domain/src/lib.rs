pub mod catalog;
pub mod engagement;
pub mod song;
pub mod user;
pub mod value;
