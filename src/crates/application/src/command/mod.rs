pub mod engagement;
