pub mod listening_history;
