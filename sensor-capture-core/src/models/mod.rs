pub mod chunk;
pub mod config;
pub mod error;
pub mod handles;
pub mod session_report;
pub mod state;
