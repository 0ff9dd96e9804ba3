// Public API for integration tests and potential library usage

pub mod api;
pub mod clock;
pub mod config;
pub mod dictionary;
pub mod protocol;
pub mod scoring;
pub mod state;
pub mod types;
pub mod validator;
pub mod ws;
