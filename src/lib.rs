//! Review chat assistant: an HTTP backend that grounds every question in a
//! fixed persona prompt and an optional PDF, plus the client used to talk to it.

pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod routes;
pub mod services;
pub mod state;
