//! AI Tutor client: session bootstrap, backend REST client, and the
//! page-level flows built on top of it.

pub mod api;
pub mod config;
pub mod export;
pub mod flows;
pub mod notify;
pub mod routes;
pub mod services;
pub mod session;
pub mod state;
