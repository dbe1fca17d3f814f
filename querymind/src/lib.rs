//! QueryMind - terminal client for the QueryMind chat backend.
//!
//! The interesting part is `chat`: it keeps the transcript and backend
//! session id, sends messages, and uploads staged PDFs one by one into the
//! current session. `backend` and `auth` are the network and credential
//! boundaries; the CLI in `main.rs` wires them together.

pub mod auth;
pub mod backend;
pub mod chat;
pub mod config;
pub mod format;
pub mod logging;
pub mod models;

#[cfg(test)]
mod testing;
