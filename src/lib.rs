//! Bearer-JWT resource server.
//!
//! Every request passes one gate: paths matching a public pattern go straight
//! through; everything else needs a verified `Authorization: Bearer` JWT whose
//! claims are then handed to handlers as `AuthCtx`.
pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod services;
pub mod state;
