//! LensTag server library.
//!
//! Exposes the axum application so the binary and the integration tests
//! build exactly the same router.

pub mod server;

pub use server::{build_app_state, create_router, run, AppState};
