//! Test utilities for Paddock services.
//!
//! Provides `MockSession` for sending a session cookie and assertions over the
//! session cookie contract. Import in tests only.

pub mod cookie;
pub mod session;
