//! Client-side auth state.
//!
//! DESIGN
//! ======
//! `tokens` persists credentials, `auth` holds the observable session, and
//! `session` owns the operations that move between the two.

pub mod auth;
pub mod session;
pub mod tokens;
