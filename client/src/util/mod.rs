//! Front-end seams shared by the session context and the route guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! `nav` holds the navigation/notification effects, `auth` the route guard.

pub mod auth;
pub mod nav;
