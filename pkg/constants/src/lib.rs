//! Centralized constants for the rbac-manager project.
//!
//! All project-wide constant values live here.
//! Change a value in one place and it applies everywhere.

pub mod api;
pub mod labels;
pub mod paths;
pub mod state;
