//! Middleware for protected routes.
//!
//! Execution order (outermost → innermost):
//! 1. Session validator: cookie verification, injects `AuthContext`
//! 2. Audit logger: logs after auth, so it knows the subject

pub mod audit;
pub mod auth;
