// ABOUTME: Security primitives for the web boundary
// ABOUTME: CSRF token management and cookie helpers

/// CSRF token generation and validation
pub mod csrf;

/// Cookie parsing and `Set-Cookie` construction
pub mod cookies;
