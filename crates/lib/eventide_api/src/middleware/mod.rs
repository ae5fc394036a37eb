//! Request extractors and middleware.

pub mod identity;
