//! HTTP surface of the mock endpoint
//!
//! Every request, whatever its method or path, lands on the same recording handler.

pub mod handlers;
