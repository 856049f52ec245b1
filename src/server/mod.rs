//! HTTP surface: routes, CORS and the server loop

pub mod api;
pub mod cors;
