//! # Blog Shared
//!
//! Wire types of the blog API, shared by the server and its clients.

pub mod dto;
pub mod response;

pub use response::ErrorResponse;
