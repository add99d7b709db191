//! # Blog Core
//!
//! The domain layer of the blog service: posts, handles, publications and
//! permissions. This crate contains pure business logic; storage and other
//! infrastructure are reached through the traits in [`ports`].

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
