//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Map lower-layer outcomes to the caller-visible `BoardError`.

pub mod account_service;
pub mod hierarchy_service;
pub mod scope;
