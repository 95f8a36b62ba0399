//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Apply the duplicate policy before quotes reach storage.
//! - Keep the CLI decoupled from SQL details.

pub mod author_service;
pub mod quote_service;
pub mod super_subject_service;
