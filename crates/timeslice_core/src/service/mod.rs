//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation and repository calls into use-case APIs.
//! - Keep UI/FFI layers decoupled from storage details.

pub mod entry_service;
