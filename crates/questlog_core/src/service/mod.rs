//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep presentation/transport layers decoupled from storage details.
//!
//! # Invariants
//! - Not-found and not-owned outcomes surface as normal values
//!   (`Ok(None)`/`false`), never as errors.

pub mod achievement_service;
pub mod category_service;
pub mod completion;
pub mod progression_service;
pub mod task_service;
