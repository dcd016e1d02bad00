//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep boundary layers (CLI, HTTP) decoupled from storage details.

pub mod dashboard_service;
