//! Engine use-case services.
//!
//! # Responsibility
//! - Orchestrate schema, layout, and response mutations into use-case APIs.
//! - Keep UI layers decoupled from model and storage details.

pub mod builder;
pub mod extract;
pub mod renderer;
pub mod session;
