//! Domain model for the form engine.
//!
//! # Responsibility
//! - Define the recursive field schema, grid layout, and response shapes.
//! - Keep one canonical data contract shared by builder, renderer, and store.
//!
//! # Invariants
//! - Every field is identified by a stable `FieldId` that is never reused.
//! - At any nesting level, layout entries never outlive their field.
//! - Deletion of persisted records is represented by soft-delete flags.

pub mod field;
pub mod layout;
pub mod value;
