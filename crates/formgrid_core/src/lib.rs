//! Core engine for grid-based form schemas.
//! This crate is the single source of truth for field, layout, and
//! response invariants.

pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod theme;

pub use export::{csv_file_name, export_csv};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::field::{Field, FieldId, FieldOption, FieldType, FieldValidationError};
pub use model::layout::{LayoutEntry, LayoutIndex, GRID_COLUMNS};
pub use model::value::{ExtractedRecord, ExtractedValue, ResponseMap, ResponseValue};
pub use repo::store_repo::{
    FieldStub, FormStoreRepository, FormSubmission, SavedTemplate, SqliteFormStore, StoreError,
    StoreResult, SubmissionKind,
};
pub use service::builder::{apply_edit, builder_view, section_palette, BuilderError, FieldEdit};
pub use service::extract::{extract, extract_record, validate};
pub use service::renderer::{render, RenderConfig, RenderedControl, RenderedField};
pub use service::session::{FormPreview, FormSession, SessionError};
pub use theme::{current_theme, set_theme, toggle_theme, Theme};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
