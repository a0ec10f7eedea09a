//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `formgrid_core` linkage.
//! - Walk one build/fill/submit cycle and print the exported CSV.

use formgrid_core::{FieldEdit, FieldType, FormSession, ResponseValue};

fn main() {
    println!("formgrid_core ping={}", formgrid_core::ping());
    println!("formgrid_core version={}", formgrid_core::core_version());

    let mut session = FormSession::new("Smoke Test Form");
    let name_id = session.add_field(FieldType::Text);
    let skills_id = session.add_field(FieldType::Checkboxes);

    if let Err(err) = session.edit_field(name_id, &FieldEdit::SetLabel("Name".to_string())) {
        eprintln!("edit failed: {err}");
        std::process::exit(1);
    }
    if let Err(err) = session.edit_field(skills_id, &FieldEdit::SetLabel("Skills".to_string())) {
        eprintln!("edit failed: {err}");
        std::process::exit(1);
    }

    session.set_response(name_id, ResponseValue::Text("Ada".to_string()));
    session.set_response(
        skills_id,
        ResponseValue::Selection(vec!["option_1".to_string()]),
    );

    match session.submit() {
        Ok(submission) => {
            println!("submitted id={} title={}", submission.id, submission.title);
            println!("{}", formgrid_core::export_csv(&submission.responses));
        }
        Err(err) => {
            eprintln!("submit failed: {err}");
            std::process::exit(1);
        }
    }
}
