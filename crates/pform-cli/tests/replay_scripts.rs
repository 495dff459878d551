//! Integration tests: scripted sessions through the replay handler.

use pform_cli::input::{parse_document, Format};
use pform_cli::replay::{exit_code, replay, FormEvent};
use pform_schema::person::{ADDRESSES_MESSAGE, EMAIL_REQUIRED_MESSAGE};
use pform_state::{FormOptions, SubmitOutcome, ValidationMode};
use serde_json::json;

fn script(yaml: &str) -> Vec<FormEvent> {
    parse_document(yaml, Format::Yaml).unwrap()
}

#[test]
fn test_full_session_submits_and_resets() {
    let events = script(
        r#"
- event: change
  field: firstName
  value: Ada
- event: change
  field: age
  value: "36"
- event: change
  field: email
  value: ada@example.com
- event: change
  field: terms
  value: true
- event: change
  field: addresses.0.country
  value: UK
- event: submit
"#,
    );

    let report = replay(&events, FormOptions::person()).unwrap();

    assert_eq!(report.submissions, vec![SubmitOutcome::Submitted]);
    assert_eq!(report.submitted.len(), 1);
    assert_eq!(report.submitted[0].age, 36.0);
    assert!(report.state.is_submit_successful);
    assert!(!report.state.is_dirty);
    assert_eq!(report.values["firstName"], json!(""));
    assert_eq!(report.values["age"], json!(18));
    assert!(!report.state.is_valid);
    assert_eq!(exit_code(&report), 0);
}

#[test]
fn test_exit_code_follows_last_submit() {
    let rejected_last = script(
        r#"
- event: change
  field: firstName
  value: Ada
- event: change
  field: email
  value: ada@example.com
- event: change
  field: terms
  value: true
- event: change
  field: addresses.0.country
  value: UK
- event: submit
- event: submit
"#,
    );
    let report = replay(&rejected_last, FormOptions::person()).unwrap();
    assert!(report.submissions[0].is_submitted());
    assert!(!report.submissions[1].is_submitted());
    assert_eq!(exit_code(&report), 1);

    let no_submit = script(
        r#"
- event: change
  field: firstName
  value: Ada
"#,
    );
    let report = replay(&no_submit, FormOptions::person()).unwrap();
    assert!(report.submissions.is_empty());
    assert_eq!(exit_code(&report), 1);
}

#[test]
fn test_blur_in_on_blur_mode_reports_field_error() {
    let events = script(
        r#"
- event: blur
  field: email
"#,
    );

    let report = replay(&events, FormOptions::person()).unwrap();

    let email = pform_core::FieldPath::parse("email").unwrap();
    assert_eq!(report.state.errors.first(&email), Some(EMAIL_REQUIRED_MESSAGE));
    assert_eq!(report.state.touched_fields, vec![email]);
    assert!(report.submissions.is_empty());
}

#[test]
fn test_remove_last_address_then_trigger() {
    let events = script(
        r#"
- event: remove
  array: addresses
  index: 0
- event: trigger
  fields: [addresses]
"#,
    );

    let options = FormOptions::person().with_mode(ValidationMode::OnSubmit);
    let report = replay(&events, options).unwrap();

    let addresses = pform_core::FieldPath::parse("addresses").unwrap();
    assert_eq!(report.values["addresses"], json!([]));
    assert_eq!(report.state.errors.first(&addresses), Some(ADDRESSES_MESSAGE));
}

#[test]
fn test_failed_event_names_its_step() {
    let events = script(
        r#"
- event: reset
- event: remove
  array: addresses
  index: 4
"#,
    );

    let err = replay(&events, FormOptions::person()).unwrap_err();
    assert!(err.to_string().contains("event 1"));
}

#[test]
fn test_config_document_drives_defaults() {
    let options: FormOptions = parse_document(
        "mode: onChange\ndefaultValues:\n  gender: f\n  addresses: []\n",
        Format::Yaml,
    )
    .unwrap();
    let events = script(
        r#"
- event: change
  field: email
  value: nope
- event: set
  field: firstName
  value: Ada
  options:
    shouldDirty: true
"#,
    );

    let report = replay(&events, options).unwrap();

    let email = pform_core::FieldPath::parse("email").unwrap();
    assert_eq!(report.state.errors.first(&email), Some("Invalid email"));
    assert_eq!(report.values["gender"], json!("f"));
    assert!(report.state.is_dirty);
}
