//! Integration tests: person schema behavior across whole records.
//!
//! Covers the two-phase ordering (field rules before the name refinement),
//! error aggregation in a single pass, and idempotence of validation.

use pform_core::FieldPath;
use pform_schema::person::{
    ADDRESSES_MESSAGE, AGE_MESSAGE, INVALID_EMAIL_MESSAGE, NAME_MESSAGE, TERMS_MESSAGE,
};
use pform_schema::{person_schema, Resolver};
use proptest::prelude::*;
use serde_json::{json, Value};

fn path(s: &str) -> FieldPath {
    FieldPath::parse(s).unwrap()
}

fn valid_record() -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "age": 36,
        "email": "ada@example.com",
        "gender": "f",
        "terms": true,
        "addresses": [{"country": "UK", "city": "London"}]
    })
}

#[test]
fn test_only_name_refinement_fails_when_fields_are_valid() {
    let candidate = json!({
        "firstName": "",
        "lastName": "",
        "age": 18,
        "email": "a@b.com",
        "gender": "m",
        "terms": true,
        "addresses": [{"country": "US"}]
    });

    let errors = person_schema().validate(&candidate).unwrap_err();

    assert_eq!(errors.len(), 1);
    assert_eq!(errors.first(&path("lastName")), Some(NAME_MESSAGE));
}

#[test]
fn test_field_errors_are_aggregated_and_refinement_skipped() {
    let candidate = json!({
        "firstName": "Jo",
        "lastName": "",
        "age": 17,
        "email": "bad",
        "gender": "m",
        "terms": false,
        "addresses": []
    });

    let errors = person_schema().validate(&candidate).unwrap_err();

    assert_eq!(errors.first(&path("age")), Some(AGE_MESSAGE));
    assert_eq!(errors.first(&path("email")), Some(INVALID_EMAIL_MESSAGE));
    assert_eq!(errors.first(&path("terms")), Some(TERMS_MESSAGE));
    assert_eq!(errors.first(&path("addresses")), Some(ADDRESSES_MESSAGE));
    assert!(!errors.contains(&path("lastName")));
    assert_eq!(errors.len(), 4);
}

#[test]
fn test_name_refinement_hidden_behind_field_errors() {
    let mut candidate = valid_record();
    candidate["firstName"] = json!("");
    candidate["lastName"] = json!("");
    candidate["terms"] = json!(false);

    let errors = person_schema().validate(&candidate).unwrap_err();

    assert!(errors.contains(&path("terms")));
    assert!(!errors.contains(&path("lastName")));
}

#[test]
fn test_missing_names_count_as_empty() {
    let mut candidate = valid_record();
    let obj = candidate.as_object_mut().unwrap();
    obj.remove("firstName");
    obj.insert("lastName".to_string(), Value::Null);

    let errors = person_schema().validate(&candidate).unwrap_err();

    assert_eq!(errors.first(&path("lastName")), Some(NAME_MESSAGE));
}

#[test]
fn test_empty_addresses_produce_no_entry_errors() {
    let mut candidate = valid_record();
    candidate["addresses"] = json!([]);

    let errors = person_schema().validate(&candidate).unwrap_err();

    assert_eq!(errors.paths().cloned().collect::<Vec<_>>(), vec![path("addresses")]);
}

#[test]
fn test_addresses_of_wrong_type() {
    let mut candidate = valid_record();
    candidate["addresses"] = json!("UK");

    let errors = person_schema().validate(&candidate).unwrap_err();

    assert_eq!(
        errors.first(&path("addresses")),
        Some("Expected array, received string")
    );
}

#[test]
fn test_resolver_matches_validate() {
    let schema = person_schema();
    let candidate = valid_record();
    assert_eq!(schema.resolve(&candidate).ok(), schema.validate(&candidate).ok());
}

#[test]
fn test_unknown_members_are_stripped() {
    let mut candidate = valid_record();
    candidate["nickname"] = json!("Countess");

    let person = person_schema().validate(&candidate).unwrap();
    let round = serde_json::to_value(&person).unwrap();

    assert!(round.get("nickname").is_none());
}

// ─── Properties ──────────────────────────────────────────────────────

fn name() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[A-Z][a-z]{1,10}"]
}

fn address() -> impl Strategy<Value = Value> {
    ("[A-Z]{2}", prop::option::of("[A-Z][a-z]{2,10}"))
        .prop_map(|(country, city)| json!({"country": country, "city": city}))
}

fn record() -> impl Strategy<Value = Value> {
    (
        name(),
        name(),
        0u32..120,
        prop::bool::ANY,
        prop_oneof![Just("m"), Just("f")],
        prop::collection::vec(address(), 0..4),
    )
        .prop_map(|(first, last, age, terms, gender, addresses)| {
            json!({
                "firstName": first,
                "lastName": last,
                "age": age,
                "email": "someone@example.com",
                "gender": gender,
                "terms": terms,
                "addresses": addresses
            })
        })
}

proptest! {
    /// Under-age records always fail at `age`, whatever else they hold.
    #[test]
    fn under_age_always_fails_at_age(mut candidate in record(), age in 0u32..18) {
        candidate["age"] = json!(age);
        let errors = person_schema().validate(&candidate).unwrap_err();
        prop_assert_eq!(errors.first(&path("age")), Some(AGE_MESSAGE));
    }

    /// The name refinement fires exactly when both names are empty and
    /// nothing else is wrong.
    #[test]
    fn name_refinement_only_on_otherwise_valid(candidate in record()) {
        let result = person_schema().validate(&candidate);
        let names_empty = candidate["firstName"] == json!("") && candidate["lastName"] == json!("");
        let fields_ok = candidate["age"].as_u64().is_some_and(|a| a >= 18)
            && candidate["terms"] == json!(true)
            && candidate["addresses"].as_array().is_some_and(|a| !a.is_empty());

        match result {
            Ok(_) => prop_assert!(fields_ok && !names_empty),
            Err(errors) => {
                let has_name_error = errors.contains(&path("lastName"));
                prop_assert_eq!(has_name_error, fields_ok && names_empty);
            }
        }
    }

    /// Empty address lists fail with a single list-level error.
    #[test]
    fn empty_addresses_single_error(mut candidate in record()) {
        candidate["addresses"] = json!([]);
        let errors = person_schema().validate(&candidate).unwrap_err();
        prop_assert_eq!(errors.first(&path("addresses")), Some(ADDRESSES_MESSAGE));
        prop_assert!(!errors.paths().any(|p| p.len() > 1));
    }

    /// A record that passes keeps passing when validated again, both as the
    /// original candidate and as the serialized typed record.
    #[test]
    fn validation_is_idempotent(candidate in record()) {
        let schema = person_schema();
        if let Ok(person) = schema.validate(&candidate) {
            prop_assert_eq!(schema.validate(&candidate).ok(), Some(person.clone()));
            let reserialized = serde_json::to_value(&person).unwrap();
            prop_assert_eq!(schema.validate(&reserialized).ok(), Some(person));
        }
    }
}
