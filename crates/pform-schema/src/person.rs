//! # Person Schema
//!
//! Field rules and the name refinement for person records. The message
//! constants are the exact strings a person form displays.

use pform_core::{FieldPath, Gender, Person};

use crate::schema::Schema;
use crate::shape::{ArrayRule, BooleanRule, EnumRule, NumberRule, ObjectShape, StringRule};

/// Age below 18, or age input that is not a number.
pub const AGE_MESSAGE: &str = "Must be at least 18 years old";
/// Email present but malformed.
pub const INVALID_EMAIL_MESSAGE: &str = "Invalid email";
/// Email left empty.
pub const EMAIL_REQUIRED_MESSAGE: &str = "Email is required";
/// Terms checkbox not ticked.
pub const TERMS_MESSAGE: &str = "You must accept Terms & Conditions";
/// Address list empty.
pub const ADDRESSES_MESSAGE: &str = "Provide at least 1 address";
/// Address entry without a country.
pub const COUNTRY_MESSAGE: &str = "Country is required";
/// Both name fields empty.
pub const NAME_MESSAGE: &str = "Either first or last name should be filled in.";

/// Minimum accepted age.
pub const MIN_AGE: f64 = 18.0;

/// Schema type for person records.
pub type PersonSchema = Schema<Person>;

/// Build the person schema.
pub fn person_schema() -> PersonSchema {
    let address = ObjectShape::new()
        .field("country", StringRule::new().min(1, COUNTRY_MESSAGE))
        .field("city", StringRule::new().optional());

    let shape = ObjectShape::new()
        .field("firstName", StringRule::new().optional())
        .field("lastName", StringRule::new().optional())
        .field(
            "age",
            NumberRule::coerced()
                .type_message(AGE_MESSAGE)
                .min(MIN_AGE, AGE_MESSAGE),
        )
        .field(
            "email",
            StringRule::new()
                .min(1, EMAIL_REQUIRED_MESSAGE)
                .email(INVALID_EMAIL_MESSAGE),
        )
        .field("gender", EnumRule::new(&Gender::WIRE_VALUES))
        .field("terms", BooleanRule::new().must_be_true(TERMS_MESSAGE))
        .field(
            "addresses",
            ArrayRule::new(address).min(1, ADDRESSES_MESSAGE),
        );

    Schema::new(shape).refine(
        FieldPath::root().key("lastName"),
        NAME_MESSAGE,
        Person::has_name,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pform_core::Address;
    use serde_json::{json, Value};

    fn valid() -> Value {
        json!({
            "firstName": "Jo",
            "lastName": "",
            "age": 18,
            "email": "a@b.com",
            "gender": "m",
            "terms": true,
            "addresses": [{"country": "US", "city": ""}]
        })
    }

    fn path(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    #[test]
    fn test_valid_record() {
        let person = person_schema().validate(&valid()).unwrap();
        assert_eq!(person.first_name.as_deref(), Some("Jo"));
        assert_eq!(person.age, 18.0);
        assert_eq!(person.gender, Gender::Male);
        assert_eq!(
            person.addresses,
            vec![Address {
                country: "US".to_string(),
                city: Some(String::new())
            }]
        );
    }

    #[test]
    fn test_age_coerced_from_text() {
        let mut v = valid();
        v["age"] = json!("42");
        assert_eq!(person_schema().validate(&v).unwrap().age, 42.0);
    }

    #[test]
    fn test_age_not_a_number_uses_age_message() {
        for raw in [json!("abc"), json!([]), Value::Null] {
            let mut v = valid();
            v["age"] = raw;
            let errors = person_schema().validate(&v).unwrap_err();
            assert_eq!(errors.first(&path("age")), Some(AGE_MESSAGE));
        }
        let mut v = valid();
        v.as_object_mut().unwrap().remove("age");
        let errors = person_schema().validate(&v).unwrap_err();
        assert_eq!(errors.first(&path("age")), Some(AGE_MESSAGE));
    }

    #[test]
    fn test_email_messages() {
        let mut v = valid();
        v["email"] = json!("");
        let errors = person_schema().validate(&v).unwrap_err();
        assert_eq!(errors.get(&path("email")).unwrap(), [EMAIL_REQUIRED_MESSAGE]);

        v["email"] = json!("bad");
        let errors = person_schema().validate(&v).unwrap_err();
        assert_eq!(errors.first(&path("email")), Some(INVALID_EMAIL_MESSAGE));
    }

    #[test]
    fn test_gender_outside_enum() {
        let mut v = valid();
        v["gender"] = json!("x");
        let errors = person_schema().validate(&v).unwrap_err();
        assert_eq!(
            errors.first(&path("gender")),
            Some("Invalid enum value. Expected 'm' | 'f', received 'x'")
        );
    }

    #[test]
    fn test_missing_country() {
        let mut v = valid();
        v["addresses"] = json!([{"country": "US"}, {"city": "Paris"}, {"country": ""}]);
        let errors = person_schema().validate(&v).unwrap_err();
        assert_eq!(errors.first(&path("addresses.1.country")), Some("Required"));
        assert_eq!(errors.first(&path("addresses.2.country")), Some(COUNTRY_MESSAGE));
        assert!(!errors.contains(&path("addresses")));
    }
}
