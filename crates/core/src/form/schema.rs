use once_cell::sync::Lazy;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{FieldDescriptor, FieldKind, Rule, ValidationErrors};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// A value submitted for one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(i64),
    Text(String),
    Choices(Vec<String>),
}

impl FieldValue {
    fn is_blank(&self) -> bool {
        match self {
            FieldValue::Number(_) => false,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Choices(items) => items.is_empty(),
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

/// Submitted values keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues(BTreeMap<String, FieldValue>);

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, field: &str, value: impl Into<String>) -> Self {
        self.0
            .insert(field.to_string(), FieldValue::Text(value.into()));
        self
    }

    pub fn number(mut self, field: &str, value: i64) -> Self {
        self.0.insert(field.to_string(), FieldValue::Number(value));
        self
    }

    pub fn choices(mut self, field: &str, values: Vec<String>) -> Self {
        self.0
            .insert(field.to_string(), FieldValue::Choices(values));
        self
    }

    pub fn value(mut self, field: &str, value: FieldValue) -> Self {
        self.0.insert(field.to_string(), value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }
}

/// A named set of field descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSchema {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl FormSchema {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check every field of the schema against the submitted values.
    pub fn validate(&self, values: &FormValues) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        for field in &self.fields {
            match values.get(&field.name).filter(|v| !v.is_blank()) {
                None => {
                    if self.is_required(field, values) {
                        errors.add(&field.name, format!("{} is required", field.label));
                    }
                }
                Some(value) => {
                    if let Some(message) = check_kind(field, value) {
                        errors.add(&field.name, message);
                        continue;
                    }
                    for rule in &field.rules {
                        if let Some(message) = check_rule(field, rule, value) {
                            errors.add(&field.name, message);
                            break;
                        }
                    }
                }
            }
        }

        errors.into_result()
    }

    fn is_required(&self, field: &FieldDescriptor, values: &FormValues) -> bool {
        field.required
            || field.rules.iter().any(|rule| match rule {
                Rule::RequiredWhen {
                    field: other,
                    equals,
                } => values
                    .get(other)
                    .and_then(FieldValue::as_text)
                    .is_some_and(|v| v == equals.as_str()),
                _ => false,
            })
    }
}

fn check_kind(field: &FieldDescriptor, value: &FieldValue) -> Option<String> {
    match (&field.kind, value) {
        (FieldKind::Text, FieldValue::Text(_)) => None,
        (FieldKind::Email, FieldValue::Text(s)) => {
            if EMAIL_RE.is_match(s.trim()) {
                None
            } else {
                Some(format!("{} is not a valid email", field.label))
            }
        }
        (FieldKind::Number, FieldValue::Number(_)) => None,
        (FieldKind::Number, FieldValue::Text(s)) if s.trim().parse::<i64>().is_ok() => None,
        (FieldKind::SingleChoice(choices), FieldValue::Text(s)) => {
            if choices.iter().any(|c| &c.id == s) {
                None
            } else {
                Some(format!("{} has an unknown option: {}", field.label, s))
            }
        }
        (FieldKind::MultiChoice(choices), FieldValue::Choices(items)) => items
            .iter()
            .find(|item| !choices.iter().any(|c| &c.id == *item))
            .map(|item| format!("{} has an unknown option: {}", field.label, item)),
        (FieldKind::Number, _) => Some(format!("{} must be a number", field.label)),
        _ => Some(format!("{} has the wrong value type", field.label)),
    }
}

fn check_rule(field: &FieldDescriptor, rule: &Rule, value: &FieldValue) -> Option<String> {
    match rule {
        Rule::Email => match value.as_text() {
            Some(s) if EMAIL_RE.is_match(s.trim()) => None,
            _ => Some(format!("{} is not a valid email", field.label)),
        },
        Rule::DigitCount { digits } => {
            let count = match value {
                FieldValue::Text(s) => s.chars().filter(char::is_ascii_digit).count(),
                FieldValue::Number(n) => n.unsigned_abs().to_string().len(),
                FieldValue::Choices(_) => 0,
            };
            (count != *digits)
                .then(|| format!("{} must contain {} digits", field.label, digits))
        }
        Rule::Positive => {
            let number = match value {
                FieldValue::Number(n) => Some(*n),
                FieldValue::Text(s) => s.trim().parse::<i64>().ok(),
                FieldValue::Choices(_) => None,
            };
            match number {
                Some(n) if n > 0 => None,
                _ => Some(format!("{} must be greater than zero", field.label)),
            }
        }
        Rule::RequiredWhen { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Choice;

    fn schema() -> FormSchema {
        FormSchema::new(
            "test",
            vec![
                FieldDescriptor::new("name", "Name", FieldKind::Text).required(),
                FieldDescriptor::new("email", "E-mail", FieldKind::Email).required(),
                FieldDescriptor::new("cpf", "CPF", FieldKind::Text)
                    .required()
                    .with_rule(Rule::DigitCount { digits: 11 }),
                FieldDescriptor::new(
                    "kind",
                    "Kind",
                    FieldKind::SingleChoice(vec![
                        Choice::new("normal", "Normal"),
                        Choice::new("cert", "Certificate"),
                    ]),
                )
                .required(),
                FieldDescriptor::new("certificate", "Certificate", FieldKind::Text)
                    .hidden()
                    .with_rule(Rule::RequiredWhen {
                        field: "kind".to_string(),
                        equals: "cert".to_string(),
                    }),
                FieldDescriptor::new("order", "Order", FieldKind::Number)
                    .required()
                    .with_rule(Rule::Positive),
            ],
        )
    }

    fn valid_values() -> FormValues {
        FormValues::new()
            .text("name", "Ana")
            .text("email", "ana@acme.com")
            .text("cpf", "123.456.789-09")
            .text("kind", "normal")
            .number("order", 1)
    }

    #[test]
    fn test_valid_values_pass() {
        assert!(schema().validate(&valid_values()).is_ok());
    }

    #[test]
    fn test_missing_required_fields_reported() {
        let errors = schema().validate(&FormValues::new()).unwrap_err();
        assert_eq!(errors.get("name"), Some("Name is required"));
        assert!(errors.get("email").is_some());
        assert!(errors.get("certificate").is_none());
    }

    #[test]
    fn test_blank_text_counts_as_missing() {
        let values = valid_values().text("name", "   ");
        let errors = schema().validate(&values).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors.get("name").is_some());
    }

    #[test]
    fn test_invalid_email_rejected() {
        let values = valid_values().text("email", "not-an-email");
        let errors = schema().validate(&values).unwrap_err();
        assert!(errors.get("email").unwrap().contains("valid email"));
    }

    #[test]
    fn test_cpf_digit_count() {
        let values = valid_values().text("cpf", "123.456");
        let errors = schema().validate(&values).unwrap_err();
        assert!(errors.get("cpf").unwrap().contains("11 digits"));
    }

    #[test]
    fn test_conditional_requirement() {
        let values = valid_values().text("kind", "cert");
        let errors = schema().validate(&values).unwrap_err();
        assert!(errors.get("certificate").is_some());

        let values = valid_values()
            .text("kind", "cert")
            .text("certificate", "A1");
        assert!(schema().validate(&values).is_ok());
    }

    #[test]
    fn test_unknown_choice_rejected() {
        let values = valid_values().text("kind", "other");
        let errors = schema().validate(&values).unwrap_err();
        assert!(errors.get("kind").unwrap().contains("unknown option"));
    }

    #[test]
    fn test_number_rules() {
        let errors = schema()
            .validate(&valid_values().number("order", 0))
            .unwrap_err();
        assert!(errors.get("order").is_some());

        assert!(schema()
            .validate(&valid_values().text("order", "3"))
            .is_ok());

        let errors = schema()
            .validate(&valid_values().text("order", "third"))
            .unwrap_err();
        assert!(errors.get("order").unwrap().contains("number"));
    }

    #[test]
    fn test_values_deserialize_untagged() {
        let values: FormValues =
            serde_json::from_str(r#"{"name":"Ana","order":2,"tags":["a","b"]}"#).unwrap();
        assert_eq!(values.get("order"), Some(&FieldValue::Number(2)));
        assert_eq!(
            values.get("tags"),
            Some(&FieldValue::Choices(vec!["a".to_string(), "b".to_string()]))
        );
    }
}
