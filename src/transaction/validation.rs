//! Validation of client supplied transaction fields.
//!
//! Validation never stops at the first problem: every failing field is
//! reported so the client can fix them all at once.

use std::{fmt::Display, str::FromStr, sync::LazyLock};

use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use time::{
    Date, OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description,
};

use crate::{
    LocalTimezone,
    transaction::core::{
        Category, NewTransaction, TransactionPatch, TransactionType, amount_to_cents,
        from_unix_millis, to_unix_millis,
    },
};

/// The longest description allowed, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 255;

static AMOUNT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.[0-9]{1,2})?$").expect("invalid amount pattern"));

/// The raw transaction fields sent by a client.
///
/// Every field is optional so that the same type can be used for creating
/// (all fields required) and updating (any subset of fields) transactions.
/// Fields hold any JSON value so that a value of the wrong type, including
/// `null`, is reported against its field instead of failing the whole body.
/// A field that is absent is `None`, an explicit `null` is `Some(Value::Null)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionInput {
    /// A decimal string with at most two decimal places, e.g. "12.50".
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub amount: Option<Value>,
    /// What the transaction was for.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    /// One of the [Category] names.
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,
    /// Either "income" or "expense".
    #[serde(
        rename = "type",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<Value>,
    /// An RFC 3339 timestamp or a calendar date (YYYY-MM-DD).
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub date: Option<Value>,
}

/// Deserialize a field that is present in the body, keeping `null` as a value.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// A validation failure for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// The name of the field as it appears in the JSON body.
    pub field: String,
    /// A message describing how to fix the field.
    pub message: String,
}

impl FieldError {
    /// Create a new field error.
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_owned(),
            message: message.to_owned(),
        }
    }
}

/// The list of fields that failed validation. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// The individual field errors.
    pub fn as_slice(&self) -> &[FieldError] {
        &self.0
    }
}

#[cfg(test)]
impl ValidationErrors {
    pub(crate) fn contains_field(&self, field: &str) -> bool {
        self.0.iter().any(|error| error.field == field)
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(value: Vec<FieldError>) -> Self {
        Self(value)
    }
}

impl Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<String> = self
            .0
            .iter()
            .map(|error| format!("{}: {}", error.field, error.message))
            .collect();

        write!(f, "{}", messages.join("; "))
    }
}

/// Validate the fields for a new transaction. Every field is required.
///
/// Dates given without a time are interpreted as midnight in `timezone`.
///
/// # Errors
///
/// Returns [ValidationErrors] listing every missing or invalid field.
pub fn validate_new_transaction(
    input: &TransactionInput,
    timezone: &LocalTimezone,
) -> Result<NewTransaction, ValidationErrors> {
    let mut errors = Vec::new();

    let amount = required(&mut errors, "amount", input.amount.as_ref(), parse_amount);
    let description = required(
        &mut errors,
        "description",
        input.description.as_ref(),
        parse_description,
    );
    let category = required(
        &mut errors,
        "category",
        input.category.as_ref(),
        parse_category,
    );
    let kind = required(&mut errors, "type", input.kind.as_ref(), parse_kind);
    let date = required(&mut errors, "date", input.date.as_ref(), |raw| {
        parse_date(raw, timezone)
    });

    match (amount, description, category, kind, date) {
        (Some(amount), Some(description), Some(category), Some(kind), Some(date))
            if errors.is_empty() =>
        {
            Ok(NewTransaction {
                amount,
                description,
                category,
                kind,
                date,
            })
        }
        _ => Err(ValidationErrors(errors)),
    }
}

/// Validate the fields for a partial update. Only the supplied fields are checked.
///
/// # Errors
///
/// Returns [ValidationErrors] listing every invalid field.
pub fn validate_patch(
    input: &TransactionInput,
    timezone: &LocalTimezone,
) -> Result<TransactionPatch, ValidationErrors> {
    let mut errors = Vec::new();

    let patch = TransactionPatch {
        amount: optional(&mut errors, "amount", input.amount.as_ref(), parse_amount),
        description: optional(
            &mut errors,
            "description",
            input.description.as_ref(),
            parse_description,
        ),
        category: optional(
            &mut errors,
            "category",
            input.category.as_ref(),
            parse_category,
        ),
        kind: optional(&mut errors, "type", input.kind.as_ref(), parse_kind),
        date: optional(&mut errors, "date", input.date.as_ref(), |raw| {
            parse_date(raw, timezone)
        }),
    };

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(ValidationErrors(errors))
    }
}

fn required<T>(
    errors: &mut Vec<FieldError>,
    field: &str,
    raw: Option<&Value>,
    parse: impl FnOnce(&str) -> Result<T, &'static str>,
) -> Option<T> {
    match raw {
        Some(raw) => optional(errors, field, Some(raw), parse),
        None => {
            errors.push(FieldError::new(field, "Required"));
            None
        }
    }
}

fn optional<T>(
    errors: &mut Vec<FieldError>,
    field: &str,
    raw: Option<&Value>,
    parse: impl FnOnce(&str) -> Result<T, &'static str>,
) -> Option<T> {
    let raw = raw?;

    let Value::String(text) = raw else {
        let message = format!("Expected string, received {}", json_type_name(raw));
        errors.push(FieldError::new(field, &message));
        return None;
    };

    match parse(text) {
        Ok(value) => Some(value),
        Err(message) => {
            errors.push(FieldError::new(field, message));
            None
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn parse_amount(raw: &str) -> Result<Decimal, &'static str> {
    if raw.is_empty() {
        return Err("Amount is required");
    }

    if !AMOUNT_PATTERN.is_match(raw) {
        return Err("Invalid amount format");
    }

    let mut amount = Decimal::from_str(raw).map_err(|_| "Invalid amount format")?;
    amount_to_cents(amount).ok_or("Invalid amount format")?;
    amount.rescale(2);

    Ok(amount)
}

fn parse_description(raw: &str) -> Result<String, &'static str> {
    if raw.is_empty() {
        return Err("Description is required");
    }

    if raw.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err("Description too long");
    }

    Ok(raw.to_owned())
}

fn parse_category(raw: &str) -> Result<Category, &'static str> {
    raw.parse().map_err(|_| "Please select a valid category")
}

fn parse_kind(raw: &str) -> Result<TransactionType, &'static str> {
    raw.parse().map_err(|_| "Please select transaction type")
}

fn parse_date(raw: &str, timezone: &LocalTimezone) -> Result<OffsetDateTime, &'static str> {
    if raw.is_empty() {
        return Err("Date is required");
    }

    let timestamp = match OffsetDateTime::parse(raw, &Rfc3339) {
        Ok(timestamp) => timestamp,
        Err(_) => Date::parse(raw, format_description!("[year]-[month]-[day]"))
            .map(|date| timezone.midnight(date))
            .map_err(|_| "Invalid date")?,
    };

    from_unix_millis(to_unix_millis(timestamp)).map_err(|_| "Invalid date")
}
