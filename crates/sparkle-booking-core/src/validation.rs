//! Booking request validation
//!
//! Every rule runs on every request, so a caller sees all field problems in
//! one response rather than one at a time.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sparkle_types::{is_valid_email, ServiceId};

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9\s\-().]{7,20}$").expect("phone pattern is valid")
});

static TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([01]\d|2[0-3]):([0-5]\d)$").expect("time pattern is valid")
});

/// Raw booking request as submitted by the public booking form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub customer_phone: Option<String>,
    /// Service ID
    pub service: Option<String>,
    /// RFC 3339 datetime or `YYYY-MM-DD`
    pub date: Option<String>,
    /// `HH:MM`
    pub time: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

/// A single field that failed validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name as it appears in the request body
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// A booking request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedBooking {
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub service_id: ServiceId,
    pub appointment_date: DateTime<Utc>,
    pub appointment_time: String,
    pub address: String,
    pub notes: Option<String>,
}

/// Validate a booking request against the clock reading `now`
pub fn validate(
    request: &BookingRequest,
    now: DateTime<Utc>,
) -> Result<ValidatedBooking, Vec<FieldError>> {
    let mut errors = Vec::new();

    let customer_name = required(&request.customer_name, "customerName", "Customer name", &mut errors)
        .and_then(|name| {
            let len = name.chars().count();
            if len < 2 {
                errors.push(FieldError::new("customerName", "Name must be at least 2 characters"));
                None
            } else if len > 50 {
                errors.push(FieldError::new("customerName", "Name must be at most 50 characters"));
                None
            } else {
                Some(name)
            }
        });

    let customer_email = required(&request.customer_email, "customerEmail", "Email", &mut errors)
        .and_then(|email| {
            if is_valid_email(&email) {
                Some(email)
            } else {
                errors.push(FieldError::new(
                    "customerEmail",
                    "Please enter a valid email address",
                ));
                None
            }
        });

    let customer_phone = required(&request.customer_phone, "customerPhone", "Phone number", &mut errors)
        .and_then(|phone| {
            if PHONE_RE.is_match(&phone) {
                Some(phone)
            } else {
                errors.push(FieldError::new(
                    "customerPhone",
                    "Please enter a valid phone number",
                ));
                None
            }
        });

    let service_id = required(&request.service, "service", "Service", &mut errors).and_then(|raw| {
        match ServiceId::parse(&raw) {
            Ok(id) => Some(id),
            Err(_) => {
                errors.push(FieldError::new("service", "Invalid service ID"));
                None
            }
        }
    });

    let appointment_date = required(&request.date, "date", "Date", &mut errors).and_then(|raw| {
        match parse_date(&raw) {
            Some(date) if date > now => Some(date),
            Some(_) => {
                errors.push(FieldError::new("date", "Date must be in the future"));
                None
            }
            None => {
                errors.push(FieldError::new("date", "Please select a valid date"));
                None
            }
        }
    });

    let appointment_time = required(&request.time, "time", "Time", &mut errors).and_then(|time| {
        if TIME_RE.is_match(&time) {
            Some(time)
        } else {
            errors.push(FieldError::new("time", "Time must be in 24-hour HH:MM format"));
            None
        }
    });

    let address = required(&request.address, "address", "Address", &mut errors).and_then(|addr| {
        let len = addr.chars().count();
        if len < 5 {
            errors.push(FieldError::new("address", "Address must be at least 5 characters"));
            None
        } else if len > 200 {
            errors.push(FieldError::new("address", "Address must be at most 200 characters"));
            None
        } else {
            Some(addr)
        }
    });

    let notes = match request.notes.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(notes) if notes.chars().count() > 500 => {
            errors.push(FieldError::new("notes", "Notes must be at most 500 characters"));
            None
        }
        Some(notes) => Some(notes.to_string()),
    };

    match (
        customer_name,
        customer_email,
        customer_phone,
        service_id,
        appointment_date,
        appointment_time,
        address,
    ) {
        (
            Some(customer_name),
            Some(customer_email),
            Some(customer_phone),
            Some(service_id),
            Some(appointment_date),
            Some(appointment_time),
            Some(address),
        ) if errors.is_empty() => Ok(ValidatedBooking {
            customer_name,
            customer_email,
            customer_phone,
            service_id,
            appointment_date,
            appointment_time,
            address,
            notes,
        }),
        _ => Err(errors),
    }
}

/// Validate a raw JSON body.
///
/// Fields of the wrong JSON type are reported in place of the usual
/// message for that field, alongside every other field problem.
pub fn validate_json(
    body: &serde_json::Value,
    now: DateTime<Utc>,
) -> Result<ValidatedBooking, Vec<FieldError>> {
    let Some(object) = body.as_object() else {
        return Err(vec![FieldError::new("body", "Expected a JSON object")]);
    };

    let mut mistyped: Vec<FieldError> = Vec::new();
    let mut field = |name: &str| match object.get(name) {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(v)) => Some(v.clone()),
        Some(other) => {
            mistyped.push(FieldError::new(
                name,
                format!("Expected a string, received {}", json_type(other)),
            ));
            None
        }
    };

    let request = BookingRequest {
        customer_name: field("customerName"),
        customer_email: field("customerEmail"),
        customer_phone: field("customerPhone"),
        service: field("service"),
        date: field("date"),
        time: field("time"),
        address: field("address"),
        notes: field("notes"),
    };

    match validate(&request, now) {
        Ok(validated) if mistyped.is_empty() => Ok(validated),
        Ok(_) => Err(mistyped),
        Err(errors) => {
            let mut merged: Vec<FieldError> = errors
                .into_iter()
                .map(|err| {
                    match mistyped.iter().position(|m| m.field == err.field) {
                        Some(i) => mistyped.remove(i),
                        None => err,
                    }
                })
                .collect();
            merged.append(&mut mistyped);
            Err(merged)
        }
    }
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Parse an RFC 3339 datetime, or a bare `YYYY-MM-DD` as UTC midnight
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Whether a string is a bare `YYYY-MM-DD` date
pub fn is_date_only(raw: &str) -> bool {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").is_ok()
}

fn required(
    value: &Option<String>,
    field: &str,
    label: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Some(v.to_string()),
        _ => {
            errors.push(FieldError::new(field, format!("{label} is required")));
            None
        }
    }
}
