// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Submission payload validator.
//!
//! Turns an arbitrary JSON value into a typed [`Submission`] or a
//! structured per-field error map. The caller always gets one of the
//! two; malformed shapes are validation failures, never faults. All
//! field errors are collected in a single pass so the client can show
//! every problem at once.

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A fully validated candidate registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub city: String,
    pub phone: String,
    pub start_date: String,
    pub contract_type: String,
    pub role_title: String,
    pub shift: String,
    pub transit_allowance: String,
    pub pix_key: String,
    pub bank: String,
    pub supervisor_name: String,
    /// Hidden form field; humans leave it empty. Not part of the
    /// semantic payload and never affects validation of other fields.
    pub honeypot: Option<String>,
}

/// True when the payload's honeypot field is a string with
/// non-whitespace content.
///
/// Checked against the raw payload so a bot that trips the honeypot is
/// filtered whether or not its other fields would validate. A
/// non-string honeypot value is not "filled" and falls through to
/// normal validation.
pub fn honeypot_filled(payload: &Value) -> bool {
    payload
        .get("honeypot")
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}

/// Validation failure: form-level problems plus per-field messages
/// keyed by the wire field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    fn field(&mut self, name: &'static str, message: String) {
        self.field_errors.entry(name).or_default().push(message);
    }

    /// Invalid field names, for log lines.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.field_errors.keys().copied().collect()
    }
}

/// Validate an untyped payload into a [`Submission`].
///
/// Deterministic: identical input always yields identical output.
pub fn validate_submission(input: &Value) -> Result<Submission, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    let Some(map) = input.as_object() else {
        errors.form_errors.push("expected a JSON object".to_string());
        return Err(errors);
    };

    let name = require_string(map, &mut errors, "name", 2);
    let city = require_string(map, &mut errors, "city", 2);
    let phone = require_string(map, &mut errors, "phone", 10);
    let start_date = require_string(map, &mut errors, "startDate", 1);
    let contract_type = require_string(map, &mut errors, "contractType", 1);
    let role_title = require_string(map, &mut errors, "roleTitle", 1);
    let shift = require_string(map, &mut errors, "shift", 1);
    let transit_allowance = require_string(map, &mut errors, "transitAllowance", 1);
    let pix_key = require_string(map, &mut errors, "pixKey", 1);
    let bank = require_string(map, &mut errors, "bank", 1);
    let supervisor_name = require_string(map, &mut errors, "supervisorName", 2);

    let honeypot = match map.get("honeypot") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            errors.field("honeypot", "must be a string".to_string());
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(Submission {
        name,
        city,
        phone,
        start_date,
        contract_type,
        role_title,
        shift,
        transit_allowance,
        pix_key,
        bank,
        supervisor_name,
        honeypot,
    })
}

/// Pull a required string field out of the payload, recording an error
/// for absence, wrong type, or insufficient length. Returns an empty
/// string on failure so the single pass can keep collecting.
fn require_string(
    map: &serde_json::Map<String, Value>,
    errors: &mut ValidationErrors,
    name: &'static str,
    min_chars: usize,
) -> String {
    match map.get(name) {
        None | Some(Value::Null) => {
            errors.field(name, "required".to_string());
            String::new()
        }
        Some(Value::String(s)) => {
            if s.chars().count() < min_chars {
                let message = if min_chars == 1 {
                    "must not be empty".to_string()
                } else {
                    format!("must be at least {} characters", min_chars)
                };
                errors.field(name, message);
            }
            s.clone()
        }
        Some(_) => {
            errors.field(name, "must be a string".to_string());
            String::new()
        }
    }
}
