//! Booking form input rules.
//!
//! Works on [`FormControl`] snapshots so the same rules run against the live
//! page and against field sets loaded by the preview tool.

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::FormControl;
use crate::state::data::FormFieldSet;

/// Ten digits, mobile prefixes 6-9
static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9]\d{9}$").expect("phone pattern is valid"));

/// Banner text for a rejected phone number
pub const PHONE_ERROR: &str = "Please enter a valid 10-digit phone number";

/// Fields the booking page marks `required`
pub const REQUIRED_FIELDS: [&str; 4] = ["customer_name", "phone_number", "address", "garment_type"];

/// Name of the booking form's telephone field
pub const PHONE_FIELD: &str = "phone_number";

/// Strip everything but ASCII digits
pub fn digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Check a phone number after dropping separators and spaces
pub fn is_valid_phone(raw: &str) -> bool {
    PHONE_PATTERN.is_match(&digits(raw))
}

/// Outcome of checking a form's controls. Indices point into the slice that
/// was validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Required controls that are blank after trimming
    pub missing: Vec<usize>,
    /// The telephone control, when it holds an unusable number
    pub bad_phone: Option<usize>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.missing.is_empty() && self.bad_phone.is_none()
    }

    /// Every control index that should be marked, without duplicates
    pub fn marked(&self) -> Vec<usize> {
        let mut marked = self.missing.clone();
        if let Some(phone) = self.bad_phone {
            if !marked.contains(&phone) {
                marked.push(phone);
            }
        }
        marked
    }
}

/// Check every control; all problems are collected, none short-circuit
pub fn validate<N>(controls: &[FormControl<N>]) -> ValidationReport {
    let missing = controls
        .iter()
        .enumerate()
        .filter(|(_, c)| c.required && c.value.trim().is_empty())
        .map(|(i, _)| i)
        .collect();

    // Only the first telephone input is checked, and only when it has input
    let bad_phone = controls
        .iter()
        .position(|c| c.kind == "tel")
        .filter(|&i| {
            let value = &controls[i].value;
            !value.is_empty() && !is_valid_phone(value)
        });

    ValidationReport { missing, bad_phone }
}

/// Controls equivalent to the booking page for a bare field set
pub fn booking_controls(fields: &FormFieldSet) -> Vec<FormControl<()>> {
    let mut controls: Vec<FormControl<()>> = fields
        .iter()
        .map(|(name, value)| FormControl {
            node: (),
            name: name.to_string(),
            kind: if name == PHONE_FIELD { "tel" } else { "text" }.to_string(),
            required: REQUIRED_FIELDS.contains(&name),
            disabled: false,
            value: value.to_string(),
            checked: false,
        })
        .collect();

    for name in REQUIRED_FIELDS {
        if fields.get(name).is_none() {
            controls.push(FormControl {
                node: (),
                name: name.to_string(),
                kind: if name == PHONE_FIELD { "tel" } else { "text" }.to_string(),
                required: true,
                disabled: false,
                value: String::new(),
                checked: false,
            });
        }
    }
    controls
}
