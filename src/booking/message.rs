//! Booking message formatting and the messaging deep-link.
//!
//! Everything here is pure: a [`BookingRequest`] plus a timestamp goes in, the
//! message text comes out.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::config::{MessagingConfig, SiteConfig};
use crate::state::data::FormFieldSet;

/// Shown in place of a mandatory field the form did not carry
pub const PLACEHOLDER: &str = "N/A";

/// Measurement fields in message order: (form name, label)
pub const MEASUREMENT_FIELDS: [(&str, &str); 8] = [
    ("bust", "Bust"),
    ("waist", "Waist"),
    ("hip", "Hip"),
    ("shoulder", "Shoulder"),
    ("arm_length", "Arm Length"),
    ("length", "Length"),
    ("sleeve_length", "Sleeve Length"),
    ("neck_depth", "Neck Depth"),
];

/// One filled-in measurement
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Measurement {
    pub label: &'static str,
    pub value: String,
}

/// Structured booking, built from a submitted field set.
///
/// Empty form values are treated the same as absent ones.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingRequest {
    // ========== Customer ==========
    pub customer_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,

    // ========== Order ==========
    pub garment_type: Option<String>,
    pub style: Option<String>,
    /// Only the measurements that were filled in
    pub measurements: Vec<Measurement>,
    /// Unit picked on the form, if any
    pub unit: Option<String>,

    // ========== Additional ==========
    pub fabric_provided: bool,
    pub pickup_required: bool,
    pub delivery_required: bool,
    pub preferred_date: Option<String>,
    pub special_instructions: Option<String>,
}

impl BookingRequest {
    pub fn from_fields(fields: &FormFieldSet) -> Self {
        let text = |name: &str| fields.filled(name).map(str::to_string);
        // Checkboxes submit "on" when ticked and nothing otherwise
        let ticked = |name: &str| fields.get(name) == Some("on");

        Self {
            customer_name: text("customer_name"),
            phone: text("phone_number"),
            email: text("email"),
            address: text("address"),
            garment_type: text("garment_type"),
            style: text("style_preference"),
            measurements: MEASUREMENT_FIELDS
                .iter()
                .filter_map(|&(name, label)| {
                    fields.filled(name).map(|value| Measurement {
                        label,
                        value: value.to_string(),
                    })
                })
                .collect(),
            unit: text("unit"),
            fabric_provided: ticked("fabric_provided"),
            pickup_required: ticked("pickup_required"),
            delivery_required: ticked("delivery_required"),
            preferred_date: text("preferred_date"),
            special_instructions: text("special_instructions"),
        }
    }
}

/// Fixed parts of the message template
#[derive(Debug, Clone, Copy)]
pub struct Composer<'a> {
    pub business_name: &'a str,
    pub default_unit: &'a str,
}

impl<'a> Composer<'a> {
    pub fn from_config(config: &'a SiteConfig) -> Self {
        Self {
            business_name: &config.business_name,
            default_unit: &config.default_unit,
        }
    }

    /// Render the booking as a chat message stamped with `at`
    pub fn compose(&self, request: &BookingRequest, at: NaiveDateTime) -> String {
        let or_placeholder = |v: &Option<String>| v.clone().unwrap_or_else(|| PLACEHOLDER.to_string());
        let yes_no = |b: bool| if b { "Yes" } else { "No" };
        let unit = request.unit.as_deref().unwrap_or(self.default_unit);

        let mut message = format!("*New Booking - {}*\n", self.business_name);
        message += &format!("*Date:* {}\n\n", format_timestamp(at));

        message += "*Customer Details:*\n";
        message += &format!("👤 Name: {}\n", or_placeholder(&request.customer_name));
        message += &format!("📞 Phone: {}\n", or_placeholder(&request.phone));
        if let Some(email) = &request.email {
            message += &format!("📧 Email: {}\n", email);
        }
        message += &format!("🏠 Address: {}\n\n", or_placeholder(&request.address));

        message += "*Order Details:*\n";
        message += &format!("👗 Garment Type: {}\n", or_placeholder(&request.garment_type));
        if let Some(style) = &request.style {
            message += &format!("✂️ Style: {}\n", style);
        }
        message += "📏 Measurements:\n";
        for m in &request.measurements {
            message += &format!("   • {}: {} {}\n", m.label, m.value, unit);
        }

        message += "\n*Additional Info:*\n";
        message += &format!("🧵 Fabric Provided: {}\n", yes_no(request.fabric_provided));
        message += &format!("🚚 Pickup Required: {}\n", yes_no(request.pickup_required));
        message += &format!("📦 Delivery Required: {}\n", yes_no(request.delivery_required));
        if let Some(date) = &request.preferred_date {
            message += &format!("📅 Preferred Date: {}\n", date);
        }
        if let Some(notes) = &request.special_instructions {
            message += &format!("📝 Special Instructions: {}\n", notes);
        }

        message += &format!("\nThank you for choosing {}! 🙏", self.business_name);
        message
    }
}

/// `19/10/2026, 3:04:05 pm` (Indian English locale style)
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format("%-d/%-m/%Y, %-I:%M:%S %P").to_string()
}

/// Deep-link that opens the chat app with `message` pre-filled
pub fn deep_link(messaging: &MessagingConfig, message: &str) -> String {
    format!(
        "{}/{}?text={}",
        messaging.base_url.trim_end_matches('/'),
        messaging.recipient,
        urlencoding::encode(message)
    )
}
