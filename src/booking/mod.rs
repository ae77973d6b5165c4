/// Booking request handling
///
/// DOM-free pieces of the booking pipeline:
/// - Required field and phone number rules (validate.rs)
/// - Message template and deep-link construction (message.rs)

pub mod message;
pub mod validate;

pub use message::{deep_link, BookingRequest, Composer};
pub use validate::{validate, ValidationReport};
