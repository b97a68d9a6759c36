pub mod phone_validation;
pub use phone_validation::{PhoneValidationError, validate_phone_number};

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Current UTC time as an RFC 3339 string, used in response bodies
pub fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default()
}
