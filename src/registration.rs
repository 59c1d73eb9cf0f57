use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // 10-digit Indian mobile number, optionally prefixed with +91
    static ref PHONE_REGEX: Regex = Regex::new(r"^(?:\+91)?[6-9]\d{9}$").unwrap();
}

pub const NAME_TOO_SHORT: &str = "பெயர் குறைந்தது 2 எழுத்துகள் இருக்க வேண்டும்.";
pub const PHONE_INVALID: &str = "சரியான 10 இலக்க தொலைபேசி எண்ணை உள்ளிடவும்.";
pub const BOOTH_REQUIRED: &str = "பூத் எண் தேவை.";
pub const POSITION_REQUIRED: &str = "பதவி தேவை.";

/// Registration form as typed by the visitor
///
/// Field names match the HTML form inputs. Nothing is trimmed; the rules are
/// applied to exactly what was entered.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Registration {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub booth: String,

    #[serde(default)]
    pub position: String,
}

/// Payload sent to the sheet, keyed the way the Apps Script expects
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub full_name: String,
    pub phone_number: String,
    pub constituency: String,
    pub party_role: String,
}

/// Per-field validation messages, `None` when the field is fine
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FieldErrors {
    pub name: Option<&'static str>,
    pub phone: Option<&'static str>,
    pub booth: Option<&'static str>,
    pub position: Option<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone.is_none()
            && self.booth.is_none()
            && self.position.is_none()
    }
}

impl Registration {
    /// Check every field and report all failures at once
    ///
    /// # Returns
    /// * `Ok(SubmissionPayload)` - The mapped payload when every rule passes
    /// * `Err(FieldErrors)` - One localized message per failing field
    pub fn validate(&self) -> Result<SubmissionPayload, FieldErrors> {
        let errors = FieldErrors {
            name: min_chars(&self.name, 2).then_some(NAME_TOO_SHORT),
            phone: (!is_valid_phone(&self.phone)).then_some(PHONE_INVALID),
            booth: min_chars(&self.booth, 1).then_some(BOOTH_REQUIRED),
            position: min_chars(&self.position, 2).then_some(POSITION_REQUIRED),
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(SubmissionPayload {
            full_name: self.name.clone(),
            phone_number: self.phone.clone(),
            constituency: self.booth.clone(),
            party_role: self.position.clone(),
        })
    }
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_REGEX.is_match(phone)
}

// true when `value` is shorter than `min` characters
fn min_chars(value: &str, min: usize) -> bool {
    value.chars().count() < min
}
