//! Contact details of a network node (one contact per node).

use serde::{Deserialize, Serialize};

use tradenet_core::{ContactId, Entity, FieldErrors};

pub const EMAIL_MAX_LEN: usize = 254;
pub const COUNTRY_MAX_LEN: usize = 200;
pub const CITY_MAX_LEN: usize = 255;
pub const STREET_MAX_LEN: usize = 255;
pub const BUILDING_NUMBER_MAX_LEN: usize = 20;

/// Stored contact record, owned by exactly one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub email: String,
    pub country: String,
    pub city: String,
    pub street: String,
    pub building_number: String,
}

/// Full contact input (node creation, full update).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    pub email: String,
    pub country: String,
    pub city: String,
    pub street: String,
    pub building_number: String,
}

/// Partial contact input; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactPatch {
    pub email: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub building_number: Option<String>,
}

impl Contact {
    pub fn from_details(id: ContactId, details: ContactDetails) -> Self {
        Self {
            id,
            email: details.email.trim().to_string(),
            country: details.country.trim().to_string(),
            city: details.city.trim().to_string(),
            street: details.street.trim().to_string(),
            building_number: details.building_number.trim().to_string(),
        }
    }

    /// Merge a partial update into this contact, keeping the identifier.
    pub fn apply_patch(&mut self, patch: ContactPatch) {
        if let Some(email) = patch.email {
            self.email = email.trim().to_string();
        }
        if let Some(country) = patch.country {
            self.country = country.trim().to_string();
        }
        if let Some(city) = patch.city {
            self.city = city.trim().to_string();
        }
        if let Some(street) = patch.street {
            self.street = street.trim().to_string();
        }
        if let Some(building_number) = patch.building_number {
            self.building_number = building_number.trim().to_string();
        }
    }

    /// Record every field rule this contact breaks under `prefix` (`contact`).
    pub fn validate(&self, prefix: &str, errors: &mut FieldErrors) {
        let key = |field: &str| format!("{prefix}.{field}");

        check_text(&self.email, EMAIL_MAX_LEN, &key("email"), errors);
        if !self.email.is_empty() && !is_valid_email(&self.email) {
            errors.add(key("email"), "enter a valid email address");
        }
        check_text(&self.country, COUNTRY_MAX_LEN, &key("country"), errors);
        check_text(&self.city, CITY_MAX_LEN, &key("city"), errors);
        check_text(&self.street, STREET_MAX_LEN, &key("street"), errors);
        check_text(
            &self.building_number,
            BUILDING_NUMBER_MAX_LEN,
            &key("building_number"),
            errors,
        );
    }

    /// Case-insensitive country comparison used by list filtering.
    pub fn is_in_country(&self, country: &str) -> bool {
        self.country.to_lowercase() == country.trim().to_lowercase()
    }
}

impl From<ContactDetails> for ContactPatch {
    fn from(details: ContactDetails) -> Self {
        Self {
            email: Some(details.email),
            country: Some(details.country),
            city: Some(details.city),
            street: Some(details.street),
            building_number: Some(details.building_number),
        }
    }
}

impl Entity for Contact {
    type Id = ContactId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl core::fmt::Display for Contact {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}, {}, {} st., bld. {}",
            self.country, self.city, self.street, self.building_number
        )
    }
}

/// Shared rule for required, length-limited text fields.
pub(crate) fn check_text(value: &str, max_len: usize, field: &str, errors: &mut FieldErrors) {
    if value.trim().is_empty() {
        errors.add(field, "this field may not be blank");
    } else if value.chars().count() > max_len {
        errors.add(
            field,
            format!("ensure this field has no more than {max_len} characters"),
        );
    }
}

/// Syntactic email check: `local@domain.tld`, no whitespace, one `@`.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}
