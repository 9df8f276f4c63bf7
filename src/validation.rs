//! Field rules for user records.
//!
//! Everything here is pure: the same record always produces the same
//! [`FieldErrors`].

use std::collections::BTreeMap;

use thiserror::Error;

use crate::models::UserRecord;

/// A validated field of a user record. Permissions carry no rules and are
/// not listed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Email,
    Phone,
    Organization,
    UserType,
}

impl Field {
    /// Field path as used in form names and error maps.
    pub fn path(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::Phone => "phone",
            Field::Organization => "organization",
            Field::UserType => "userType",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Email => "Email",
            Field::Phone => "Phone",
            Field::Organization => "Organization",
            Field::UserType => "User type",
        }
    }

    pub fn from_path(path: &str) -> Option<Field> {
        Field::all().iter().copied().find(|f| f.path() == path)
    }

    pub fn all() -> &'static [Field] {
        &[
            Field::Name,
            Field::Email,
            Field::Phone,
            Field::Organization,
            Field::UserType,
        ]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{} is required", .0.label())]
    Required(Field),
    #[error("Invalid email")]
    Format(Field),
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            ValidationError::Required(f) | ValidationError::Format(f) => *f,
        }
    }
}

/// Field-level errors of a record, keyed by field. Empty means valid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<Field, ValidationError>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn get(&self, field: Field) -> Option<&ValidationError> {
        self.errors.get(&field)
    }

    pub fn message(&self, field: Field) -> Option<String> {
        self.get(field).map(|e| e.to_string())
    }

    /// Replace the entry for `field`; `None` clears it.
    pub fn set(&mut self, field: Field, error: Option<ValidationError>) {
        match error {
            Some(e) => {
                self.errors.insert(field, e);
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.values()
    }

    /// Field path → message.
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        self.errors
            .iter()
            .map(|(f, e)| (f.path(), e.to_string()))
            .collect()
    }
}

/// Whole-record validation.
pub fn validate(record: &UserRecord) -> FieldErrors {
    let mut errors = FieldErrors::default();
    for field in Field::all() {
        errors.set(*field, validate_field(record, *field));
    }
    errors
}

/// Validation of a single field.
pub fn validate_field(record: &UserRecord, field: Field) -> Option<ValidationError> {
    match field {
        Field::Name => required(field, &record.name),
        Field::Email => required(field, &record.email).or_else(|| {
            if is_valid_email(&record.email) {
                None
            } else {
                Some(ValidationError::Format(field))
            }
        }),
        Field::Phone => required(field, &record.phone),
        Field::Organization => required(field, &record.organization),
        Field::UserType => match record.user_type {
            Some(_) => None,
            None => Some(ValidationError::Required(field)),
        },
    }
}

fn required(field: Field, value: &str) -> Option<ValidationError> {
    if value.trim().is_empty() {
        Some(ValidationError::Required(field))
    } else {
        None
    }
}

/// `local@domain` with at least one dot in the domain.
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let (local, domain) = match value.split_once('@') {
        Some(parts) => parts,
        None => return false,
    };
    if domain.contains('@') {
        return false;
    }
    valid_local_part(local) && valid_domain(domain)
}

fn valid_local_part(local: &str) -> bool {
    const SPECIALS: &str = "!#$%&'*+/=?^_`{|}~-";
    !local.is_empty()
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || SPECIALS.contains(c))
}

fn valid_domain(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}
