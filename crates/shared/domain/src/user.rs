//! User domain entity and its flat record codec.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::constants::{is_reserved_field, FIELD_EMAIL, FIELD_ID, FIELD_NAME};
use crate::error::{DomainError, DomainResult};

/// User domain entity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Assigned by the store on creation, 0 until then
    #[serde(default)]
    pub id: i64,
    pub name: String,
    pub email: String,
    /// Extra fields persisted alongside the user, opaque to the repository
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl User {
    /// Create a new, not yet persisted user
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            email: email.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute setter
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Check that the user can be written to the store.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.is_empty() {
            return Err(DomainError::validation("name must not be empty"));
        }
        if self.email.is_empty() {
            return Err(DomainError::validation("email must not be empty"));
        }
        if let Some(key) = self.attributes.keys().find(|k| is_reserved_field(k)) {
            return Err(DomainError::validation(format!(
                "attribute '{}' shadows a reserved field",
                key
            )));
        }
        Ok(())
    }

    /// Encode the user as the flat field mapping stored under its record key.
    ///
    /// Reserved fields come first, followed by attributes in key order.
    pub fn to_fields(&self) -> Vec<(String, String)> {
        let mut fields = Vec::with_capacity(3 + self.attributes.len());
        fields.push((FIELD_ID.to_string(), self.id.to_string()));
        fields.push((FIELD_NAME.to_string(), self.name.clone()));
        fields.push((FIELD_EMAIL.to_string(), self.email.clone()));
        fields.extend(
            self.attributes
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        fields
    }

    /// Decode a user from a stored field mapping.
    ///
    /// Every reserved field must be present and `id` must parse as an i64.
    /// Unknown fields are kept as attributes.
    pub fn from_fields(fields: &HashMap<String, String>) -> DomainResult<Self> {
        let raw_id = required(fields, FIELD_ID)?;
        let id = raw_id
            .parse::<i64>()
            .map_err(|_| DomainError::invalid_field(FIELD_ID, raw_id))?;

        let attributes = fields
            .iter()
            .filter(|(k, _)| !is_reserved_field(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(Self {
            id,
            name: required(fields, FIELD_NAME)?.to_string(),
            email: required(fields, FIELD_EMAIL)?.to_string(),
            attributes,
        })
    }
}

fn required<'a>(fields: &'a HashMap<String, String>, field: &str) -> DomainResult<&'a str> {
    fields
        .get(field)
        .map(String::as_str)
        .ok_or_else(|| DomainError::missing_field(field))
}
