#![forbid(unsafe_code)]

//! Project-level constants referenced by templated field names.
//!
//! A constant is either an enum (a fixed option list that templated
//! field names expand across) or a fixed string. Names are constrained
//! to `[A-Z0-9_]+` at the persistence-validation boundary; inside an
//! editing session lookups by unknown name simply miss (soft failure).

use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

/// One project constant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Constant {
    /// Fixed option list, e.g. `SIZE = ["S", "M", "L"]`.
    Enum {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        options: Vec<String>,
    },
    /// Fixed string value.
    String {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
        value: String,
    },
}

impl Constant {
    /// The constant's name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Constant::Enum { name, .. } | Constant::String { name, .. } => name,
        }
    }
}

/// Look a constant up by name.
#[must_use]
pub fn find_constant<'a>(constants: &'a [Constant], name: &str) -> Option<&'a Constant> {
    constants.iter().find(|constant| constant.name() == name)
}

/// Options of the enum constant named `name`, or `None` when the name
/// is missing or resolves to a non-enum constant.
#[must_use]
pub fn enum_options<'a>(constants: &'a [Constant], name: &str) -> Option<&'a [String]> {
    match find_constant(constants, name)? {
        Constant::Enum { options, .. } => Some(options),
        Constant::String { .. } => None,
    }
}

/// Enforce the `[A-Z0-9_]+` naming constraint.
pub fn validate_name(name: &str) -> Result<(), SchemaError> {
    let valid = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_');
    if valid {
        Ok(())
    } else {
        Err(SchemaError::InvalidConstantName {
            name: name.to_string(),
        })
    }
}

/// Validate a constants list at the persistence boundary: every name
/// well-formed and unique.
pub fn validate_constants(constants: &[Constant]) -> Result<(), SchemaError> {
    let mut seen: Vec<&str> = Vec::new();
    for constant in constants {
        let name = constant.name();
        validate_name(name)?;
        if seen.contains(&name) {
            return Err(SchemaError::DuplicateConstantName {
                name: name.to_string(),
            });
        }
        seen.push(name);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
