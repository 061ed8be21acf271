//! Descriptor validation.
//!
//! Catches schemas the registration driver could not mirror faithfully:
//! unusable names, duplicates, and a negatable flag whose `no` form collides
//! with another descriptor.
//!
//! # Examples
//!
//! ```
//! use aspect_flags_core::*;
//!
//! let flags = vec![
//!     FlagDescriptor::new("keep_going").with_negative_flag(),
//!     FlagDescriptor::new("output_base"),
//! ];
//! assert!(validate_descriptors(&flags).is_empty());
//!
//! let bad = vec![FlagDescriptor::new("--keep_going")];
//! assert!(!validate_descriptors(&bad).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::negatable::negated_flag_name;
use crate::types::FlagDescriptor;

/// Descriptor validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Flag name is empty or whitespace-only.
    #[error("flag name cannot be empty")]
    EmptyFlagName,
    /// Flag name carries dashes, `=` or whitespace.
    #[error("invalid flag name: {0}")]
    InvalidFlagName(String),
    /// Shorthand is not an ASCII alphanumeric character.
    #[error("invalid abbreviation '{abbreviation}' for flag {flag}")]
    InvalidAbbreviation { flag: String, abbreviation: char },
    /// Two descriptors share a name.
    #[error("duplicate flag in schema: {0}")]
    DuplicateFlag(String),
    /// The `no` form of a negatable flag is also a descriptor of its own.
    #[error("negated form of {flag} collides with flag {negated}")]
    NegatedNameCollision { flag: String, negated: String },
}

/// Validates a full descriptor list, returning every problem found.
pub fn validate_descriptors(descriptors: &[FlagDescriptor]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();

    for descriptor in descriptors {
        let name = descriptor.name.as_str();
        if name.trim().is_empty() {
            errors.push(ValidationError::EmptyFlagName);
            continue;
        }
        if name.starts_with('-') || name.contains('=') || name.chars().any(char::is_whitespace) {
            errors.push(ValidationError::InvalidFlagName(name.to_string()));
            continue;
        }
        if let Some(abbreviation) = descriptor.abbreviation {
            if !abbreviation.is_ascii_alphanumeric() {
                errors.push(ValidationError::InvalidAbbreviation {
                    flag: name.to_string(),
                    abbreviation,
                });
            }
        }
        if !seen.insert(name) {
            errors.push(ValidationError::DuplicateFlag(name.to_string()));
        }
    }

    for descriptor in descriptors.iter().filter(|d| d.has_negative_flag) {
        let negated = negated_flag_name(&descriptor.name);
        if seen.contains(negated.as_str()) {
            errors.push(ValidationError::NegatedNameCollision {
                flag: descriptor.name.clone(),
                negated,
            });
        }
    }

    errors
}
