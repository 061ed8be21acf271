//! Flag value types shared by every synthesized flag.
//!
//! A [`FlagValue`] is the storage behind one registered flag name: the CLI
//! layer feeds it raw text with [`apply`](FlagValue::apply) and reads it back
//! with [`render`](FlagValue::render).

use thiserror::Error;

/// Spellings accepted as `true` by boolean flags (after lowercasing).
pub const BOOL_TRUE_TOKENS: &[&str] = &["true", "yes", "1"];

/// Spellings accepted as `false` by boolean flags (after lowercasing).
pub const BOOL_FALSE_TOKENS: &[&str] = &["false", "no", "0"];

/// Errors raised when a flag's raw input does not fit its grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlagValueError {
    /// The raw text is not an accepted spelling for this flag.
    #[error("invalid value '{value}': expected {expected}")]
    InvalidValue {
        value: String,
        expected: &'static str,
    },
}

impl FlagValueError {
    pub(crate) fn invalid(value: &str, expected: &'static str) -> Self {
        Self::InvalidValue {
            value: value.to_string(),
            expected,
        }
    }
}

/// Storage for one registered flag name.
pub trait FlagValue {
    /// Current value in canonical textual form.
    fn render(&self) -> String;

    /// Parses `raw` and stores it.
    ///
    /// # Errors
    ///
    /// Returns [`FlagValueError::InvalidValue`] when `raw` is rejected; the
    /// stored value is left untouched.
    fn apply(&mut self, raw: &str) -> Result<(), FlagValueError>;

    /// Type label reported to the CLI layer (`"bool"`, `"string"`, ...).
    fn type_name(&self) -> &'static str;
}

/// Parses a boolean spelling: `true|yes|1` or `false|no|0`, any casing.
///
/// # Examples
///
/// ```
/// use aspect_flags_core::parse_bool;
///
/// assert_eq!(parse_bool("YES"), Ok(true));
/// assert_eq!(parse_bool("0"), Ok(false));
/// assert!(parse_bool("maybe").is_err());
/// ```
pub fn parse_bool(raw: &str) -> Result<bool, FlagValueError> {
    let normalized = raw.to_ascii_lowercase();
    if BOOL_TRUE_TOKENS.contains(&normalized.as_str()) {
        Ok(true)
    } else if BOOL_FALSE_TOKENS.contains(&normalized.as_str()) {
        Ok(false)
    } else {
        Err(FlagValueError::invalid(raw, "true|yes|1 or false|no|0"))
    }
}

/// Formats a boolean the way every flag renders it.
pub fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Plain boolean flag with no negated companion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoolValue {
    value: bool,
}

impl BoolValue {
    pub fn new(default: bool) -> Self {
        Self { value: default }
    }

    pub fn get(&self) -> bool {
        self.value
    }
}

impl FlagValue for BoolValue {
    fn render(&self) -> String {
        bool_str(self.value).to_string()
    }

    fn apply(&mut self, raw: &str) -> Result<(), FlagValueError> {
        self.value = parse_bool(raw)?;
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "bool"
    }
}

/// Single string value; the last occurrence wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringValue {
    value: String,
}

impl StringValue {
    pub fn new(default: &str) -> Self {
        Self {
            value: default.to_string(),
        }
    }

    pub fn get(&self) -> &str {
        &self.value
    }
}

impl FlagValue for StringValue {
    fn render(&self) -> String {
        self.value.clone()
    }

    fn apply(&mut self, raw: &str) -> Result<(), FlagValueError> {
        self.value = raw.to_string();
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "string"
    }
}

/// Accumulates every occurrence of a repeatable flag, in order.
///
/// # Examples
///
/// ```
/// use aspect_flags_core::{FlagValue, MultiString};
///
/// let mut copt = MultiString::default();
/// copt.apply("-O2").unwrap();
/// copt.apply("-g").unwrap();
/// assert_eq!(copt.values(), ["-O2", "-g"]);
/// assert_eq!(copt.render(), "[-O2,-g]");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultiString {
    values: Vec<String>,
}

impl MultiString {
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl FlagValue for MultiString {
    fn render(&self) -> String {
        format!("[{}]", self.values.join(","))
    }

    fn apply(&mut self, raw: &str) -> Result<(), FlagValueError> {
        self.values.push(raw.to_string());
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "stringSlice"
    }
}
