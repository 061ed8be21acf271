//! Bazel-style negatable booleans.
//!
//! Bazel spells a boolean option either `--foo` or `--nofoo`; both names
//! drive the same value and the last one on the command line wins. Front-end
//! options in the `aspect:` namespace follow the same idiom with the `no`
//! inserted after the namespace: `--aspect:foo` / `--aspect:nofoo`.
//!
//! [`NegatableBool`] owns the shared cell and hands out two
//! [`NegatableBoolFace`]s, one per registered name. The faces parse
//! differently:
//!
//! - the plain face accepts `true|yes|1` and `false|no|0`;
//! - the negated face accepts only `true`, since there is no way to turn a
//!   negation off other than using the plain name.
//!
//! ```
//! use aspect_flags_core::{FlagValue, NegatableBool};
//!
//! let binding = NegatableBool::new(false);
//! let (mut plain, mut negated) = binding.faces();
//!
//! plain.apply("yes").unwrap();
//! assert!(binding.get());
//!
//! negated.apply("TRUE").unwrap();
//! assert!(!binding.get());
//! assert_eq!(plain.render(), "false");
//!
//! assert!(negated.apply("0").is_err());
//! ```

use std::cell::Cell;
use std::rc::Rc;

use crate::values::{BOOL_TRUE_TOKENS, FlagValue, FlagValueError, bool_str, parse_bool};

/// Namespace prefix of the front-end's own options.
pub const NAMESPACE_PREFIX: &str = "aspect:";

/// Prefix Bazel and the front-end use for negative boolean names.
pub const NEGATION_PREFIX: &str = "no";

/// Derives the registered name of a flag's negative form.
///
/// `home_rc` becomes `nohome_rc`; `aspect:home_config` becomes
/// `aspect:nohome_config`. The transform is not an involution: negating an
/// already negated name prefixes it again.
///
/// # Examples
///
/// ```
/// use aspect_flags_core::negated_flag_name;
///
/// assert_eq!(negated_flag_name("home_rc"), "nohome_rc");
/// assert_eq!(negated_flag_name("aspect:home_config"), "aspect:nohome_config");
/// ```
pub fn negated_flag_name(name: &str) -> String {
    match name.strip_prefix(NAMESPACE_PREFIX) {
        Some(rest) => format!("{NAMESPACE_PREFIX}{NEGATION_PREFIX}{rest}"),
        None => format!("{NEGATION_PREFIX}{name}"),
    }
}

/// Accepts `raw` for a face with the given polarity.
///
/// Returns the value the shared cell takes on acceptance. The CLI layer
/// uses this to reject bad input at parse time without touching the cell.
///
/// # Errors
///
/// [`FlagValueError::InvalidValue`] if `raw` is not in the face's grammar.
pub fn accept_face_input(value_when_true: bool, raw: &str) -> Result<bool, FlagValueError> {
    let means_true = if value_when_true {
        parse_bool(raw)?
    } else if BOOL_TRUE_TOKENS[0].eq_ignore_ascii_case(raw) {
        true
    } else {
        return Err(FlagValueError::invalid(raw, "true (negated flags take no other value)"));
    };

    Ok(if means_true {
        value_when_true
    } else {
        !value_when_true
    })
}

/// One boolean shared by a plain and a negated flag name.
#[derive(Debug, Clone)]
pub struct NegatableBool {
    cell: Rc<Cell<bool>>,
}

impl NegatableBool {
    /// Creates the shared cell holding `default`.
    pub fn new(default: bool) -> Self {
        Self {
            cell: Rc::new(Cell::new(default)),
        }
    }

    /// Current value of the cell.
    pub fn get(&self) -> bool {
        self.cell.get()
    }

    /// Face bound to the plain name.
    pub fn plain(&self) -> NegatableBoolFace {
        NegatableBoolFace {
            cell: Rc::clone(&self.cell),
            value_when_true: true,
        }
    }

    /// Face bound to the negated name.
    pub fn negated(&self) -> NegatableBoolFace {
        NegatableBoolFace {
            cell: Rc::clone(&self.cell),
            value_when_true: false,
        }
    }

    /// Both faces, plain first.
    pub fn faces(&self) -> (NegatableBoolFace, NegatableBoolFace) {
        (self.plain(), self.negated())
    }
}

/// One registered name of a [`NegatableBool`].
#[derive(Debug, Clone)]
pub struct NegatableBoolFace {
    cell: Rc<Cell<bool>>,
    value_when_true: bool,
}

impl NegatableBoolFace {
    /// `true` for the plain face, `false` for the negated face.
    pub fn value_when_true(&self) -> bool {
        self.value_when_true
    }

    pub fn is_negated(&self) -> bool {
        !self.value_when_true
    }

    /// Returns `true` if both faces write to the same cell.
    pub fn shares_cell_with(&self, other: &NegatableBoolFace) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl FlagValue for NegatableBoolFace {
    fn render(&self) -> String {
        bool_str(self.cell.get()).to_string()
    }

    fn apply(&mut self, raw: &str) -> Result<(), FlagValueError> {
        let value = accept_face_input(self.value_when_true, raw)?;
        self.cell.set(value);
        Ok(())
    }

    fn type_name(&self) -> &'static str {
        "bool"
    }
}
