//! clap value parsers for synthesized boolean flags.
//!
//! The parsers apply the same grammar as the core flag values, so bad input
//! is rejected while clap parses the command line, with
//! [`ErrorKind::InvalidValue`]. They never touch a binding; values reach the
//! bindings afterwards through
//! [`SynthesizedFlags::apply_matches`](crate::SynthesizedFlags::apply_matches).

use std::ffi::OsStr;

use aspect_flags_core::{FlagValueError, accept_face_input, parse_bool};
use clap::error::ErrorKind;
use clap::{Arg, Command};

/// Which boolean grammar an argument accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolGrammar {
    /// Plain face of a negatable flag: `true|yes|1|false|no|0`.
    Plain,
    /// Negated face of a negatable flag: only `true`.
    Negated,
    /// Non-negatable boolean: same spellings as [`BoolGrammar::Plain`].
    Expando,
}

impl BoolGrammar {
    /// Parses `raw`, returning the value the flag's cell would take.
    pub fn accept(self, raw: &str) -> Result<bool, FlagValueError> {
        match self {
            Self::Plain => accept_face_input(true, raw),
            Self::Negated => accept_face_input(false, raw),
            Self::Expando => parse_bool(raw),
        }
    }
}

impl clap::builder::TypedValueParser for BoolGrammar {
    type Value = bool;

    fn parse_ref(
        &self,
        cmd: &Command,
        arg: Option<&Arg>,
        value: &OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let raw = value
            .to_str()
            .ok_or_else(|| clap::Error::new(ErrorKind::InvalidUtf8).with_cmd(cmd))?;
        self.accept(raw).map_err(|err| {
            let flag = arg
                .and_then(Arg::get_long)
                .map(|long| format!(" for '--{long}'"))
                .unwrap_or_default();
            clap::Error::raw(ErrorKind::InvalidValue, format!("{err}{flag}\n")).with_cmd(cmd)
        })
    }
}
