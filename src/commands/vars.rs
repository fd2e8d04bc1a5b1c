//! Variable display (`$NAME` alone) and assignment (`NAME=value`).
//!
//! Neither is selected by name: the evaluator picks them from the shape of
//! the verb word after name-matched built-ins have been ruled out.

use std::io::{self, Write};

use crate::env;
use crate::error::ShellError;
use crate::eval::{Shell, Status};
use crate::expand;
use crate::parse::{Part, Word};

/// Print the value of `name` followed by a newline. An unset variable prints
/// as an empty line and, depending on settings, becomes defined as empty.
pub fn display(shell: &Shell, name: &str) -> Result<Status, ShellError> {
    let value = env::lookup(name, shell.unset_vars());
    let mut stdout = io::stdout().lock();
    match writeln!(stdout, "{value}").and_then(|()| stdout.flush()) {
        Ok(()) => Ok(Status::SUCCESS),
        Err(e) => {
            log::warn!("displaying {name}: {e}");
            Ok(Status::FAILURE)
        }
    }
}

/// A verb of the form `[Literal(name), Literal("=..."), rest...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment<'a> {
    pub name: &'a str,
    /// Text of the marker segment after its leading `=`.
    head: &'a str,
    /// Segments after the marker, resolved when the assignment runs.
    rest: &'a [Part],
}

impl<'a> Assignment<'a> {
    /// Recognise an assignment verb. Anything else is `None`.
    pub fn parse(verb: &'a Word) -> Option<Self> {
        let [Part::Literal(name), Part::Literal(marker), rest @ ..] = verb.parts() else {
            return None;
        };
        let head = marker.strip_prefix('=')?;
        Some(Self {
            name: name.as_str(),
            head,
            rest,
        })
    }

    /// The value to assign, with every variable segment resolved now.
    pub fn value(&self, shell: &Shell) -> String {
        let mut value = self.head.to_string();
        value.push_str(&expand::resolve_parts(self.rest, shell.unset_vars()));
        value
    }

    pub fn apply(&self, shell: &Shell) -> Result<Status, ShellError> {
        let value = self.value(shell);
        log::debug!("set {}={value:?}", self.name);
        env::set(self.name, &value)?;
        Ok(Status::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::word;

    fn lit(text: &str) -> Part {
        Part::Literal(text.into())
    }

    #[test]
    fn parses_built_assignment() {
        let verb = word("TREESH_VARS_A=value");
        let assignment = Assignment::parse(&verb).unwrap();
        assert_eq!(assignment.name, "TREESH_VARS_A");
        assert_eq!(assignment.value(&Shell::default()), "value");
    }

    #[test]
    fn empty_value() {
        let verb = Word::new(vec![lit("TREESH_VARS_EMPTY"), lit("=")]);
        let assignment = Assignment::parse(&verb).unwrap();
        assert_eq!(assignment.apply(&Shell::default()).unwrap(), Status::SUCCESS);
        assert_eq!(env::get("TREESH_VARS_EMPTY").as_deref(), Some(""));
    }

    #[test]
    fn value_concatenates_later_segments() {
        env::set("TREESH_VARS_SRC", "mid").unwrap();
        let verb = Word::new(vec![
            lit("TREESH_VARS_DST"),
            lit("=a"),
            Part::Variable("TREESH_VARS_SRC".into()),
            lit("z"),
        ]);
        Assignment::parse(&verb).unwrap().apply(&Shell::default()).unwrap();
        assert_eq!(env::get("TREESH_VARS_DST").as_deref(), Some("amidz"));
    }

    #[test]
    fn other_shapes_are_not_assignments() {
        for verb in [
            Word::literal("X=1"),
            Word::new(vec![lit("X"), lit("1")]),
            Word::new(vec![Part::Variable("X".into()), lit("=1")]),
            Word::new(vec![lit("X"), Part::Variable("Y".into())]),
            Word::default(),
        ] {
            assert!(Assignment::parse(&verb).is_none(), "{verb:?}");
        }
    }

    #[test]
    fn bad_name_is_invalid_argument() {
        let verb = Word::new(vec![lit(""), lit("=x")]);
        let assignment = Assignment::parse(&verb).unwrap();
        assert!(matches!(
            assignment.apply(&Shell::default()),
            Err(ShellError::InvalidArgument(_))
        ));
    }

    #[test]
    fn display_defines_unset_variable() {
        assert_eq!(
            display(&Shell::default(), "TREESH_VARS_SHOWN").unwrap(),
            Status::SUCCESS
        );
        assert_eq!(env::get("TREESH_VARS_SHOWN").as_deref(), Some(""));
    }
}
