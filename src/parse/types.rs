//! Command-tree types produced by a parser and consumed by the evaluator.
//!
//! A tree is immutable during evaluation: every node is borrowed, never
//! consumed, so the same tree can be evaluated any number of times.

use serde::{Deserialize, Serialize};

/// One segment of a [`Word`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Part {
    /// Text appended verbatim.
    #[serde(rename = "lit")]
    Literal(String),
    /// Name of an environment variable looked up at resolution time.
    #[serde(rename = "var")]
    Variable(String),
}

/// A single token built from concatenated parts.
///
/// `echo$HOME/bin` is one word with three parts. Successive tokens are
/// separate words held in a list, never chained through the parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Word {
    parts: Vec<Part>,
}

impl Word {
    pub fn new(parts: Vec<Part>) -> Self {
        Self { parts }
    }

    /// A word made of one literal part.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(vec![Part::Literal(text.into())])
    }

    /// A word made of one variable reference.
    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(vec![Part::Variable(name.into())])
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// The text of a word that is exactly one literal part.
    pub fn as_literal(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [Part::Literal(text)] => Some(text),
            _ => None,
        }
    }

    /// The variable name of a word that is exactly one variable reference.
    pub fn as_variable(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [Part::Variable(name)] => Some(name),
            _ => None,
        }
    }
}

/// Append flags for the output and error targets of a [`SimpleCommand`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoFlags {
    /// `>>` rather than `>`.
    #[serde(default)]
    pub out_append: bool,
    /// `2>>` rather than `2>`.
    #[serde(default)]
    pub err_append: bool,
}

/// One program or built-in invocation plus its redirections.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimpleCommand {
    /// The command name. A missing verb makes the command a no-op.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verb: Option<Word>,
    /// Arguments, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<Word>,
    /// `< target`
    #[serde(default, rename = "in", skip_serializing_if = "Option::is_none")]
    pub input: Option<Word>,
    /// `> target` / `>> target`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out: Option<Word>,
    /// `2> target` / `2>> target`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err: Option<Word>,
    #[serde(default)]
    pub io: IoFlags,
}

/// Operator of an interior tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    /// `;`: run left, then right.
    Sequential,
    /// `&`: run both sides concurrently.
    Parallel,
    /// `||`: run right only if left returned non-zero.
    ConditionalNonZero,
    /// `&&`: run right only if left returned zero.
    ConditionalZero,
    /// `|`: left's stdout feeds right's stdin.
    Pipe,
}

impl Operator {
    /// The operator's shell syntax.
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Sequential => ";",
            Operator::Parallel => "&",
            Operator::ConditionalNonZero => "||",
            Operator::ConditionalZero => "&&",
            Operator::Pipe => "|",
        }
    }
}

/// A node of the command tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    /// Leaf wrapping one simple command.
    Simple(SimpleCommand),
    /// Interior node. A missing child evaluates as a successful no-op.
    Compound {
        op: Operator,
        #[serde(default)]
        left: Option<Box<Command>>,
        #[serde(default)]
        right: Option<Box<Command>>,
    },
}

impl Command {
    pub fn simple(cmd: SimpleCommand) -> Self {
        Command::Simple(cmd)
    }

    /// An interior node with both children present.
    pub fn compound(op: Operator, left: Command, right: Command) -> Self {
        Command::Compound {
            op,
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
        }
    }

    pub fn sequential(left: Command, right: Command) -> Self {
        Self::compound(Operator::Sequential, left, right)
    }

    pub fn parallel(left: Command, right: Command) -> Self {
        Self::compound(Operator::Parallel, left, right)
    }

    /// `left || right`
    pub fn if_nonzero(left: Command, right: Command) -> Self {
        Self::compound(Operator::ConditionalNonZero, left, right)
    }

    /// `left && right`
    pub fn if_zero(left: Command, right: Command) -> Self {
        Self::compound(Operator::ConditionalZero, left, right)
    }

    pub fn pipe(left: Command, right: Command) -> Self {
        Self::compound(Operator::Pipe, left, right)
    }

    /// Short label for log lines: the operator syntax, or `simple`.
    pub fn label(&self) -> &'static str {
        match self {
            Command::Simple(_) => "simple",
            Command::Compound { op, .. } => op.as_str(),
        }
    }
}
