//! Builds a leaf [`Command`] from one line of simple-command text.
//!
//! Quoting is delegated to shlex. Composition operators (`|`, `&&`, `;`)
//! are not recognised here: trees are assembled by the caller.

use super::types::{Command, Part, SimpleCommand, Word};
use crate::error::ShellError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RedirOp {
    In,
    Out,
    OutAppend,
    Err,
    ErrAppend,
    Both,
    BothAppend,
}

// Longest prefix first.
const REDIRECTIONS: &[(&str, RedirOp)] = &[
    ("&>>", RedirOp::BothAppend),
    ("&>", RedirOp::Both),
    ("2>>", RedirOp::ErrAppend),
    ("2>", RedirOp::Err),
    (">>", RedirOp::OutAppend),
    (">", RedirOp::Out),
    ("<", RedirOp::In),
];

/// Tokenize a command line into words using shlex (POSIX word splitting).
pub fn tokenize(line: &str) -> Vec<String> {
    shlex::split(line).unwrap_or_else(|| {
        // Fallback: simple whitespace splitting if shlex can't parse
        line.split_whitespace().map(String::from).collect()
    })
}

/// Split a token into literal and `$NAME` / `${NAME}` parts.
///
/// A leading `NAME=` becomes its own literal part so the `=` segment that
/// marks an assignment is visible to dispatch.
pub fn word(token: &str) -> Word {
    let mut parts = Vec::new();
    let mut rest = token;
    if let Some((name, value)) = split_assignment(token) {
        parts.push(Part::Literal(name.to_string()));
        rest = value;
    }
    push_expansions(rest, &mut parts);
    if parts.is_empty() {
        parts.push(Part::Literal(String::new()));
    }
    Word::new(parts)
}

/// Build a simple command from one line of text.
pub fn simple_command(line: &str) -> Result<SimpleCommand, ShellError> {
    let mut cmd = SimpleCommand::default();
    let mut tokens = tokenize(line).into_iter();

    while let Some(token) = tokens.next() {
        let Some((op, attached)) = redirection(&token) else {
            let w = word(&token);
            match cmd.verb {
                None => cmd.verb = Some(w),
                Some(_) => cmd.params.push(w),
            }
            continue;
        };

        let target = if attached.is_empty() {
            tokens.next().ok_or_else(|| {
                ShellError::Syntax(format!("missing target after `{token}`"))
            })?
        } else {
            attached.to_string()
        };
        let target = word(&target);

        match op {
            RedirOp::In => cmd.input = Some(target),
            RedirOp::Out | RedirOp::OutAppend => {
                cmd.io.out_append = op == RedirOp::OutAppend;
                cmd.out = Some(target);
            }
            RedirOp::Err | RedirOp::ErrAppend => {
                cmd.io.err_append = op == RedirOp::ErrAppend;
                cmd.err = Some(target);
            }
            RedirOp::Both | RedirOp::BothAppend => {
                let append = op == RedirOp::BothAppend;
                cmd.io.out_append = append;
                cmd.io.err_append = append;
                cmd.out = Some(target.clone());
                cmd.err = Some(target);
            }
        }
    }

    Ok(cmd)
}

/// Build a leaf node from one line of text.
pub fn leaf(line: &str) -> Result<Command, ShellError> {
    simple_command(line).map(Command::Simple)
}

fn redirection(token: &str) -> Option<(RedirOp, &str)> {
    REDIRECTIONS
        .iter()
        .find_map(|(prefix, op)| token.strip_prefix(prefix).map(|rest| (*op, rest)))
}

fn is_name(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && s.chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
}

/// `NAME=value` → (`NAME`, `=value`).
fn split_assignment(token: &str) -> Option<(&str, &str)> {
    let eq_pos = token.find('=')?;
    let name = &token[..eq_pos];
    is_name(name).then(|| (name, &token[eq_pos..]))
}

fn push_expansions(text: &str, parts: &mut Vec<Part>) {
    let mut literal = String::new();
    let mut rest = text;

    while let Some(pos) = rest.find('$') {
        literal.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        let reference = match after.strip_prefix('{') {
            Some(braced) => braced
                .find('}')
                .map(|end| (&braced[..end], &braced[end + 1..])),
            None => {
                let len = after
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(after.len());
                Some((&after[..len], &after[len..]))
            }
        };

        match reference {
            Some((name, tail)) if is_name(name) => {
                if !literal.is_empty() {
                    parts.push(Part::Literal(std::mem::take(&mut literal)));
                }
                parts.push(Part::Variable(name.to_string()));
                rest = tail;
            }
            _ => {
                literal.push('$');
                rest = after;
            }
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        parts.push(Part::Literal(literal));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Part {
        Part::Literal(s.into())
    }

    fn var(s: &str) -> Part {
        Part::Variable(s.into())
    }

    #[test]
    fn tokenize_simple() {
        assert_eq!(tokenize("ls -la /tmp"), vec!["ls", "-la", "/tmp"]);
    }

    #[test]
    fn tokenize_quoted() {
        assert_eq!(tokenize("echo 'hello world'"), vec!["echo", "hello world"]);
    }

    #[test]
    fn tokenize_unbalanced_quote_falls_back() {
        assert_eq!(tokenize("echo 'oops"), vec!["echo", "'oops"]);
    }

    #[test]
    fn word_plain_literal() {
        assert_eq!(word("ls").parts(), &[lit("ls")]);
    }

    #[test]
    fn word_variable() {
        assert_eq!(word("$HOME").parts(), &[var("HOME")]);
    }

    #[test]
    fn word_concatenation() {
        assert_eq!(
            word("pre$A${B}post").parts(),
            &[lit("pre"), var("A"), var("B"), lit("post")]
        );
    }

    #[test]
    fn word_lone_dollar_stays_literal() {
        assert_eq!(word("cost$").parts(), &[lit("cost$")]);
        assert_eq!(word("$1").parts(), &[lit("$1")]);
    }

    #[test]
    fn word_empty_token_keeps_one_part() {
        assert_eq!(word("").parts(), &[lit("")]);
    }

    #[test]
    fn word_assignment_split() {
        assert_eq!(word("X=5").parts(), &[lit("X"), lit("=5")]);
        assert_eq!(word("X=$Y").parts(), &[lit("X"), lit("="), var("Y")]);
    }

    #[test]
    fn word_flag_with_equals_is_not_assignment() {
        assert_eq!(word("--color=auto").parts(), &[lit("--color=auto")]);
    }

    #[test]
    fn simple_verb_and_params() {
        let cmd = simple_command("echo hello $USER").unwrap();
        assert_eq!(cmd.verb, Some(Word::literal("echo")));
        assert_eq!(cmd.params, vec![Word::literal("hello"), Word::variable("USER")]);
    }

    #[test]
    fn simple_output_truncate() {
        let cmd = simple_command("ls > out.txt").unwrap();
        assert_eq!(cmd.out, Some(Word::literal("out.txt")));
        assert!(!cmd.io.out_append);
        assert!(cmd.params.is_empty());
    }

    #[test]
    fn simple_output_append_attached() {
        let cmd = simple_command("ls >>out.txt").unwrap();
        assert_eq!(cmd.out, Some(Word::literal("out.txt")));
        assert!(cmd.io.out_append);
    }

    #[test]
    fn simple_error_and_input() {
        let cmd = simple_command("sort < in.txt 2>> err.log").unwrap();
        assert_eq!(cmd.input, Some(Word::literal("in.txt")));
        assert_eq!(cmd.err, Some(Word::literal("err.log")));
        assert!(cmd.io.err_append);
        assert_eq!(cmd.out, None);
    }

    #[test]
    fn simple_both_streams() {
        let cmd = simple_command("make &> build.log").unwrap();
        assert_eq!(cmd.out, Some(Word::literal("build.log")));
        assert_eq!(cmd.err, Some(Word::literal("build.log")));
    }

    #[test]
    fn simple_expanded_target() {
        let cmd = simple_command("ls > $LOG").unwrap();
        assert_eq!(cmd.out, Some(Word::variable("LOG")));
    }

    #[test]
    fn simple_missing_target() {
        assert!(matches!(
            simple_command("ls >"),
            Err(ShellError::Syntax(_))
        ));
    }

    #[test]
    fn simple_empty_line_has_no_verb() {
        assert_eq!(simple_command("").unwrap().verb, None);
    }
}
