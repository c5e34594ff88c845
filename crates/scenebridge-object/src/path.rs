//! Path expressions.
//!
//! A path addresses something reachable from a root object:
//!
//! ```text
//! PATH := "" | STEP ( "/" STEP )*
//! STEP := [ "?" ] [ KIND ":" ] BODY [ "!" ]
//! KIND := member | field | property | component | method
//!       | index | transform | map | object
//! ```
//!
//! | Step | Meaning |
//! |------|---------|
//! | `title`, `member:title` | property (or builtin/attached component) lookup |
//! | `component:Tags` | component lookup only |
//! | `method:Translate(1, 'up', transform/position)` | call; args are literals or paths |
//! | `index:-1` | array element, negative counts from the end |
//! | `transform:Child`, `transform:..` | child by name, or parent |
//! | `map:key` | dictionary key |
//! | `object:obj2` | jump to another registered object |
//!
//! `?` makes a step optional: a miss there, or anywhere after it, ends
//! resolution quietly. `!` is legal on the last step only and marks the
//! value being written as itself a path.
//!
//! Slashes and commas inside parentheses or quotes do not split.

use crate::PathError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A parsed path: steps applied left to right.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PathExpression {
    pub steps: Vec<Step>,
}

/// One step of a path.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub kind: StepKind,
    /// `?` prefix.
    pub optional: bool,
    /// `!` suffix.
    pub evaluate: bool,
}

/// What a step does.
#[derive(Debug, Clone, PartialEq)]
pub enum StepKind {
    Member(String),
    Component(String),
    /// `args` is `None` when written without parentheses.
    Method {
        name: String,
        args: Option<Vec<Arg>>,
    },
    Index(i64),
    /// Child by name, or the parent for `..`.
    Hierarchy(String),
    Map(String),
    Object(String),
}

/// A method argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Literal(Value),
    Path(PathExpression),
}

/// Name used for the parent in hierarchy steps.
pub const PARENT: &str = "..";

impl PathExpression {
    /// The empty path, which resolves to the root.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a path string.
    ///
    /// # Errors
    ///
    /// See [`PathError`].
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if path.is_empty() {
            return Ok(Self::root());
        }
        let raw_steps = split_top_level(path, '/')?;
        let last = raw_steps.len() - 1;
        let steps = raw_steps
            .iter()
            .enumerate()
            .map(|(index, raw)| parse_step(raw, index, index == last))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps })
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.steps.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The final step, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Step> {
        self.steps.last()
    }

    /// Returns `true` when any step is marked `?`.
    #[must_use]
    pub fn has_optional(&self) -> bool {
        self.steps.iter().any(|s| s.optional)
    }
}

impl FromStr for PathExpression {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// Serialized as its path text.
impl Serialize for PathExpression {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PathExpression {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.optional {
            f.write_str("?")?;
        }
        match &self.kind {
            StepKind::Member(name) if needs_member_prefix(name) => write!(f, "member:{name}")?,
            StepKind::Member(name) => f.write_str(name)?,
            StepKind::Component(name) => write!(f, "component:{name}")?,
            StepKind::Method { name, args } => {
                write!(f, "method:{name}")?;
                if let Some(args) = args {
                    f.write_str("(")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{arg}")?;
                    }
                    f.write_str(")")?;
                }
            }
            StepKind::Index(i) => write!(f, "index:{i}")?,
            StepKind::Hierarchy(name) => write!(f, "transform:{name}")?,
            StepKind::Map(key) => write!(f, "map:{key}")?,
            StepKind::Object(id) => write!(f, "object:{id}")?,
        }
        if self.evaluate {
            f.write_str("!")?;
        }
        Ok(())
    }
}

/// A bare member name that would re-parse as another kind or flag.
fn needs_member_prefix(name: &str) -> bool {
    name.starts_with('?') || name.contains([':', '(', '\'', '"'])
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(v) => write!(f, "{v}"),
            Self::Path(p) => write!(f, "{p}"),
        }
    }
}

/// Splits on `sep` outside parentheses and quotes.
fn split_top_level(text: &str, sep: char) -> Result<Vec<&str>, PathError> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    let unbalanced = || PathError::Unbalanced {
        path: text.to_string(),
    };

    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.checked_sub(1).ok_or_else(unbalanced)?,
            (None, c) if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if depth != 0 || quote.is_some() {
        return Err(unbalanced());
    }
    parts.push(&text[start..]);
    Ok(parts)
}

fn parse_step(raw: &str, index: usize, is_last: bool) -> Result<Step, PathError> {
    let (optional, rest) = match raw.strip_prefix('?') {
        Some(rest) => (true, rest),
        None => (false, raw),
    };
    let (evaluate, rest) = match rest.strip_suffix('!') {
        Some(rest) => (true, rest),
        None => (false, rest),
    };
    if evaluate && !is_last {
        return Err(PathError::MisplacedIndirection { index });
    }
    if rest.is_empty() {
        return Err(PathError::EmptyStep { index });
    }

    let (prefix, body) = split_prefix(rest);
    if body.is_empty() {
        return Err(PathError::EmptyStep { index });
    }

    let kind = match prefix {
        None | Some("member" | "field" | "property") => StepKind::Member(body.to_string()),
        Some("component") => StepKind::Component(body.to_string()),
        Some("method") => parse_method(body, index)?,
        Some("index") => StepKind::Index(body.parse().map_err(|_| PathError::InvalidIndex {
            token: body.to_string(),
        })?),
        Some("transform") => StepKind::Hierarchy(body.to_string()),
        Some("map") => StepKind::Map(body.to_string()),
        Some("object") => StepKind::Object(body.to_string()),
        Some(other) => {
            return Err(PathError::UnknownKind {
                prefix: other.to_string(),
            })
        }
    };

    Ok(Step {
        kind,
        optional,
        evaluate,
    })
}

/// Splits `kind:body`. Only a colon before any parenthesis or quote counts.
fn split_prefix(step: &str) -> (Option<&str>, &str) {
    let boundary = step.find(['(', '\'', '"']).unwrap_or(step.len());
    match step[..boundary].find(':') {
        Some(colon) => (Some(&step[..colon]), &step[colon + 1..]),
        None => (None, step),
    }
}

fn parse_method(body: &str, index: usize) -> Result<StepKind, PathError> {
    let Some(open) = body.find('(') else {
        return Ok(StepKind::Method {
            name: body.to_string(),
            args: None,
        });
    };
    let name = &body[..open];
    let inner = body[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| PathError::Unbalanced {
            path: body.to_string(),
        })?;
    if name.is_empty() {
        return Err(PathError::EmptyStep { index });
    }

    let args = if inner.trim().is_empty() {
        Vec::new()
    } else {
        split_top_level(inner, ',')?
            .into_iter()
            .map(|token| parse_arg(name, token.trim()))
            .collect::<Result<Vec<_>, _>>()?
    };

    Ok(StepKind::Method {
        name: name.to_string(),
        args: Some(args),
    })
}

/// A JSON literal or single-quoted string is literal; anything else is a
/// path resolved against the root at call time.
fn parse_arg(method: &str, token: &str) -> Result<Arg, PathError> {
    let invalid = || PathError::InvalidArgument {
        method: method.to_string(),
        token: token.to_string(),
    };
    if token.is_empty() {
        return Err(invalid());
    }
    if let Some(quoted) = token
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    {
        return Ok(Arg::Literal(Value::String(quoted.to_string())));
    }
    if let Ok(literal) = serde_json::from_str::<Value>(token) {
        return Ok(Arg::Literal(literal));
    }
    PathExpression::parse(token)
        .map(Arg::Path)
        .map_err(|_| invalid())
}
