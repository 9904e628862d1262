//! Mutation script model and its `|`-joined token form.
//!
//! Tokens: `-` (no-op), `Mut_<i>_<c>` (substitute), `Ins_<i>_<c>` (insert),
//! `Del_<i>` (delete). Tokens that do not parse are kept verbatim as
//! [`ScriptToken::Malformed`] so a loaded script re-serializes unchanged.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub const SEPARATOR: char = '|';
pub const NOOP_TOKEN: &str = "-";

const SUBSTITUTE_PREFIX: &str = "Mut_";
const INSERT_PREFIX: &str = "Ins_";
const DELETE_PREFIX: &str = "Del_";

/// A single positional edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationOp {
    NoOp,
    Substitute { index: usize, symbol: char },
    Insert { index: usize, symbol: char },
    Delete { index: usize },
}

impl MutationOp {
    /// True for everything except `NoOp`.
    pub fn is_edit(&self) -> bool {
        !matches!(self, Self::NoOp)
    }
}

impl fmt::Display for MutationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoOp => f.write_str(NOOP_TOKEN),
            Self::Substitute { index, symbol } => write!(f, "{SUBSTITUTE_PREFIX}{index}_{symbol}"),
            Self::Insert { index, symbol } => write!(f, "{INSERT_PREFIX}{index}_{symbol}"),
            Self::Delete { index } => write!(f, "{DELETE_PREFIX}{index}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptToken {
    Op(MutationOp),
    Malformed(String),
}

impl ScriptToken {
    pub fn parse(token: &str) -> Self {
        parse_op(token)
            .map(Self::Op)
            .unwrap_or_else(|| Self::Malformed(token.to_string()))
    }

    /// Whether the token claims to be an edit, parsed or not.
    pub fn is_edit_token(&self) -> bool {
        match self {
            Self::Op(op) => op.is_edit(),
            Self::Malformed(raw) => {
                let raw = raw.trim();
                raw.starts_with(SUBSTITUTE_PREFIX)
                    || raw.starts_with(INSERT_PREFIX)
                    || raw.starts_with(DELETE_PREFIX)
            }
        }
    }
}

impl fmt::Display for ScriptToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Op(op) => fmt::Display::fmt(op, f),
            Self::Malformed(raw) => f.write_str(raw),
        }
    }
}

fn parse_op(token: &str) -> Option<MutationOp> {
    if token == NOOP_TOKEN {
        return Some(MutationOp::NoOp);
    }
    if let Some(rest) = token.strip_prefix(SUBSTITUTE_PREFIX) {
        let (index, symbol) = parse_indexed_symbol(rest)?;
        return Some(MutationOp::Substitute { index, symbol });
    }
    if let Some(rest) = token.strip_prefix(INSERT_PREFIX) {
        let (index, symbol) = parse_indexed_symbol(rest)?;
        return Some(MutationOp::Insert { index, symbol });
    }
    if let Some(rest) = token.strip_prefix(DELETE_PREFIX) {
        return rest.parse().ok().map(|index| MutationOp::Delete { index });
    }
    None
}

/// `<index>_<char>`; the payload must be exactly one character.
fn parse_indexed_symbol(rest: &str) -> Option<(usize, char)> {
    let (index, payload) = rest.split_once('_')?;
    let index = index.parse().ok()?;
    let mut chars = payload.chars();
    let symbol = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    Some((index, symbol))
}

/// Ordered edit script, one token per comparison slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationScript {
    tokens: Vec<ScriptToken>,
}

impl MutationScript {
    pub fn new(tokens: Vec<ScriptToken>) -> Self {
        Self { tokens }
    }

    /// The single-`-` script used for verbatim blocks.
    pub fn noop() -> Self {
        Self { tokens: vec![ScriptToken::Op(MutationOp::NoOp)] }
    }

    pub fn from_ops(ops: impl IntoIterator<Item = MutationOp>) -> Self {
        Self { tokens: ops.into_iter().map(ScriptToken::Op).collect() }
    }

    /// Parse the token form. Never fails: unknown tokens become `Malformed`.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        Self { tokens: text.split(SEPARATOR).map(ScriptToken::parse).collect() }
    }

    pub fn tokens(&self) -> &[ScriptToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Parsed ops, skipping malformed tokens.
    pub fn ops(&self) -> impl Iterator<Item = &MutationOp> {
        self.tokens.iter().filter_map(|t| match t {
            ScriptToken::Op(op) => Some(op),
            ScriptToken::Malformed(_) => None,
        })
    }

    /// Count of tokens that are not `-`.
    pub fn edit_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|t| !matches!(t, ScriptToken::Op(MutationOp::NoOp)))
            .count()
    }

    /// True if any token is (or claims to be) a substitute/insert/delete.
    pub fn has_edits(&self) -> bool {
        self.tokens.iter().any(ScriptToken::is_edit_token)
    }
}

impl fmt::Display for MutationScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                write!(f, "{SEPARATOR}")?;
            }
            fmt::Display::fmt(token, f)?;
        }
        Ok(())
    }
}

impl From<&str> for MutationScript {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl Serialize for MutationScript {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MutationScript {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::parse(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_tokens() {
        let script = MutationScript::parse("-|Mut_2_C|Ins_4_T|Del_5");
        let ops: Vec<_> = script.ops().copied().collect();
        assert_eq!(
            ops,
            vec![
                MutationOp::NoOp,
                MutationOp::Substitute { index: 2, symbol: 'C' },
                MutationOp::Insert { index: 4, symbol: 'T' },
                MutationOp::Delete { index: 5 },
            ]
        );
        assert_eq!(script.edit_count(), 3);
    }

    #[test]
    fn test_underscore_payload() {
        let script = MutationScript::parse("Mut_3__");
        assert_eq!(
            script.ops().next(),
            Some(&MutationOp::Substitute { index: 3, symbol: '_' })
        );
    }

    #[test]
    fn test_malformed_kept_verbatim() {
        let text = "Mut_X_Y|sub_2_T|Del_|-";
        let script = MutationScript::parse(text);
        assert_eq!(script.ops().count(), 1);
        assert_eq!(script.to_string(), text);
        // Mut_X_Y and Del_ still claim to be edits; sub_2_T does not.
        assert!(script.tokens()[0].is_edit_token());
        assert!(!script.tokens()[1].is_edit_token());
        assert!(script.tokens()[2].is_edit_token());
    }

    #[test]
    fn test_script_from_tokens() {
        let script = MutationScript::new(vec![
            ScriptToken::Op(MutationOp::Delete { index: 1 }),
            ScriptToken::parse("Ins_x_A"),
        ]);
        assert_eq!(script.to_string(), "Del_1|Ins_x_A");
        assert_eq!(script.edit_count(), 2);
        assert_eq!(MutationScript::parse(&script.to_string()), script);
    }

    #[test]
    fn test_noop_script() {
        let script = MutationScript::noop();
        assert_eq!(script.to_string(), "-");
        assert!(!script.has_edits());
        assert_eq!(script.edit_count(), 0);
    }

    #[test]
    fn test_empty_script() {
        let script = MutationScript::parse("");
        assert!(script.is_empty());
        assert_eq!(script.to_string(), "");
    }

    #[test]
    fn test_serde_as_string() {
        let script = MutationScript::parse("-|Mut_7_A");
        let json = serde_json::to_string(&script).unwrap();
        assert_eq!(json, "\"-|Mut_7_A\"");
        let back: MutationScript = serde_json::from_str(&json).unwrap();
        assert_eq!(back, script);
    }
}
