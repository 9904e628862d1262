//! Positional edit scripts between two strings.

use serde::Serialize;

use gc_core::{GeneDictionary, MutationOp, MutationScript, ScriptToken};

/// Script turning `reference` into `target`, one token per position.
///
/// Past the end of `reference` each extra target character becomes an
/// insert at the running position; past the end of `target` each extra
/// reference position becomes a delete.
pub fn diff(target: &str, reference: &str) -> MutationScript {
    let target: Vec<char> = target.chars().collect();
    let reference: Vec<char> = reference.chars().collect();
    let mut ops = Vec::with_capacity(target.len().max(reference.len()));
    let (mut i, mut j) = (0, 0);
    while i < reference.len() || j < target.len() {
        if i < reference.len() && j < target.len() {
            if reference[i] == target[j] {
                ops.push(MutationOp::NoOp);
            } else {
                ops.push(MutationOp::Substitute { index: i, symbol: target[j] });
            }
            i += 1;
            j += 1;
        } else if i < reference.len() {
            ops.push(MutationOp::Delete { index: i });
            i += 1;
        } else {
            ops.push(MutationOp::Insert { index: i, symbol: target[j] });
            j += 1;
            i += 1;
        }
    }
    MutationScript::from_ops(ops)
}

/// Script that transforms `from` into `to`.
pub fn compare_blocks(from: &str, to: &str) -> MutationScript {
    diff(to, from)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// Token did not parse.
    Malformed,
    /// Offset-adjusted index fell outside the sequence; `None` if it
    /// overflowed.
    OutOfRange { index: Option<isize>, len: usize },
}

/// A token `apply` ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedOp {
    /// Token position within the script.
    pub position: usize,
    pub token: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reconstruction {
    pub text: String,
    pub skipped: Vec<SkippedOp>,
}

impl Reconstruction {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Replay a script against `original`.
///
/// Indices are shifted by a running offset: +1 after each applied insert,
/// -1 after each applied delete. Tokens that do not parse or land out of
/// range are skipped and reported, never raised.
pub fn apply(original: &str, script: &MutationScript) -> Reconstruction {
    let mut sequence: Vec<char> = original.chars().collect();
    let mut offset: isize = 0;
    let mut skipped = Vec::new();

    for (position, token) in script.tokens().iter().enumerate() {
        let op = match token {
            ScriptToken::Op(op) => *op,
            ScriptToken::Malformed(raw) => {
                skipped.push(SkippedOp { position, token: raw.clone(), reason: SkipReason::Malformed });
                continue;
            }
        };
        let len = sequence.len();
        let shifted = shift(op_index(&op), offset);
        let applied = match op {
            MutationOp::NoOp => continue,
            MutationOp::Substitute { symbol, .. } => in_range(shifted, len).map(|i| sequence[i] = symbol),
            MutationOp::Insert { symbol, .. } => in_range(shifted, len + 1).map(|i| {
                sequence.insert(i, symbol);
                offset += 1;
            }),
            MutationOp::Delete { .. } => in_range(shifted, len).map(|i| {
                sequence.remove(i);
                offset -= 1;
            }),
        };
        if applied.is_none() {
            skipped.push(SkippedOp {
                position,
                token: op.to_string(),
                reason: SkipReason::OutOfRange { index: shifted, len },
            });
        }
    }

    Reconstruction { text: sequence.into_iter().collect(), skipped }
}

/// `None` when the shifted index does not fit in an `isize`.
fn shift(index: usize, offset: isize) -> Option<isize> {
    isize::try_from(index).ok().and_then(|i| i.checked_add(offset))
}

fn in_range(idx: Option<isize>, bound: usize) -> Option<usize> {
    idx.and_then(|i| usize::try_from(i).ok()).filter(|&i| i < bound)
}

fn op_index(op: &MutationOp) -> usize {
    match op {
        MutationOp::NoOp => 0,
        MutationOp::Substitute { index, .. } | MutationOp::Insert { index, .. } | MutationOp::Delete { index } => *index,
    }
}

/// First gene, in dictionary order, within `max_mutations` edits of
/// `block`. Not necessarily the closest one.
pub fn find_closest_gene(
    block: &str,
    genes: &GeneDictionary,
    max_mutations: usize,
) -> Option<(String, MutationScript)> {
    genes.iter().find_map(|(id, sequence)| {
        let script = diff(block, sequence);
        (script.edit_count() <= max_mutations).then(|| (id.to_string(), script))
    })
}
