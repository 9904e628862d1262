//! Text ↔ 4-symbol alphabet via 2-bit packing.
//!
//! Every character is widened to 8 bits and split into four 2-bit values,
//! most significant first. Only characters up to U+00FF are encodable.

use serde::Serialize;
use std::collections::HashMap;

use gc_core::document::seed_gene_id;
use gc_core::{GcError, GeneDictionary, Result};

pub const DEFAULT_ALPHABET: [char; 4] = ['A', 'C', 'G', 'T'];

/// Symbols per encoded character.
const SYMBOLS_PER_CHAR: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolCodec {
    alphabet: [char; 4],
}

impl Default for SymbolCodec {
    fn default() -> Self {
        Self { alphabet: DEFAULT_ALPHABET }
    }
}

impl SymbolCodec {
    /// `alphabet[v]` is the symbol for 2-bit value `v`.
    pub fn new(alphabet: [char; 4]) -> Result<Self> {
        for (i, a) in alphabet.iter().enumerate() {
            if alphabet[i + 1..].contains(a) {
                return Err(GcError::InvalidConfig(format!("duplicate alphabet symbol {a:?}")));
            }
        }
        Ok(Self { alphabet })
    }

    pub fn alphabet(&self) -> [char; 4] {
        self.alphabet
    }

    pub fn encode_motif(&self, text: &str) -> Result<String> {
        let mut out = String::with_capacity(text.len() * SYMBOLS_PER_CHAR);
        for (position, ch) in text.chars().enumerate() {
            let byte = to_byte(ch, position)?;
            for shift in [6u8, 4, 2, 0] {
                out.push(self.alphabet[usize::from((byte >> shift) & 0b11)]);
            }
        }
        Ok(out)
    }

    pub fn decode(&self, symbols: &str) -> Result<String> {
        let values = symbols
            .chars()
            .map(|s| self.value_of(s))
            .collect::<Result<Vec<u8>>>()?;
        if values.len() % SYMBOLS_PER_CHAR != 0 {
            return Err(GcError::SymbolDecoding(format!(
                "{} symbols is not a whole number of characters",
                values.len()
            )));
        }
        Ok(values
            .chunks(SYMBOLS_PER_CHAR)
            .map(|quad| char::from(quad.iter().fold(0u8, |acc, v| (acc << 2) | v)))
            .collect())
    }

    fn value_of(&self, symbol: char) -> Result<u8> {
        self.alphabet
            .iter()
            .position(|&a| a == symbol)
            .map(|v| v as u8)
            .ok_or_else(|| GcError::SymbolDecoding(format!("unknown symbol {symbol:?}")))
    }

    /// Encode motifs as seed genes `G0, G1, …` in the given order.
    pub fn build_gene_dict<S: AsRef<str>>(&self, motifs: &[S]) -> Result<GeneDictionary> {
        let mut genes = GeneDictionary::new();
        for (i, motif) in motifs.iter().enumerate() {
            genes.insert(seed_gene_id(i), self.encode_motif(motif.as_ref())?);
        }
        Ok(genes)
    }

    /// Greedy tokenization: at each position take the longest motif that
    /// matches, otherwise emit the character as a literal.
    pub fn encode_sequence<S: AsRef<str>>(&self, sequence: &str, motifs: &[S]) -> Vec<SequenceToken> {
        let mut reverse: HashMap<Vec<char>, String> = HashMap::new();
        for (i, motif) in motifs.iter().enumerate() {
            reverse.insert(motif.as_ref().chars().collect(), seed_gene_id(i));
        }
        let mut lengths: Vec<usize> = reverse.keys().map(Vec::len).filter(|&l| l > 0).collect();
        lengths.sort_unstable_by(|a, b| b.cmp(a));
        lengths.dedup();

        let chars: Vec<char> = sequence.chars().collect();
        let mut tokens = Vec::new();
        let mut i = 0;
        'outer: while i < chars.len() {
            for &length in &lengths {
                if i + length > chars.len() {
                    continue;
                }
                if let Some(id) = reverse.get(&chars[i..i + length]) {
                    tokens.push(SequenceToken::Gene(id.clone()));
                    i += length;
                    continue 'outer;
                }
            }
            tokens.push(SequenceToken::Literal(chars[i]));
            i += 1;
        }
        tokens
    }

    /// Inverse of [`encode_sequence`](Self::encode_sequence) against a
    /// dictionary built by [`build_gene_dict`](Self::build_gene_dict).
    pub fn decode_sequence(&self, tokens: &[SequenceToken], genes: &GeneDictionary) -> Result<String> {
        let mut out = String::new();
        for (position, token) in tokens.iter().enumerate() {
            match token {
                SequenceToken::Literal(c) => out.push(*c),
                SequenceToken::Gene(id) => {
                    let symbols = genes.get(id).ok_or_else(|| {
                        GcError::SymbolDecoding(format!("token {position} references unknown gene {id}"))
                    })?;
                    out.push_str(&self.decode(symbols)?);
                }
            }
        }
        Ok(out)
    }
}

/// Output of [`SymbolCodec::encode_sequence`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SequenceToken {
    Gene(String),
    Literal(char),
}

/// Reject text containing characters above U+00FF.
pub fn check_encodable(text: &str) -> Result<()> {
    for (position, ch) in text.chars().enumerate() {
        to_byte(ch, position)?;
    }
    Ok(())
}

fn to_byte(ch: char, position: usize) -> Result<u8> {
    u8::try_from(u32::from(ch)).map_err(|_| GcError::SymbolEncodingPrecondition { ch, position })
}
