//! Frequent-substring detection.
//!
//! Two strategies: a naive window count over a length range, and a
//! rolling-hash scan for a single window length. A failing hash scan falls
//! back to the naive count.

use anyhow::anyhow;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, warn};

use gc_core::{GcError, HashParams, Result, ScanConfig, ScanStrategy};

/// Pattern → frequency, most frequent first; ties keep first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MotifTable {
    entries: Vec<(String, usize)>,
}

impl MotifTable {
    fn from_counts(mut entries: Vec<(String, usize)>) -> Self {
        // stable: equal counts stay in first-seen order
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Self { entries }
    }

    pub fn get(&self, pattern: &str) -> Option<usize> {
        self.entries.iter().find(|(p, _)| p == pattern).map(|(_, c)| *c)
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.get(pattern).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(p, c)| (p.as_str(), *c))
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct MotifScanner {
    min_len: usize,
    max_len: usize,
    min_frequency: usize,
    strategy: ScanStrategy,
    hash: HashParams,
}

impl MotifScanner {
    /// Strategy chosen from the bounds: fixed-length when they are equal.
    pub fn new(min_len: usize, max_len: usize, min_frequency: usize) -> Result<Self> {
        let strategy = if min_len == max_len { ScanStrategy::FixedLength } else { ScanStrategy::Naive };
        Self::with_strategy(min_len, max_len, min_frequency, strategy)
    }

    pub fn with_strategy(
        min_len: usize,
        max_len: usize,
        min_frequency: usize,
        strategy: ScanStrategy,
    ) -> Result<Self> {
        if min_len == 0 || min_len > max_len {
            return Err(GcError::InvalidConfig(format!(
                "scan window must satisfy 1 <= min_len <= max_len, got {min_len}..={max_len}"
            )));
        }
        if strategy == ScanStrategy::FixedLength && min_len != max_len {
            return Err(GcError::IncompatibleScanConfiguration { min_len, max_len });
        }
        Ok(Self {
            min_len,
            max_len,
            min_frequency,
            strategy,
            hash: HashParams::default(),
        })
    }

    /// Scanner for a compressor: one window length equal to the block size.
    pub fn for_blocks(block_size: usize, config: &ScanConfig) -> Result<Self> {
        let scanner = match config.strategy {
            Some(strategy) => Self::with_strategy(block_size, block_size, config.min_frequency, strategy)?,
            None => Self::new(block_size, block_size, config.min_frequency)?,
        };
        Ok(scanner.with_hash(config.hash))
    }

    pub fn with_hash(mut self, hash: HashParams) -> Self {
        self.hash = hash;
        self
    }

    pub fn strategy(&self) -> ScanStrategy {
        self.strategy
    }

    pub fn scan(&self, text: &str) -> MotifTable {
        let chars: Vec<char> = text.chars().collect();
        match self.strategy {
            ScanStrategy::Naive => self.scan_naive(&chars),
            ScanStrategy::FixedLength => match self.scan_fixed_length(&chars) {
                Ok(table) => table,
                Err(e) => {
                    warn!(error = %e, window = self.min_len, "fixed-length scan failed, falling back to naive");
                    self.scan_naive(&chars)
                }
            },
        }
    }

    /// Count every window for every length in the range.
    pub fn scan_naive(&self, chars: &[char]) -> MotifTable {
        let mut index: HashMap<&[char], usize> = HashMap::new();
        let mut counts: Vec<(&[char], usize)> = Vec::new();
        for size in self.min_len..=self.max_len {
            if size > chars.len() {
                break;
            }
            for window in chars.windows(size) {
                match index.get(window) {
                    Some(&slot) => counts[slot].1 += 1,
                    None => {
                        index.insert(window, counts.len());
                        counts.push((window, 1));
                    }
                }
            }
        }
        let kept = counts
            .into_iter()
            .filter(|(_, count)| *count >= self.min_frequency)
            .map(|(window, count)| (window.iter().collect(), count))
            .collect();
        MotifTable::from_counts(kept)
    }

    /// Rolling-hash scan over windows of `min_len`.
    ///
    /// Windows are bucketed by hash and compared for real equality inside a
    /// bucket, so collisions never merge distinct substrings. Fails if the
    /// hash arithmetic overflows for the configured base and prime.
    pub fn scan_fixed_length(&self, chars: &[char]) -> Result<MotifTable> {
        if self.min_len != self.max_len {
            return Err(GcError::IncompatibleScanConfiguration {
                min_len: self.min_len,
                max_len: self.max_len,
            });
        }
        let length = self.min_len;
        let n = chars.len();
        if n < length {
            return Ok(MotifTable::default());
        }
        let HashParams { base, prime } = self.hash;
        if prime == 0 {
            return Err(anyhow!("hash prime must be non-zero").into());
        }
        let high = pow_mod(base, length - 1, prime)?;

        let mut hash = 0u64;
        for &c in &chars[..length] {
            hash = roll_in(hash, base, code(c), prime)?;
        }

        let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
        let mut bucket_order: Vec<u64> = Vec::new();
        let mut record = |hash: u64, pos: usize| {
            buckets
                .entry(hash)
                .or_insert_with(|| {
                    bucket_order.push(hash);
                    Vec::new()
                })
                .push(pos);
        };
        record(hash, 0);

        for i in 1..=(n - length) {
            let outgoing = checked(code(chars[i - 1]) % prime, high)? % prime;
            let without = if hash >= outgoing { hash - outgoing } else { prime - (outgoing - hash) };
            hash = roll_in(without, base, code(chars[i + length - 1]), prime)?;
            record(hash, i);
        }

        // (first position, window, count)
        let mut found: Vec<(usize, &[char], usize)> = Vec::new();
        for hash in &bucket_order {
            // window -> (first position, count)
            let mut per_window: HashMap<&[char], (usize, usize)> = HashMap::new();
            for &pos in &buckets[hash] {
                per_window.entry(&chars[pos..pos + length]).or_insert((pos, 0)).1 += 1;
            }
            found.extend(
                per_window
                    .into_iter()
                    .filter(|(_, (_, count))| *count >= self.min_frequency)
                    .map(|(window, (pos, count))| (pos, window, count)),
            );
        }
        found.sort_by_key(|(pos, _, _)| *pos);

        debug!(window = length, buckets = bucket_order.len(), kept = found.len(), "fixed-length scan");
        Ok(MotifTable::from_counts(
            found.into_iter().map(|(_, w, count)| (w.iter().collect(), count)).collect(),
        ))
    }

    /// Scan the concatenated blocks and keep the `top_k` most frequent
    /// patterns.
    pub fn find_frequent_patterns<S: AsRef<str>>(&self, blocks: &[S], top_k: usize) -> Vec<String> {
        let concatenated: String = blocks.iter().map(AsRef::as_ref).collect();
        self.scan(&concatenated)
            .patterns()
            .take(top_k)
            .map(str::to_string)
            .collect()
    }
}

/// Chunk by characters; the last block may be shorter.
pub fn split_into_blocks(sequence: &str, block_size: usize) -> Result<Vec<String>> {
    if block_size == 0 {
        return Err(GcError::InvalidConfig("block_size must be at least 1".into()));
    }
    let chars: Vec<char> = sequence.chars().collect();
    Ok(chars.chunks(block_size).map(|chunk| chunk.iter().collect()).collect())
}

fn code(c: char) -> u64 {
    u64::from(u32::from(c))
}

fn checked(a: u64, b: u64) -> Result<u64> {
    a.checked_mul(b)
        .ok_or_else(|| anyhow!("rolling hash overflow: {a} * {b}").into())
}

fn roll_in(hash: u64, base: u64, incoming: u64, prime: u64) -> Result<u64> {
    let shifted = checked(hash, base)?;
    let sum = shifted
        .checked_add(incoming)
        .ok_or_else(|| GcError::from(anyhow!("rolling hash overflow: {shifted} + {incoming}")))?;
    Ok(sum % prime)
}

fn pow_mod(base: u64, exp: usize, prime: u64) -> Result<u64> {
    let base = base % prime;
    let mut result = 1 % prime;
    for _ in 0..exp {
        result = checked(result, base)? % prime;
    }
    Ok(result)
}
