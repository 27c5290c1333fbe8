//! Per-severity count tables and their fan-in merge.

use std::collections::HashMap;

/// Occurrences of each severity token, plus lines with no usable tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeverityCounts {
    counts: HashMap<String, u64>,
    malformed: u64,
}

impl SeverityCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, severity: &str) {
        self.add(severity, 1);
    }

    /// Record a raw token; non-UTF-8 bytes are replaced lossily
    pub fn record_bytes(&mut self, severity: &[u8]) {
        match std::str::from_utf8(severity) {
            Ok(s) => self.record(s),
            Err(_) => self.record(&String::from_utf8_lossy(severity)),
        }
    }

    pub fn add(&mut self, severity: &str, count: u64) {
        if let Some(existing) = self.counts.get_mut(severity) {
            *existing += count;
        } else {
            self.counts.insert(severity.to_string(), count);
        }
    }

    pub fn record_malformed(&mut self) {
        self.malformed += 1;
    }

    pub fn get(&self, severity: &str) -> u64 {
        self.counts.get(severity).copied().unwrap_or(0)
    }

    pub fn malformed(&self) -> u64 {
        self.malformed
    }

    /// Well-formed lines counted
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty() && self.malformed == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Entries sorted by severity name, for stable display
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Add every count from `other` into `self`
    pub fn absorb(&mut self, other: &SeverityCounts) {
        for (severity, count) in other.iter() {
            self.add(severity, count);
        }
        self.malformed += other.malformed;
    }
}

/// Sum any number of tables; the result does not depend on their order
pub fn merge<'a, I>(tables: I) -> SeverityCounts
where
    I: IntoIterator<Item = &'a SeverityCounts>,
{
    tables
        .into_iter()
        .fold(SeverityCounts::new(), |mut global, local| {
            global.absorb(local);
            global
        })
}
