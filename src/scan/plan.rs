//! Byte-range partitioning of a file across scan workers.

use std::fmt;

/// Half-open byte interval `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "inverted range [{}, {})", start, end);
        Self { start, end }
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Split `[0, file_size)` into `workers` contiguous ranges of
/// `file_size / workers` bytes; the last range absorbs the remainder.
pub fn plan(file_size: u64, workers: usize) -> Vec<ByteRange> {
    let workers = workers.max(1) as u64;
    let chunk_size = file_size / workers;

    (0..workers)
        .map(|i| {
            let start = i * chunk_size;
            let end = if i == workers - 1 {
                file_size
            } else {
                (i + 1) * chunk_size
            };
            ByteRange::new(start, end)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_even_split() {
        assert_eq!(
            plan(100, 4),
            vec![
                ByteRange::new(0, 25),
                ByteRange::new(25, 50),
                ByteRange::new(50, 75),
                ByteRange::new(75, 100),
            ]
        );
    }

    #[test]
    fn test_last_range_absorbs_remainder() {
        let ranges = plan(10, 3);
        assert_eq!(
            ranges,
            vec![
                ByteRange::new(0, 3),
                ByteRange::new(3, 6),
                ByteRange::new(6, 10)
            ]
        );
    }

    #[test]
    fn test_more_workers_than_bytes() {
        let ranges = plan(2, 4);
        assert_eq!(ranges.len(), 4);
        assert!(ranges[..3].iter().all(ByteRange::is_empty));
        assert_eq!(ranges[3], ByteRange::new(0, 2));
    }

    #[test]
    fn test_zero_workers_and_empty_file() {
        assert_eq!(plan(50, 0), vec![ByteRange::new(0, 50)]);
        assert_eq!(plan(0, 3).iter().map(ByteRange::len).sum::<u64>(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(ByteRange::new(3, 9).to_string(), "[3, 9)");
    }

    proptest! {
        #[test]
        fn prop_plan_is_contiguous_and_exhaustive(file_size in 0u64..10_000_000, workers in 1usize..64) {
            let ranges = plan(file_size, workers);
            prop_assert_eq!(ranges.len(), workers);
            prop_assert_eq!(ranges[0].start, 0);
            prop_assert_eq!(ranges[ranges.len() - 1].end, file_size);
            for pair in ranges.windows(2) {
                prop_assert_eq!(pair[0].end, pair[1].start);
                prop_assert!(pair[0].start <= pair[0].end);
            }
            prop_assert_eq!(ranges.iter().map(ByteRange::len).sum::<u64>(), file_size);
        }
    }
}
