use std::ops::Range;

/// Contiguous half-open item range `[from, to)` recorded by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    /// Worker slot, and the position of this slice's command list in
    /// submission order.
    pub index: usize,
    pub from: usize,
    pub to: usize,
}

impl Slice {
    pub fn range(&self) -> Range<usize> {
        self.from..self.to
    }

    pub fn len(&self) -> usize {
        self.to - self.from
    }

    pub fn is_empty(&self) -> bool {
        self.from == self.to
    }
}

/// Splits `item_count` items over at most `workers` slices.
///
/// Every slice gets `item_count / n` items, where `n = min(workers, item_count)`;
/// the `item_count % n` leftover items are folded into the last slice. Slices
/// never outnumber workers, so each maps onto its own recording surface, and
/// no slice is ever empty.
pub fn partition(item_count: usize, workers: usize) -> Vec<Slice> {
    let effective = workers.max(1).min(item_count);
    if effective == 0 {
        return Vec::new();
    }

    let base = item_count / effective;
    (0..effective)
        .map(|index| {
            let from = index * base;
            let to = if index + 1 == effective {
                item_count
            } else {
                from + base
            };
            Slice { index, from, to }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(slices: &[Slice]) -> Vec<(usize, usize)> {
        slices.iter().map(|s| (s.from, s.to)).collect()
    }

    #[test]
    fn remainder_folds_into_last_slice() {
        let slices = partition(10, 4);
        assert_eq!(ranges(&slices), [(0, 2), (2, 4), (4, 6), (6, 10)]);
    }

    #[test]
    fn even_split_has_equal_slices() {
        let slices = partition(12, 4);
        assert!(slices.iter().all(|s| s.len() == 3));
    }

    #[test]
    fn empty_batch_has_no_slices() {
        assert!(partition(0, 4).is_empty());
    }

    #[test]
    fn fewer_items_than_workers_gives_one_item_per_slice() {
        for n in 1..8 {
            let slices = partition(n, 8);
            assert_eq!(slices.len(), n);
            assert!(slices.iter().all(|s| s.len() == 1));
        }
    }

    #[test]
    fn zero_workers_still_records_everything() {
        assert_eq!(ranges(&partition(5, 0)), [(0, 5)]);
    }

    #[test]
    fn slices_partition_the_item_range_exactly() {
        for n in 0..64 {
            for w in 1..12 {
                let slices = partition(n, w);
                assert!(slices.len() <= w);

                let mut next = 0;
                for (i, slice) in slices.iter().enumerate() {
                    assert_eq!(slice.index, i);
                    assert_eq!(slice.from, next, "gap or overlap for n={n} w={w}");
                    assert!(!slice.is_empty());
                    next = slice.to;
                }
                assert_eq!(next, n, "slices must cover [0, {n}) for w={w}");
            }
        }
    }
}
