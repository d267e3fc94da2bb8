//! Output page order for interleave and booklet reorder.

use std::collections::VecDeque;

/// Drains per-source queues one item per non-empty queue per sweep, in
/// queue order. Exhausted queues are skipped, so longer queues keep
/// contributing after shorter ones run dry.
pub struct RoundRobin<T> {
    queues: Vec<VecDeque<T>>,
    next: usize,
}

impl<T> RoundRobin<T> {
    pub fn new(queues: Vec<VecDeque<T>>) -> Self {
        RoundRobin { queues, next: 0 }
    }
}

impl<T> Iterator for RoundRobin<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let len = self.queues.len();
        for offset in 0..len {
            let index = (self.next + offset) % len;
            if let Some(item) = self.queues[index].pop_front() {
                self.next = (index + 1) % len;
                return Some(item);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.queues.iter().map(VecDeque::len).sum();
        (remaining, Some(remaining))
    }
}

impl<T> ExactSizeIterator for RoundRobin<T> {}

/// 0-based page order for manual duplex booklet printing of an `n`-page
/// document: first, last, second, second-to-last, and so on until the two
/// ends meet. For odd `n` the middle page appears once.
pub fn booklet_order(n: u32) -> Vec<u32> {
    let is_even = n % 2 == 0;
    let middle = if is_even { n / 2 } else { n / 2 + 1 };

    let mut order = Vec::with_capacity(n as usize);
    for i in 0..middle {
        order.push(i);
        if i < middle - 1 || is_even {
            order.push(n - i - 1);
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queues(lengths: &[u32]) -> Vec<VecDeque<(char, u32)>> {
        lengths
            .iter()
            .zip('A'..)
            .map(|(&len, name)| (1..=len).map(|page| (name, page)).collect())
            .collect()
    }

    #[test]
    fn test_round_robin_drops_exhausted_queues() {
        let order: Vec<_> = RoundRobin::new(queues(&[2, 3, 1])).collect();
        assert_eq!(
            order,
            vec![('A', 1), ('B', 1), ('C', 1), ('A', 2), ('B', 2), ('B', 3)]
        );
    }

    #[test]
    fn test_round_robin_equal_lengths_alternate() {
        let order: Vec<_> = RoundRobin::new(queues(&[3, 3])).collect();
        assert_eq!(
            order,
            vec![('A', 1), ('B', 1), ('A', 2), ('B', 2), ('A', 3), ('B', 3)]
        );
    }

    #[test]
    fn test_round_robin_empty_queue_contributes_nothing() {
        let order: Vec<_> = RoundRobin::new(queues(&[0, 2, 1])).collect();
        assert_eq!(order, vec![('B', 1), ('C', 1), ('B', 2)]);
        assert_eq!(RoundRobin::<u32>::new(Vec::new()).next(), None);
    }

    #[test]
    fn test_round_robin_size_hint() {
        let mut order = RoundRobin::new(queues(&[4, 1, 2]));
        assert_eq!(order.size_hint(), (7, Some(7)));
        order.next();
        assert_eq!(order.len(), 6);
    }

    #[test]
    fn test_booklet_even() {
        assert_eq!(booklet_order(4), vec![0, 3, 1, 2]);
        assert_eq!(booklet_order(2), vec![0, 1]);
    }

    #[test]
    fn test_booklet_odd_middle_once() {
        assert_eq!(booklet_order(5), vec![0, 4, 1, 3, 2]);
        assert_eq!(booklet_order(1), vec![0]);
        assert_eq!(booklet_order(3), vec![0, 2, 1]);
    }

    #[test]
    fn test_booklet_is_a_permutation() {
        for n in 1..=40 {
            let mut order = booklet_order(n);
            assert_eq!(order.len(), n as usize);
            order.sort_unstable();
            assert_eq!(order, (0..n).collect::<Vec<_>>());
        }
    }
}
