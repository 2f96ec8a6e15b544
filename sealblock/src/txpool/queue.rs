use std::collections::VecDeque;

/// A first-in first-out queue of transactions.
///
/// ```
/// # use sealblock::txpool::Queue;
///
/// let mut queue = Queue::default();
///
/// queue.insert(4);
/// queue.insert(1);
/// queue.insert(3);
///
/// assert!(queue.contains(&1));
/// assert_eq!(queue.remove(&1), Some(1));
/// assert_eq!(queue.remove(&1), None);
///
/// queue.requeue(vec![7]);
/// assert_eq!(queue.drain(), [7, 4, 3]);
/// assert!(queue.is_empty());
/// ```
#[derive(Debug)]
pub struct Queue<T> {
    items: VecDeque<T>,
}

impl<T> Default for Queue<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<T> Queue<T> {
    /// Append an `item` to the queue.
    pub fn insert(&mut self, item: T) {
        self.items.push_back(item);
    }

    /// Put `items` back in front of the queue, keeping their order.
    pub fn requeue(&mut self, items: Vec<T>) {
        for item in items.into_iter().rev() {
            self.items.push_front(item);
        }
    }

    /// Get the number of items in the queue.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check whether the queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Check whether `item` is queued.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.items.contains(item)
    }

    /// Clone all queued items in order.
    #[must_use]
    pub fn items(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.iter().cloned().collect()
    }

    /// Take all items out of the queue.
    pub fn drain(&mut self) -> Vec<T> {
        self.items.drain(..).collect()
    }

    /// Remove an `item` from the queue.
    ///
    /// **Note:** This scans the whole queue and therefore has an `O(n)` runtime.
    pub fn remove(&mut self, item: &T) -> Option<T>
    where
        T: PartialEq,
    {
        self.items
            .iter()
            .position(|queued| queued == item)
            .and_then(|index| self.items.remove(index))
    }

    /// Remove all `items` from the queue and return the found ones.
    ///
    /// **Note:** This has an `O(n * m)` runtime.
    pub fn remove_all<'a>(&mut self, items: impl IntoIterator<Item = &'a T>) -> Vec<T>
    where
        T: PartialEq + 'a,
    {
        items
            .into_iter()
            .filter_map(|item| self.remove(item))
            .collect()
    }
}
