//! Recency List Module
//!
//! Arena-backed doubly linked list used to track LRU order.
//!
//! Nodes live in a `Vec` of slots and link to each other by `SlotId`, so a
//! key map can hold a stable handle to its node and splice it to the front
//! in O(1) without pointer juggling.
//!
//! ```text
//!   head (MRU) ─► [id_2] ◄──► [id_0] ◄──► [id_1] ◄── tail (LRU)
//! ```

// == Slot Id ==
/// Stable handle to a node inside a `RecencyList`.
///
/// Handles are reused after their node is removed, so holders must drop
/// them when the node goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(usize);

#[derive(Debug)]
struct Node<T> {
    value: T,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

// == Recency List ==
/// Tracks access order for LRU eviction.
///
/// - Front = Most recently used
/// - Back = Least recently used
#[derive(Debug)]
pub struct RecencyList<T> {
    slots: Vec<Option<Node<T>>>,
    free: Vec<usize>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
}

impl<T> RecencyList<T> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    /// Creates an empty list with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            ..Self::new()
        }
    }

    // == Length ==
    /// Returns the number of linked nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // == Accessors ==
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.node(id).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.node_mut(id).map(|node| &mut node.value)
    }

    // == Push Front ==
    /// Links a new node at the MRU end and returns its handle.
    pub fn push_front(&mut self, value: T) -> SlotId {
        let node = Node {
            value,
            prev: None,
            next: self.head,
        };
        let id = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(node);
                SlotId(idx)
            }
            None => {
                self.slots.push(Some(node));
                SlotId(self.slots.len() - 1)
            }
        };

        match self.head {
            Some(old_head) => self.link_mut(old_head).prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        self.len += 1;
        id
    }

    // == Move To Front ==
    /// Marks a node as most recently used.
    ///
    /// Returns `false` if `id` is not a live node.
    pub fn move_to_front(&mut self, id: SlotId) -> bool {
        if self.node(id).is_none() {
            return false;
        }
        if self.head == Some(id) {
            return true;
        }

        self.detach(id);
        let old_head = self.head;
        {
            let node = self.link_mut(id);
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => self.link_mut(h).prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
        true
    }

    // == Pop Back ==
    /// Unlinks and returns the least recently used value.
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Remove ==
    /// Unlinks a node and frees its slot.
    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.node(id)?;
        self.detach(id);
        let node = self.slots[id.0].take()?;
        self.free.push(id.0);
        self.len -= 1;
        Some(node.value)
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    // == Iteration ==
    /// Iterates values from most to least recently used.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            current: self.head,
        }
    }

    fn node(&self, id: SlotId) -> Option<&Node<T>> {
        self.slots.get(id.0).and_then(|slot| slot.as_ref())
    }

    fn node_mut(&mut self, id: SlotId) -> Option<&mut Node<T>> {
        self.slots.get_mut(id.0).and_then(|slot| slot.as_mut())
    }

    /// Neighbour links always point at live slots.
    fn link_mut(&mut self, id: SlotId) -> &mut Node<T> {
        self.node_mut(id)
            .expect("recency list link points at a freed slot")
    }

    /// Unhooks `id` from its neighbours, leaving its own links stale.
    fn detach(&mut self, id: SlotId) {
        let (prev, next) = {
            let node = self.link_mut(id);
            (node.prev, node.next)
        };
        match prev {
            Some(p) => self.link_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.link_mut(n).prev = prev,
            None => self.tail = prev,
        }
    }

    #[cfg(test)]
    pub(crate) fn debug_validate_invariants(&self) {
        let mut count = 0;
        let mut prev = None;
        let mut current = self.head;
        while let Some(id) = current {
            let node = self.node(id).expect("linked slot is empty");
            assert_eq!(node.prev, prev, "broken prev link at {:?}", id);
            prev = Some(id);
            current = node.next;
            count += 1;
            assert!(count <= self.len, "cycle in recency list");
        }
        assert_eq!(prev, self.tail, "tail does not match last node");
        assert_eq!(count, self.len, "len does not match linked nodes");
        let occupied = self.slots.iter().filter(|slot| slot.is_some()).count();
        assert_eq!(occupied, self.len, "occupied slots do not match len");
    }
}

impl<T> Default for RecencyList<T> {
    fn default() -> Self {
        Self::new()
    }
}

// == Iterator ==
/// Front-to-back iterator over a `RecencyList`.
pub struct Iter<'a, T> {
    list: &'a RecencyList<T>,
    current: Option<SlotId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.list.node(self.current?)?;
        self.current = node.next;
        Some(&node.value)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn collect(list: &RecencyList<&'static str>) -> Vec<&'static str> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_list_new() {
        let list: RecencyList<u32> = RecencyList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.iter().next().is_none());
    }

    #[test]
    fn test_push_front_orders_mru_first() {
        let mut list = RecencyList::new();
        list.push_front("a");
        list.push_front("b");
        list.push_front("c");

        assert_eq!(collect(&list), vec!["c", "b", "a"]);
        assert_eq!(list.iter().last(), Some(&"a"));
        list.debug_validate_invariants();
    }

    #[test]
    fn test_move_to_front_from_tail_and_middle() {
        let mut list = RecencyList::new();
        let a = list.push_front("a");
        let b = list.push_front("b");
        list.push_front("c");

        // a is the tail
        assert!(list.move_to_front(a));
        assert_eq!(collect(&list), vec!["a", "c", "b"]);
        list.debug_validate_invariants();

        // c is in the middle now
        assert!(list.move_to_front(b));
        assert_eq!(collect(&list), vec!["b", "a", "c"]);
        list.debug_validate_invariants();
    }

    #[test]
    fn test_move_to_front_head_is_noop() {
        let mut list = RecencyList::new();
        list.push_front("a");
        let b = list.push_front("b");

        assert!(list.move_to_front(b));
        assert_eq!(collect(&list), vec!["b", "a"]);
        list.debug_validate_invariants();
    }

    #[test]
    fn test_pop_back_returns_lru() {
        let mut list = RecencyList::new();
        list.push_front("a");
        list.push_front("b");

        assert_eq!(list.pop_back(), Some("a"));
        assert_eq!(list.pop_back(), Some("b"));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
        list.debug_validate_invariants();
    }

    #[test]
    fn test_remove_and_slot_reuse() {
        let mut list = RecencyList::new();
        list.push_front("a");
        let b = list.push_front("b");
        list.push_front("c");

        assert_eq!(list.remove(b), Some("b"));
        assert_eq!(list.remove(b), None);
        assert!(!list.move_to_front(b));
        assert_eq!(collect(&list), vec!["c", "a"]);

        // freed slot is handed out again
        let d = list.push_front("d");
        assert_eq!(d, b);
        assert_eq!(collect(&list), vec!["d", "c", "a"]);
        list.debug_validate_invariants();
    }

    #[test]
    fn test_get_mut_updates_value_in_place() {
        let mut list = RecencyList::new();
        let id = list.push_front(String::from("old"));
        *list.get_mut(id).unwrap() = String::from("new");
        assert_eq!(list.get(id).map(String::as_str), Some("new"));
    }

    #[test]
    fn test_clear() {
        let mut list = RecencyList::new();
        list.push_front(1);
        list.push_front(2);
        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.iter().count(), 0);
        list.push_front(3);
        assert_eq!(list.iter().next(), Some(&3));
        list.debug_validate_invariants();
    }
}
