// Copyright 2025 spillway Project Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use spillway_common::{strict_assert, strict_assert_eq};

/// Sentinel index for absent links.
const NIL: usize = usize::MAX;

#[derive(Debug)]
struct Node<T> {
    // `None` marks a vacant slot waiting on the free list.
    data: Option<T>,
    prev: usize,
    next: usize,
}

/// Array-backed doubly linked list used as a recency list.
///
/// Nodes live in a `Vec` arena and are linked by index, so a token handed
/// out by [`Dlist::push_front`] stays valid across arena growth. Removed
/// slots are recycled through a free list. All operations are O(1).
#[derive(Debug)]
pub struct Dlist<T> {
    nodes: Vec<Node<T>>,
    head: usize,
    tail: usize,
    free: usize,
    len: usize,
}

impl<T> Default for Dlist<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Dlist<T> {
    /// Create an empty list.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            head: NIL,
            tail: NIL,
            free: NIL,
            len: 0,
        }
    }

    /// Number of linked entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the list holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert at the front (most recent position) and return the slot token.
    pub fn push_front(&mut self, data: T) -> usize {
        let token = if self.free != NIL {
            let token = self.free;
            self.free = self.nodes[token].next;
            strict_assert!(self.nodes[token].data.is_none());
            self.nodes[token] = Node {
                data: Some(data),
                prev: NIL,
                next: NIL,
            };
            token
        } else {
            self.nodes.push(Node {
                data: Some(data),
                prev: NIL,
                next: NIL,
            });
            self.nodes.len() - 1
        };
        self.link_front(token);
        self.len += 1;
        token
    }

    /// Move an occupied slot to the front.
    pub fn move_to_front(&mut self, token: usize) {
        strict_assert!(self.nodes[token].data.is_some());
        if self.head == token {
            return;
        }
        self.unlink(token);
        self.link_front(token);
    }

    /// Unlink a slot and return its data, recycling the slot.
    ///
    /// # Panics
    ///
    /// Panics if the slot is vacant. A caller holding a token for a vacant
    /// slot has lost track of its own bookkeeping and there is no way to
    /// recover a consistent list.
    pub fn remove(&mut self, token: usize) -> T {
        let data = self
            .nodes
            .get_mut(token)
            .and_then(|node| node.data.take())
            .unwrap_or_else(|| panic!("recency list slot {token} is vacant"));
        self.unlink(token);
        self.nodes[token].next = self.free;
        self.free = token;
        self.len -= 1;
        data
    }

    /// Remove and return the back (least recent) entry.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.tail == NIL {
            return None;
        }
        Some(self.remove(self.tail))
    }

    /// Reference to the front (most recent) entry.
    pub fn front(&self) -> Option<&T> {
        self.get(self.head)
    }

    /// Reference to the back (least recent) entry.
    pub fn back(&self) -> Option<&T> {
        self.get(self.tail)
    }

    /// Reference to the data in a slot, `None` if the slot is vacant or out
    /// of range.
    pub fn get(&self, token: usize) -> Option<&T> {
        self.nodes.get(token).and_then(|node| node.data.as_ref())
    }

    /// Mutable reference to the data in a slot.
    pub fn get_mut(&mut self, token: usize) -> Option<&mut T> {
        self.nodes.get_mut(token).and_then(|node| node.data.as_mut())
    }

    /// Drop every entry and slot.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = NIL;
        self.tail = NIL;
        self.free = NIL;
        self.len = 0;
    }

    /// Iterate front to back (most to least recent).
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.head,
        }
    }

    fn link_front(&mut self, token: usize) {
        let old = self.head;
        {
            let node = &mut self.nodes[token];
            node.prev = NIL;
            node.next = old;
        }
        if old != NIL {
            self.nodes[old].prev = token;
        } else {
            strict_assert_eq!(self.tail, NIL);
            self.tail = token;
        }
        self.head = token;
    }

    fn unlink(&mut self, token: usize) {
        let (prev, next) = {
            let node = &self.nodes[token];
            (node.prev, node.next)
        };
        if prev != NIL {
            self.nodes[prev].next = next;
        } else {
            strict_assert_eq!(self.head, token);
            self.head = next;
        }
        if next != NIL {
            self.nodes[next].prev = prev;
        } else {
            strict_assert_eq!(self.tail, token);
            self.tail = prev;
        }
        let node = &mut self.nodes[token];
        node.prev = NIL;
        node.next = NIL;
    }
}

/// Front-to-back iterator over a [`Dlist`].
pub struct Iter<'a, T> {
    list: &'a Dlist<T>,
    cursor: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let node = &self.list.nodes[self.cursor];
        self.cursor = node.next;
        match node.data.as_ref() {
            Some(data) => Some(data),
            None => panic!("recency list links a vacant slot"),
        }
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;

    fn dump(list: &Dlist<u64>) -> Vec<u64> {
        list.iter().copied().collect_vec()
    }

    #[test]
    fn test_push_and_order() {
        let mut list = Dlist::new();
        let a = list.push_front(1);
        let b = list.push_front(2);
        let c = list.push_front(3);
        assert_eq!(dump(&list), vec![3, 2, 1]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.front(), Some(&3));
        assert_eq!(list.back(), Some(&1));
        assert_eq!(list.get(a), Some(&1));
        assert_eq!(list.get(b), Some(&2));
        assert_eq!(list.get(c), Some(&3));
    }

    #[test]
    fn test_move_to_front() {
        let mut list = Dlist::new();
        let a = list.push_front(1);
        let _b = list.push_front(2);
        let c = list.push_front(3);

        list.move_to_front(a);
        assert_eq!(dump(&list), vec![1, 3, 2]);

        // Front is a no-op.
        list.move_to_front(a);
        assert_eq!(dump(&list), vec![1, 3, 2]);

        list.move_to_front(c);
        assert_eq!(dump(&list), vec![3, 1, 2]);
    }

    #[test]
    fn test_remove_and_pop_back() {
        let mut list = Dlist::new();
        let _a = list.push_front(1);
        let b = list.push_front(2);
        let _c = list.push_front(3);

        assert_eq!(list.remove(b), 2);
        assert_eq!(dump(&list), vec![3, 1]);

        assert_eq!(list.pop_back(), Some(1));
        assert_eq!(list.pop_back(), Some(3));
        assert_eq!(list.pop_back(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_slot_reuse() {
        let mut list = Dlist::new();
        let a = list.push_front(1);
        let _b = list.push_front(2);
        list.remove(a);

        // The vacated slot is recycled before the arena grows.
        let c = list.push_front(3);
        assert_eq!(c, a);
        assert_eq!(dump(&list), vec![3, 2]);
        assert_eq!(list.nodes.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut list = Dlist::new();
        list.push_front(1);
        list.push_front(2);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.pop_back(), None);
        assert_eq!(dump(&list), Vec::<u64>::new());
    }

    #[test]
    #[should_panic(expected = "vacant")]
    fn test_remove_vacant_panics() {
        let mut list = Dlist::new();
        let a = list.push_front(1);
        list.remove(a);
        list.remove(a);
    }
}
