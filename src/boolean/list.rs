use std::ops::{Index, IndexMut};

use slotmap::{Key, SlotMap};

#[derive(Debug, Clone)]
struct Node<K, T> {
    value: T,
    prev: Option<K>,
    next: Option<K>,
    linked: bool,
}

/// Insertion point found by [`LinkedList::find_transition`]: the new node
/// goes between `before` and `after`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<K> {
    pub before: Option<K>,
    pub after: Option<K>,
}

/// Doubly linked list stored in a slot map.
///
/// Nodes outlive their membership in the list: [`unlink`](Self::unlink)
/// detaches a node but keeps its value addressable, so it can be relinked
/// later or still be looked up through a stale handle.
#[derive(Debug, Clone)]
pub struct LinkedList<K: Key, T> {
    nodes: SlotMap<K, Node<K, T>>,
    head: Option<K>,
    tail: Option<K>,
}

impl<K: Key, T> Default for LinkedList<K, T> {
    fn default() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            head: None,
            tail: None,
        }
    }
}

impl<K: Key, T> LinkedList<K, T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a detached node.
    pub fn alloc(&mut self, value: T) -> K {
        self.nodes.insert(Node {
            value,
            prev: None,
            next: None,
            linked: false,
        })
    }

    #[must_use]
    pub fn head(&self) -> Option<K> {
        self.head
    }

    #[must_use]
    pub fn get(&self, key: K) -> Option<&T> {
        self.nodes.get(key).map(|n| &n.value)
    }

    #[must_use]
    pub fn is_linked(&self, key: K) -> bool {
        self.nodes.get(key).is_some_and(|n| n.linked)
    }

    #[must_use]
    pub fn next(&self, key: K) -> Option<K> {
        self.nodes.get(key).and_then(|n| n.next)
    }

    #[must_use]
    pub fn prev(&self, key: K) -> Option<K> {
        self.nodes.get(key).and_then(|n| n.prev)
    }

    /// Links a detached node in front of `before`, or at the tail when
    /// `before` is `None`. Linked nodes are left where they are.
    pub fn link_before(&mut self, key: K, before: Option<K>) {
        if !self.nodes.contains_key(key) || self.is_linked(key) {
            return;
        }
        let prev = match before {
            Some(b) => self.prev(b),
            None => self.tail,
        };
        if let Some(node) = self.nodes.get_mut(key) {
            node.prev = prev;
            node.next = before;
            node.linked = true;
        }
        match prev.and_then(|p| self.nodes.get_mut(p)) {
            Some(p) => p.next = Some(key),
            None => self.head = Some(key),
        }
        match before.and_then(|b| self.nodes.get_mut(b)) {
            Some(b) => b.prev = Some(key),
            None => self.tail = Some(key),
        }
    }

    /// Detaches a node, keeping its value.
    pub fn unlink(&mut self, key: K) {
        if !self.is_linked(key) {
            return;
        }
        let (prev, next) = match self.nodes.get_mut(key) {
            Some(node) => {
                node.linked = false;
                (node.prev.take(), node.next.take())
            }
            None => return,
        };
        match prev.and_then(|p| self.nodes.get_mut(p)) {
            Some(p) => p.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.nodes.get_mut(n)) {
            Some(n) => n.prev = prev,
            None => self.tail = prev,
        }
    }

    /// Walks from the head and stops at the first node for which `check`
    /// holds.
    pub fn find_transition(&self, mut check: impl FnMut(K, &T) -> bool) -> Transition<K> {
        let mut before = None;
        let mut here = self.head;
        while let Some(key) = here {
            let Some(node) = self.nodes.get(key) else {
                break;
            };
            if check(key, &node.value) {
                break;
            }
            before = Some(key);
            here = node.next;
        }
        Transition { before, after: here }
    }

    /// Links a detached node at a previously found transition.
    pub fn insert_at(&mut self, key: K, at: Transition<K>) {
        self.link_before(key, at.after);
    }

    /// Keys of the linked nodes, head to tail.
    #[must_use]
    pub fn keys(&self) -> Vec<K> {
        let mut out = Vec::new();
        let mut here = self.head;
        while let Some(key) = here {
            out.push(key);
            here = self.next(key);
        }
        out
    }
}

impl<K: Key, T> Index<K> for LinkedList<K, T> {
    type Output = T;

    fn index(&self, key: K) -> &T {
        &self.nodes[key].value
    }
}

impl<K: Key, T> IndexMut<K> for LinkedList<K, T> {
    fn index_mut(&mut self, key: K) -> &mut T {
        &mut self.nodes[key].value
    }
}
