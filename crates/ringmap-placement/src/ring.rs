//! Consistent hashing ring implementation.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::error::RingError;
use crate::hasher::{Crc32Hasher, KeyHasher};
use crate::index::{Node, NodeIndex};

/// A node as seen from outside the ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    /// The node's identifier.
    pub id: String,
    /// The node's position on the ring (`hash(id)`).
    pub position: u32,
}

/// A key whose owner differs between two ring views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// The key that must move.
    pub key: String,
    /// The node that owns it in the old view.
    pub from: String,
    /// The node that owns it in the new view.
    pub to: String,
}

/// Thread-safe consistent hashing ring.
///
/// Each node occupies one position, `hash(id)`. A key belongs to the first
/// node at or after `hash(key)`, wrapping to the lowest position when the key
/// hashes past every node. Mutations hold the write lock for their whole
/// search-and-modify sequence; lookups hold the read lock, so they run in
/// parallel with each other and never see a half-applied change.
///
/// Share a ring across threads with `Arc<Ring>`.
pub struct Ring<H = Crc32Hasher> {
    index: RwLock<NodeIndex>,
    hasher: Arc<H>,
}

impl Ring {
    /// Create an empty ring using CRC-32 positions.
    pub fn new() -> Self {
        Self::with_hasher(Crc32Hasher)
    }
}

impl Default for Ring {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: KeyHasher> Ring<H> {
    /// Create an empty ring positioning nodes and keys with `hasher`.
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            index: RwLock::new(NodeIndex::new()),
            hasher: Arc::new(hasher),
        }
    }

    /// Ring position of an arbitrary key or identifier.
    pub fn hash_key(&self, key: &str) -> u32 {
        self.hasher.hash(key.as_bytes())
    }

    /// Add a node to the ring.
    ///
    /// Returns `false` without changing anything if `id` is already a member:
    /// an identifier always hashes to the same position, so re-adding it could
    /// only create a second entry for the same logical node.
    pub fn add_node(&self, id: impl Into<String>) -> bool {
        let id = id.into();
        let position = self.hash_key(&id);

        let mut index = self.write();
        if index.find(&id, position).is_some() {
            debug!(node = %id, position, "node already on ring");
            return false;
        }

        debug!(node = %id, position, "added node to ring");
        index.insert(Node { id, position });
        true
    }

    /// Remove a node from the ring.
    ///
    /// Only the entry whose identifier matches is removed, even if another
    /// identifier happens to hash to the same position.
    pub fn remove_node(&self, id: &str) -> Result<(), RingError> {
        let position = self.hash_key(id);

        let mut index = self.write();
        let found = index.find(id, position);
        match found.and_then(|i| index.remove(i)) {
            Some(_) => {
                debug!(node = %id, position, "removed node from ring");
                Ok(())
            }
            None => Err(RingError::NodeNotFound(id.to_string())),
        }
    }

    /// Return the identifier of the node that owns `key`.
    pub fn get(&self, key: &str) -> Result<String, RingError> {
        let position = self.hash_key(key);
        let index = self.read();
        owner(&index, position).map(|node| node.id.clone())
    }

    /// Number of nodes on the ring.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether the ring has no nodes.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Whether `id` is a member of the ring.
    pub fn contains(&self, id: &str) -> bool {
        self.position_of(id).is_some()
    }

    /// Position of member `id`, or `None` if it is not on the ring.
    pub fn position_of(&self, id: &str) -> Option<u32> {
        let position = self.hash_key(id);
        self.read().find(id, position).map(|_| position)
    }

    /// All members in ring order (ascending position).
    pub fn nodes(&self) -> Vec<NodeInfo> {
        node_infos(&self.read())
    }

    /// Take an immutable copy of the current membership.
    pub fn view(&self) -> RingView<H> {
        RingView {
            index: self.read().clone(),
            hasher: Arc::clone(&self.hasher),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, NodeIndex> {
        // No mutation can panic while the index is unsorted.
        self.index.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, NodeIndex> {
        self.index.write().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn is_sorted(&self) -> bool {
        self.read().is_sorted()
    }
}

impl<H> fmt::Debug for Ring<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index = self.index.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("Ring")
            .field("nodes", &index.len())
            .finish_non_exhaustive()
    }
}

/// Point-in-time copy of a [`Ring`]'s membership.
///
/// Resolves keys exactly as the ring did when the view was taken. Used to
/// compare memberships before and after a change.
pub struct RingView<H = Crc32Hasher> {
    index: NodeIndex,
    hasher: Arc<H>,
}

impl<H: KeyHasher> RingView<H> {
    /// Return the identifier of the node that owned `key` in this view.
    pub fn get(&self, key: &str) -> Result<&str, RingError> {
        let position = self.hasher.hash(key.as_bytes());
        owner(&self.index, position).map(|node| node.id.as_str())
    }

    /// Number of nodes in this view.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether this view has no nodes.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// All members in ring order (ascending position).
    pub fn nodes(&self) -> Vec<NodeInfo> {
        node_infos(&self.index)
    }

    /// Keys whose owner differs between `old` and `new`.
    ///
    /// Keys with no owner in either view (an empty ring) produce no migration.
    pub fn diff<K>(old: &RingView<H>, new: &RingView<H>, keys: K) -> Vec<Migration>
    where
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        let mut migrations = Vec::new();

        for key in keys {
            let key = key.as_ref();
            let (Ok(from), Ok(to)) = (old.get(key), new.get(key)) else {
                continue;
            };
            if from != to {
                migrations.push(Migration {
                    key: key.to_string(),
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }

        migrations
    }
}

impl<H> Clone for RingView<H> {
    fn clone(&self) -> Self {
        Self {
            index: self.index.clone(),
            hasher: Arc::clone(&self.hasher),
        }
    }
}

impl<H> fmt::Debug for RingView<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingView")
            .field("nodes", &self.index.len())
            .finish_non_exhaustive()
    }
}

/// First node at or after `position`, wrapping to the start of the ring.
fn owner(index: &NodeIndex, position: u32) -> Result<&Node, RingError> {
    let i = index.lower_bound(position);
    let i = if i == index.len() { 0 } else { i };
    index.get(i).ok_or(RingError::EmptyRing)
}

fn node_infos(index: &NodeIndex) -> Vec<NodeInfo> {
    index
        .iter()
        .map(|n| NodeInfo {
            id: n.id.clone(),
            position: n.position,
        })
        .collect()
}
