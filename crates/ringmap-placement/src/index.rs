//! Sorted index of ring members.

/// One ring member: an identifier and the position it hashes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Node {
    pub(crate) id: String,
    pub(crate) position: u32,
}

/// Ring members ordered ascending by position.
///
/// Pure data: locking is the caller's job. Entries with equal positions keep
/// no particular order among themselves.
#[derive(Debug, Clone, Default)]
pub(crate) struct NodeIndex {
    nodes: Vec<Node>,
}

impl NodeIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the member at `i` sits strictly before the member at `j`.
    ///
    /// Panics if either index is out of bounds, like slice indexing.
    pub(crate) fn less(&self, i: usize, j: usize) -> bool {
        self.nodes[i].position < self.nodes[j].position
    }

    /// Exchange two members in place.
    pub(crate) fn swap(&mut self, i: usize, j: usize) {
        self.nodes.swap(i, j);
    }

    pub(crate) fn get(&self, i: usize) -> Option<&Node> {
        self.nodes.get(i)
    }

    /// Smallest index whose position is `>= target`, or `len()` if none is.
    pub(crate) fn lower_bound(&self, target: u32) -> usize {
        self.nodes.partition_point(|n| n.position < target)
    }

    /// Index of the entry for `id` at `position`, if present.
    ///
    /// Only the run of entries sharing `position` is scanned.
    pub(crate) fn find(&self, id: &str, position: u32) -> Option<usize> {
        let start = self.lower_bound(position);
        self.nodes[start..]
            .iter()
            .take_while(|n| n.position == position)
            .position(|n| n.id == id)
            .map(|offset| start + offset)
    }

    /// Append `node` and sift it back into sorted order.
    ///
    /// The rest of the index is already sorted, so one insertion-sort pass is
    /// a full re-sort. A node whose position equals an existing one lands
    /// after it.
    pub(crate) fn insert(&mut self, node: Node) {
        self.nodes.push(node);
        let mut i = self.len() - 1;
        while i > 0 && self.less(i, i - 1) {
            self.swap(i, i - 1);
            i -= 1;
        }
    }

    /// Remove and return the member at `i`, shifting later members left.
    pub(crate) fn remove(&mut self, i: usize) -> Option<Node> {
        (i < self.nodes.len()).then(|| self.nodes.remove(i))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    #[cfg(test)]
    pub(crate) fn is_sorted(&self) -> bool {
        (1..self.len()).all(|i| !self.less(i, i - 1))
    }
}
