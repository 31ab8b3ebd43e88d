//! Per-side ordered map of [`Limit`]s, keyed by price.
//!
//! Balanced (AVL) rather than a plain unsorted BST: an adversarial
//! ascending/descending price sequence would otherwise degrade inserts and
//! removals to O(N). Find and insert both descend left on strictly-smaller,
//! right on strictly-larger, applied consistently in both directions.
//!
//! The tree is an arena (`Vec<Option<Node>>` addressed by [`LimitId`])
//! rather than a graph of owned/weak pointers. Removal of a two-child node
//! relinks the in-order successor into the removed node's structural
//! position instead of copying its payload, so a `LimitId` handed out by
//! `insert`/`find` always stays valid until that specific price is removed.

use crate::ids::LimitId;
use crate::limit::Limit;

struct Node {
    limit: Limit,
    parent: Option<LimitId>,
    left: Option<LimitId>,
    right: Option<LimitId>,
    height: i32,
}

#[derive(Default)]
pub struct PriceTree {
    nodes: Vec<Option<Node>>,
    free: Vec<LimitId>,
    root: Option<LimitId>,
}

impl PriceTree {
    pub fn new() -> Self {
        PriceTree {
            nodes: Vec::new(),
            free: Vec::new(),
            root: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn get(&self, id: LimitId) -> &Limit {
        &self.nodes[id].as_ref().expect("live LimitId").limit
    }

    pub fn get_mut(&mut self, id: LimitId) -> &mut Limit {
        &mut self.nodes[id].as_mut().expect("live LimitId").limit
    }

    fn node(&self, id: LimitId) -> &Node {
        self.nodes[id].as_ref().expect("live LimitId")
    }

    fn node_mut(&mut self, id: LimitId) -> &mut Node {
        self.nodes[id].as_mut().expect("live LimitId")
    }

    fn height_of(&self, id: Option<LimitId>) -> i32 {
        id.map_or(0, |id| self.node(id).height)
    }

    fn update_height(&mut self, id: LimitId) {
        let (l, r) = {
            let n = self.node(id);
            (n.left, n.right)
        };
        let h = 1 + self.height_of(l).max(self.height_of(r));
        self.node_mut(id).height = h;
    }

    fn balance_factor(&self, id: LimitId) -> i32 {
        let n = self.node(id);
        self.height_of(n.left) - self.height_of(n.right)
    }

    /// Finds the node whose `limit_price == price`, if any. O(log N).
    pub fn find(&self, price: u64) -> Option<LimitId> {
        let mut cur = self.root;
        while let Some(id) = cur {
            let n = self.node(id);
            if price < n.limit.limit_price {
                cur = n.left;
            } else if price > n.limit.limit_price {
                cur = n.right;
            } else {
                return Some(id);
            }
        }
        None
    }

    /// Returns the existing node at `price`, or creates and inserts a
    /// fresh zeroed [`Limit`]. Idempotent: calling this twice with the
    /// same price returns the same node.
    pub fn insert(&mut self, price: u64) -> LimitId {
        if self.root.is_none() {
            let id = self.alloc(price, None);
            self.root = Some(id);
            return id;
        }

        let mut cur = self.root.unwrap();
        loop {
            let n = self.node(cur);
            if price < n.limit.limit_price {
                match n.left {
                    Some(next) => cur = next,
                    None => {
                        let id = self.alloc(price, Some(cur));
                        self.node_mut(cur).left = Some(id);
                        self.retrace(cur);
                        return id;
                    }
                }
            } else if price > n.limit.limit_price {
                match n.right {
                    Some(next) => cur = next,
                    None => {
                        let id = self.alloc(price, Some(cur));
                        self.node_mut(cur).right = Some(id);
                        self.retrace(cur);
                        return id;
                    }
                }
            } else {
                return cur;
            }
        }
    }

    fn alloc(&mut self, price: u64, parent: Option<LimitId>) -> LimitId {
        let node = Node {
            limit: Limit::new(price),
            parent,
            left: None,
            right: None,
            height: 1,
        };
        if let Some(id) = self.free.pop() {
            self.nodes[id] = Some(node);
            id
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        }
    }

    /// Detaches and destroys `target`. `target` must currently be empty
    /// (`size == 0`) — the book only ever removes drained limits, so no
    /// order ever has `parent_limit` pointing at a node this function
    /// actually frees.
    pub fn remove(&mut self, target: LimitId) {
        debug_assert!(self.node(target).limit.is_empty());

        let (left, right) = {
            let n = self.node(target);
            (n.left, n.right)
        };

        let rebalance_from = if left.is_some() && right.is_some() {
            // Two children: relink the in-order successor (leftmost of the
            // right subtree) into `target`'s structural position. `target`
            // itself is freed; the successor keeps its own LimitId.
            let successor = self.leftmost_from(right.unwrap());
            self.detach_leftmost_descendant(successor);
            let start = self.node(successor).parent.filter(|&p| p != target);

            let target_parent = self.node(target).parent;
            let new_left = left;
            let new_right = self.node(target).right;

            self.node_mut(successor).parent = target_parent;
            self.node_mut(successor).left = new_left;
            self.node_mut(successor).right = new_right;
            if let Some(l) = new_left {
                self.node_mut(l).parent = Some(successor);
            }
            if let Some(r) = new_right {
                self.node_mut(r).parent = Some(successor);
            }
            self.replace_child(target_parent, target, Some(successor));
            self.update_height(successor);

            start.unwrap_or(successor)
        } else {
            let only_child = left.or(right);
            let parent = self.node(target).parent;
            if let Some(c) = only_child {
                self.node_mut(c).parent = parent;
            }
            self.replace_child(parent, target, only_child);
            parent.unwrap_or_else(|| only_child.unwrap_or(target))
        };

        self.nodes[target] = None;
        self.free.push(target);

        if !matches!(self.nodes.get(rebalance_from), Some(Some(_))) {
            // The rebalance anchor was `target` itself (empty tree, or the
            // only-child case collapsed straight to the removed node) —
            // nothing left to retrace.
            return;
        }
        self.retrace(rebalance_from);
    }

    /// Removes `id` (which has at most a right child) from its current
    /// position, reattaching its right child in its place. Used only as
    /// the first step of two-child removal above.
    fn detach_leftmost_descendant(&mut self, id: LimitId) {
        let parent = self.node(id).parent;
        let right = self.node(id).right;
        if let Some(r) = right {
            self.node_mut(r).parent = parent;
        }
        self.replace_child(parent, id, right);
    }

    /// Points `parent`'s child slot that currently holds `old` at `new`
    /// instead (or updates `self.root` if `old` was the root).
    fn replace_child(&mut self, parent: Option<LimitId>, old: LimitId, new: Option<LimitId>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                let n = self.node_mut(p);
                if n.left == Some(old) {
                    n.left = new;
                } else {
                    debug_assert_eq!(n.right, Some(old));
                    n.right = new;
                }
            }
        }
    }

    fn leftmost_from(&self, mut id: LimitId) -> LimitId {
        while let Some(l) = self.node(id).left {
            id = l;
        }
        id
    }

    fn rightmost_from(&self, mut id: LimitId) -> LimitId {
        while let Some(r) = self.node(id).right {
            id = r;
        }
        id
    }

    /// All live `LimitId`s in ascending price order. Used for diagnostic
    /// dumps; not on any hot path.
    pub(crate) fn ascending(&self) -> Vec<LimitId> {
        fn walk(tree: &PriceTree, id: Option<LimitId>, out: &mut Vec<LimitId>) {
            let Some(id) = id else { return };
            let n = tree.node(id);
            walk(tree, n.left, out);
            out.push(id);
            walk(tree, n.right, out);
        }
        let mut out = Vec::new();
        walk(self, self.root, &mut out);
        out
    }

    /// The leftmost (lowest-price) node in the whole tree.
    pub fn leftmost(&self) -> Option<LimitId> {
        self.root.map(|r| self.leftmost_from(r))
    }

    /// The rightmost (highest-price) node in the whole tree.
    pub fn rightmost(&self) -> Option<LimitId> {
        self.root.map(|r| self.rightmost_from(r))
    }

    fn rotate_left(&mut self, x: LimitId) -> LimitId {
        let y = self.node(x).right.expect("rotate_left needs a right child");
        let parent = self.node(x).parent;
        let y_left = self.node(y).left;

        self.node_mut(x).right = y_left;
        if let Some(t) = y_left {
            self.node_mut(t).parent = Some(x);
        }

        self.node_mut(y).left = Some(x);
        self.node_mut(x).parent = Some(y);
        self.node_mut(y).parent = parent;
        self.replace_child(parent, x, Some(y));

        self.update_height(x);
        self.update_height(y);
        y
    }

    fn rotate_right(&mut self, x: LimitId) -> LimitId {
        let y = self.node(x).left.expect("rotate_right needs a left child");
        let parent = self.node(x).parent;
        let y_right = self.node(y).right;

        self.node_mut(x).left = y_right;
        if let Some(t) = y_right {
            self.node_mut(t).parent = Some(x);
        }

        self.node_mut(y).right = Some(x);
        self.node_mut(x).parent = Some(y);
        self.node_mut(y).parent = parent;
        self.replace_child(parent, x, Some(y));

        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Walks from `start` up to the root, updating heights and rotating
    /// away any balance-factor violation introduced by the last
    /// insert/remove.
    fn retrace(&mut self, start: LimitId) {
        let mut cur = Some(start);
        while let Some(id) = cur {
            self.update_height(id);
            let balance = self.balance_factor(id);

            let new_subtree_root = if balance > 1 {
                let left = self.node(id).left.unwrap();
                if self.balance_factor(left) < 0 {
                    self.rotate_left(left);
                }
                self.rotate_right(id)
            } else if balance < -1 {
                let right = self.node(id).right.unwrap();
                if self.balance_factor(right) > 0 {
                    self.rotate_right(right);
                }
                self.rotate_left(id)
            } else {
                id
            };

            cur = self.node(new_subtree_root).parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prices_in_order(tree: &PriceTree) -> Vec<u64> {
        fn walk(tree: &PriceTree, id: Option<LimitId>, out: &mut Vec<u64>) {
            if let Some(id) = id {
                let n = tree.node(id);
                walk(tree, n.left, out);
                out.push(n.limit.limit_price);
                walk(tree, n.right, out);
            }
        }
        let mut out = Vec::new();
        walk(tree, tree.root, &mut out);
        out
    }

    fn height_is_consistent(tree: &PriceTree, id: Option<LimitId>) -> i32 {
        match id {
            None => 0,
            Some(id) => {
                let n = tree.node(id);
                let lh = height_is_consistent(tree, n.left);
                let rh = height_is_consistent(tree, n.right);
                assert!((lh - rh).abs() <= 1, "AVL balance violated at {id}");
                assert_eq!(n.height, 1 + lh.max(rh));
                n.height
            }
        }
    }

    #[test]
    fn insert_is_idempotent() {
        let mut t = PriceTree::new();
        let a = t.insert(100);
        let b = t.insert(100);
        assert_eq!(a, b);
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let mut t = PriceTree::new();
        for p in 1..=1000u64 {
            t.insert(p);
        }
        height_is_consistent(&t, t.root);
        assert_eq!(prices_in_order(&t), (1..=1000).collect::<Vec<_>>());
        assert_eq!(t.leftmost().map(|id| t.get(id).limit_price), Some(1));
        assert_eq!(t.rightmost().map(|id| t.get(id).limit_price), Some(1000));
    }

    #[test]
    fn descending_inserts_stay_balanced() {
        let mut t = PriceTree::new();
        for p in (1..=1000u64).rev() {
            t.insert(p);
        }
        height_is_consistent(&t, t.root);
        assert_eq!(prices_in_order(&t), (1..=1000).collect::<Vec<_>>());
    }

    #[test]
    fn remove_leaf_and_two_child_node_preserves_order_and_balance() {
        let mut t = PriceTree::new();
        let ids: Vec<LimitId> = [50, 30, 70, 20, 40, 60, 80]
            .iter()
            .map(|&p| t.insert(p))
            .collect();

        // remove the root (two children)
        t.remove(ids[0]);
        height_is_consistent(&t, t.root);
        assert_eq!(prices_in_order(&t), vec![20, 30, 40, 60, 70, 80]);

        // remove a leaf
        let leaf = t.find(20).unwrap();
        t.remove(leaf);
        height_is_consistent(&t, t.root);
        assert_eq!(prices_in_order(&t), vec![30, 40, 60, 70, 80]);
    }

    #[test]
    fn successor_limitid_survives_its_parents_removal() {
        // Removing a node with two children must not invalidate the
        // successor's LimitId.
        let mut t = PriceTree::new();
        let root = t.insert(50);
        t.insert(30);
        let right = t.insert(70);
        let successor = t.insert(60); // leftmost of `right`'s subtree
        t.insert(80);

        t.get_mut(successor).total_volume = 42; // stand-in for a live FIFO

        t.remove(root);

        // `successor`'s LimitId must still resolve to the same payload.
        assert_eq!(t.get(successor).limit_price, 60);
        assert_eq!(t.get(successor).total_volume, 42);
        let _ = right;
    }

    #[test]
    fn remove_all_empties_tree() {
        let mut t = PriceTree::new();
        let ids: Vec<LimitId> = (1..=50u64).map(|p| t.insert(p)).collect();
        for id in ids {
            t.remove(id);
        }
        assert!(t.is_empty());
        assert!(t.leftmost().is_none());
    }
}
