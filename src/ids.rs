//! Stable identifiers used to address orders and price levels.
//!
//! The book is implemented as an arena of [`crate::limit::Limit`] nodes
//! rather than a graph of `Rc<RefCell<_>>` pointers: every reference a node
//! would otherwise hold to a sibling or parent becomes one of these indices
//! instead.

/// Caller-supplied order identifier. Unique across the whole book while an
/// order is resting.
pub type OrderId = u64;

/// Arena index of a [`crate::limit::Limit`] within one side's [`crate::price_tree::PriceTree`].
///
/// `LimitId`s from the buy tree and the sell tree are drawn from independent
/// arenas; a `LimitId` only makes sense paired with the `Side` it belongs
/// to, which is why [`crate::order::Order`] stores both.
pub type LimitId = usize;
