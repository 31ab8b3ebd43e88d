//! The book façade every external mutation enters through.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::diagnostics::{self, BookSnapshot};
use crate::engine;
use crate::errors::{BookError, BookResult};
use crate::ids::{LimitId, OrderId};
use crate::order::{Order, Side};
use crate::price_tree::PriceTree;
use crate::trade::Trade;

/// Outcome of a [`Book::cancel`] call. Cancelling an unknown id is a
/// silent no-op, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    NotFound,
}

/// Outcome of a [`Book::modify`] call.
#[derive(Debug, Clone)]
pub enum ModifyOutcome {
    /// Unknown id; no-op.
    NotFound,
    /// `new_shares == old_shares && new_price == old_price`; no-op.
    NoOp,
    /// Pure in-place shrink; queue priority preserved.
    Shrunk,
    /// Price changed or size grew: decomposed into cancel+add. Queue
    /// priority was lost; these are the trades the re-insertion produced.
    Replaced(Vec<Trade>),
}

/// The live state of one instrument's resting liquidity.
pub struct Book {
    pub(crate) buy_tree: PriceTree,
    pub(crate) sell_tree: PriceTree,
    pub(crate) order_index: HashMap<OrderId, Order>,
    highest_buy: Option<LimitId>,
    lowest_sell: Option<LimitId>,
    clock: u64,
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}

impl Book {
    pub fn new() -> Self {
        Book {
            buy_tree: PriceTree::new(),
            sell_tree: PriceTree::new(),
            order_index: HashMap::new(),
            highest_buy: None,
            lowest_sell: None,
            clock: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order_index.is_empty()
    }

    pub fn len(&self) -> usize {
        self.order_index.len()
    }

    /// A point-in-time, non-mutating view of the book.
    pub fn snapshot(&self) -> BookSnapshot {
        diagnostics::build(self)
    }

    /// Adds a new order. Runs matching first; any unfilled remainder
    /// rests. Returns the trades matching produced.
    pub fn add(&mut self, id: OrderId, shares: u64, price: u64, side: Side) -> BookResult<Vec<Trade>> {
        if shares == 0 {
            return Err(BookError::InvalidInput("shares must be positive"));
        }
        if self.order_index.contains_key(&id) {
            return Err(BookError::DuplicateId(id));
        }

        let now = self.tick();
        debug!(id, shares, price, ?side, "add");
        let mut incoming = Order::new(id, shares, price, side, now);
        let trades = engine::match_incoming(self, &mut incoming);

        if incoming.shares > 0 {
            self.rest(incoming);
        }
        Ok(trades)
    }

    /// Removes a resting order. No-op if `id` is unknown.
    pub fn cancel(&mut self, id: OrderId) -> CancelOutcome {
        let Some(order) = self.order_index.get(&id) else {
            trace!(id, "cancel: not found");
            return CancelOutcome::NotFound;
        };
        let side = order.side;
        self.remove_resting(side, id);
        debug!(id, "cancel");
        CancelOutcome::Cancelled
    }

    /// Resizes and/or reprices a resting order. No-op if `id` is unknown.
    pub fn modify(&mut self, id: OrderId, new_shares: u64, new_price: u64) -> BookResult<ModifyOutcome> {
        if new_shares == 0 {
            return Err(BookError::InvalidInput("new_shares must be positive"));
        }
        let Some(existing) = self.order_index.get(&id) else {
            trace!(id, "modify: not found");
            return Ok(ModifyOutcome::NotFound);
        };
        let old_shares = existing.shares;
        let old_price = existing.price;
        let side = existing.side;

        if new_price != old_price || new_shares > old_shares {
            self.remove_resting(side, id);
            let now = self.tick();
            let mut incoming = Order::new(id, new_shares, new_price, side, now);
            let trades = engine::match_incoming(self, &mut incoming);
            if incoming.shares > 0 {
                self.rest(incoming);
            }
            debug!(id, new_shares, new_price, "modify: replaced (priority lost)");
            Ok(ModifyOutcome::Replaced(trades))
        } else if new_shares < old_shares {
            let limit_id = existing
                .parent_limit
                .expect("resting order always has a parent limit");
            let diff = old_shares - new_shares;
            let now = self.tick();
            let order = self.order_index.get_mut(&id).expect("checked above");
            order.shares = new_shares;
            order.event_time = now;
            self.tree_mut(side).get_mut(limit_id).total_volume -= diff;
            debug!(id, new_shares, "modify: shrunk in place");
            Ok(ModifyOutcome::Shrunk)
        } else {
            trace!(id, "modify: no-op");
            Ok(ModifyOutcome::NoOp)
        }
    }

    // ---- internals shared with `engine` -----------------------------

    pub(crate) fn tree(&self, side: Side) -> &PriceTree {
        match side {
            Side::Buy => &self.buy_tree,
            Side::Sell => &self.sell_tree,
        }
    }

    pub(crate) fn tree_mut(&mut self, side: Side) -> &mut PriceTree {
        match side {
            Side::Buy => &mut self.buy_tree,
            Side::Sell => &mut self.sell_tree,
        }
    }

    fn tree_and_index_mut(&mut self, side: Side) -> (&mut PriceTree, &mut HashMap<OrderId, Order>) {
        match side {
            Side::Buy => (&mut self.buy_tree, &mut self.order_index),
            Side::Sell => (&mut self.sell_tree, &mut self.order_index),
        }
    }

    /// The cached best-bid (BUY) or best-ask (SELL) limit, if the side is
    /// non-empty.
    pub(crate) fn extremum(&self, side: Side) -> Option<LimitId> {
        match side {
            Side::Buy => self.highest_buy,
            Side::Sell => self.lowest_sell,
        }
    }

    fn set_extremum(&mut self, side: Side, value: Option<LimitId>) {
        match side {
            Side::Buy => self.highest_buy = value,
            Side::Sell => self.lowest_sell = value,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Rests an order that matching left with `shares > 0`: find-or-insert
    /// its Limit, enqueue at the FIFO tail, maintain the extremum cache.
    pub(crate) fn rest(&mut self, mut order: Order) {
        let side = order.side;
        let price = order.price;
        let limit_id = self.tree_mut(side).insert(price);
        order.parent_limit = Some(limit_id);

        let (tree, index) = self.tree_and_index_mut(side);
        tree.get_mut(limit_id).enqueue(index, order);

        self.update_extremum_on_insert(side, limit_id);
    }

    /// Fully removes a resting order: FIFO unlink, Limit aggregate update,
    /// possible Limit removal from the tree, extremum maintenance. Used by
    /// both `cancel` and the matching engine's full-fill cleanup.
    pub(crate) fn remove_resting(&mut self, side: Side, order_id: OrderId) -> Order {
        let limit_id = self.order_index[&order_id]
            .parent_limit
            .expect("resting order always has a parent limit");

        let removed = {
            let (tree, index) = self.tree_and_index_mut(side);
            tree.get_mut(limit_id).remove(index, order_id)
        };

        if self.tree(side).get(limit_id).is_empty() {
            self.tree_mut(side).remove(limit_id);
            self.update_extremum_on_remove(side, limit_id);
        }

        removed
    }

    fn update_extremum_on_insert(&mut self, side: Side, limit_id: LimitId) {
        let price = self.tree(side).get(limit_id).limit_price;
        let better = match self.extremum(side) {
            None => true,
            Some(cur_id) => {
                let cur_price = self.tree(side).get(cur_id).limit_price;
                match side {
                    Side::Buy => price > cur_price,
                    Side::Sell => price < cur_price,
                }
            }
        };
        if better {
            self.set_extremum(side, Some(limit_id));
        }
    }

    fn update_extremum_on_remove(&mut self, side: Side, removed: LimitId) {
        if self.extremum(side) == Some(removed) {
            let recomputed = match side {
                Side::Buy => self.tree(side).rightmost(),
                Side::Sell => self.tree(side).leftmost(),
            };
            self.set_extremum(side, recomputed);
        }
    }
}
