//! The price-level aggregate record and its order FIFO.

use std::collections::HashMap;

use crate::ids::OrderId;
use crate::order::Order;

/// One price bucket on one side of the book.
///
/// `head_order`/`tail_order` are the FIFO endpoints; the orders themselves
/// live in `Book::order_index`, so these are non-owning links.
#[derive(Debug, Clone)]
pub struct Limit {
    pub limit_price: u64,
    pub size: u64,
    pub total_volume: u64,
    pub(crate) head_order: Option<OrderId>,
    pub(crate) tail_order: Option<OrderId>,
}

impl Limit {
    pub(crate) fn new(limit_price: u64) -> Self {
        Limit {
            limit_price,
            size: 0,
            total_volume: 0,
            head_order: None,
            tail_order: None,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// O(1): the oldest resting order, i.e. the one matching consumes next.
    pub(crate) fn head(&self) -> Option<OrderId> {
        self.head_order
    }

    /// Appends `order` to the tail of the FIFO (arrival order = priority
    /// order). `order` must not already be linked anywhere.
    pub(crate) fn enqueue(&mut self, order_index: &mut HashMap<OrderId, Order>, mut order: Order) {
        order.prev = self.tail_order;
        order.next = None;
        let id = order.id;

        match self.tail_order {
            Some(tail_id) => {
                order_index.get_mut(&tail_id).expect("tail order present").next = Some(id);
            }
            None => {
                self.head_order = Some(id);
            }
        }
        self.tail_order = Some(id);

        self.size += 1;
        self.total_volume += order.shares;
        order_index.insert(id, order);
    }

    /// Splices `order_id` out of the FIFO and removes it from
    /// `order_index`, returning the removed order. Handles all four
    /// positions: only node, head, tail, middle.
    pub(crate) fn remove(
        &mut self,
        order_index: &mut HashMap<OrderId, Order>,
        order_id: OrderId,
    ) -> Order {
        let order = order_index
            .remove(&order_id)
            .expect("order_id must belong to this limit's FIFO");

        match order.prev {
            Some(prev_id) => {
                order_index.get_mut(&prev_id).expect("prev order present").next = order.next;
            }
            None => {
                self.head_order = order.next;
            }
        }
        match order.next {
            Some(next_id) => {
                order_index.get_mut(&next_id).expect("next order present").prev = order.prev;
            }
            None => {
                self.tail_order = order.prev;
            }
        }

        self.size -= 1;
        self.total_volume -= order.shares;
        order
    }
}
