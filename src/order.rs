//! The passive order record.

use std::fmt;
use std::str::FromStr;

use crate::ids::{LimitId, OrderId};

/// Which book a working order rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side an incoming order crosses against: a buy crosses asks, a
    /// sell crosses bids.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Buy => "B",
            Side::Sell => "S",
        })
    }
}

/// Parses the driver's side token: `B`/`b` is BUY, anything else is SELL.
/// `FromStr` here never fails — the one-character token is validated by
/// the caller before this is reached.
impl FromStr for Side {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.chars().next() {
            Some('B') | Some('b') => Side::Buy,
            _ => Side::Sell,
        })
    }
}

/// A single working order, living in the doubly-linked FIFO of exactly one
/// [`crate::limit::Limit`].
///
/// `next`/`prev`/`parent_limit` are non-owning index links: the order's
/// sole owner is `Book::order_index`.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    /// Remaining (unfilled) quantity. Strictly positive while resting.
    pub shares: u64,
    pub price: u64,
    pub side: Side,
    /// Set once, when the order first rests.
    pub entry_time: u64,
    /// Updated on every mutation (rest, partial fill, shrink).
    pub event_time: u64,
    pub(crate) parent_limit: Option<LimitId>,
    pub(crate) next: Option<OrderId>,
    pub(crate) prev: Option<OrderId>,
}

impl Order {
    pub(crate) fn new(id: OrderId, shares: u64, price: u64, side: Side, now: u64) -> Self {
        Order {
            id,
            shares,
            price,
            side,
            entry_time: now,
            event_time: now,
            parent_limit: None,
            next: None,
            prev: None,
        }
    }
}
