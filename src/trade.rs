//! The outbound fill record published for each match.

use serde::{Deserialize, Serialize};

use crate::ids::OrderId;

/// One match between an incoming order and a resting order.
///
/// The price is always the **resting** (maker) order's limit price — the
/// aggressor receives price improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub buy_id: OrderId,
    pub sell_id: OrderId,
    pub price: u64,
    pub quantity: u64,
}
