//! Non-mutating book introspection for diagnostic dumps.

use serde::{Deserialize, Serialize};

use crate::book::Book;
use crate::order::Side;
use crate::price_tree::PriceTree;

/// One price level as seen from outside the book: no FIFO detail, just the
/// aggregate a dump or a UI would want.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelView {
    pub price: u64,
    pub total_volume: u64,
    pub size: u64,
}

/// A point-in-time snapshot of both sides of the book. `bids`/`asks` are
/// ascending by price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub bids: Vec<LevelView>,
    pub asks: Vec<LevelView>,
    pub best_bid: Option<u64>,
    pub best_ask: Option<u64>,
    /// `best_ask - best_bid`, present only when both sides are non-empty.
    pub spread: Option<u64>,
}

pub(crate) fn build(book: &Book) -> BookSnapshot {
    let bids = levels_ascending(&book.buy_tree);
    let asks = levels_ascending(&book.sell_tree);

    let best_bid = book.tree(Side::Buy).rightmost().map(|id| book.tree(Side::Buy).get(id).limit_price);
    let best_ask = book.tree(Side::Sell).leftmost().map(|id| book.tree(Side::Sell).get(id).limit_price);
    let spread = match (best_bid, best_ask) {
        (Some(b), Some(a)) => Some(a.saturating_sub(b)),
        _ => None,
    };

    BookSnapshot { bids, asks, best_bid, best_ask, spread }
}

fn levels_ascending(tree: &PriceTree) -> Vec<LevelView> {
    tree.ascending()
        .into_iter()
        .map(|id| {
            let limit = tree.get(id);
            LevelView {
                price: limit.limit_price,
                total_volume: limit.total_volume,
                size: limit.size,
            }
        })
        .collect()
}
