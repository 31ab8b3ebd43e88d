//! The matching engine: crosses an incoming order against the resting book.

use tracing::info;

use crate::book::Book;
use crate::order::Order;
use crate::trade::Trade;

/// Crosses `incoming` against the opposite side's best price(s) until either
/// `incoming` is exhausted or the book no longer crosses it. Mutates
/// `incoming.shares` down to whatever remains unfilled; the caller rests
/// that remainder.
pub(crate) fn match_incoming(book: &mut Book, incoming: &mut Order) -> Vec<Trade> {
    let mut trades = Vec::new();
    let opp_side = incoming.side.opposite();

    loop {
        if incoming.shares == 0 {
            break;
        }
        let Some(opp_limit_id) = book.extremum(opp_side) else {
            break;
        };
        let opp_price = book.tree(opp_side).get(opp_limit_id).limit_price;
        if !crosses(incoming, opp_price) {
            break;
        }
        let resting_id = book
            .tree(opp_side)
            .get(opp_limit_id)
            .head()
            .expect("a non-empty limit always has a head order");

        execute_trade(book, incoming, opp_limit_id, resting_id, &mut trades);
    }

    trades
}

fn crosses(incoming: &Order, opp_price: u64) -> bool {
    use crate::order::Side;
    match incoming.side {
        Side::Buy => incoming.price >= opp_price,
        Side::Sell => incoming.price <= opp_price,
    }
}

/// One fill between `incoming` and the resting order at the head of
/// `opp_limit_id`'s FIFO. Trade price is the resting order's limit price
/// (maker price improvement). Fully-drained resting orders are unlinked
/// and, if they emptied their limit, the limit is removed from its tree
/// and the cached extremum refreshed.
fn execute_trade(
    book: &mut Book,
    incoming: &mut Order,
    opp_limit_id: crate::ids::LimitId,
    resting_id: crate::ids::OrderId,
    trades: &mut Vec<Trade>,
) {
    let opp_side = incoming.side.opposite();
    let opp_price = book.tree(opp_side).get(opp_limit_id).limit_price;
    let resting_shares = book.order_index[&resting_id].shares;
    let quantity = incoming.shares.min(resting_shares);

    let (buy_id, sell_id) = match incoming.side {
        crate::order::Side::Buy => (incoming.id, resting_id),
        crate::order::Side::Sell => (resting_id, incoming.id),
    };
    let trade = Trade { buy_id, sell_id, price: opp_price, quantity };
    info!(buy_id, sell_id, price = opp_price, quantity, "trade executed");
    trades.push(trade);

    incoming.shares -= quantity;
    {
        let resting = book.order_index.get_mut(&resting_id).expect("resting order present");
        resting.shares -= quantity;
    }
    book.tree_mut(opp_side).get_mut(opp_limit_id).total_volume -= quantity;

    if book.order_index[&resting_id].shares == 0 {
        book.remove_resting(opp_side, resting_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::Side::{Buy, Sell};

    #[test]
    fn no_cross_leaves_incoming_untouched() {
        let mut book = Book::new();
        book.add(1, 5, 100, Sell).unwrap();
        let mut incoming = Order::new(2, 3, 99, Buy, 1);
        let trades = match_incoming(&mut book, &mut incoming);
        assert!(trades.is_empty());
        assert_eq!(incoming.shares, 3);
    }

    #[test]
    fn trade_price_is_the_resting_makers_price() {
        let mut book = Book::new();
        book.add(1, 5, 100, Sell).unwrap();
        let mut incoming = Order::new(2, 5, 110, Buy, 1);
        let trades = match_incoming(&mut book, &mut incoming);
        assert_eq!(trades, vec![Trade { buy_id: 2, sell_id: 1, price: 100, quantity: 5 }]);
    }
}
