//! The textual front-end: parses the `A`/`R`/`M`/`P` line grammar and
//! applies it to a [`Book`], rendering trades and snapshots to a
//! caller-supplied sink.

use std::io::{BufRead, Write};

use anyhow::{bail, Context, Result};
use tracing::warn;

use crate::book::{Book, CancelOutcome, ModifyOutcome};
use crate::order::Side;

/// One parsed line of the textual grammar. Comments and blank lines never
/// reach this far — they're filtered out during parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { id: u64, shares: u64, price: u64, side: Side },
    Cancel { id: u64 },
    Modify { id: u64, new_shares: u64, new_price: u64 },
    Print,
}

/// Parses one line. Returns `Ok(None)` for a comment or blank line — both
/// are silently ignored.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = trimmed.split_whitespace();
    let head = tokens.next().expect("non-empty after trim");

    let command = match head {
        "A" => {
            let id = next_u64(&mut tokens, "id")?;
            let shares = next_u64(&mut tokens, "shares")?;
            let price = next_u64(&mut tokens, "price")?;
            let side_tok = tokens.next().context("A: missing side token")?;
            if shares == 0 {
                bail!("A: shares must be positive, got 0");
            }
            let side: Side = side_tok.parse().expect("Side::from_str is infallible");
            Command::Add { id, shares, price, side }
        }
        "R" => Command::Cancel { id: next_u64(&mut tokens, "id")? },
        "M" => {
            let id = next_u64(&mut tokens, "id")?;
            let new_shares = next_u64(&mut tokens, "new_shares")?;
            let new_price = next_u64(&mut tokens, "new_price")?;
            if new_shares == 0 {
                bail!("M: new_shares must be positive, got 0");
            }
            Command::Modify { id, new_shares, new_price }
        }
        "P" => Command::Print,
        other => bail!("unrecognized record type {other:?}"),
    };

    if let Some(extra) = tokens.next() {
        bail!("trailing token {extra:?} after a complete record");
    }

    Ok(Some(command))
}

fn next_u64<'a>(tokens: &mut impl Iterator<Item = &'a str>, field: &str) -> Result<u64> {
    let tok = tokens.next().with_context(|| format!("missing {field} field"))?;
    tok.parse::<u64>()
        .with_context(|| format!("{field} must be a non-negative integer, got {tok:?}"))
}

/// Applies `command` to `book`, writing trades and/or a print dump to `out`
/// as human-readable text.
pub fn apply(book: &mut Book, command: Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Add { id, shares, price, side } => {
            let trades = book.add(id, shares, price, side)?;
            for t in trades {
                writeln!(out, "TRADE buy={} sell={} price={} qty={}", t.buy_id, t.sell_id, t.price, t.quantity)?;
            }
        }
        Command::Cancel { id } => {
            if book.cancel(id) == CancelOutcome::NotFound {
                warn!(id, "cancel: no such order");
            }
        }
        Command::Modify { id, new_shares, new_price } => match book.modify(id, new_shares, new_price)? {
            ModifyOutcome::NotFound => warn!(id, "modify: no such order"),
            ModifyOutcome::NoOp | ModifyOutcome::Shrunk => {}
            ModifyOutcome::Replaced(trades) => {
                for t in trades {
                    writeln!(out, "TRADE buy={} sell={} price={} qty={}", t.buy_id, t.sell_id, t.price, t.quantity)?;
                }
            }
        },
        Command::Print => {
            let snap = book.snapshot();
            writeln!(out, "--- book ---")?;
            writeln!(out, "asks:")?;
            for level in &snap.asks {
                writeln!(out, "  {} {}({})", level.price, level.total_volume, level.size)?;
            }
            writeln!(out, "bids:")?;
            for level in snap.bids.iter().rev() {
                writeln!(out, "  {} {}({})", level.price, level.total_volume, level.size)?;
            }
            match (snap.best_bid, snap.best_ask, snap.spread) {
                (Some(b), Some(a), Some(s)) => writeln!(out, "best_bid={b} best_ask={a} spread={s}")?,
                _ => writeln!(out, "best_bid=- best_ask=- spread=-")?,
            }
        }
    }
    Ok(())
}

/// Reads `input` line by line, parsing and applying each record to `book`,
/// rendering to `out`. Returns on the first IO or parse error; the caller
/// maps the `Result` to a process exit code (non-zero on failure, 0 on
/// clean EOF).
pub fn run(book: &mut Book, input: impl BufRead, mut out: impl Write) -> Result<()> {
    for (lineno, line) in input.lines().enumerate() {
        let line = line.with_context(|| format!("reading line {}", lineno + 1))?;
        match parse_line(&line) {
            Ok(Some(command)) => apply(book, command, &mut out).with_context(|| format!("line {}: {line:?}", lineno + 1))?,
            Ok(None) => {}
            Err(e) => return Err(e.context(format!("line {}: {line:?}", lineno + 1))),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_add_cancel_modify_print() {
        assert_eq!(
            parse_line("A 1 10 100 B").unwrap(),
            Some(Command::Add { id: 1, shares: 10, price: 100, side: Side::Buy })
        );
        assert_eq!(
            parse_line("A 2 5 99 s").unwrap(),
            Some(Command::Add { id: 2, shares: 5, price: 99, side: Side::Sell })
        );
        assert_eq!(parse_line("R 1").unwrap(), Some(Command::Cancel { id: 1 }));
        assert_eq!(
            parse_line("M 2 3 99").unwrap(),
            Some(Command::Modify { id: 2, new_shares: 3, new_price: 99 })
        );
        assert_eq!(parse_line("P").unwrap(), Some(Command::Print));
    }

    #[test]
    fn ignores_comments_and_blank_lines() {
        assert_eq!(parse_line("# a comment").unwrap(), None);
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[test]
    fn rejects_malformed_records() {
        assert!(parse_line("A 1 10 100").is_err()); // missing side
        assert!(parse_line("A 1 0 100 B").is_err()); // zero shares
        assert!(parse_line("X 1").is_err()); // unknown record type
        assert!(parse_line("A 1 10 100 B extra").is_err()); // trailing token
    }

    #[test]
    fn end_to_end_script_matches_expected_trades_and_dump() {
        let script = "A 1 10 100 B\nA 2 5 99 B\nA 3 8 101 S\nA 4 4 102 S\nP\n";
        let mut book = Book::new();
        let mut out = Vec::new();
        run(&mut book, script.as_bytes(), &mut out).unwrap();
        let rendered = String::from_utf8(out).unwrap();
        assert!(rendered.contains("best_bid=100 best_ask=101 spread=1"));
        assert!(!rendered.contains("TRADE"));
    }

    #[test]
    fn exact_cross_prints_one_trade_line() {
        let script = "A 1 10 100 B\nA 2 10 100 S\n";
        let mut book = Book::new();
        let mut out = Vec::new();
        run(&mut book, script.as_bytes(), &mut out).unwrap();
        let rendered = String::from_utf8(out).unwrap();
        assert_eq!(rendered.trim(), "TRADE buy=1 sell=2 price=100 qty=10");
    }
}
