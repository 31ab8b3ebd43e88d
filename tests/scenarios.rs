//! End-to-end scenarios run through the textual driver, mirroring how a
//! real script file would exercise the book.

use order_book_engine::driver;
use order_book_engine::Book;

fn drive(script: &str) -> String {
    let mut book = Book::new();
    let mut out = Vec::new();
    driver::run(&mut book, script.as_bytes(), &mut out).expect("script should parse and apply cleanly");
    String::from_utf8(out).unwrap()
}

#[test]
fn resting_only() {
    let out = drive("A 1 10 100 B\nA 2 5 99 B\nA 3 8 101 S\nA 4 4 102 S\nP\n");
    assert!(!out.contains("TRADE"));
    assert!(out.contains("best_bid=100 best_ask=101 spread=1"));
    assert!(out.contains("99 5(1)"));
    assert!(out.contains("100 10(1)"));
    assert!(out.contains("101 8(1)"));
    assert!(out.contains("102 4(1)"));
}

#[test]
fn exact_cross_empties_book() {
    let out = drive("A 1 10 100 B\nA 2 10 100 S\nP\n");
    assert_eq!(out.lines().next().unwrap(), "TRADE buy=1 sell=2 price=100 qty=10");
    assert!(out.contains("best_bid=- best_ask=- spread=-"));
}

#[test]
fn partial_fill_remainder_rests() {
    let out = drive("A 1 5 100 B\nA 2 8 100 S\nP\n");
    assert!(out.contains("TRADE buy=1 sell=2 price=100 qty=5"));
    assert!(out.contains("100 3(1)"));
}

#[test]
fn price_time_priority() {
    let out = drive("A 1 5 100 S\nA 2 5 100 S\nA 3 7 101 B\n");
    let trades: Vec<&str> = out.lines().collect();
    assert_eq!(trades, vec!["TRADE buy=3 sell=1 price=100 qty=5", "TRADE buy=3 sell=2 price=100 qty=2"]);
}

#[test]
fn multi_level_sweep() {
    let out = drive("A 1 3 100 S\nA 2 4 101 S\nA 3 2 102 S\nA 4 10 102 B\n");
    let trades: Vec<&str> = out.lines().collect();
    assert_eq!(
        trades,
        vec![
            "TRADE buy=4 sell=1 price=100 qty=3",
            "TRADE buy=4 sell=2 price=101 qty=4",
            "TRADE buy=4 sell=3 price=102 qty=2",
        ]
    );
}

#[test]
fn cancel_then_modify() {
    let out = drive("A 1 10 100 B\nA 2 5 99 B\nR 1\nM 2 3 99\nP\n");
    assert!(!out.contains("TRADE"));
    assert!(out.contains("99 3(1)"));
}

#[test]
fn comments_and_blank_lines_are_ignored() {
    let out = drive("# seed the book\nA 1 10 100 B\n\n   \n#cancel it\nR 1\nP\n");
    assert!(out.contains("best_bid=- best_ask=- spread=-"));
}

#[test]
fn duplicate_add_fails_the_script() {
    let mut book = Book::new();
    let mut out = Vec::new();
    let result = driver::run(&mut book, "A 1 10 100 B\nA 1 1 100 B\n".as_bytes(), &mut out);
    assert!(result.is_err());
}

#[test]
fn cancelling_unknown_id_does_not_fail_the_script() {
    let out = drive("R 999\nP\n");
    assert!(out.contains("best_bid=- best_ask=- spread=-"));
}

#[test]
fn script_file_on_disk_drives_the_book_the_same_way() {
    use std::fs::File;
    use std::io::{BufReader, Write};

    let mut file = tempfile::NamedTempFile::new().expect("creating temp script file");
    writeln!(file, "A 1 10 100 B").unwrap();
    writeln!(file, "A 2 10 100 S").unwrap();
    file.flush().unwrap();

    let mut book = Book::new();
    let mut out = Vec::new();
    let reopened = File::open(file.path()).expect("reopening temp script file");
    driver::run(&mut book, BufReader::new(reopened), &mut out).expect("script should parse and apply cleanly");

    let rendered = String::from_utf8(out).unwrap();
    assert_eq!(rendered.trim(), "TRADE buy=1 sell=2 price=100 qty=10");
    assert!(book.is_empty());
}
