use std::time::Instant;

use avl_index::{AvlTreeMap, SearchIndex};
use log::info;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

const BULK_BOOKS: usize = 100_000;

fn lookup<I: SearchIndex<String, String>>(index: &I, title: &str) {
    match index.search(&title.to_string()) {
        Some(isbn) => println!("Book found: {title} -> ISBN: {isbn}"),
        None => println!("Book not found: {title}"),
    }
}

fn main() {
    let _ = TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );

    let mut catalog = AvlTreeMap::new();
    catalog.insert("Introduction to Algorithms".to_string(), "978-0262046305".to_string());
    catalog.insert("The C Programming Language".to_string(), "978-0131103627".to_string());
    catalog.insert("The Mythical Man-Month".to_string(), "978-0201616224".to_string());

    lookup(&catalog, "Introduction to Algorithms");
    lookup(&catalog, "Non-Existent Book");

    let start = Instant::now();
    for i in 0..BULK_BOOKS {
        catalog.insert(format!("Book {i}"), format!("ISBN-{i}"));
    }
    info!(
        "inserted {BULK_BOOKS} books in {:.2?}, {} entries, height {}",
        start.elapsed(),
        catalog.len(),
        catalog.height()
    );

    lookup(&catalog, "Book 4242");
}
