//! Example: Classify the cursor context at one or more offsets of a file.
//!
//! Run with: cargo run -p inputshift-context --example classify_file -- <path> <offset>...

use inputshift_context::classify;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("inputshift_context=debug")
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        eprintln!("usage: classify_file <path> <offset>...");
        std::process::exit(2);
    };

    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("failed to read {path}: {e}");
            std::process::exit(1);
        }
    };

    let offsets: Vec<usize> = args.filter_map(|a| a.parse().ok()).collect();
    let offsets = if offsets.is_empty() {
        vec![text.len()]
    } else {
        offsets
    };

    for offset in offsets {
        let classification = classify(&text, offset);
        println!("{offset:>8}  {classification}");
    }
}
