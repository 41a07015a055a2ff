//! CLI tool for inferring a PDF's title and heading outline

use log::info;
use pdf_outline::{extract_outline, save_json, write_json, RESULT_FILE};
use std::env;
use std::io;
use std::process;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: pdf-outline <pdf_file>");
        eprintln!();
        eprintln!("Infers the title and heading outline of a PDF from font sizes.");
        eprintln!("Writes {} to the current directory and prints it.", RESULT_FILE);
        process::exit(2);
    }

    let pdf_path = &args[1];
    info!("Parsing {}", pdf_path);

    let outline = match extract_outline(pdf_path) {
        Ok(outline) => outline,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let written = save_json(&outline, RESULT_FILE)
        .and_then(|_| write_json(&outline, io::stdout().lock()));
    if let Err(e) = written {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    info!("Extraction complete. Output saved to {}", RESULT_FILE);
}
