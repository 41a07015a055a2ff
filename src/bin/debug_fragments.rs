use pdf_outline::{extract_fragments, group_by_style, rank_heading_styles, OutlineOptions};
use std::env;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: debug_fragments <pdf_path> [max_page | min-max]");
        std::process::exit(1);
    }

    // Page range is 1-based on the command line
    let range = args.get(2).map(|s| s.as_str()).unwrap_or("1-3");
    let (min_page, max_page): (u32, u32) = if let Some((a, b)) = range.split_once('-') {
        (a.parse().unwrap_or(1), b.parse().unwrap_or(3))
    } else {
        (1, range.parse().unwrap_or(3))
    };

    let fragments = match extract_fragments(&args[1]) {
        Ok(fragments) => fragments,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let levels = rank_heading_styles(
        &group_by_style(&fragments),
        OutlineOptions::default().max_levels,
    );
    println!("=== HEADING STYLES ===");
    for (key, level) in &levels {
        println!("  {} {}", level, key);
    }
    println!();

    for page in min_page.max(1) - 1..max_page {
        let page_fragments: Vec<_> = fragments.iter().filter(|f| f.page == page).collect();
        println!("=== PAGE {} ({} fragments) ===", page, page_fragments.len());
        for fragment in &page_fragments {
            println!(
                "  x={:>7} y={:>7} fs={:>5} font={} text={:?}",
                fragment.x, fragment.y, fragment.size, fragment.font, fragment.text
            );
        }
        println!();
    }
}
