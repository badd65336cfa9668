use std::io::Read;

use clap::Parser;

use keyword_density::{analyze, KeywordInput};

#[derive(Parser)]
#[command(
    name = "keyword-density",
    about = "Check keyword density in rich-text content",
    version
)]
struct Cli {
    /// Comma-separated keywords to check
    #[arg(short, long)]
    keywords: String,

    /// File paths to analyze (reads stdin if none provided)
    files: Vec<String>,
}

fn main() {
    let cli = Cli::parse();
    let keywords = KeywordInput::Delimited(&cli.keywords);

    if cli.files.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .expect("Failed to read stdin");
        report(keywords, &input);
    } else {
        for path in &cli.files {
            let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading {path}: {e}");
                std::process::exit(1);
            });
            report(keywords, &text);
        }
    }
}

fn report(keywords: KeywordInput, text: &str) {
    match analyze(keywords, text) {
        Ok(results) => println!("{}", serde_json::to_string_pretty(&results).unwrap()),
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
