//! Score a product record from a JSON file or stdin and print the result
//! Usage: cargo run --bin score_product -- [product.json]

use std::io::Read;

use shelfscore::models::ProductRecord;
use shelfscore::scoring::ScoreAggregator;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    let raw = match args.get(1).map(|s| s.as_str()) {
        Some("-") | None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
        Some(path) => std::fs::read_to_string(path)?,
    };

    let product: ProductRecord = serde_json::from_str(&raw)?;
    let result = ScoreAggregator::default().analyze(&product);

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
