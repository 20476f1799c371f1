//! Example: stat a path, or list a directory, in a real S3 bucket.
//!
//! Credentials come from the usual AWS environment (profile, env vars or
//! instance metadata).
//!
//! Usage:
//!   cargo run --features s3 --example s3_stat -- --bucket BUCKET [--region REGION]
//!       [--endpoint URL] [--path-style] [--list] PATH

mod cli;

use std::process;
use std::sync::Arc;
use std::time::UNIX_EPOCH;

use bucketfs::{Fs, S3Config, S3Store};
use cli::{format_size, init_tracing, usage_and_exit, ArgParser};

const USAGE: &str = "Usage: cargo run --features s3 --example s3_stat -- --bucket BUCKET [--region REGION] [--endpoint URL] [--path-style] [--list] PATH";

#[tokio::main]
async fn main() {
    init_tracing();

    let mut parser = ArgParser::new(USAGE);
    let bucket = parser
        .take_value(&["--bucket", "-b"])
        .unwrap_or_else(|| usage_and_exit(USAGE));
    let config = S3Config {
        region: parser.take_value(&["--region"]),
        endpoint: parser.take_value(&["--endpoint"]),
        force_path_style: parser.take_flag(&["--path-style"]),
    };
    let list = parser.take_flag(&["--list", "-l"]);
    let path = parser
        .remaining()
        .first()
        .cloned()
        .unwrap_or_else(|| usage_and_exit(USAGE));

    let store = S3Store::from_config(&config).await;
    let fs = Fs::new(bucket, Arc::new(store));

    let info = match fs.stat(&path).await {
        Ok(info) => info,
        Err(e) => {
            eprintln!("❌ {e}");
            process::exit(1);
        }
    };

    let modified = info
        .modified()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    println!("\n🔍 {}", path);
    println!("  Name:      {}", info.name());
    println!("  Type:      {}", if info.is_dir() { "directory" } else { "file" });
    println!("  Mode:      {:o}", info.mode());
    println!("  Size:      {}", format_size(info.size()));
    println!("  Modified:  {}", modified);

    if list && info.is_dir() {
        let mut dir = match fs.open(&path).await {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("❌ {e}");
                process::exit(1);
            }
        };
        loop {
            match dir.readdir(100).await {
                Ok(page) if page.is_empty() => break,
                Ok(page) => {
                    for entry in page {
                        let suffix = if entry.is_dir() { "/" } else { "" };
                        println!("  {}{} ({})", entry.name(), suffix, format_size(entry.size()));
                    }
                }
                Err(e) => {
                    eprintln!("❌ {e}");
                    process::exit(1);
                }
            }
        }
    }
}
