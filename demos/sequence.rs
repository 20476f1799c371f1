//! Example: walk through every filesystem operation against the in-memory
//! store, with a visibility lag so freshly written objects take a few lookups
//! to show up.
//!
//! Usage:
//!   cargo run --example sequence -- [--lag PROBES] [DIR]

mod cli;

use std::io::SeekFrom;
use std::sync::Arc;
use std::time::Duration;

use bucketfs::{
    sanitize, Fs, FsError, MemoryStore, ObjectStore, OpenFlags, Result, UploadedFileProperties,
    WaitPolicy,
};
use cli::{format_size, init_tracing, usage_and_exit, ArgParser};

const USAGE: &str = "Usage: cargo run --example sequence -- [--lag PROBES] [DIR]

Defaults: PROBES=2 DIR=/demo";

/// Block until `path` answers point lookups.
async fn settle(fs: &Fs, path: &str) -> Result<()> {
    let key = sanitize(path);
    let key = key.trim_start_matches('/');
    fs.store()
        .wait_until_object_exists(fs.bucket(), key, fs.wait_policy())
        .await
        .map_err(|source| FsError::Path {
            op: "wait",
            path: path.to_string(),
            source,
        })
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let mut parser = ArgParser::new(USAGE);
    let lag = parser
        .take_value(&["--lag"])
        .map(|v| v.parse::<u32>().unwrap_or_else(|_| usage_and_exit(USAGE)))
        .unwrap_or(2);
    let dir = parser
        .remaining()
        .first()
        .cloned()
        .unwrap_or_else(|| "/demo".to_string());

    let store = Arc::new(MemoryStore::new().with_visibility_lag(lag));
    let fs = Fs::new("demo-bucket", store.clone())
        .with_file_props(UploadedFileProperties::default().with_cache_control("max-age=60"))
        .with_wait_policy(WaitPolicy::fixed(10, Duration::from_millis(50)));

    println!("Creating {dir}...");
    fs.mkdir(&dir, 0o755).await?;
    settle(&fs, &format!("{dir}/")).await?;

    let notes = format!("{dir}/notes.txt");
    println!("Creating {notes} (lag: {lag} probes)...");
    let mut file = fs.create(&notes).await?;
    file.write_str("first line\nsecond line\n")?;
    file.close().await?;
    settle(&fs, &notes).await?;

    let windows_style = format!(r"C:{}\nested\data.json", dir.replace('/', "\\"));
    println!("Writing {windows_style} as {}...", sanitize(&windows_style));
    let mut file = fs
        .open_file(&windows_style, OpenFlags::WRITE_ONLY | OpenFlags::CREATE, 0o644)
        .await?;
    file.write(br#"{"ok":true}"#)?;
    file.close().await?;
    settle(&fs, &windows_style).await?;

    println!("\nListing {dir}:");
    let mut handle = fs.open(&dir).await?;
    for entry in handle.readdir(0).await? {
        let kind = if entry.is_dir() { "dir " } else { "file" };
        println!("  {kind} {:<12} {:o} {}", entry.name(), entry.mode(), format_size(entry.size()));
    }
    handle.close().await?;

    println!("\nReading the second line of {notes}:");
    let mut file = fs.open(&notes).await?;
    file.seek(SeekFrom::Start(11)).await?;
    let body = file.read_to_end().await?;
    print!("  {}", String::from_utf8_lossy(&body));
    file.close().await?;

    let moved = format!("{dir}/archive.txt");
    println!("\nRenaming {notes} -> {moved}");
    fs.rename(&notes, &moved).await?;
    settle(&fs, &moved).await?;
    fs.chmod(&moved, 0o644).await?;

    for result in [
        fs.chown(&moved, 0, 0).await,
        fs.open_file(&moved, OpenFlags::READ_WRITE, 0o644).await.map(|_| ()),
    ] {
        if let Err(e) = result {
            println!("  expected failure: {e}");
        }
    }

    println!("\nRemoving {dir}...");
    fs.remove_all(&dir).await?;
    match fs.stat(&dir).await {
        Err(e) if e.is_not_found() => println!("{dir} is gone"),
        other => println!("unexpected: {other:?}"),
    }

    println!("\nStore round trips: {}", store.round_trips());
    Ok(())
}
