//! In-process SFTP transfer example
//!
//! Runs an upload, listing and download against the in-memory transport with
//! would-block interleaving and partial writes switched on, so the retry loop
//! and the partial-write accounting are visible in the trace output.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=tether_sftp=trace cargo run --example memory_transfer -- [size]
//! ```

use std::env;
use std::sync::Arc;
use tether_sftp::memory::MemoryTransport;
use tether_sftp::{SftpConfig, SftpSession, HANDLE_BUFFER_SIZE};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let size: usize = match env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => HANDLE_BUFFER_SIZE * 2 + 1,
    };

    let transport = Arc::new(MemoryTransport::new());
    transport.interleave_would_block(true);
    transport.set_max_write(Some(HANDLE_BUFFER_SIZE / 3));

    let config = SftpConfig::builder().skip_dot_entries(true).build()?;
    let mut sftp = SftpSession::with_config(transport.clone(), config)?;

    println!("Uploading {} bytes...", size);
    let payload: Vec<u8> = (0..size).map(|i| (i % 256) as u8).collect();
    sftp.mkdir("/demo", None).await?;
    sftp.upload_bytes(&payload, "/demo/payload.bin", None).await?;
    sftp.upload_str("hello world", "/demo/hello.txt", Some(0o600)).await?;

    println!("\nListing /demo:");
    for (name, attrs) in sftp.ls("/demo").await? {
        let mode = attrs.mode().map(|m| m.permissions()).unwrap_or(0);
        println!("  {:<12} {:>8} bytes  {:o}", name, attrs.size().unwrap_or(0), mode);
    }

    let local = env::temp_dir().join("tether-memory-transfer.bin");
    let total = sftp.download("/demo/payload.bin", &local).await?;
    println!("\nDownloaded {} bytes to {}", total, local.display());
    if tokio::fs::read(&local).await? != payload {
        return Err("downloaded data does not match the upload".into());
    }
    tokio::fs::remove_file(&local).await?;

    sftp.shutdown().await?;

    let stats = transport.stats();
    println!("\nTransport calls:");
    println!("  writes:       {}", stats.writes);
    println!("  reads:        {}", stats.reads);
    println!("  would-blocks: {}", stats.would_blocks);
    println!("  waits:        {}", stats.waits);

    Ok(())
}
