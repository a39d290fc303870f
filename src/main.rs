//! Main entry point for the rundeb CLI application.
//!
//! This binary provides a command-line interface for inspecting Debian
//! packages from both local filesystem and remote HTTP URLs.

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use clap::Parser;
use std::io::{BufReader, Read, Write};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Handle;

use rundeb::ar::{self, Header};
use rundeb::{BlockingReader, Cli, HttpRangeReader, LocalFileReader, Package, ReadAt};

/// Read-ahead for member headers, so each header costs one fetch
const HEADER_READ_AHEAD: usize = 4096;

/// Application entry point.
///
/// Opens the package as a local file or HTTP URL, then either walks the raw
/// archive members or assembles the full [`Package`].
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if cli.is_http_url() {
        let reader = Arc::new(HttpRangeReader::new(cli.file.clone()).await?);
        inspect(reader.clone(), &cli).await?;

        // Display network transfer statistics for HTTP sources
        if !cli.is_quiet() {
            eprintln!(
                "\nTotal bytes transferred: {} in {} requests",
                format_size(reader.transferred_bytes()),
                reader.request_count()
            );
        }
    } else {
        let reader = LocalFileReader::new(Path::new(&cli.file))?;
        inspect(Arc::new(reader), &cli).await?;
    }

    Ok(())
}

/// Run the mode selected on the command line against `source`.
///
/// Member modes stream the archive on a blocking thread and fetch only the
/// headers plus any member that gets printed. Package modes need the whole
/// file for the bundles and checksums.
async fn inspect(source: Arc<dyn ReadAt>, cli: &Cli) -> Result<()> {
    if cli.is_member_mode() {
        let reader = BlockingReader::new(source, Handle::current());
        let cli = cli.clone();
        tokio::task::spawn_blocking(move || process_members(reader, &cli)).await?
    } else {
        let data = source.read_all().await?;
        let package = Package::from_bytes(cli.file.clone(), &data)?;
        print_package(&package, cli)
    }
}

/// Walk the ar members of a package.
///
/// - List mode (`-l`): member names, one per line
/// - Verbose mode (`-v`): `ar tv` style table with a summary line
/// - Pipe mode (`-p`): raw content of one member to stdout
fn process_members(source: BlockingReader, cli: &Cli) -> Result<()> {
    let mut archive =
        ar::Reader::with_skip(BufReader::with_capacity(HEADER_READ_AHEAD, source));
    let mut total_size = 0u64;
    let mut member_count = 0usize;

    while let Some(header) = archive.next()? {
        if let Some(ref wanted) = cli.pipe {
            if header.name == *wanted {
                let mut content = vec![0u8; usize::try_from(header.size)?];
                archive.read_exact(&mut content)?;
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&content)?;
                stdout.flush()?;
                return Ok(());
            }
            continue;
        }

        if cli.verbose {
            println!("{}", format_member(&header));
        } else {
            println!("{}", header.name);
        }
        total_size += header.size;
        member_count += 1;
    }

    if let Some(ref wanted) = cli.pipe {
        bail!("member {} not found in {}", wanted, cli.file);
    }

    if cli.verbose {
        println!("{}", "-".repeat(60));
        println!("{:>10}  {} members", format_size(total_size), member_count);
    }

    Ok(())
}

/// Print the parts of a package selected on the command line.
///
/// Without any selection flag, the control fields (checksums included) are
/// printed in control file syntax.
fn print_package(package: &Package, cli: &Cli) -> Result<()> {
    let mut selected = false;

    if let Some(ref key) = cli.field {
        match package.field(key) {
            Some(value) => println!("{}", value),
            None => bail!("field {} not found in {}", key, package.name),
        }
        selected = true;
    }

    if cli.control {
        print!("{}", package.control);
        selected = true;
    }

    if cli.files {
        for file in &package.files {
            println!("{}", file);
        }
        selected = true;
    }

    if cli.scripts {
        for (name, text) in package.scripts() {
            if !cli.is_quiet() {
                println!("--- {} ---", name);
            }
            print!("{}", text);
        }
        selected = true;
    }

    if !selected {
        for (key, value) in &package.fields {
            println!("{}", format_field(key, value));
        }
    }

    Ok(())
}

/// Format a control field, indenting continuation lines by one space.
fn format_field(key: &str, value: &str) -> String {
    format!("{}: {}", key, value.replace('\n', "\n "))
}

/// Format a member header like `ar tv` does.
fn format_member(header: &Header) -> String {
    let date = match header.mtime {
        Some(mtime) => DateTime::<Utc>::from(mtime)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => format!("{:16}", ""),
    };

    format!(
        "{} {}/{} {:>10} {} {}",
        format_mode(header.permissions()),
        header.uid,
        header.gid,
        header.size,
        date,
        header.name
    )
}

/// Render permission bits as `rwxr-xr-x`.
fn format_mode(perm: u32) -> String {
    let mut out = String::with_capacity(9);
    for shift in [6, 3, 0] {
        let bits = (perm >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

/// Format a byte size into a human-readable string.
///
/// Automatically selects the appropriate unit (bytes, KB, MB, GB)
/// based on the size magnitude.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
