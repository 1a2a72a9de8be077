use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

use exif_codec::exif::{ExifData, IfdKind};
use exif_codec::{config, pipeline};

#[derive(Parser, Debug)]
#[command(
    name = "exif-codec",
    version,
    about = "Read and rewrite the EXIF metadata of JPEG files"
)]
struct Cli {
    /// Image files or directories to process
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Preview changes without writing to files
    #[arg(long)]
    dry_run: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Display all EXIF metadata and exit
    #[arg(long = "show-exif")]
    show_exif: bool,

    /// Write GPS coordinates in decimal degrees
    #[arg(long, value_name = "LAT,LON", value_parser = parse_gps, allow_hyphen_values = true)]
    gps: Option<(f64, f64)>,

    /// Remove the thumbnail directory and image
    #[arg(long = "strip-thumbnail")]
    strip_thumbnail: bool,

    /// Set a tag by name or hex id (repeatable)
    #[arg(long = "set", value_name = "TAG=VALUE", value_parser = parse_assignment)]
    set_tags: Vec<(String, String)>,

    /// Remove a tag by name or hex id (repeatable)
    #[arg(long = "remove", value_name = "TAG")]
    remove_tags: Vec<String>,
}

fn parse_gps(s: &str) -> std::result::Result<(f64, f64), String> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LAT,LON but got '{s}'"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude '{lat}': {e}"))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude '{lon}': {e}"))?;
    Ok((lat, lon))
}

fn parse_assignment(s: &str) -> std::result::Result<(String, String), String> {
    let (tag, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected TAG=VALUE but got '{s}'"))?;
    if tag.trim().is_empty() {
        return Err(format!("missing tag name in '{s}'"));
    }
    Ok((tag.trim().to_string(), value.to_string()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    if cli.paths.is_empty() {
        anyhow::bail!("No input files or directories specified. Use --help for usage.");
    }

    // Load config
    let mut config = config::Config::load(cli.config.as_deref())?;

    // Override dry_run from CLI flag
    if cli.dry_run {
        config.output.dry_run = true;
    }

    // Collect images
    let images = pipeline::collect_images(&cli.paths);
    if images.is_empty() {
        anyhow::bail!("No supported image files found in the specified paths.");
    }

    // Handle --show-exif
    if cli.show_exif {
        if cli.json {
            let mut listing = Vec::new();
            for image_path in &images {
                let exif = pipeline::read_image(image_path, &config)?;
                listing.push(serde_json::json!({
                    "path": image_path.display().to_string(),
                    "byte_order": exif.as_ref().map(|e| e.byte_order()),
                    "thumbnail_size": exif.as_ref().and_then(|e| e.compressed_thumbnail()).map(<[u8]>::len),
                    "tags": exif.as_ref().map(pipeline::list_tags).unwrap_or_default(),
                }));
            }
            println!("{}", serde_json::to_string_pretty(&listing)?);
        } else {
            for image_path in &images {
                let exif = pipeline::read_image(image_path, &config)?;
                print_full_exif(image_path, exif.as_ref());
            }
        }
        return Ok(());
    }

    let edits = pipeline::Edits {
        gps: cli.gps,
        strip_thumbnail: cli.strip_thumbnail,
        set_tags: cli.set_tags.clone(),
        remove_tags: cli.remove_tags.clone(),
    };
    if edits.is_empty() {
        anyhow::bail!(
            "Nothing to do. Use --show-exif to display metadata, or --gps / --set / --remove / --strip-thumbnail to edit it."
        );
    }

    log::info!("Found {} image(s) to process", images.len());
    if config.output.dry_run {
        log::info!("DRY RUN: no files will be modified");
    }

    // Process each image
    let mut results = Vec::new();
    let total = images.len();

    for (i, image_path) in images.iter().enumerate() {
        log::info!(
            "[{}/{}] Processing: {}",
            i + 1,
            total,
            image_path.display()
        );

        let result = pipeline::process_image(image_path, &edits, &config);

        if let Some(ref err) = result.error {
            log::error!("  Error: {err}");
        } else {
            let mut written = Vec::new();
            if !result.tags_set.is_empty() {
                written.push(format!("set {}", result.tags_set.join(", ")));
            }
            if !result.tags_removed.is_empty() {
                written.push(format!("removed {}", result.tags_removed.join(", ")));
            }
            if result.gps_written {
                written.push("gps".to_string());
            }
            if result.thumbnail_removed {
                written.push("thumbnail stripped".to_string());
            }
            if !written.is_empty() {
                log::info!("  Changes: {}", written.join("; "));
            }
            if let Some(size) = result.bytes_written {
                log::info!("  Encoded size: {size} bytes");
            }
            if let Some(ref backup) = result.backup_path {
                log::info!("  Backup: {}", backup.display());
            }
        }

        results.push(result);
    }

    // JSON output
    if cli.json {
        let json_results: Vec<serde_json::Value> = results
            .iter()
            .map(|r| {
                serde_json::json!({
                    "path": r.path.display().to_string(),
                    "had_exif": r.had_exif,
                    "tags_set": r.tags_set,
                    "tags_removed": r.tags_removed,
                    "gps_written": r.gps_written,
                    "thumbnail_removed": r.thumbnail_removed,
                    "bytes_written": r.bytes_written,
                    "backup_path": r.backup_path.as_ref().map(|p| p.display().to_string()),
                    "error": r.error,
                })
            })
            .collect();

        println!("{}", serde_json::to_string_pretty(&json_results)?);
    }

    // Summary
    let success = results.iter().filter(|r| r.error.is_none()).count();
    let failed = results.len() - success;
    log::info!("Done: {success} succeeded, {failed} failed out of {total} images");

    Ok(())
}

// ANSI color codes
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Max width for the value column before wrapping.
const VAL_WIDTH: usize = 46;
/// Indent for continuation lines (tag column width + " : " = 25 chars + 2 leading spaces).
const INDENT: &str = "                           ";

/// Print full EXIF metadata for a file, one section per directory.
fn print_full_exif(path: &Path, exif: Option<&ExifData>) {
    println!();
    println!("{BOLD}File:{RESET} {}", path.display());
    println!("{DIM}{}{RESET}", "═".repeat(72));

    let Some(exif) = exif else {
        println!("  {DIM}(no EXIF metadata found){RESET}");
        println!();
        return;
    };

    println!("  Byte order: {}", exif.byte_order());
    println!();

    for kind in IfdKind::ALL {
        let Some(ifd) = exif.ifd(kind) else {
            continue;
        };
        if ifd.is_empty() {
            continue;
        }
        println!("  {BOLD}{kind}{RESET}");
        println!("  {DIM}{}{RESET}", "─".repeat(70));
        for tag in ifd.tags() {
            let name = tag
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("0x{:04x}", tag.tag_id()));
            print_row(&name, &tag.value_to_string());
        }
        println!();
    }

    if let Some(thumbnail) = exif.compressed_thumbnail() {
        print_row("Thumbnail", &format!("JPEG, {} bytes", thumbnail.len()));
        println!();
    } else if exif.has_uncompressed_strip() {
        let total: usize = exif.strips().iter().map(Vec::len).sum();
        print_row(
            "Thumbnail",
            &format!("{} strip(s), {total} bytes", exif.strip_count()),
        );
        println!();
    }
}

/// Print a single row in the EXIF display table.
fn print_row(tag: &str, val: &str) {
    let tag_col = format!("{:<22}", tag);
    let lines = wrap_text(val, VAL_WIDTH);
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            println!("  {tag_col} : {line}");
        } else {
            println!("  {INDENT}{line}");
        }
    }
}

/// Wrap text at word boundaries to fit within max_width.
fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in s.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
        } else if current_line.len() + 1 + word.len() <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
        } else {
            lines.push(current_line);
            current_line = word.to_string();
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(s.to_string());
    }

    lines
}
