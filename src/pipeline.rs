use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::Config;
use crate::exif::registry::{self, TagInfo};
use crate::exif::{DataType, ExifData, ExifReader, ExifTag, IfdKind, Rational, write_exif};
use crate::{ExifError, Result as ExifResult};

/// Extensions of the files the codec can rewrite.
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "jpe", "jfif"];

/// Metadata changes applied to every processed image.
///
/// Tags are addressed by registry name (`Artist`, `DateTimeOriginal`, ...) or
/// by a hexadecimal id (`0x013b`). Values are parsed with
/// [`parse_tag_value`].
///
/// # Example
///
/// ```rust
/// use exif_codec::pipeline::Edits;
///
/// let edits = Edits {
///     gps: Some((37.4219, -122.0840)),
///     set_tags: vec![("Artist".into(), "Jane Doe".into())],
///     remove_tags: vec!["MakerNote".into()],
///     ..Edits::default()
/// };
/// assert!(!edits.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Edits {
    /// Decimal latitude and longitude.
    pub gps: Option<(f64, f64)>,
    /// Drop IFD1 together with the thumbnail image.
    pub strip_thumbnail: bool,
    /// `(tag, value)` pairs.
    pub set_tags: Vec<(String, String)>,
    pub remove_tags: Vec<String>,
}

impl Edits {
    pub fn is_empty(&self) -> bool {
        self.gps.is_none()
            && !self.strip_thumbnail
            && self.set_tags.is_empty()
            && self.remove_tags.is_empty()
    }
}

/// One decoded tag, flattened for display and JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagEntry {
    pub ifd: IfdKind,
    pub id: u16,
    pub name: Option<&'static str>,
    pub data_type: DataType,
    pub component_count: u32,
    pub value: String,
}

impl From<&ExifTag> for TagEntry {
    fn from(tag: &ExifTag) -> Self {
        Self {
            ifd: tag.ifd(),
            id: tag.tag_id(),
            name: tag.name(),
            data_type: tag.data_type(),
            component_count: tag.component_count(),
            value: tag.value_to_string(),
        }
    }
}

/// The result of processing a single image.
///
/// # Example
///
/// ```rust,no_run
/// use exif_codec::config::Config;
/// use exif_codec::pipeline::{process_image, Edits};
///
/// let edits = Edits { strip_thumbnail: true, ..Edits::default() };
/// let result = process_image("photo.jpg".as_ref(), &edits, &Config::default());
///
/// if result.error.is_none() {
///     println!("Thumbnail removed: {}", result.thumbnail_removed);
///     println!("Bytes written: {:?}", result.bytes_written);
/// }
/// ```
#[derive(Debug)]
pub struct ProcessResult {
    pub path: PathBuf,
    /// Whether the file carried EXIF data before processing.
    pub had_exif: bool,
    /// Metadata after the edits were applied.
    pub exif: Option<ExifData>,
    pub tags_set: Vec<String>,
    pub tags_removed: Vec<String>,
    pub gps_written: bool,
    pub thumbnail_removed: bool,
    /// Size of the rewritten file, `None` if nothing was encoded.
    pub bytes_written: Option<usize>,
    pub backup_path: Option<PathBuf>,
    pub error: Option<String>,
}

impl ProcessResult {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            had_exif: false,
            exif: None,
            tags_set: Vec::new(),
            tags_removed: Vec::new(),
            gps_written: false,
            thumbnail_removed: false,
            bytes_written: None,
            backup_path: None,
            error: None,
        }
    }
}

/// Collect JPEG files from the given paths.
///
/// Accepts a mix of file paths and directory paths. Directories are walked
/// recursively (following symlinks).
///
/// # Example
///
/// ```rust,no_run
/// use exif_codec::pipeline::collect_images;
/// use std::path::PathBuf;
///
/// let images = collect_images(&[
///     PathBuf::from("photo.jpg"),       // single file
///     PathBuf::from("./photos/"),        // entire directory
/// ]);
/// println!("Found {} images", images.len());
/// ```
pub fn collect_images(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut images = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported_image(path) {
                images.push(path.clone());
            } else {
                log::warn!("Skipping unsupported file: {}", path.display());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let p = entry.path();
                if p.is_file() && is_supported_image(p) {
                    images.push(p.to_path_buf());
                }
            }
        } else {
            log::warn!("Path does not exist: {}", path.display());
        }
    }

    images
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Create a backup of the original file.
fn backup_file(path: &Path) -> Result<PathBuf> {
    let backup_path = path.with_extension(format!(
        "{}.bak",
        path.extension().unwrap_or_default().to_string_lossy()
    ));

    if !backup_path.exists() {
        std::fs::copy(path, &backup_path).context("Failed to create backup")?;
        log::debug!("Backup created: {}", backup_path.display());
    }

    Ok(backup_path)
}

/// Decode the directories selected in `config.decode`.
pub fn read_image(path: &Path, config: &Config) -> Result<Option<ExifData>> {
    let bytes = std::fs::read(path).context("Failed to read image file")?;
    ExifReader::new(config.parse_options())
        .read(Cursor::new(bytes))
        .with_context(|| format!("Failed to parse EXIF data in {}", path.display()))
}

/// Every tag of the model in directory order.
pub fn list_tags(exif: &ExifData) -> Vec<TagEntry> {
    exif.ifds()
        .flat_map(|ifd| ifd.tags())
        .map(TagEntry::from)
        .collect()
}

/// Resolve a tag by registry name or `0x`-prefixed hexadecimal id.
pub fn resolve_tag(name: &str) -> Option<&'static TagInfo> {
    if let Some(hex) = name
        .strip_prefix("0x")
        .or_else(|| name.strip_prefix("0X"))
    {
        let id = u16::from_str_radix(hex, 16).ok()?;
        return registry::lookup(id).or_else(|| registry::lookup_interoperability(id));
    }
    registry::lookup_by_name(name)
}

/// Parse `text` into the tag's value according to its data type.
///
/// - ASCII: the text itself
/// - BYTE / UNDEFINED: whitespace-separated hexadecimal bytes (`"02 20 00"`)
/// - SHORT / LONG / SLONG: whitespace-separated integers
/// - RATIONAL / SRATIONAL: whitespace-separated `n/d` fractions or integers
///
/// This is the inverse of [`ExifTag::value_to_string`].
///
/// ```rust
/// use exif_codec::exif::{registry, ExifTag};
/// use exif_codec::pipeline::parse_tag_value;
///
/// let mut tag = ExifTag::build(registry::EXPOSURE_TIME).unwrap();
/// parse_tag_value(&mut tag, "1/125").unwrap();
/// assert_eq!(tag.value_to_string(), "1/125");
/// ```
pub fn parse_tag_value(tag: &mut ExifTag, text: &str) -> ExifResult<()> {
    let (tag_id, data_type) = (tag.tag_id(), tag.data_type());
    let invalid = |token: &str| {
        ExifError::InvalidFormat(format!(
            "Invalid {data_type} value '{token}' for tag 0x{tag_id:04x}"
        ))
    };

    match data_type {
        DataType::Ascii => tag.set_string(text),
        DataType::UnsignedByte | DataType::Undefined => {
            let bytes = text
                .split_whitespace()
                .map(|t| u8::from_str_radix(t, 16).map_err(|_| invalid(t)))
                .collect::<ExifResult<Vec<_>>>()?;
            tag.set_bytes(&bytes)
        }
        DataType::UnsignedShort | DataType::UnsignedLong | DataType::Long => {
            let values = text
                .split_whitespace()
                .map(|t| t.parse::<i64>().map_err(|_| invalid(t)))
                .collect::<ExifResult<Vec<_>>>()?;
            tag.set_integers(&values)
        }
        DataType::UnsignedRational | DataType::Rational => {
            let values = text
                .split_whitespace()
                .map(|t| parse_rational(t).ok_or_else(|| invalid(t)))
                .collect::<ExifResult<Vec<_>>>()?;
            let negative = values
                .iter()
                .find(|r| r.numerator() < 0 || r.denominator() < 0);
            match negative {
                Some(bad) if data_type == DataType::UnsignedRational => {
                    Err(ExifError::ValueOverflow {
                        tag: tag_id,
                        value: bad.to_string(),
                        data_type,
                    })
                }
                _ => tag.set_rationals(&values),
            }
        }
    }
}

fn parse_rational(token: &str) -> Option<Rational> {
    match token.split_once('/') {
        Some((n, d)) => Some(Rational::new(n.parse().ok()?, d.parse().ok()?)),
        None => Some(Rational::new(token.parse().ok()?, 1)),
    }
}

/// Apply `edits` to `exif`, recording what changed in `result`.
/// Thumbnail size tags, rewritten by the encoder from the image data.
fn is_image_size_tag(tag_id: u16) -> bool {
    matches!(
        tag_id,
        registry::JPEG_INTERCHANGE_FORMAT_LENGTH | registry::STRIP_BYTE_COUNTS
    )
}

fn apply_edits(exif: &mut ExifData, edits: &Edits, result: &mut ProcessResult) -> Result<()> {
    for name in &edits.remove_tags {
        let Some(info) = resolve_tag(name) else {
            bail!("Unknown tag: {name}");
        };
        let removed = exif
            .ifd_mut(info.ifd)
            .and_then(|ifd| ifd.remove_tag(info.id))
            .is_some();
        if removed {
            result.tags_removed.push(info.name.to_string());
        } else {
            log::debug!("  {} not present, nothing to remove", info.name);
        }
    }

    for (name, value) in &edits.set_tags {
        let Some(info) = resolve_tag(name) else {
            bail!("Unknown tag: {name}");
        };
        if registry::is_offset_tag(info.id) || is_image_size_tag(info.id) {
            bail!("{} is computed by the encoder and cannot be set", info.name);
        }
        let tag = if info.ifd == IfdKind::Interoperability {
            exif.add_interoperability_tag(info.id)?
        } else {
            exif.add_tag(info.id)?
        };
        parse_tag_value(tag, value)
            .with_context(|| format!("Failed to set {} to '{value}'", info.name))?;
        result.tags_set.push(info.name.to_string());
    }

    if let Some((latitude, longitude)) = edits.gps {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            bail!("GPS coordinates out of range: {latitude}, {longitude}");
        }
        exif.add_gps_tags(latitude, longitude)?;
        result.gps_written = true;
    }

    if edits.strip_thumbnail {
        result.thumbnail_removed = exif.ifd(IfdKind::Ifd1).is_some()
            || exif.has_compressed_thumbnail()
            || exif.has_uncompressed_strip();
        exif.remove_thumbnail_data();
    }

    Ok(())
}

/// Process a single image: read its metadata, apply `edits` and write the
/// file back with a re-encoded EXIF segment.
///
/// 1. **Read**: decodes every directory of the file (a file without EXIF
///    starts from an empty model in `config.output.byte_order`)
/// 2. **Edit**: removes tags, sets tags, writes GPS, strips the thumbnail
/// 3. **Write**: encodes the new APP1 segment; unless `dry_run` is set the
///    original is backed up (if configured) and replaced
///
/// An empty [`Edits`] only reads.
pub fn process_image(path: &Path, edits: &Edits, config: &Config) -> ProcessResult {
    let mut result = ProcessResult::new(path);

    let jpeg = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            result.error = Some(format!("Failed to read file: {e}"));
            return result;
        }
    };

    let mut exif = match ExifReader::default().read(Cursor::new(jpeg.as_slice())) {
        Ok(Some(data)) => {
            result.had_exif = true;
            data
        }
        Ok(None) => {
            log::debug!("No EXIF data in {}", path.display());
            ExifData::new(config.output.byte_order)
        }
        Err(e) => {
            result.error = Some(format!("Failed to parse EXIF data: {e}"));
            return result;
        }
    };

    if edits.is_empty() {
        result.exif = result.had_exif.then_some(exif);
        return result;
    }

    if let Err(e) = apply_edits(&mut exif, edits, &mut result) {
        result.error = Some(format!("{e:#}"));
        return result;
    }

    let output = match write_exif(&jpeg, exif.clone()) {
        Ok(bytes) => bytes,
        Err(e) => {
            result.error = Some(format!("Failed to encode metadata: {e}"));
            return result;
        }
    };
    result.bytes_written = Some(output.len());
    result.exif = Some(exif);

    if config.output.dry_run {
        log::info!(
            "  [dry run] would write {} bytes to {}",
            output.len(),
            path.display()
        );
        return result;
    }

    if config.output.backup_originals {
        match backup_file(path) {
            Ok(backup) => result.backup_path = Some(backup),
            Err(e) => {
                result.error = Some(format!("Failed to backup original: {e:#}"));
                return result;
            }
        }
    }

    if let Err(e) = std::fs::write(path, &output) {
        result.error = Some(format!("Failed to write file: {e}"));
    }

    result
}
