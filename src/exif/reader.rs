use anyhow::Context;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use super::data::ExifData;
use super::parser::{ExifParser, ParseOptions, ParserEvent};
use super::registry;
use super::tag::ExifTag;

/// Builds an [`ExifData`] from a JPEG stream by driving an [`ExifParser`].
///
/// Pointer tags (Exif/GPS/Interoperability IFD, thumbnail and strip offsets)
/// are left out of the model: they describe one particular layout and the
/// writer regenerates them.
#[derive(Debug, Clone, Copy)]
pub struct ExifReader {
    options: ParseOptions,
}

impl Default for ExifReader {
    fn default() -> Self {
        Self::new(ParseOptions::ALL)
    }
}

impl ExifReader {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Returns `Ok(None)` when the stream is a JPEG without EXIF data.
    pub fn read<R: Read>(&self, reader: R) -> crate::Result<Option<ExifData>> {
        let mut parser = ExifParser::parse(reader, self.options)?;
        if !parser.has_exif_data() {
            return Ok(None);
        }

        let mut data = ExifData::new(parser.byte_order());
        loop {
            match parser.next()? {
                ParserEvent::StartOfIfd(kind) => {
                    data.get_or_create_ifd(kind);
                }
                ParserEvent::NewTag => {
                    let Some(tag) = parser.tag().cloned() else {
                        continue;
                    };
                    if tag.has_value() {
                        store_tag(&mut data, tag);
                    } else {
                        parser.register_for_tag_value(&tag);
                    }
                }
                ParserEvent::ValueOfRegisteredTag => {
                    if let Some(tag) = parser.tag().cloned() {
                        store_tag(&mut data, tag);
                    }
                }
                ParserEvent::CompressedImage => {
                    let size = parser.compressed_image_size() as usize;
                    data.set_compressed_thumbnail(parser.read_bytes(size)?);
                }
                ParserEvent::UncompressedStrip(index) => {
                    let size = parser.strip_size() as usize;
                    data.set_strip(index, parser.read_bytes(size)?);
                }
                ParserEvent::End => break,
            }
        }
        Ok(Some(data))
    }
}

fn store_tag(data: &mut ExifData, tag: ExifTag) {
    if registry::is_offset_tag(tag.tag_id()) {
        return;
    }
    data.get_or_create_ifd(tag.ifd()).set_tag(tag);
}

/// Read the EXIF data of a JPEG file.
pub fn read_exif(path: &Path) -> anyhow::Result<Option<ExifData>> {
    let file = File::open(path).context("Failed to open image file")?;
    let exif = ExifReader::default()
        .read(BufReader::new(file))
        .with_context(|| format!("Failed to parse EXIF data in {}", path.display()))?;
    if exif.is_none() {
        log::debug!("No EXIF data found in {}", path.display());
    }
    Ok(exif)
}
