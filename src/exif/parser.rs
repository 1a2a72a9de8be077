//! Pull parser for the EXIF payload of a JPEG stream.
//!
//! [`ExifParser::next`] walks the directories selected by [`ParseOptions`] and
//! reports what it finds as [`ParserEvent`]s. Values stored outside a
//! directory's entry table are not read until the stream reaches them: a
//! caller interested in such a value calls
//! [`ExifParser::register_for_tag_value`] and later receives
//! [`ParserEvent::ValueOfRegisteredTag`].
//!
//! The underlying stream is never rewound. Directories, values and images
//! are visited in ascending offset order; anything whose offset the stream
//! has already passed is dropped.

use byteorder::{BigEndian, ReadBytesExt};
use std::collections::BTreeMap;
use std::io::{self, Read};
use std::ops::{BitOr, BitOrAssign};

use super::data::Endian;
use super::ifd::IfdKind;
use super::jpeg;
use super::rational::Rational;
use super::registry;
use super::stream::CountedReader;
use super::tag::{DataType, ExifTag, TagValue};
use crate::{ExifError, Result};

const TIFF_HEADER_TAIL: u16 = 0x002A;
const TAG_SIZE: u64 = 12;
const TAG_COUNT_SIZE: u64 = 2;

/// Bit set selecting which directories and images the parser reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParseOptions(u8);

impl ParseOptions {
    pub const IFD_0: Self = Self(1 << 0);
    pub const IFD_1: Self = Self(1 << 1);
    pub const EXIF: Self = Self(1 << 2);
    pub const GPS: Self = Self(1 << 3);
    pub const INTEROPERABILITY: Self = Self(1 << 4);
    pub const THUMBNAIL: Self = Self(1 << 5);
    pub const ALL: Self = Self(0b11_1111);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Option bit of a directory kind.
    pub fn for_ifd(kind: IfdKind) -> Self {
        match kind {
            IfdKind::Ifd0 => Self::IFD_0,
            IfdKind::Ifd1 => Self::IFD_1,
            IfdKind::Exif => Self::EXIF,
            IfdKind::Gps => Self::GPS,
            IfdKind::Interoperability => Self::INTEROPERABILITY,
        }
    }
}

impl BitOr for ParseOptions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ParseOptions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// What [`ExifParser::next`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserEvent {
    /// A requested directory starts. Following `NewTag` events belong to it.
    StartOfIfd(IfdKind),
    /// A directory entry was decoded; see [`ExifParser::tag`]. Its value is
    /// present unless it lives outside the entry table.
    NewTag,
    /// The value of a tag passed to [`ExifParser::register_for_tag_value`]
    /// has been read; see [`ExifParser::tag`].
    ValueOfRegisteredTag,
    /// The stream is at the compressed thumbnail, which is
    /// [`ExifParser::compressed_image_size`] bytes long.
    CompressedImage,
    /// The stream is at the given uncompressed thumbnail strip, which is
    /// [`ExifParser::strip_size`] bytes long.
    UncompressedStrip(usize),
    /// Nothing left to report.
    End,
}

/// Work queued at an absolute TIFF offset.
#[derive(Debug)]
enum PendingEvent {
    Ifd { kind: IfdKind, requested: bool },
    TagValue { tag: ExifTag, requested: bool },
    CompressedImage,
    UncompressedStrip(usize),
}

/// Event-driven EXIF decoder over a JPEG byte stream.
#[derive(Debug)]
pub struct ExifParser<R> {
    stream: CountedReader<R>,
    options: ParseOptions,
    contains_exif: bool,
    current_ifd: IfdKind,
    ifd_start: u64,
    tag_count: u16,
    parse_offsets_in_current_ifd: bool,
    tag: Option<ExifTag>,
    strip_index: usize,
    strip_count: usize,
    strip_size_tag: Option<ExifTag>,
    jpeg_size_tag: Option<ExifTag>,
    pending: BTreeMap<u32, PendingEvent>,
}

impl<R: Read> ExifParser<R> {
    /// Locates the EXIF payload in `reader`, which must be positioned at the
    /// start of a JPEG file, and reads the TIFF header.
    ///
    /// A JPEG without EXIF data is not an error: the parser then reports
    /// [`ParserEvent::End`] straight away.
    pub fn parse(mut reader: R, options: ParseOptions) -> Result<Self> {
        let contains_exif = seek_tiff_data(&mut reader)?;
        let mut parser = Self {
            stream: CountedReader::new(reader),
            options,
            contains_exif,
            current_ifd: IfdKind::Ifd0,
            ifd_start: 0,
            tag_count: 0,
            parse_offsets_in_current_ifd: false,
            tag: None,
            strip_index: 0,
            strip_count: 0,
            strip_size_tag: None,
            jpeg_size_tag: None,
            pending: BTreeMap::new(),
        };
        if !contains_exif {
            log::debug!("no EXIF data found");
            return Ok(parser);
        }

        parser.parse_tiff_header()?;
        let ifd0_offset = parser.stream.read_u32()?;
        log::debug!(
            "EXIF payload found, {} byte order, IFD0 at {}",
            parser.stream.byte_order(),
            ifd0_offset
        );
        parser.register_ifd(IfdKind::Ifd0, ifd0_offset);
        Ok(parser)
    }

    pub fn has_exif_data(&self) -> bool {
        self.contains_exif
    }

    /// Advances to the next event.
    pub fn next(&mut self) -> Result<ParserEvent> {
        if !self.contains_exif {
            return Ok(ParserEvent::End);
        }

        let end_of_tags = self.end_of_tags();
        let mut offset = self.stream.position();
        while offset < end_of_tags {
            if let Some(tag) = self.read_tag()? {
                if self.parse_offsets_in_current_ifd {
                    self.check_offset_or_image_tag(&tag);
                }
                self.tag = Some(tag);
                return Ok(ParserEvent::NewTag);
            }
            offset = self.stream.position();
        }
        if offset == end_of_tags {
            let link = self.stream.read_u32()?;
            if self.current_ifd == IfdKind::Ifd0 {
                if link != 0 && self.wants_ifd1() {
                    self.register_ifd(IfdKind::Ifd1, link);
                }
            } else if link != 0 {
                return Err(ExifError::invalid_format("Invalid link to next IFD"));
            }
        }

        while let Some((offset, event)) = self.pending.pop_first() {
            let target = u64::from(offset);
            if target < self.stream.position() {
                log::debug!("dropping {event:?} at {offset}, stream already passed it");
                continue;
            }
            self.skip_to(target)?;
            match event {
                PendingEvent::Ifd { kind, requested } => {
                    self.current_ifd = kind;
                    self.tag_count = self.stream.read_u16()?;
                    self.ifd_start = target;
                    self.parse_offsets_in_current_ifd = self.need_to_parse_offsets_in_current_ifd();
                    if requested {
                        return Ok(ParserEvent::StartOfIfd(kind));
                    }
                    log::debug!("skipping unrequested {kind} directory at {offset}");
                    self.skip_remaining_tags_in_current_ifd()?;
                }
                PendingEvent::CompressedImage => return Ok(ParserEvent::CompressedImage),
                PendingEvent::UncompressedStrip(index) => {
                    self.strip_index = index;
                    return Ok(ParserEvent::UncompressedStrip(index));
                }
                PendingEvent::TagValue { mut tag, requested } => {
                    self.read_full_tag_value(&mut tag)?;
                    self.check_offset_or_image_tag(&tag);
                    self.tag = Some(tag);
                    if requested {
                        return Ok(ParserEvent::ValueOfRegisteredTag);
                    }
                }
            }
        }
        Ok(ParserEvent::End)
    }

    /// Skips the rest of the current directory's entry table. Pointer tags
    /// met on the way are still followed when a requested directory or image
    /// hangs off them.
    pub fn skip_remaining_tags_in_current_ifd(&mut self) -> Result<()> {
        let end_of_tags = self.end_of_tags();
        let mut offset = self.stream.position();
        if offset > end_of_tags {
            return Ok(());
        }
        if self.parse_offsets_in_current_ifd {
            while offset < end_of_tags {
                if let Some(tag) = self.read_tag()? {
                    self.check_offset_or_image_tag(&tag);
                    self.tag = Some(tag);
                }
                offset = self.stream.position();
            }
        } else {
            self.skip_to(end_of_tags)?;
        }
        let link = self.stream.read_u32()?;
        if self.current_ifd == IfdKind::Ifd0 && link != 0 && self.wants_ifd1() {
            self.register_ifd(IfdKind::Ifd1, link);
        }
        Ok(())
    }

    /// Queues the out-of-line value of `tag` for reading. The parser reports
    /// [`ParserEvent::ValueOfRegisteredTag`] once the stream gets there.
    pub fn register_for_tag_value(&mut self, tag: &ExifTag) {
        self.pending.insert(
            tag.offset(),
            PendingEvent::TagValue {
                tag: tag.clone(),
                requested: true,
            },
        );
    }

    // ── accessors ────────────────────────────────────────────────────

    /// The tag of the last `NewTag` or `ValueOfRegisteredTag` event.
    pub fn tag(&self) -> Option<&ExifTag> {
        self.tag.as_ref()
    }

    pub fn current_ifd(&self) -> IfdKind {
        self.current_ifd
    }

    pub fn tag_count_in_current_ifd(&self) -> u16 {
        self.tag_count
    }

    pub fn strip_index(&self) -> usize {
        self.strip_index
    }

    /// Number of strips announced by the strip offsets tag.
    pub fn strip_count(&self) -> usize {
        self.strip_count
    }

    /// Size of the strip of the last `UncompressedStrip` event, 0 if unknown.
    pub fn strip_size(&self) -> u32 {
        self.strip_size_tag
            .as_ref()
            .and_then(|tag| tag.unsigned_component(self.strip_index))
            .unwrap_or(0)
    }

    /// Size of the compressed thumbnail, 0 if unknown.
    pub fn compressed_image_size(&self) -> u32 {
        self.jpeg_size_tag
            .as_ref()
            .and_then(|tag| tag.unsigned_component(0))
            .unwrap_or(0)
    }

    pub fn byte_order(&self) -> Endian {
        self.stream.byte_order()
    }

    // ── raw reads ────────────────────────────────────────────────────

    pub fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        self.stream.read_exact(buf)
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>> {
        self.stream.read_bytes(len)
    }

    /// Reads an `n` byte ASCII field and returns the text before its
    /// terminating NUL.
    pub fn read_string(&mut self, n: usize) -> Result<String> {
        if n == 0 {
            return Ok(String::new());
        }
        let bytes = self.stream.read_bytes(n)?;
        let text = &bytes[..n - 1];
        let end = text.iter().position(|b| *b == 0).unwrap_or(text.len());
        Ok(String::from_utf8_lossy(&text[..end]).into_owned())
    }

    pub fn read_unsigned_short(&mut self) -> Result<u16> {
        self.stream.read_u16()
    }

    pub fn read_unsigned_long(&mut self) -> Result<u32> {
        self.stream.read_u32()
    }

    pub fn read_unsigned_rational(&mut self) -> Result<Rational> {
        let numerator = self.read_unsigned_long()?;
        let denominator = self.read_unsigned_long()?;
        Ok(Rational::new(i64::from(numerator), i64::from(denominator)))
    }

    pub fn read_long(&mut self) -> Result<i32> {
        self.stream.read_i32()
    }

    pub fn read_rational(&mut self) -> Result<Rational> {
        let numerator = self.read_long()?;
        let denominator = self.read_long()?;
        Ok(Rational::new(i64::from(numerator), i64::from(denominator)))
    }

    // ── internals ────────────────────────────────────────────────────

    fn is_ifd_requested(&self, kind: IfdKind) -> bool {
        self.options.contains(ParseOptions::for_ifd(kind))
    }

    fn is_thumbnail_requested(&self) -> bool {
        self.options.contains(ParseOptions::THUMBNAIL)
    }

    fn wants_ifd1(&self) -> bool {
        self.is_ifd_requested(IfdKind::Ifd1) || self.is_thumbnail_requested()
    }

    fn end_of_tags(&self) -> u64 {
        self.ifd_start + TAG_COUNT_SIZE + TAG_SIZE * u64::from(self.tag_count)
    }

    /// Whether the current directory holds a pointer to something requested.
    fn need_to_parse_offsets_in_current_ifd(&self) -> bool {
        match self.current_ifd {
            IfdKind::Ifd0 => {
                self.is_ifd_requested(IfdKind::Exif)
                    || self.is_ifd_requested(IfdKind::Gps)
                    || self.is_ifd_requested(IfdKind::Interoperability)
            }
            IfdKind::Ifd1 => self.is_thumbnail_requested(),
            IfdKind::Exif => self.is_ifd_requested(IfdKind::Interoperability),
            IfdKind::Gps | IfdKind::Interoperability => false,
        }
    }

    fn skip_to(&mut self, offset: u64) -> Result<()> {
        self.stream.skip_to(offset)?;
        while let Some(entry) = self.pending.first_entry() {
            if u64::from(*entry.key()) >= offset {
                break;
            }
            entry.remove();
        }
        Ok(())
    }

    fn register_ifd(&mut self, kind: IfdKind, offset: u32) {
        let requested = self.is_ifd_requested(kind);
        self.pending
            .insert(offset, PendingEvent::Ifd { kind, requested });
    }

    fn parse_tiff_header(&mut self) -> Result<()> {
        let mut marker = [0u8; 2];
        self.stream.read_exact(&mut marker)?;
        let byte_order = Endian::from_marker(marker)
            .ok_or_else(|| ExifError::invalid_format("Invalid TIFF header"))?;
        self.stream.set_byte_order(byte_order);
        if self.stream.read_u16()? != TIFF_HEADER_TAIL {
            return Err(ExifError::invalid_format("Invalid TIFF header"));
        }
        Ok(())
    }

    /// Decodes one 12-byte directory entry. Entries of a type EXIF does not
    /// define are consumed and dropped.
    fn read_tag(&mut self) -> Result<Option<ExifTag>> {
        let tag_id = self.stream.read_u16()?;
        let type_code = self.stream.read_u16()?;
        let count = self.stream.read_u32()?;
        if count > i32::MAX as u32 {
            return Err(ExifError::invalid_format(
                "Number of component is larger than i32::MAX",
            ));
        }
        let Some(data_type) = DataType::from_code(type_code) else {
            log::warn!(
                "skipping tag 0x{tag_id:04x} in {} with unsupported type {type_code}",
                self.current_ifd
            );
            self.stream.skip(4)?;
            return Ok(None);
        };
        let size = count
            .checked_mul(data_type.element_size())
            .ok_or_else(|| ExifError::invalid_format("Tag data size overflows 32 bits"))?;

        let mut tag = ExifTag::new(tag_id, data_type, count, self.current_ifd);
        if size > 4 {
            let offset = self.stream.read_u32()?;
            if offset > i32::MAX as u32 {
                return Err(ExifError::invalid_format(
                    "Offset is larger than i32::MAX",
                ));
            }
            tag.set_offset(offset);
        } else {
            self.read_full_tag_value(&mut tag)?;
            self.stream.skip(u64::from(4 - size))?;
        }
        Ok(Some(tag))
    }

    fn read_full_tag_value(&mut self, tag: &mut ExifTag) -> Result<()> {
        let count = tag.component_count() as usize;
        let value = match tag.data_type() {
            DataType::UnsignedByte | DataType::Undefined => {
                TagValue::Bytes(self.stream.read_bytes(count)?)
            }
            DataType::Ascii => TagValue::Ascii(self.read_string(count)?),
            DataType::UnsignedShort => TagValue::Unsigned(
                (0..count)
                    .map(|_| self.read_unsigned_short().map(u32::from))
                    .collect::<Result<_>>()?,
            ),
            DataType::UnsignedLong => TagValue::Unsigned(
                (0..count)
                    .map(|_| self.read_unsigned_long())
                    .collect::<Result<_>>()?,
            ),
            DataType::Long => TagValue::Signed(
                (0..count)
                    .map(|_| self.read_long())
                    .collect::<Result<_>>()?,
            ),
            DataType::UnsignedRational => TagValue::Rationals(
                (0..count)
                    .map(|_| self.read_unsigned_rational())
                    .collect::<Result<_>>()?,
            ),
            DataType::Rational => TagValue::Rationals(
                (0..count)
                    .map(|_| self.read_rational())
                    .collect::<Result<_>>()?,
            ),
        };
        tag.set_value_unchecked(value);
        Ok(())
    }

    /// Queues the directory, image or value a pointer or size tag refers to,
    /// if the caller asked for it. Runs for inline values as they are decoded
    /// and again for out-of-line values once resolved.
    fn check_offset_or_image_tag(&mut self, tag: &ExifTag) {
        match tag.tag_id() {
            registry::EXIF_IFD => {
                if self.is_ifd_requested(IfdKind::Exif)
                    || self.is_ifd_requested(IfdKind::Interoperability)
                {
                    if let Some(offset) = tag.unsigned_component(0) {
                        self.register_ifd(IfdKind::Exif, offset);
                    }
                }
            }
            registry::GPS_IFD => {
                if self.is_ifd_requested(IfdKind::Gps) {
                    if let Some(offset) = tag.unsigned_component(0) {
                        self.register_ifd(IfdKind::Gps, offset);
                    }
                }
            }
            registry::INTEROPERABILITY_IFD => {
                if self.is_ifd_requested(IfdKind::Interoperability) {
                    if let Some(offset) = tag.unsigned_component(0) {
                        self.register_ifd(IfdKind::Interoperability, offset);
                    }
                }
            }
            registry::JPEG_INTERCHANGE_FORMAT => {
                if self.is_thumbnail_requested() {
                    if let Some(offset) = tag.unsigned_component(0) {
                        self.pending.insert(offset, PendingEvent::CompressedImage);
                    }
                }
            }
            registry::JPEG_INTERCHANGE_FORMAT_LENGTH => {
                if self.is_thumbnail_requested() {
                    self.jpeg_size_tag = Some(tag.clone());
                }
            }
            registry::STRIP_OFFSETS => {
                if self.is_thumbnail_requested() {
                    if tag.has_value() {
                        self.strip_count = tag.component_count() as usize;
                        for index in 0..self.strip_count {
                            if let Some(offset) = tag.unsigned_component(index) {
                                self.pending
                                    .insert(offset, PendingEvent::UncompressedStrip(index));
                            }
                        }
                    } else {
                        self.queue_silent_value(tag);
                    }
                }
            }
            registry::STRIP_BYTE_COUNTS => {
                if self.is_thumbnail_requested() {
                    if tag.has_value() {
                        self.strip_size_tag = Some(tag.clone());
                    } else {
                        self.queue_silent_value(tag);
                    }
                }
            }
            _ => {}
        }
    }

    fn queue_silent_value(&mut self, tag: &ExifTag) {
        self.pending.insert(
            tag.offset(),
            PendingEvent::TagValue {
                tag: tag.clone(),
                requested: false,
            },
        );
    }
}

/// Scans JPEG markers up to the first APP1, EOI or frame header and reports
/// whether an EXIF payload starts there. On `true` the reader is positioned
/// at the TIFF header.
fn seek_tiff_data<R: Read>(reader: &mut R) -> Result<bool> {
    if reader.read_u16::<BigEndian>()? != jpeg::SOI {
        return Err(ExifError::invalid_format("Invalid JPEG format"));
    }

    let mut marker = reader.read_u16::<BigEndian>()?;
    while marker != jpeg::APP1 && marker != jpeg::EOI && !jpeg::is_sof_marker(marker) {
        let length = reader.read_u16::<BigEndian>()?;
        let payload = length
            .checked_sub(2)
            .ok_or_else(|| ExifError::invalid_format("Invalid JPEG segment length"))?;
        let payload = u64::from(payload);
        if io::copy(&mut reader.by_ref().take(payload), &mut io::sink())? != payload {
            return Err(ExifError::UnexpectedEndOfData);
        }
        marker = reader.read_u16::<BigEndian>()?;
    }

    if marker != jpeg::APP1 {
        return Ok(false);
    }
    // APP1 length, not needed.
    reader.read_u16::<BigEndian>()?;
    let mut header = [0u8; 6];
    reader.read_exact(&mut header)?;
    Ok(header == jpeg::EXIF_HEADER)
}
