use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use std::io::{self, Write};

use super::data::{Endian, ExifData};
use super::ifd::{IfdData, IfdKind};
use super::jpeg;
use super::registry;
use super::tag::{DataType, ExifTag, TagValue};

const TIFF_HEADER_TAIL: u16 = 0x002A;
const TIFF_HEADER_SIZE: u32 = 8;
const TAG_SIZE: u32 = 12;

// APP1 length field counts itself and `Exif\0\0` on top of the TIFF data.
const APP1_OVERHEAD: u32 = 8;
const MAX_EXIF_SIZE: u32 = u16::MAX as u32 - APP1_OVERHEAD;

// Marker (2) + length (2) + `Exif\0\0` (6).
const HEADER_BUFFER_SIZE: usize = 10;

/// Serialization order of the directories.
const IFD_WRITE_ORDER: [IfdKind; IfdKind::COUNT] = [
    IfdKind::Ifd0,
    IfdKind::Exif,
    IfdKind::Interoperability,
    IfdKind::Gps,
    IfdKind::Ifd1,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Soi,
    FrameHeader,
    JpegData,
}

/// `Write` filter that copies a JPEG stream to `inner`, dropping its EXIF
/// APP1 segment and inserting one encoded from an [`ExifData`] right after
/// SOI.
///
/// Segments up to the first frame header are inspected; everything after it
/// passes through untouched. APP1 segments that do not carry EXIF (XMP, for
/// one) are kept.
#[derive(Debug)]
pub struct ExifOutputStream<W: Write> {
    inner: W,
    exif_data: ExifData,
    state: State,
    buffer: [u8; HEADER_BUFFER_SIZE],
    buffered: usize,
    bytes_to_skip: usize,
    bytes_to_copy: usize,
}

impl<W: Write> ExifOutputStream<W> {
    pub fn new(inner: W, exif_data: ExifData) -> Self {
        Self {
            inner,
            exif_data,
            state: State::Soi,
            buffer: [0; HEADER_BUFFER_SIZE],
            buffered: 0,
            bytes_to_skip: 0,
            bytes_to_copy: 0,
        }
    }

    /// The model being written. Once the segment has been emitted it also
    /// carries the pointer tags and offsets of the written layout.
    pub fn exif_data(&self) -> &ExifData {
        &self.exif_data
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    /// Whether the SOI marker has been seen and the EXIF segment written.
    pub fn has_written_exif(&self) -> bool {
        self.state != State::Soi
    }

    /// Moves bytes from `buf` into the header buffer until it holds `want`
    /// bytes. Returns what is left of `buf`.
    fn fill_buffer<'a>(&mut self, want: usize, buf: &'a [u8]) -> &'a [u8] {
        let n = want.saturating_sub(self.buffered).min(buf.len());
        self.buffer[self.buffered..self.buffered + n].copy_from_slice(&buf[..n]);
        self.buffered += n;
        &buf[n..]
    }

    fn buffered_u16(&self, at: usize) -> u16 {
        BigEndian::read_u16(&self.buffer[at..at + 2])
    }

    fn flush_buffer(&mut self) -> io::Result<()> {
        self.inner.write_all(&self.buffer[..self.buffered])?;
        self.buffered = 0;
        Ok(())
    }

    /// Handles one segment header in the frame header state. Returns the
    /// unconsumed rest of `buf`, empty when the header is still incomplete.
    fn process_frame_header<'a>(&mut self, buf: &'a [u8]) -> io::Result<&'a [u8]> {
        let buf = self.fill_buffer(2, buf);
        if self.buffered < 2 {
            return Ok(buf);
        }
        let marker = self.buffered_u16(0);
        if marker == jpeg::EOI && self.buffered == 2 {
            self.flush_buffer()?;
            return Ok(buf);
        }

        let buf = self.fill_buffer(4, buf);
        if self.buffered < 4 {
            return Ok(buf);
        }
        let length = usize::from(self.buffered_u16(2));

        if marker == jpeg::APP1 && length >= APP1_OVERHEAD as usize {
            let buf = self.fill_buffer(HEADER_BUFFER_SIZE, buf);
            if self.buffered < HEADER_BUFFER_SIZE {
                return Ok(buf);
            }
            if self.buffer[4..] == jpeg::EXIF_HEADER {
                log::debug!("dropping existing EXIF segment of {length} bytes");
                self.buffered = 0;
                self.bytes_to_skip = length - APP1_OVERHEAD as usize;
            } else {
                self.flush_buffer()?;
                self.bytes_to_copy = length - APP1_OVERHEAD as usize;
            }
            return Ok(buf);
        }

        self.flush_buffer()?;
        if jpeg::is_sof_marker(marker) {
            self.state = State::JpegData;
        } else {
            self.bytes_to_copy = length.saturating_sub(2);
        }
        Ok(buf)
    }

    fn write_exif_data(&mut self) -> io::Result<()> {
        self.create_required_ifd_and_tag();
        let exif_size = self.calculate_all_offset();
        if exif_size > MAX_EXIF_SIZE {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("EXIF data of {exif_size} bytes does not fit in an APP1 segment"),
            ));
        }
        log::debug!(
            "writing EXIF segment: {} bytes, {} byte order, directories [{}]",
            exif_size,
            self.exif_data.byte_order(),
            IFD_WRITE_ORDER
                .iter()
                .filter(|kind| self.exif_data.ifd(**kind).is_some())
                .map(|kind| kind.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut segment = Vec::with_capacity(exif_size as usize + 10);
        segment.write_u16::<BigEndian>(jpeg::APP1)?;
        segment.write_u16::<BigEndian>((exif_size + APP1_OVERHEAD) as u16)?;
        segment.extend_from_slice(&jpeg::EXIF_HEADER);
        match self.exif_data.byte_order() {
            Endian::Big => write_tiff::<BigEndian>(&self.exif_data, &mut segment)?,
            Endian::Little => write_tiff::<LittleEndian>(&self.exif_data, &mut segment)?,
        }
        self.inner.write_all(&segment)
    }

    /// Adds the directories and pointer tags every encoding needs: IFD0 and
    /// the Exif directory always, GPS/Interoperability pointers when those
    /// directories exist, and the IFD1 image tags when there is a thumbnail.
    /// Size tags left over for image data the model does not hold are dropped.
    fn create_required_ifd_and_tag(&mut self) {
        let data = &mut self.exif_data;

        data.get_or_create_ifd(IfdKind::Ifd0).set_tag(pointer_tag(
            registry::EXIF_IFD,
            IfdKind::Ifd0,
        ));
        data.get_or_create_ifd(IfdKind::Exif);

        if data.ifd(IfdKind::Gps).is_some() {
            data.get_or_create_ifd(IfdKind::Ifd0)
                .set_tag(pointer_tag(registry::GPS_IFD, IfdKind::Ifd0));
        }
        if data.ifd(IfdKind::Interoperability).is_some() {
            data.get_or_create_ifd(IfdKind::Exif)
                .set_tag(pointer_tag(registry::INTEROPERABILITY_IFD, IfdKind::Exif));
        }

        let has_thumbnail = data.has_compressed_thumbnail();
        let has_strips = data.has_uncompressed_strip();
        if let Some(ifd1) = data.ifd_mut(IfdKind::Ifd1) {
            if !has_thumbnail {
                ifd1.remove_tag(registry::JPEG_INTERCHANGE_FORMAT_LENGTH);
            }
            if has_thumbnail || !has_strips {
                ifd1.remove_tag(registry::STRIP_BYTE_COUNTS);
            }
        }

        if let Some(length) = data.compressed_thumbnail().map(|t| t.len() as u32) {
            let ifd1 = data.get_or_create_ifd(IfdKind::Ifd1);
            ifd1.set_tag(pointer_tag(registry::JPEG_INTERCHANGE_FORMAT, IfdKind::Ifd1));
            let mut length_tag = ExifTag::new(
                registry::JPEG_INTERCHANGE_FORMAT_LENGTH,
                DataType::UnsignedLong,
                1,
                IfdKind::Ifd1,
            );
            length_tag.set_value_unchecked(TagValue::Unsigned(vec![length]));
            ifd1.set_tag(length_tag);
        } else if data.has_uncompressed_strip() {
            let lengths: Vec<u32> = data.strips().iter().map(|s| s.len() as u32).collect();
            let count = lengths.len() as u32;
            let ifd1 = data.get_or_create_ifd(IfdKind::Ifd1);
            ifd1.set_tag(ExifTag::new(
                registry::STRIP_OFFSETS,
                DataType::UnsignedLong,
                count,
                IfdKind::Ifd1,
            ));
            let mut length_tag = ExifTag::new(
                registry::STRIP_BYTE_COUNTS,
                DataType::UnsignedLong,
                count,
                IfdKind::Ifd1,
            );
            length_tag.set_value_unchecked(TagValue::Unsigned(lengths));
            ifd1.set_tag(length_tag);
        }
    }

    /// Lays the payload out in write order, assigning every out-of-line value
    /// its offset and filling in the pointer tags and the IFD0 -> IFD1 link.
    /// Returns the size of the TIFF data.
    pub(crate) fn calculate_all_offset(&mut self) -> u32 {
        let data = &mut self.exif_data;
        for kind in IfdKind::ALL {
            if let Some(ifd) = data.ifd_mut(kind) {
                ifd.set_next_ifd_offset(0);
            }
        }

        let mut offset = TIFF_HEADER_SIZE;
        offset = calculate_offset_of_ifd(data.get_or_create_ifd(IfdKind::Ifd0), offset);

        let exif_start = offset;
        offset = calculate_offset_of_ifd(data.get_or_create_ifd(IfdKind::Exif), offset);
        set_pointer(data.get_or_create_ifd(IfdKind::Ifd0), registry::EXIF_IFD, exif_start);

        if let Some(interop) = data.ifd_mut(IfdKind::Interoperability) {
            let start = offset;
            offset = calculate_offset_of_ifd(interop, offset);
            set_pointer(
                data.get_or_create_ifd(IfdKind::Exif),
                registry::INTEROPERABILITY_IFD,
                start,
            );
        }

        if let Some(gps) = data.ifd_mut(IfdKind::Gps) {
            let start = offset;
            offset = calculate_offset_of_ifd(gps, offset);
            set_pointer(data.get_or_create_ifd(IfdKind::Ifd0), registry::GPS_IFD, start);
        }

        if let Some(ifd1) = data.ifd_mut(IfdKind::Ifd1) {
            let start = offset;
            offset = calculate_offset_of_ifd(ifd1, offset);
            data.get_or_create_ifd(IfdKind::Ifd0)
                .set_next_ifd_offset(start);
        }

        if let Some(length) = data.compressed_thumbnail().map(|t| t.len() as u32) {
            set_pointer(
                data.get_or_create_ifd(IfdKind::Ifd1),
                registry::JPEG_INTERCHANGE_FORMAT,
                offset,
            );
            offset = offset.saturating_add(length);
        } else if data.has_uncompressed_strip() {
            let mut offsets = Vec::with_capacity(data.strip_count());
            for strip in data.strips() {
                offsets.push(offset);
                offset = offset.saturating_add(strip.len() as u32);
            }
            if let Some(tag) = data
                .get_or_create_ifd(IfdKind::Ifd1)
                .get_tag_mut(registry::STRIP_OFFSETS)
            {
                tag.set_value_unchecked(TagValue::Unsigned(offsets));
            }
        }
        offset
    }
}

impl<W: Write> Write for ExifOutputStream<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let total = buf.len();
        let mut buf = buf;
        while (self.bytes_to_skip > 0 || self.bytes_to_copy > 0 || self.state != State::JpegData)
            && !buf.is_empty()
        {
            if self.bytes_to_skip > 0 {
                let n = buf.len().min(self.bytes_to_skip);
                self.bytes_to_skip -= n;
                buf = &buf[n..];
            }
            if self.bytes_to_copy > 0 {
                let n = buf.len().min(self.bytes_to_copy);
                self.inner.write_all(&buf[..n])?;
                self.bytes_to_copy -= n;
                buf = &buf[n..];
            }
            if buf.is_empty() {
                break;
            }
            match self.state {
                State::Soi => {
                    buf = self.fill_buffer(2, buf);
                    if self.buffered < 2 {
                        break;
                    }
                    if self.buffered_u16(0) != jpeg::SOI {
                        return Err(io::Error::new(
                            io::ErrorKind::InvalidData,
                            "Invalid JPEG format: missing SOI marker",
                        ));
                    }
                    self.flush_buffer()?;
                    self.state = State::FrameHeader;
                    self.write_exif_data()?;
                }
                State::FrameHeader => buf = self.process_frame_header(buf)?,
                State::JpegData => {}
            }
        }
        if !buf.is_empty() {
            self.inner.write_all(buf)?;
        }
        Ok(total)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn pointer_tag(tag_id: u16, ifd: IfdKind) -> ExifTag {
    ExifTag::new(tag_id, DataType::UnsignedLong, 1, ifd)
}

fn set_pointer(ifd: &mut IfdData, tag_id: u16, offset: u32) {
    if let Some(tag) = ifd.get_tag_mut(tag_id) {
        tag.set_value_unchecked(TagValue::Unsigned(vec![offset]));
    }
}

/// Places the directory at `offset` and its out-of-line values right after
/// its entry table. Returns the first offset past the directory.
fn calculate_offset_of_ifd(ifd: &mut IfdData, offset: u32) -> u32 {
    let table = 2 + TAG_SIZE.saturating_mul(ifd.tag_count() as u32) + 4;
    let mut offset = offset.saturating_add(table);
    for tag in ifd.tags_mut() {
        let size = tag.data_size();
        if size > 4 {
            tag.set_offset(offset);
            offset = offset.saturating_add(size);
        }
    }
    offset
}

fn write_tiff<B: ByteOrder>(data: &ExifData, out: &mut Vec<u8>) -> io::Result<()> {
    out.extend_from_slice(&data.byte_order().marker());
    out.write_u16::<B>(TIFF_HEADER_TAIL)?;
    out.write_u32::<B>(TIFF_HEADER_SIZE)?;
    for kind in IFD_WRITE_ORDER {
        if let Some(ifd) = data.ifd(kind) {
            write_ifd::<B>(ifd, out)?;
        }
    }
    if let Some(thumbnail) = data.compressed_thumbnail() {
        out.extend_from_slice(thumbnail);
    } else {
        for strip in data.strips() {
            out.extend_from_slice(strip);
        }
    }
    Ok(())
}

fn write_ifd<B: ByteOrder>(ifd: &IfdData, out: &mut Vec<u8>) -> io::Result<()> {
    out.write_u16::<B>(ifd.tag_count() as u16)?;
    for tag in ifd.tags() {
        out.write_u16::<B>(tag.tag_id())?;
        out.write_u16::<B>(tag.data_type().code())?;
        out.write_u32::<B>(tag.component_count())?;
        if tag.data_size() > 4 {
            out.write_u32::<B>(tag.offset())?;
        } else {
            write_tag_value::<B>(tag, out)?;
            out.resize(out.len() + 4 - tag.data_size() as usize, 0);
        }
    }
    out.write_u32::<B>(ifd.next_ifd_offset())?;
    for tag in ifd.tags().filter(|tag| tag.data_size() > 4) {
        write_tag_value::<B>(tag, out)?;
    }
    Ok(())
}

/// Writes exactly `data_size` bytes: short values are zero padded (this is
/// where ASCII gets its NUL), long ones cut. ASCII is cut one byte early so
/// the NUL always survives.
fn write_tag_value<B: ByteOrder>(tag: &ExifTag, out: &mut Vec<u8>) -> io::Result<()> {
    let start = out.len();
    match tag.value() {
        None => {}
        Some(TagValue::Bytes(bytes)) => out.extend_from_slice(bytes),
        Some(TagValue::Ascii(text)) => {
            let room = (tag.data_size() as usize).saturating_sub(1);
            let bytes = text.as_bytes();
            out.extend_from_slice(&bytes[..bytes.len().min(room)]);
        }
        Some(TagValue::Unsigned(values)) => {
            for value in values {
                if tag.data_type() == DataType::UnsignedShort {
                    out.write_u16::<B>(*value as u16)?;
                } else {
                    out.write_u32::<B>(*value)?;
                }
            }
        }
        Some(TagValue::Signed(values)) => {
            for value in values {
                out.write_i32::<B>(*value)?;
            }
        }
        Some(TagValue::Rationals(values)) => {
            for value in values {
                if tag.data_type() == DataType::UnsignedRational {
                    out.write_u32::<B>(value.numerator() as u32)?;
                    out.write_u32::<B>(value.denominator() as u32)?;
                } else {
                    out.write_i32::<B>(value.numerator() as i32)?;
                    out.write_i32::<B>(value.denominator() as i32)?;
                }
            }
        }
    }
    out.resize(start + tag.data_size() as usize, 0);
    Ok(())
}

/// Replace the EXIF segment of an in-memory JPEG.
pub fn write_exif(jpeg: &[u8], exif: ExifData) -> io::Result<Vec<u8>> {
    let mut out = ExifOutputStream::new(Vec::with_capacity(jpeg.len() + 1024), exif);
    out.write_all(jpeg)?;
    out.flush()?;
    if !out.has_written_exif() {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "JPEG data ended before the SOI marker",
        ));
    }
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exif::registry::*;
    use crate::exif::Rational;

    const BARE_JPEG: &[u8] = &[
        0xFF, 0xD8, // SOI
        0xFF, 0xDB, 0x00, 0x04, 0x11, 0x22, // DQT
        0xFF, 0xC0, 0x00, 0x03, 0x08, // SOF0
        0xAA, 0xBB, 0xCC, // scan data
        0xFF, 0xD9, // EOI
    ];

    fn sample() -> ExifData {
        let mut data = ExifData::new(Endian::Big);
        data.add_tag(MAKE).unwrap().set_string("Maker Inc").unwrap();
        data.add_tag(ORIENTATION).unwrap().set_integer(1).unwrap();
        data.add_tag(EXPOSURE_TIME)
            .unwrap()
            .set_rational(Rational::new(1, 60))
            .unwrap();
        data.add_gps_tags(37.4219, -122.0840).unwrap();
        data.add_interoperability_tag(INTEROPERABILITY_INDEX)
            .unwrap()
            .set_string("R98")
            .unwrap();
        data.set_compressed_thumbnail(vec![0xFF, 0xD8, 1, 2, 3, 0xFF, 0xD9]);
        data
    }

    fn read_u16(bytes: &[u8], at: usize) -> u16 {
        BigEndian::read_u16(&bytes[at..at + 2])
    }

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        BigEndian::read_u32(&bytes[at..at + 4])
    }

    /// Start offset of the TIFF header in an encoded JPEG whose EXIF segment
    /// follows SOI.
    const TIFF_START: usize = 2 + 4 + 6;

    // ── offset planning ──────────────────────────────────────────────

    #[test]
    fn offsets_are_monotonic_and_disjoint() {
        let mut stream = ExifOutputStream::new(Vec::new(), sample());
        stream.create_required_ifd_and_tag();
        let end = stream.calculate_all_offset();
        let data = stream.exif_data();

        let thumbnail_start = data
            .get_thumbnail_tag(JPEG_INTERCHANGE_FORMAT)
            .unwrap()
            .get_unsigned_long(0)
            .unwrap();
        assert_eq!(end, thumbnail_start + 7);

        let mut regions: Vec<(u32, u32)> = data
            .ifds()
            .flat_map(|ifd| ifd.tags())
            .filter(|tag| tag.data_size() > 4)
            .map(|tag| (tag.offset(), tag.offset() + tag.data_size()))
            .collect();
        assert!(!regions.is_empty());
        regions.sort();
        for (start, stop) in &regions {
            assert!(*start >= TIFF_HEADER_SIZE);
            assert!(*stop <= thumbnail_start);
        }
        for pair in regions.windows(2) {
            assert!(pair[0].1 <= pair[1].0, "overlapping values {pair:?}");
        }
    }

    #[test]
    fn directories_laid_out_in_fixed_order() {
        let mut stream = ExifOutputStream::new(Vec::new(), sample());
        stream.create_required_ifd_and_tag();
        stream.calculate_all_offset();
        let data = stream.exif_data();

        let exif = data.get_tag(EXIF_IFD).unwrap().get_unsigned_long(0).unwrap();
        let interop = data.get_tag(INTEROPERABILITY_IFD).unwrap().get_unsigned_long(0).unwrap();
        let gps = data.get_tag(GPS_IFD).unwrap().get_unsigned_long(0).unwrap();
        let ifd1 = data.ifd(IfdKind::Ifd1).unwrap();
        let ifd1_start = data.ifd(IfdKind::Ifd0).unwrap().next_ifd_offset();

        assert!(TIFF_HEADER_SIZE < exif);
        assert!(exif < interop);
        assert!(interop < gps);
        assert!(gps < ifd1_start);
        assert_eq!(ifd1.next_ifd_offset(), 0);
    }

    #[test]
    fn stale_size_tags_are_dropped_without_image_data() {
        let mut data = ExifData::new(Endian::Big);
        data.add_thumbnail_tag(COMPRESSION)
            .unwrap()
            .set_integer(i64::from(compression::JPEG))
            .unwrap();
        data.add_thumbnail_tag(JPEG_INTERCHANGE_FORMAT_LENGTH)
            .unwrap()
            .set_integer(4096)
            .unwrap();
        data.add_thumbnail_tag(STRIP_BYTE_COUNTS)
            .unwrap()
            .set_integers(&[10, 20])
            .unwrap();

        let mut stream = ExifOutputStream::new(Vec::new(), data);
        stream.create_required_ifd_and_tag();
        let ifd1 = stream.exif_data().ifd(IfdKind::Ifd1).unwrap();
        assert!(ifd1.get_tag(COMPRESSION).is_some());
        assert!(ifd1.get_tag(JPEG_INTERCHANGE_FORMAT_LENGTH).is_none());
        assert!(ifd1.get_tag(STRIP_BYTE_COUNTS).is_none());
        assert!(ifd1.get_tag(JPEG_INTERCHANGE_FORMAT).is_none());
    }

    #[test]
    fn strip_byte_counts_dropped_alongside_a_thumbnail() {
        let mut data = sample();
        data.add_thumbnail_tag(STRIP_BYTE_COUNTS)
            .unwrap()
            .set_integers(&[10])
            .unwrap();

        let mut stream = ExifOutputStream::new(Vec::new(), data);
        stream.create_required_ifd_and_tag();
        let ifd1 = stream.exif_data().ifd(IfdKind::Ifd1).unwrap();
        assert!(ifd1.get_tag(STRIP_BYTE_COUNTS).is_none());
        assert_eq!(
            ifd1.get_tag(JPEG_INTERCHANGE_FORMAT_LENGTH)
                .unwrap()
                .get_unsigned_long(0)
                .unwrap(),
            7
        );
    }

    #[test]
    fn no_ifd1_means_no_link() {
        let mut data = ExifData::new(Endian::Big);
        data.get_or_create_ifd(IfdKind::Ifd0).set_next_ifd_offset(999);
        let mut stream = ExifOutputStream::new(Vec::new(), data);
        stream.create_required_ifd_and_tag();
        stream.calculate_all_offset();
        assert_eq!(
            stream.exif_data().ifd(IfdKind::Ifd0).unwrap().next_ifd_offset(),
            0
        );
    }

    // ── serialization ────────────────────────────────────────────────

    #[test]
    fn segment_is_inserted_after_soi() {
        let out = write_exif(BARE_JPEG, ExifData::new(Endian::Little)).unwrap();
        assert_eq!(&out[..2], &[0xFF, 0xD8]);
        assert_eq!(read_u16(&out, 2), jpeg::APP1);
        let length = usize::from(read_u16(&out, 4));
        assert_eq!(&out[6..12], b"Exif\0\0");
        assert_eq!(&out[12..14], b"II");
        assert_eq!(&out[14..16], &[0x2A, 0x00]);
        assert_eq!(&out[16..20], &[8, 0, 0, 0]);
        // The rest of the stream follows the segment unchanged.
        assert_eq!(&out[4 + length..], &BARE_JPEG[2..]);
    }

    #[test]
    fn app1_length_covers_tiff_data() {
        let out = write_exif(BARE_JPEG, sample()).unwrap();
        let length = usize::from(read_u16(&out, 4));
        let tail = &out[4 + length..];
        assert_eq!(tail, &BARE_JPEG[2..]);
        // Thumbnail is the last thing in the segment.
        assert_eq!(&out[4 + length - 7..4 + length], &[0xFF, 0xD8, 1, 2, 3, 0xFF, 0xD9]);
    }

    #[test]
    fn exif_pointer_matches_written_directory() {
        let out = write_exif(BARE_JPEG, sample()).unwrap();
        let tiff = &out[TIFF_START..];
        let ifd0 = read_u32(tiff, 4) as usize;
        let count = usize::from(read_u16(tiff, ifd0));
        let exif_offset = (0..count)
            .map(|i| ifd0 + 2 + i * 12)
            .find(|entry| read_u16(tiff, *entry) == EXIF_IFD)
            .map(|entry| read_u32(tiff, entry + 8) as usize)
            .unwrap();

        // The Exif directory holds ExposureTime and the Interoperability pointer.
        assert_eq!(read_u16(tiff, exif_offset), 2);
        assert_eq!(read_u16(tiff, exif_offset + 2), EXPOSURE_TIME);
        assert_eq!(read_u16(tiff, exif_offset + 14), INTEROPERABILITY_IFD);
    }

    #[test]
    fn ascii_payload_is_padded_to_component_count() {
        let mut data = ExifData::new(Endian::Big);
        let mut tag = ExifTag::new(MAKE, DataType::Ascii, 10, IfdKind::Ifd0);
        tag.set_value_unchecked(TagValue::Ascii("abc".into()));
        data.get_or_create_ifd(IfdKind::Ifd0).set_tag(tag);

        let out = write_exif(BARE_JPEG, data).unwrap();
        let tiff = &out[TIFF_START..];
        // IFD0: Make then ExifIFD pointer; Make's value follows the table.
        assert_eq!(read_u16(tiff, 10), MAKE);
        assert_eq!(read_u32(tiff, 14), 10);
        let at = read_u32(tiff, 18) as usize;
        assert_eq!(at, 8 + 2 + 24 + 4);
        assert_eq!(&tiff[at..at + 10], b"abc\0\0\0\0\0\0\0");
    }

    #[test]
    fn inline_values_are_padded_to_four_bytes() {
        let mut data = ExifData::new(Endian::Little);
        data.add_tag(ORIENTATION).unwrap().set_integer(6).unwrap();
        let out = write_exif(BARE_JPEG, data).unwrap();
        let tiff = &out[TIFF_START..];
        let entry = 10;
        assert_eq!(LittleEndian::read_u16(&tiff[entry..]), ORIENTATION);
        assert_eq!(&tiff[entry + 8..entry + 12], &[6, 0, 0, 0]);
    }

    // ── stream filtering ─────────────────────────────────────────────

    #[test]
    fn existing_exif_segment_is_replaced() {
        let first = write_exif(BARE_JPEG, sample()).unwrap();
        let second = write_exif(&first, sample()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn other_app1_segments_pass_through() {
        let xmp = b"http://ns.adobe.com/xap/1.0/\0<x/>";
        let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
        jpeg.extend_from_slice(&((xmp.len() + 2) as u16).to_be_bytes());
        jpeg.extend_from_slice(xmp);
        jpeg.extend_from_slice(&BARE_JPEG[2..]);

        let out = write_exif(&jpeg, ExifData::new(Endian::Big)).unwrap();
        let length = usize::from(read_u16(&out, 4));
        assert_eq!(&out[4 + length..], &jpeg[2..]);
    }

    #[test]
    fn byte_at_a_time_matches_single_write() {
        let source = write_exif(BARE_JPEG, sample()).unwrap();
        let expected = write_exif(&source, sample()).unwrap();

        let mut stream = ExifOutputStream::new(Vec::new(), sample());
        for byte in &source {
            stream.write_all(std::slice::from_ref(byte)).unwrap();
        }
        assert_eq!(stream.into_inner(), expected);
    }

    #[test]
    fn missing_soi_is_rejected() {
        let err = write_exif(&[0x00, 0x11, 0x22], ExifData::new(Endian::Big)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn empty_input_is_rejected() {
        let err = write_exif(&[], ExifData::new(Endian::Big)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn oversized_segment_is_rejected() {
        let mut data = ExifData::new(Endian::Big);
        data.set_compressed_thumbnail(vec![0u8; 70_000]);
        let err = write_exif(BARE_JPEG, data).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn strips_get_consecutive_offsets() {
        let mut data = ExifData::new(Endian::Big);
        data.set_strip(0, vec![1, 2, 3]);
        data.set_strip(1, vec![4, 5]);
        let mut stream = ExifOutputStream::new(Vec::new(), data);
        stream.create_required_ifd_and_tag();
        let end = stream.calculate_all_offset();

        let ifd1 = stream.exif_data().ifd(IfdKind::Ifd1).unwrap();
        let offsets = ifd1.get_tag(STRIP_OFFSETS).unwrap();
        let counts = ifd1.get_tag(STRIP_BYTE_COUNTS).unwrap();
        let first = offsets.get_unsigned_long(0).unwrap();
        assert_eq!(offsets.get_unsigned_long(1).unwrap(), first + 3);
        assert_eq!(end, first + 5);
        assert_eq!(counts.get_unsigned_long(0).unwrap(), 3);
        assert_eq!(counts.get_unsigned_long(1).unwrap(), 2);
    }
}
