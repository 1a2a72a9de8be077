//! End-to-end tests: models are encoded into synthetic JPEG streams, the
//! resulting bytes are inspected directly, and decoded back.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use chrono::NaiveDate;
use std::io::{Cursor, Write};

use exif_codec::ExifError;
use exif_codec::exif::registry::*;
use exif_codec::exif::{
    Endian, ExifData, ExifOutputStream, ExifParser, ExifReader, IfdKind, ParseOptions,
    ParserEvent, Rational, write_exif,
};

// ── fixtures ─────────────────────────────────────────────────────────

/// SOI, DQT, SOF0, scan data, EOI. Segment payloads are dummies.
const BARE_JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x04, 0x00, 0x01, 0xFF, 0xC0, 0x00, 0x03, 0x08, 0x12, 0x34,
    0x56, 0xFF, 0xD9,
];

/// Offset of the TIFF header in a stream produced by the encoder: SOI (2),
/// APP1 marker and length (4), `Exif\0\0` (6).
const TIFF_START: usize = 12;

const THUMBNAIL: &[u8] = &[0xFF, 0xD8, 0xFF, 0xDB, 0x00, 0x02, 0xFF, 0xD9];

fn full_model(byte_order: Endian) -> ExifData {
    let mut exif = ExifData::new(byte_order);

    exif.add_tag(MAKE).unwrap().set_string("Canon").unwrap();
    exif.add_tag(MODEL).unwrap().set_string("Canon EOS 5D Mark IV").unwrap();
    exif.add_tag(ORIENTATION)
        .unwrap()
        .set_integer(i64::from(orientation::RIGHT_TOP))
        .unwrap();
    exif.add_tag(X_RESOLUTION)
        .unwrap()
        .set_rational(Rational::new(72, 1))
        .unwrap();
    exif.add_tag(DATE_TIME)
        .unwrap()
        .set_time(
            NaiveDate::from_ymd_opt(2023, 7, 14)
                .unwrap()
                .and_hms_opt(9, 30, 5)
                .unwrap(),
        )
        .unwrap();

    exif.add_tag(EXPOSURE_TIME)
        .unwrap()
        .set_rational(Rational::new(1, 250))
        .unwrap();
    exif.add_tag(EXPOSURE_BIAS_VALUE)
        .unwrap()
        .set_rational(Rational::new(-2, 3))
        .unwrap();
    exif.add_tag(ISO_SPEED_RATINGS).unwrap().set_integers(&[100, 200]).unwrap();
    exif.add_tag(EXIF_VERSION).unwrap().set_bytes(b"0230").unwrap();
    exif.add_tag(USER_COMMENT)
        .unwrap()
        .set_bytes(b"ASCII\0\0\0hello there")
        .unwrap();
    exif.add_tag(PIXEL_X_DIMENSION).unwrap().set_integer(6720).unwrap();

    exif.add_interoperability_tag(INTEROPERABILITY_INDEX)
        .unwrap()
        .set_string("R98")
        .unwrap();

    exif.add_tag(GPS_VERSION_ID).unwrap().set_bytes(&[2, 3, 0, 0]).unwrap();
    exif.add_gps_tags(37.4219, -122.0840).unwrap();
    exif.add_tag(GPS_ALTITUDE)
        .unwrap()
        .set_rational(Rational::new(3210, 100))
        .unwrap();

    exif.add_thumbnail_tag(COMPRESSION)
        .unwrap()
        .set_integer(i64::from(compression::JPEG))
        .unwrap();
    exif.add_thumbnail_tag(JPEG_INTERCHANGE_FORMAT_LENGTH)
        .unwrap()
        .set_integer(THUMBNAIL.len() as i64)
        .unwrap();
    exif.set_compressed_thumbnail(THUMBNAIL.to_vec());

    exif
}

fn encode(exif: ExifData) -> Vec<u8> {
    write_exif(BARE_JPEG, exif).unwrap()
}

fn decode(jpeg: &[u8]) -> Option<ExifData> {
    ExifReader::default().read(Cursor::new(jpeg)).unwrap()
}

/// Raw view of the TIFF payload of an encoded stream.
struct Tiff<'a, B> {
    data: &'a [u8],
    _order: std::marker::PhantomData<B>,
}

impl<'a, B: ByteOrder> Tiff<'a, B> {
    fn new(jpeg: &'a [u8]) -> Self {
        assert_eq!(&jpeg[2..4], &[0xFF, 0xE1]);
        assert_eq!(&jpeg[6..12], b"Exif\0\0");
        let length = BigEndian::read_u16(&jpeg[4..6]) as usize;
        Self {
            data: &jpeg[TIFF_START..4 + length],
            _order: std::marker::PhantomData,
        }
    }

    fn u16(&self, offset: u32) -> u16 {
        B::read_u16(&self.data[offset as usize..])
    }

    fn u32(&self, offset: u32) -> u32 {
        B::read_u32(&self.data[offset as usize..])
    }

    fn ifd0(&self) -> u32 {
        self.u32(4)
    }

    fn entry_count(&self, ifd: u32) -> u32 {
        u32::from(self.u16(ifd))
    }

    fn next_link(&self, ifd: u32) -> u32 {
        self.u32(ifd + 2 + 12 * self.entry_count(ifd))
    }

    /// Value/offset field of the entry for `tag`.
    fn field(&self, ifd: u32, tag: u16) -> Option<u32> {
        (0..self.entry_count(ifd))
            .map(|i| ifd + 2 + 12 * i)
            .find(|entry| self.u16(*entry) == tag)
            .map(|entry| self.u32(entry + 8))
    }

    fn tag_ids(&self, ifd: u32) -> Vec<u16> {
        (0..self.entry_count(ifd))
            .map(|i| self.u16(ifd + 2 + 12 * i))
            .collect()
    }
}

// ── round trip ───────────────────────────────────────────────────────

#[test]
fn full_model_round_trips_big_endian() {
    let model = full_model(Endian::Big);
    let decoded = decode(&encode(model.clone())).unwrap();
    assert_eq!(decoded, model);
}

#[test]
fn full_model_round_trips_little_endian() {
    let model = full_model(Endian::Little);
    let decoded = decode(&encode(model.clone())).unwrap();
    assert_eq!(decoded, model);
    assert_eq!(decoded.byte_order(), Endian::Little);
}

#[test]
fn decoded_values_are_typed() {
    let decoded = decode(&encode(full_model(Endian::Big))).unwrap();

    assert_eq!(decoded.get_tag(MAKE).unwrap().get_string().unwrap(), "Canon");
    assert_eq!(
        decoded.get_tag(DATE_TIME).unwrap().get_string().unwrap(),
        "2023:07:14 09:30:05"
    );
    assert_eq!(
        decoded.get_tag(ORIENTATION).unwrap().get_unsigned_short(0).unwrap(),
        orientation::RIGHT_TOP
    );
    assert_eq!(
        decoded.get_tag(EXPOSURE_BIAS_VALUE).unwrap().get_rational(0).unwrap(),
        Rational::new(-2, 3)
    );
    assert_eq!(
        decoded.get_tag(ISO_SPEED_RATINGS).unwrap().value_to_string(),
        "100 200"
    );
    assert_eq!(
        decoded
            .get_interoperability_tag(INTEROPERABILITY_INDEX)
            .unwrap()
            .get_string()
            .unwrap(),
        "R98"
    );
    assert_eq!(
        decoded
            .get_thumbnail_tag(COMPRESSION)
            .unwrap()
            .get_unsigned_short(0)
            .unwrap(),
        compression::JPEG
    );
    assert_eq!(decoded.compressed_thumbnail(), Some(THUMBNAIL));
}

#[test]
fn re_encoding_a_decoded_stream_is_stable() {
    let first = encode(full_model(Endian::Big));
    let decoded = decode(&first).unwrap();
    let second = write_exif(&first, decoded).unwrap();
    assert_eq!(first, second);
}

#[test]
fn strips_round_trip() {
    let mut model = ExifData::new(Endian::Little);
    model.add_tag(MAKE).unwrap().set_string("scanner").unwrap();
    model
        .add_thumbnail_tag(COMPRESSION)
        .unwrap()
        .set_integer(i64::from(compression::UNCOMPRESSED))
        .unwrap();
    model.set_strip(0, vec![1; 5]);
    model.set_strip(1, vec![2; 7]);
    model.set_strip(2, vec![3; 3]);

    let decoded = decode(&encode(model)).unwrap();
    assert_eq!(decoded.strip_count(), 3);
    assert_eq!(decoded.strip(0), Some(&[1u8; 5][..]));
    assert_eq!(decoded.strip(1), Some(&[2u8; 7][..]));
    assert_eq!(decoded.strip(2), Some(&[3u8; 3][..]));
    assert_eq!(
        decoded
            .get_thumbnail_tag(STRIP_BYTE_COUNTS)
            .unwrap()
            .value_to_string(),
        "5 7 3"
    );
}

#[test]
fn latin1_ascii_keeps_its_characters_and_nul() {
    let mut model = ExifData::new(Endian::Big);
    model.add_tag(MAKE).unwrap().set_string("Cafxs").unwrap();
    let mut jpeg = encode(model);
    let at = {
        let tiff = Tiff::<BigEndian>::new(&jpeg);
        TIFF_START + tiff.field(tiff.ifd0(), MAKE).unwrap() as usize
    };
    assert_eq!(&jpeg[at..at + 6], b"Cafxs\0");
    jpeg[at + 3] = 0xE9;

    let decoded = decode(&jpeg).unwrap();
    let make = decoded.get_tag(MAKE).unwrap();
    assert_eq!(make.get_string().unwrap(), "Caf\u{FFFD}s");
    assert_eq!(make.component_count(), 8);

    let rewritten = write_exif(&jpeg, decoded).unwrap();
    let tiff = Tiff::<BigEndian>::new(&rewritten);
    let value = tiff.field(tiff.ifd0(), MAKE).unwrap() as usize;
    assert_eq!(&tiff.data[value..value + 8], b"Caf\xEF\xBF\xBDs\0");
    assert_eq!(
        decode(&rewritten).unwrap().get_tag(MAKE).unwrap().get_string().unwrap(),
        "Caf\u{FFFD}s"
    );
}

#[test]
fn thumbnail_tags_without_the_image_are_not_re_encoded() {
    let jpeg = encode(full_model(Endian::Big));
    let without_thumbnail = ParseOptions::IFD_0
        | ParseOptions::IFD_1
        | ParseOptions::EXIF
        | ParseOptions::GPS
        | ParseOptions::INTEROPERABILITY;
    let decoded = ExifReader::new(without_thumbnail)
        .read(Cursor::new(&jpeg))
        .unwrap()
        .unwrap();
    assert!(decoded.get_thumbnail_tag(JPEG_INTERCHANGE_FORMAT_LENGTH).is_some());
    assert!(decoded.compressed_thumbnail().is_none());

    let rewritten = write_exif(&jpeg, decoded).unwrap();
    let tiff = Tiff::<BigEndian>::new(&rewritten);
    let ifd1 = tiff.next_link(tiff.ifd0());
    assert_eq!(tiff.tag_ids(ifd1), vec![COMPRESSION]);
}

// ── layout ───────────────────────────────────────────────────────────

#[test]
fn pointers_match_written_directories() {
    let jpeg = encode(full_model(Endian::Big));
    let tiff = Tiff::<BigEndian>::new(&jpeg);

    let ifd0 = tiff.ifd0();
    assert_eq!(ifd0, 8);

    let exif = tiff.field(ifd0, EXIF_IFD).unwrap();
    assert_eq!(tiff.tag_ids(exif)[0], EXPOSURE_TIME);
    assert_eq!(tiff.next_link(exif), 0);

    let interop = tiff.field(exif, INTEROPERABILITY_IFD).unwrap();
    assert_eq!(tiff.tag_ids(interop), vec![INTEROPERABILITY_INDEX]);

    let gps = tiff.field(ifd0, GPS_IFD).unwrap();
    assert_eq!(tiff.tag_ids(gps)[0], GPS_VERSION_ID);
    assert_eq!(tiff.next_link(gps), 0);

    let ifd1 = tiff.next_link(ifd0);
    assert!(tiff.tag_ids(ifd1).contains(&JPEG_INTERCHANGE_FORMAT));
    assert_eq!(tiff.next_link(ifd1), 0);

    let thumbnail = tiff.field(ifd1, JPEG_INTERCHANGE_FORMAT).unwrap() as usize;
    let length = tiff.field(ifd1, JPEG_INTERCHANGE_FORMAT_LENGTH).unwrap() as usize;
    assert_eq!(&tiff.data[thumbnail..thumbnail + length], THUMBNAIL);
    assert_eq!(thumbnail + length, tiff.data.len());
}

#[test]
fn directories_follow_fixed_order_whatever_the_insertion_order() {
    let mut model = ExifData::new(Endian::Little);
    model.set_compressed_thumbnail(THUMBNAIL.to_vec());
    model
        .add_thumbnail_tag(COMPRESSION)
        .unwrap()
        .set_integer(i64::from(compression::JPEG))
        .unwrap();
    model.add_gps_tags(-33.8568, 151.2153).unwrap();
    model
        .add_interoperability_tag(INTEROPERABILITY_INDEX)
        .unwrap()
        .set_string("R98")
        .unwrap();
    model
        .add_tag(EXPOSURE_TIME)
        .unwrap()
        .set_rational(Rational::new(1, 60))
        .unwrap();
    model.add_tag(MAKE).unwrap().set_string("Nikon").unwrap();

    let jpeg = encode(model);
    let tiff = Tiff::<LittleEndian>::new(&jpeg);

    let ifd0 = tiff.ifd0();
    let exif = tiff.field(ifd0, EXIF_IFD).unwrap();
    let interop = tiff.field(exif, INTEROPERABILITY_IFD).unwrap();
    let gps = tiff.field(ifd0, GPS_IFD).unwrap();
    let ifd1 = tiff.next_link(ifd0);
    let thumbnail = tiff.field(ifd1, JPEG_INTERCHANGE_FORMAT).unwrap();

    assert!(ifd0 < exif);
    assert!(exif < interop);
    assert!(interop < gps);
    assert!(gps < ifd1);
    assert!(ifd1 < thumbnail);
}

#[test]
fn out_of_line_values_follow_their_directory() {
    let jpeg = encode(full_model(Endian::Big));
    let tiff = Tiff::<BigEndian>::new(&jpeg);

    let exif = tiff.field(tiff.ifd0(), EXIF_IFD).unwrap();
    let table_end = exif + 2 + 12 * tiff.entry_count(exif) + 4;
    // ExposureTime has the lowest id of the directory and is out of line.
    assert_eq!(tiff.field(exif, EXPOSURE_TIME), Some(table_end));
    assert_eq!(tiff.u32(table_end), 1);
    assert_eq!(tiff.u32(table_end + 4), 250);
}

#[test]
fn ascii_values_are_padded_to_their_count() {
    let mut model = ExifData::new(Endian::Big);
    let tag = model.add_tag(ARTIST).unwrap();
    tag.set_string("Ansel Adams").unwrap();
    assert_eq!(tag.component_count(), 12);

    let jpeg = encode(model);
    let tiff = Tiff::<BigEndian>::new(&jpeg);
    let ifd0 = tiff.ifd0();
    let offset = tiff.field(ifd0, ARTIST).unwrap() as usize;
    assert_eq!(&tiff.data[offset..offset + 12], b"Ansel Adams\0");
}

#[test]
fn inline_values_are_left_aligned() {
    let mut model = ExifData::new(Endian::Little);
    model
        .add_tag(ORIENTATION)
        .unwrap()
        .set_integer(i64::from(orientation::BOTTOM_LEFT))
        .unwrap();

    let jpeg = encode(model);
    let tiff = Tiff::<LittleEndian>::new(&jpeg);
    let ifd0 = tiff.ifd0();
    let entry = (0..tiff.entry_count(ifd0))
        .map(|i| ifd0 + 2 + 12 * i)
        .find(|e| tiff.u16(*e) == ORIENTATION)
        .unwrap() as usize;
    assert_eq!(&tiff.data[entry + 8..entry + 12], &[3, 0, 0, 0]);
}

#[test]
fn gps_coordinates_are_degrees_minutes_seconds() {
    let mut model = ExifData::new(Endian::Big);
    model.add_gps_tags(37.4219, -122.0840).unwrap();
    let decoded = decode(&encode(model)).unwrap();

    let latitude = decoded.get_tag(GPS_LATITUDE).unwrap();
    assert_eq!(latitude.value_to_string(), "37/1 25/1 1884/100");
    let longitude = decoded.get_tag(GPS_LONGITUDE).unwrap();
    assert_eq!(longitude.value_to_string(), "122/1 5/1 240/100");
    assert_eq!(
        decoded.get_tag(GPS_LATITUDE_REF).unwrap().get_string().unwrap(),
        gps_ref::NORTH
    );
    assert_eq!(
        decoded.get_tag(GPS_LONGITUDE_REF).unwrap().get_string().unwrap(),
        gps_ref::WEST
    );
}

// ── stream rewriting ─────────────────────────────────────────────────

#[test]
fn existing_exif_segment_is_replaced() {
    let first = encode(full_model(Endian::Big));

    let mut replacement = ExifData::new(Endian::Little);
    replacement.add_tag(ARTIST).unwrap().set_string("me").unwrap();
    let second = write_exif(&first, replacement.clone()).unwrap();

    let exif_segments = second
        .windows(8)
        .filter(|w| w[..2] == [0xFF, 0xE1] && &w[4..] == b"Exif")
        .count();
    assert_eq!(exif_segments, 1);
    assert_eq!(decode(&second).unwrap(), replacement);
    assert!(second.ends_with(&BARE_JPEG[2..]));
}

#[test]
fn xmp_segment_is_preserved() {
    let xmp = b"http://ns.adobe.com/xap/1.0/\0<x:xmpmeta/>";
    let mut source = vec![0xFF, 0xD8, 0xFF, 0xE1];
    source.extend_from_slice(&((xmp.len() + 2) as u16).to_be_bytes());
    source.extend_from_slice(xmp);
    source.extend_from_slice(&BARE_JPEG[2..]);

    let mut model = ExifData::new(Endian::Big);
    model.add_tag(MAKE).unwrap().set_string("Fujifilm").unwrap();
    let out = write_exif(&source, model.clone()).unwrap();

    assert!(out.windows(xmp.len()).any(|w| w == xmp));
    assert_eq!(decode(&out).unwrap(), model);
}

#[test]
fn chunked_writes_match_a_single_write() {
    let source = encode(full_model(Endian::Big));
    let expected = write_exif(&source, full_model(Endian::Little)).unwrap();

    for chunk_size in [1, 3, 7, 64] {
        let mut out = ExifOutputStream::new(Vec::new(), full_model(Endian::Little));
        for chunk in source.chunks(chunk_size) {
            out.write_all(chunk).unwrap();
        }
        assert_eq!(out.into_inner(), expected, "chunk size {chunk_size}");
    }
}

// ── decoding failures and options ────────────────────────────────────

#[test]
fn jpeg_without_app1_has_no_exif() {
    assert!(decode(BARE_JPEG).is_none());

    let parser = ExifParser::parse(Cursor::new(BARE_JPEG), ParseOptions::ALL).unwrap();
    assert!(!parser.has_exif_data());
}

#[test]
fn unknown_byte_order_is_rejected() {
    let mut jpeg = encode(full_model(Endian::Big));
    jpeg[TIFF_START..TIFF_START + 2].copy_from_slice(&[0x58, 0x58]);

    let result = ExifReader::default().read(Cursor::new(jpeg));
    assert!(matches!(result, Err(ExifError::InvalidFormat(_))));
}

#[test]
fn link_after_exif_directory_is_rejected() {
    let mut jpeg = encode(full_model(Endian::Big));
    let link = {
        let tiff = Tiff::<BigEndian>::new(&jpeg);
        let exif = tiff.field(tiff.ifd0(), EXIF_IFD).unwrap();
        TIFF_START + (exif + 2 + 12 * tiff.entry_count(exif)) as usize
    };
    BigEndian::write_u32(&mut jpeg[link..link + 4], 8);

    match ExifReader::default().read(Cursor::new(jpeg)) {
        Err(ExifError::InvalidFormat(message)) => {
            assert!(message.contains("Invalid link to next IFD"))
        }
        other => panic!("expected InvalidFormat, got {other:?}"),
    }
}

#[test]
fn truncated_payload_is_unexpected_end() {
    let jpeg = encode(full_model(Endian::Big));
    let truncated = &jpeg[..TIFF_START + 40];

    let result = ExifReader::default().read(Cursor::new(truncated));
    assert!(matches!(result, Err(ExifError::UnexpectedEndOfData)));
}

#[test]
fn selective_decode_only_reports_requested_directories() {
    let jpeg = encode(full_model(Endian::Big));

    let ifd0_only = ExifReader::new(ParseOptions::IFD_0)
        .read(Cursor::new(&jpeg))
        .unwrap()
        .unwrap();
    assert!(ifd0_only.ifd(IfdKind::Ifd0).is_some());
    for kind in [IfdKind::Ifd1, IfdKind::Exif, IfdKind::Gps, IfdKind::Interoperability] {
        assert!(ifd0_only.ifd(kind).is_none(), "{kind} should not be decoded");
    }
    assert!(!ifd0_only.has_compressed_thumbnail());

    let mut parser =
        ExifParser::parse(Cursor::new(&jpeg), ParseOptions::GPS | ParseOptions::THUMBNAIL)
            .unwrap();
    let mut events = Vec::new();
    loop {
        let event = parser.next().unwrap();
        if event == ParserEvent::End {
            break;
        }
        if let ParserEvent::StartOfIfd(kind) = event {
            events.push(kind);
        }
    }
    assert_eq!(events, vec![IfdKind::Gps]);
}

#[test]
fn parser_reports_thumbnail_after_its_directory() {
    let jpeg = encode(full_model(Endian::Big));
    let mut parser = ExifParser::parse(Cursor::new(&jpeg), ParseOptions::ALL).unwrap();

    let mut seen_ifd1 = false;
    loop {
        match parser.next().unwrap() {
            ParserEvent::StartOfIfd(IfdKind::Ifd1) => seen_ifd1 = true,
            ParserEvent::CompressedImage => {
                assert!(seen_ifd1);
                let size = parser.compressed_image_size() as usize;
                assert_eq!(parser.read_bytes(size).unwrap(), THUMBNAIL);
            }
            ParserEvent::End => break,
            _ => {}
        }
    }
    assert!(seen_ifd1);
}
