use serde::{Deserialize, Serialize};
use std::fmt;

use super::ifd::{IfdData, IfdKind};
use super::rational::Rational;
use super::registry::{self, gps_ref};
use super::tag::ExifTag;
use crate::Result;

/// Byte order of the TIFF payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    /// `MM`, Motorola order.
    #[default]
    Big,
    /// `II`, Intel order.
    Little,
}

impl Endian {
    /// The two marker bytes that open the TIFF header.
    pub fn marker(self) -> [u8; 2] {
        match self {
            Endian::Big => *b"MM",
            Endian::Little => *b"II",
        }
    }

    pub fn from_marker(marker: [u8; 2]) -> Option<Self> {
        match &marker {
            b"MM" => Some(Endian::Big),
            b"II" => Some(Endian::Little),
            _ => None,
        }
    }
}

impl fmt::Display for Endian {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endian::Big => f.write_str("big"),
            Endian::Little => f.write_str("little"),
        }
    }
}

/// In-memory EXIF metadata: one optional directory per [`IfdKind`], the
/// thumbnail image (compressed, or as uncompressed strips) and the byte
/// order the payload is encoded with.
///
/// Produced by [`ExifReader`](super::ExifReader) or built from scratch, then
/// handed to [`ExifOutputStream`](super::ExifOutputStream) for encoding.
///
/// Equality treats an empty directory like an absent one: the encoder always
/// emits an Exif directory, so a decoded model may carry one the source
/// model never had.
#[derive(Debug, Clone)]
pub struct ExifData {
    ifds: [Option<IfdData>; IfdKind::COUNT],
    byte_order: Endian,
    thumbnail: Option<Vec<u8>>,
    strips: Vec<Vec<u8>>,
}

impl ExifData {
    pub fn new(byte_order: Endian) -> Self {
        Self {
            ifds: Default::default(),
            byte_order,
            thumbnail: None,
            strips: Vec::new(),
        }
    }

    pub fn byte_order(&self) -> Endian {
        self.byte_order
    }

    // ── directories ──────────────────────────────────────────────────

    pub fn ifd(&self, kind: IfdKind) -> Option<&IfdData> {
        self.ifds[kind.index()].as_ref()
    }

    pub fn ifd_mut(&mut self, kind: IfdKind) -> Option<&mut IfdData> {
        self.ifds[kind.index()].as_mut()
    }

    /// Stores the directory in its slot, replacing any directory of the
    /// same kind.
    pub fn add_ifd(&mut self, ifd: IfdData) {
        let index = ifd.kind().index();
        self.ifds[index] = Some(ifd);
    }

    pub fn remove_ifd(&mut self, kind: IfdKind) -> Option<IfdData> {
        self.ifds[kind.index()].take()
    }

    pub fn get_or_create_ifd(&mut self, kind: IfdKind) -> &mut IfdData {
        self.ifds[kind.index()].get_or_insert_with(|| IfdData::new(kind))
    }

    /// Present directories in slot order.
    pub fn ifds(&self) -> impl Iterator<Item = &IfdData> + '_ {
        self.ifds.iter().flatten()
    }

    // ── tags ─────────────────────────────────────────────────────────

    /// Looks a tag up in its canonical directory. Thumbnail and
    /// interoperability tags have their own getters.
    pub fn get_tag(&self, tag_id: u16) -> Option<&ExifTag> {
        let kind = registry::ifd_for_tag(tag_id).ok()?;
        self.ifd(kind)?.get_tag(tag_id)
    }

    pub fn get_thumbnail_tag(&self, tag_id: u16) -> Option<&ExifTag> {
        self.ifd(IfdKind::Ifd1)?.get_tag(tag_id)
    }

    pub fn get_interoperability_tag(&self, tag_id: u16) -> Option<&ExifTag> {
        self.ifd(IfdKind::Interoperability)?.get_tag(tag_id)
    }

    /// Builds an empty tag and stores it in its canonical directory, replacing
    /// any existing tag with the same id.
    pub fn add_tag(&mut self, tag_id: u16) -> Result<&mut ExifTag> {
        let tag = ExifTag::build(tag_id)?;
        Ok(self.get_or_create_ifd(tag.ifd()).insert_tag(tag))
    }

    pub fn add_thumbnail_tag(&mut self, tag_id: u16) -> Result<&mut ExifTag> {
        let tag = ExifTag::build_thumbnail(tag_id)?;
        Ok(self.get_or_create_ifd(IfdKind::Ifd1).insert_tag(tag))
    }

    pub fn add_interoperability_tag(&mut self, tag_id: u16) -> Result<&mut ExifTag> {
        let tag = ExifTag::build_interoperability(tag_id)?;
        Ok(self
            .get_or_create_ifd(IfdKind::Interoperability)
            .insert_tag(tag))
    }

    /// Sets GPS latitude/longitude and their N/S/E/W references from decimal
    /// degrees. Coordinates are stored as degrees, minutes and hundredths of
    /// seconds.
    pub fn add_gps_tags(&mut self, latitude: f64, longitude: f64) -> Result<()> {
        let lat_ref = if latitude >= 0.0 {
            gps_ref::NORTH
        } else {
            gps_ref::SOUTH
        };
        let lon_ref = if longitude >= 0.0 {
            gps_ref::EAST
        } else {
            gps_ref::WEST
        };

        self.add_tag(registry::GPS_LATITUDE)?
            .set_rationals(&to_exif_lat_long(latitude))?;
        self.add_tag(registry::GPS_LONGITUDE)?
            .set_rationals(&to_exif_lat_long(longitude))?;
        self.add_tag(registry::GPS_LATITUDE_REF)?
            .set_string(lat_ref)?;
        self.add_tag(registry::GPS_LONGITUDE_REF)?
            .set_string(lon_ref)?;
        Ok(())
    }

    // ── thumbnail ────────────────────────────────────────────────────

    pub fn compressed_thumbnail(&self) -> Option<&[u8]> {
        self.thumbnail.as_deref()
    }

    pub fn set_compressed_thumbnail(&mut self, thumbnail: Vec<u8>) {
        self.thumbnail = Some(thumbnail);
    }

    pub fn has_compressed_thumbnail(&self) -> bool {
        self.thumbnail.is_some()
    }

    /// Stores strip `index`, growing the strip list with empty strips if
    /// needed.
    pub fn set_strip(&mut self, index: usize, strip: Vec<u8>) {
        if index >= self.strips.len() {
            self.strips.resize_with(index + 1, Vec::new);
        }
        self.strips[index] = strip;
    }

    pub fn strip(&self, index: usize) -> Option<&[u8]> {
        self.strips.get(index).map(Vec::as_slice)
    }

    pub fn strip_count(&self) -> usize {
        self.strips.len()
    }

    pub fn strips(&self) -> &[Vec<u8>] {
        &self.strips
    }

    pub fn has_uncompressed_strip(&self) -> bool {
        !self.strips.is_empty()
    }

    /// Drops the thumbnail image, its strips and the whole IFD1 directory.
    pub fn remove_thumbnail_data(&mut self) {
        self.thumbnail = None;
        self.strips.clear();
        self.ifds[IfdKind::Ifd1.index()] = None;
    }
}

impl PartialEq for ExifData {
    fn eq(&self, other: &Self) -> bool {
        fn non_empty(ifd: &Option<IfdData>) -> Option<&IfdData> {
            ifd.as_ref().filter(|d| !d.is_empty())
        }
        self.byte_order == other.byte_order
            && self.thumbnail == other.thumbnail
            && self.strips == other.strips
            && self
                .ifds
                .iter()
                .zip(other.ifds.iter())
                .all(|(a, b)| non_empty(a) == non_empty(b))
    }
}

/// `dd/1 mm/1 ssss/100`, rounded to the nearest hundredth of a second.
fn to_exif_lat_long(value: f64) -> [Rational; 3] {
    let hundredths = (value.abs() * 360_000.0).round() as i64;
    let degrees = hundredths / 360_000;
    let rest = hundredths % 360_000;
    [
        Rational::new(degrees, 1),
        Rational::new(rest / 6_000, 1),
        Rational::new(rest % 6_000, 100),
    ]
}
