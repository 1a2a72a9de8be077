use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use super::tag::ExifTag;

/// The five directory kinds an EXIF payload can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IfdKind {
    /// Primary image directory.
    Ifd0,
    /// Thumbnail directory, chained after IFD0.
    Ifd1,
    /// Exif private directory, reached through IFD0.
    Exif,
    /// GPS directory, reached through IFD0.
    Gps,
    /// Interoperability directory, reached through the Exif directory.
    Interoperability,
}

impl IfdKind {
    pub const COUNT: usize = 5;

    pub const ALL: [IfdKind; IfdKind::COUNT] = [
        IfdKind::Ifd0,
        IfdKind::Ifd1,
        IfdKind::Exif,
        IfdKind::Gps,
        IfdKind::Interoperability,
    ];

    /// Slot of this kind in [`ExifData`](super::ExifData)'s directory array.
    pub fn index(self) -> usize {
        match self {
            IfdKind::Ifd0 => 0,
            IfdKind::Ifd1 => 1,
            IfdKind::Exif => 2,
            IfdKind::Gps => 3,
            IfdKind::Interoperability => 4,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            IfdKind::Ifd0 => "IFD0",
            IfdKind::Ifd1 => "IFD1",
            IfdKind::Exif => "Exif",
            IfdKind::Gps => "GPS",
            IfdKind::Interoperability => "Interoperability",
        }
    }
}

impl fmt::Display for IfdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One image file directory: its tags keyed by id plus the structural link
/// to the next directory.
///
/// Tags are kept in ascending id order, which is also the order they are
/// serialized in.
#[derive(Debug, Clone)]
pub struct IfdData {
    kind: IfdKind,
    tags: BTreeMap<u16, ExifTag>,
    next_ifd_offset: u32,
}

impl IfdData {
    pub fn new(kind: IfdKind) -> Self {
        Self {
            kind,
            tags: BTreeMap::new(),
            next_ifd_offset: 0,
        }
    }

    pub fn kind(&self) -> IfdKind {
        self.kind
    }

    pub fn get_tag(&self, tag_id: u16) -> Option<&ExifTag> {
        self.tags.get(&tag_id)
    }

    pub fn get_tag_mut(&mut self, tag_id: u16) -> Option<&mut ExifTag> {
        self.tags.get_mut(&tag_id)
    }

    /// Inserts the tag, replacing any tag with the same id. Returns the
    /// replaced tag.
    pub fn set_tag(&mut self, tag: ExifTag) -> Option<ExifTag> {
        self.tags.insert(tag.tag_id(), tag)
    }

    /// Upserts the tag and hands back the stored instance.
    pub(crate) fn insert_tag(&mut self, tag: ExifTag) -> &mut ExifTag {
        match self.tags.entry(tag.tag_id()) {
            Entry::Occupied(mut slot) => {
                slot.insert(tag);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(tag),
        }
    }

    pub fn remove_tag(&mut self, tag_id: u16) -> Option<ExifTag> {
        self.tags.remove(&tag_id)
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn tags(&self) -> impl Iterator<Item = &ExifTag> + '_ {
        self.tags.values()
    }

    pub(crate) fn tags_mut(&mut self) -> impl Iterator<Item = &mut ExifTag> + '_ {
        self.tags.values_mut()
    }

    pub fn next_ifd_offset(&self) -> u32 {
        self.next_ifd_offset
    }

    pub fn set_next_ifd_offset(&mut self, offset: u32) {
        self.next_ifd_offset = offset;
    }
}

// The next-IFD link is a layout artifact of one particular encoding and is
// not part of a directory's value.
impl PartialEq for IfdData {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.tags == other.tags
    }
}
