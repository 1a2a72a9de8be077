use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ifd::IfdKind;
use super::rational::Rational;
use super::registry;
use crate::{ExifError, Result};

const UNSIGNED_SHORT_MAX: i64 = u16::MAX as i64;
const UNSIGNED_LONG_MAX: i64 = u32::MAX as i64;
const LONG_MIN: i64 = i32::MIN as i64;
const LONG_MAX: i64 = i32::MAX as i64;

/// Date format of the DateTime family of ASCII tags.
pub const DATE_TIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// TIFF field types supported by EXIF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    UnsignedByte,
    Ascii,
    UnsignedShort,
    UnsignedLong,
    UnsignedRational,
    Undefined,
    Long,
    Rational,
}

impl DataType {
    /// Maps a wire type code to a data type. Codes EXIF does not use
    /// (signed byte/short, float, double) yield `None`.
    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(DataType::UnsignedByte),
            2 => Some(DataType::Ascii),
            3 => Some(DataType::UnsignedShort),
            4 => Some(DataType::UnsignedLong),
            5 => Some(DataType::UnsignedRational),
            7 => Some(DataType::Undefined),
            9 => Some(DataType::Long),
            10 => Some(DataType::Rational),
            _ => None,
        }
    }

    pub fn code(self) -> u16 {
        match self {
            DataType::UnsignedByte => 1,
            DataType::Ascii => 2,
            DataType::UnsignedShort => 3,
            DataType::UnsignedLong => 4,
            DataType::UnsignedRational => 5,
            DataType::Undefined => 7,
            DataType::Long => 9,
            DataType::Rational => 10,
        }
    }

    /// Size in bytes of one component.
    pub fn element_size(self) -> u32 {
        match self {
            DataType::UnsignedByte | DataType::Ascii | DataType::Undefined => 1,
            DataType::UnsignedShort => 2,
            DataType::UnsignedLong | DataType::Long => 4,
            DataType::UnsignedRational | DataType::Rational => 8,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DataType::UnsignedByte => "UNSIGNED_BYTE",
            DataType::Ascii => "ASCII",
            DataType::UnsignedShort => "UNSIGNED_SHORT",
            DataType::UnsignedLong => "UNSIGNED_LONG",
            DataType::UnsignedRational => "UNSIGNED_RATIONAL",
            DataType::Undefined => "UNDEFINED",
            DataType::Long => "LONG",
            DataType::Rational => "RATIONAL",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The decoded value of a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagValue {
    /// UNSIGNED_BYTE and UNDEFINED payloads.
    Bytes(Vec<u8>),
    /// ASCII payload without its trailing NUL.
    Ascii(String),
    /// UNSIGNED_SHORT and UNSIGNED_LONG components.
    Unsigned(Vec<u32>),
    /// LONG components.
    Signed(Vec<i32>),
    /// RATIONAL and UNSIGNED_RATIONAL components.
    Rationals(Vec<Rational>),
}

impl TagValue {
    fn kind_name(&self) -> &'static str {
        match self {
            TagValue::Bytes(_) => "bytes",
            TagValue::Ascii(_) => "string",
            TagValue::Unsigned(_) => "unsigned integers",
            TagValue::Signed(_) => "signed integers",
            TagValue::Rationals(_) => "rationals",
        }
    }

    fn accepts(&self, data_type: DataType) -> bool {
        matches!(
            (self, data_type),
            (TagValue::Bytes(_), DataType::UnsignedByte | DataType::Undefined)
                | (TagValue::Ascii(_), DataType::Ascii)
                | (
                    TagValue::Unsigned(_),
                    DataType::UnsignedShort | DataType::UnsignedLong
                )
                | (TagValue::Signed(_), DataType::Long)
                | (
                    TagValue::Rationals(_),
                    DataType::UnsignedRational | DataType::Rational
                )
        )
    }

    /// Component count the value occupies on the wire. ASCII counts the
    /// trailing NUL.
    fn component_count(&self) -> u32 {
        let count = match self {
            TagValue::Bytes(v) => v.len(),
            TagValue::Ascii(s) => s.len() + 1,
            TagValue::Unsigned(v) => v.len(),
            TagValue::Signed(v) => v.len(),
            TagValue::Rationals(v) => v.len(),
        };
        count as u32
    }
}

/// A single directory entry: id, type, component count and value.
///
/// Values larger than four bytes live outside the directory table; for those
/// `offset` holds their position relative to the TIFF header. Decoded tags of
/// that kind start without a value until the parser reaches the offset.
#[derive(Debug, Clone)]
pub struct ExifTag {
    tag_id: u16,
    data_type: DataType,
    ifd: IfdKind,
    component_count: u32,
    component_count_defined: bool,
    value: Option<TagValue>,
    offset: u32,
}

impl ExifTag {
    pub fn new(tag_id: u16, data_type: DataType, component_count: u32, ifd: IfdKind) -> Self {
        let component_count_defined = registry::lookup_in(tag_id, ifd)
            .map(|info| info.component_count.is_some())
            .unwrap_or(false);
        Self {
            tag_id,
            data_type,
            ifd,
            component_count,
            component_count_defined,
            value: None,
            offset: 0,
        }
    }

    /// Builds an empty tag scoped to the tag's canonical directory.
    pub fn build(tag_id: u16) -> Result<Self> {
        let info = registry::lookup(tag_id).ok_or(ExifError::UnknownTag(tag_id))?;
        Ok(Self::new(
            tag_id,
            info.data_type,
            info.component_count.unwrap_or(0),
            info.ifd,
        ))
    }

    /// Builds an IFD0 tag re-scoped to the thumbnail directory.
    pub fn build_thumbnail(tag_id: u16) -> Result<Self> {
        let info = registry::lookup(tag_id)
            .filter(|info| info.ifd == IfdKind::Ifd0)
            .ok_or(ExifError::UnknownTag(tag_id))?;
        Ok(Self::new(
            tag_id,
            info.data_type,
            info.component_count.unwrap_or(0),
            IfdKind::Ifd1,
        ))
    }

    pub fn build_interoperability(tag_id: u16) -> Result<Self> {
        let info =
            registry::lookup_interoperability(tag_id).ok_or(ExifError::UnknownTag(tag_id))?;
        Ok(Self::new(
            tag_id,
            info.data_type,
            info.component_count.unwrap_or(0),
            IfdKind::Interoperability,
        ))
    }

    pub fn tag_id(&self) -> u16 {
        self.tag_id
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn ifd(&self) -> IfdKind {
        self.ifd
    }

    pub fn component_count(&self) -> u32 {
        self.component_count
    }

    /// Encoded payload size in bytes.
    pub fn data_size(&self) -> u32 {
        self.component_count
            .saturating_mul(self.data_type.element_size())
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&TagValue> {
        self.value.as_ref()
    }

    /// Offset of an out-of-line value, relative to the TIFF header.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub(crate) fn set_offset(&mut self, offset: u32) {
        self.offset = offset;
    }

    pub fn name(&self) -> Option<&'static str> {
        registry::tag_name(self.tag_id, self.ifd)
    }

    // ── setters ──────────────────────────────────────────────────────

    /// Replaces the value after checking it against the tag's type, its
    /// mandated component count and the numeric range of the type.
    pub fn set_value(&mut self, value: TagValue) -> Result<()> {
        if !value.accepts(self.data_type) {
            return Err(self.type_mismatch(value.kind_name()));
        }
        let count = value.component_count();
        self.check_component_count(count)?;
        self.check_range(&value)?;
        self.value = Some(value);
        self.component_count = count;
        Ok(())
    }

    pub fn set_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.set_value(TagValue::Bytes(bytes.to_vec()))
    }

    pub fn set_string(&mut self, value: &str) -> Result<()> {
        self.set_value(TagValue::Ascii(value.to_string()))
    }

    /// Sets UNSIGNED_SHORT, UNSIGNED_LONG or LONG components, checking that
    /// every value fits the tag's type.
    pub fn set_integers(&mut self, values: &[i64]) -> Result<()> {
        let (min, max) = match self.data_type {
            DataType::UnsignedShort => (0, UNSIGNED_SHORT_MAX),
            DataType::UnsignedLong => (0, UNSIGNED_LONG_MAX),
            DataType::Long => (LONG_MIN, LONG_MAX),
            _ => return Err(self.type_mismatch("integers")),
        };
        self.check_component_count(values.len() as u32)?;
        if let Some(bad) = values.iter().find(|v| **v < min || **v > max) {
            return Err(self.overflow(bad));
        }
        let value = if self.data_type == DataType::Long {
            TagValue::Signed(values.iter().map(|v| *v as i32).collect())
        } else {
            TagValue::Unsigned(values.iter().map(|v| *v as u32).collect())
        };
        self.set_value(value)
    }

    pub fn set_integer(&mut self, value: i64) -> Result<()> {
        self.set_integers(&[value])
    }

    pub fn set_rationals(&mut self, values: &[Rational]) -> Result<()> {
        self.set_value(TagValue::Rationals(values.to_vec()))
    }

    pub fn set_rational(&mut self, value: Rational) -> Result<()> {
        self.set_rationals(&[value])
    }

    /// Sets an ASCII date/time tag in the `YYYY:MM:DD HH:MM:SS` layout.
    pub fn set_time(&mut self, time: NaiveDateTime) -> Result<()> {
        self.set_string(&time.format(DATE_TIME_FORMAT).to_string())
    }

    /// Stores a value without validation. Used by the parser, which must keep
    /// whatever the file holds, and by the writer for pointer fix-ups.
    ///
    /// Text that no longer fits the count with its NUL (non-UTF-8 bytes
    /// decode to wider replacement characters) grows the count.
    pub(crate) fn set_value_unchecked(&mut self, value: TagValue) {
        if let TagValue::Ascii(text) = &value {
            let needed = text.len() as u32 + 1;
            if !text.is_empty() && needed > self.component_count {
                self.component_count = needed;
            }
        }
        self.value = Some(value);
    }

    fn check_component_count(&self, given: u32) -> Result<()> {
        if self.component_count_defined && self.component_count != given {
            return Err(ExifError::ComponentCountViolation {
                tag: self.tag_id,
                required: self.component_count,
                given,
            });
        }
        Ok(())
    }

    fn check_range(&self, value: &TagValue) -> Result<()> {
        match (value, self.data_type) {
            (TagValue::Unsigned(values), DataType::UnsignedShort) => {
                if let Some(bad) = values.iter().find(|v| i64::from(**v) > UNSIGNED_SHORT_MAX) {
                    return Err(self.overflow(bad));
                }
            }
            (TagValue::Rationals(values), DataType::UnsignedRational) => {
                let out = |v: i64| !(0..=UNSIGNED_LONG_MAX).contains(&v);
                if let Some(bad) = values
                    .iter()
                    .find(|r| out(r.numerator()) || out(r.denominator()))
                {
                    return Err(self.overflow(bad));
                }
            }
            (TagValue::Rationals(values), DataType::Rational) => {
                let out = |v: i64| !(LONG_MIN..=LONG_MAX).contains(&v);
                if let Some(bad) = values
                    .iter()
                    .find(|r| out(r.numerator()) || out(r.denominator()))
                {
                    return Err(self.overflow(bad));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn type_mismatch(&self, found: &'static str) -> ExifError {
        ExifError::TypeMismatch {
            tag: self.tag_id,
            expected: self.data_type,
            found,
        }
    }

    fn overflow(&self, value: &dyn fmt::Display) -> ExifError {
        ExifError::ValueOverflow {
            tag: self.tag_id,
            value: value.to_string(),
            data_type: self.data_type,
        }
    }

    // ── accessors ────────────────────────────────────────────────────

    fn expect_type(&self, accepted: &[DataType], found: &'static str) -> Result<()> {
        if accepted.contains(&self.data_type) {
            Ok(())
        } else {
            Err(self.type_mismatch(found))
        }
    }

    fn missing(&self, index: usize) -> ExifError {
        ExifError::MissingValue {
            tag: self.tag_id,
            index,
        }
    }

    pub fn get_unsigned_short(&self, index: usize) -> Result<u16> {
        self.expect_type(&[DataType::UnsignedShort], "UNSIGNED_SHORT request")?;
        match &self.value {
            Some(TagValue::Unsigned(v)) => v
                .get(index)
                .map(|x| *x as u16)
                .ok_or_else(|| self.missing(index)),
            _ => Err(self.missing(index)),
        }
    }

    pub fn get_unsigned_long(&self, index: usize) -> Result<u32> {
        self.expect_type(&[DataType::UnsignedLong], "UNSIGNED_LONG request")?;
        match &self.value {
            Some(TagValue::Unsigned(v)) => v.get(index).copied().ok_or_else(|| self.missing(index)),
            _ => Err(self.missing(index)),
        }
    }

    pub fn get_long(&self, index: usize) -> Result<i32> {
        self.expect_type(&[DataType::Long], "LONG request")?;
        match &self.value {
            Some(TagValue::Signed(v)) => v.get(index).copied().ok_or_else(|| self.missing(index)),
            _ => Err(self.missing(index)),
        }
    }

    pub fn get_rational(&self, index: usize) -> Result<Rational> {
        self.expect_type(
            &[DataType::Rational, DataType::UnsignedRational],
            "RATIONAL request",
        )?;
        match &self.value {
            Some(TagValue::Rationals(v)) => {
                v.get(index).copied().ok_or_else(|| self.missing(index))
            }
            _ => Err(self.missing(index)),
        }
    }

    pub fn get_string(&self) -> Result<&str> {
        self.expect_type(&[DataType::Ascii], "ASCII request")?;
        match &self.value {
            Some(TagValue::Ascii(s)) => Ok(s),
            _ => Err(self.missing(0)),
        }
    }

    pub fn get_bytes(&self) -> Result<&[u8]> {
        self.expect_type(
            &[DataType::UnsignedByte, DataType::Undefined],
            "BYTE request",
        )?;
        match &self.value {
            Some(TagValue::Bytes(b)) => Ok(b),
            _ => Err(self.missing(0)),
        }
    }

    /// Component `index` of an UNSIGNED_SHORT or UNSIGNED_LONG tag, the two
    /// types offsets and sizes are stored with.
    pub(crate) fn unsigned_component(&self, index: usize) -> Option<u32> {
        match &self.value {
            Some(TagValue::Unsigned(v)) => v.get(index).copied(),
            _ => None,
        }
    }

    /// Renders the value the way `exiftool -n` style dumps do: hex bytes,
    /// the string itself, or space-separated numbers and fractions.
    pub fn value_to_string(&self) -> String {
        match &self.value {
            None => String::new(),
            Some(TagValue::Bytes(b)) => b
                .iter()
                .map(|x| format!("{x:02x}"))
                .collect::<Vec<_>>()
                .join(" "),
            Some(TagValue::Ascii(s)) => s.clone(),
            Some(TagValue::Unsigned(v)) => join(v),
            Some(TagValue::Signed(v)) => join(v),
            Some(TagValue::Rationals(v)) => join(v),
        }
    }
}

fn join<T: fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

// Offsets are a property of one encoding, not of the tag's value.
impl PartialEq for ExifTag {
    fn eq(&self, other: &Self) -> bool {
        self.tag_id == other.tag_id
            && self.data_type == other.data_type
            && self.ifd == other.ifd
            && self.component_count == other.component_count
            && self.value == other.value
    }
}
