//! EXIF metadata codec for JPEG files.
//!
//! - [`ExifParser`]: pull parser producing [`ParserEvent`]s for the
//!   directories selected by [`ParseOptions`]
//! - [`ExifReader`] / [`read_exif`]: assemble an [`ExifData`] from a stream
//!   or a file
//! - [`ExifOutputStream`] / [`write_exif`]: rewrite a JPEG stream with a
//!   freshly encoded APP1 segment
//!
//! Tag ids, value constants and the tag table live in [`registry`].

mod data;
mod ifd;
pub mod jpeg;
mod parser;
mod rational;
mod reader;
pub mod registry;
mod stream;
mod tag;
mod writer;

pub use data::{Endian, ExifData};
pub use ifd::{IfdData, IfdKind};
pub use parser::{ExifParser, ParseOptions, ParserEvent};
pub use rational::Rational;
pub use reader::{ExifReader, read_exif};
pub use registry::TagInfo;
pub use stream::CountedReader;
pub use tag::{DATE_TIME_FORMAT, DataType, ExifTag, TagValue};
pub use writer::{ExifOutputStream, write_exif};
