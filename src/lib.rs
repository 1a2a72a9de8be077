//! # exif-codec
//!
//! Streaming EXIF codec for JPEG files: pull-parse the directories you care
//! about, edit tags in memory, and write the file back with a re-encoded APP1
//! segment whose offsets are all recomputed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use exif_codec::exif::{read_exif, registry, write_exif, Endian, ExifData};
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let path = Path::new("photo.jpg");
//!
//!     // 1. Read the existing metadata (None if the file has no EXIF)
//!     let mut exif = read_exif(path)?.unwrap_or_else(|| ExifData::new(Endian::Big));
//!
//!     // 2. Edit it
//!     exif.add_tag(registry::ARTIST)?.set_string("Jane Doe")?;
//!     exif.add_gps_tags(37.4219, -122.0840)?;
//!
//!     // 3. Write it back
//!     let jpeg = std::fs::read(path)?;
//!     std::fs::write(path, write_exif(&jpeg, exif)?)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Event-Level Usage
//!
//! [`ExifParser`](exif::ExifParser) exposes the decoder directly. Only the
//! selected directories are reported; the others are skipped on disk.
//!
//! ```rust,no_run
//! use exif_codec::exif::{ExifParser, ParseOptions, ParserEvent};
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! fn main() -> exif_codec::Result<()> {
//!     let file = BufReader::new(File::open("photo.jpg")?);
//!     let mut parser = ExifParser::parse(file, ParseOptions::IFD_0 | ParseOptions::GPS)?;
//!     loop {
//!         match parser.next()? {
//!             ParserEvent::NewTag => {
//!                 let Some(tag) = parser.tag().cloned() else { continue };
//!                 if tag.has_value() {
//!                     println!("{:?}: {}", tag.name(), tag.value_to_string());
//!                 } else {
//!                     parser.register_for_tag_value(&tag);
//!                 }
//!             }
//!             ParserEvent::ValueOfRegisteredTag => {
//!                 if let Some(tag) = parser.tag() {
//!                     println!("{:?}: {}", tag.name(), tag.value_to_string());
//!                 }
//!             }
//!             ParserEvent::End => break,
//!             _ => {}
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`exif`]: the codec: parser, reader, writer, in-memory model, tag registry
//! - [`config`]: configuration types and loading/saving
//! - [`pipeline`]: file-level read → edit → write processing
//! - [`error`]: error type of the codec

pub mod config;
pub mod error;
pub mod exif;
pub mod pipeline;

pub use error::{ExifError, Result};
