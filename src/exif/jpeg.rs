//! JPEG marker constants. Markers are always big-endian on the wire.

pub const SOI: u16 = 0xFFD8;
pub const EOI: u16 = 0xFFD9;
pub const APP1: u16 = 0xFFE1;

const DHT: u16 = 0xFFC4;
const JPG: u16 = 0xFFC8;
const DAC: u16 = 0xFFCC;

/// `Exif\0\0`, the identifier opening an EXIF APP1 payload.
pub const EXIF_HEADER: [u8; 6] = *b"Exif\0\0";

/// Whether `marker` starts a frame (SOF0..SOF15 without DHT, JPG and DAC).
pub fn is_sof_marker(marker: u16) -> bool {
    (0xFFC0..=0xFFCF).contains(&marker) && !matches!(marker, DHT | JPG | DAC)
}
