//! Static tag registry: for every known tag id, its owning directory, data
//! type and the component count the EXIF standard mandates (if any).
//!
//! The tables are plain constants, so lookups need no initialisation and are
//! safe from any thread. A tag id is unique across every directory except the
//! Interoperability one, which has its own small table.

use super::ifd::IfdKind;
use super::tag::DataType;

// ── TIFF (IFD0 / IFD1) tags ──────────────────────────────────────────

pub const IMAGE_WIDTH: u16 = 0x0100;
pub const IMAGE_LENGTH: u16 = 0x0101;
pub const BITS_PER_SAMPLE: u16 = 0x0102;
pub const COMPRESSION: u16 = 0x0103;
pub const PHOTOMETRIC_INTERPRETATION: u16 = 0x0106;
pub const IMAGE_DESCRIPTION: u16 = 0x010E;
pub const MAKE: u16 = 0x010F;
pub const MODEL: u16 = 0x0110;
pub const STRIP_OFFSETS: u16 = 0x0111;
pub const ORIENTATION: u16 = 0x0112;
pub const SAMPLES_PER_PIXEL: u16 = 0x0115;
pub const ROWS_PER_STRIP: u16 = 0x0116;
pub const STRIP_BYTE_COUNTS: u16 = 0x0117;
pub const X_RESOLUTION: u16 = 0x011A;
pub const Y_RESOLUTION: u16 = 0x011B;
pub const PLANAR_CONFIGURATION: u16 = 0x011C;
pub const RESOLUTION_UNIT: u16 = 0x0128;
pub const TRANSFER_FUNCTION: u16 = 0x012D;
pub const SOFTWARE: u16 = 0x0131;
pub const DATE_TIME: u16 = 0x0132;
pub const ARTIST: u16 = 0x013B;
pub const WHITE_POINT: u16 = 0x013E;
pub const PRIMARY_CHROMATICITIES: u16 = 0x013F;
pub const JPEG_INTERCHANGE_FORMAT: u16 = 0x0201;
pub const JPEG_INTERCHANGE_FORMAT_LENGTH: u16 = 0x0202;
pub const Y_CB_CR_COEFFICIENTS: u16 = 0x0211;
pub const Y_CB_CR_SUB_SAMPLING: u16 = 0x0212;
pub const Y_CB_CR_POSITIONING: u16 = 0x0213;
pub const REFERENCE_BLACK_WHITE: u16 = 0x0214;
pub const COPYRIGHT: u16 = 0x8298;
pub const EXIF_IFD: u16 = 0x8769;
pub const GPS_IFD: u16 = 0x8825;

// ── Exif tags ────────────────────────────────────────────────────────

pub const EXPOSURE_TIME: u16 = 0x829A;
pub const F_NUMBER: u16 = 0x829D;
pub const EXPOSURE_PROGRAM: u16 = 0x8822;
pub const SPECTRAL_SENSITIVITY: u16 = 0x8824;
pub const ISO_SPEED_RATINGS: u16 = 0x8827;
pub const OECF: u16 = 0x8828;
pub const EXIF_VERSION: u16 = 0x9000;
pub const DATE_TIME_ORIGINAL: u16 = 0x9003;
pub const DATE_TIME_DIGITIZED: u16 = 0x9004;
pub const COMPONENTS_CONFIGURATION: u16 = 0x9101;
pub const COMPRESSED_BITS_PER_PIXEL: u16 = 0x9102;
pub const SHUTTER_SPEED_VALUE: u16 = 0x9201;
pub const APERTURE_VALUE: u16 = 0x9202;
pub const BRIGHTNESS_VALUE: u16 = 0x9203;
pub const EXPOSURE_BIAS_VALUE: u16 = 0x9204;
pub const MAX_APERTURE_VALUE: u16 = 0x9205;
pub const SUBJECT_DISTANCE: u16 = 0x9206;
pub const METERING_MODE: u16 = 0x9207;
pub const LIGHT_SOURCE: u16 = 0x9208;
pub const FLASH: u16 = 0x9209;
pub const FOCAL_LENGTH: u16 = 0x920A;
pub const SUBJECT_AREA: u16 = 0x9214;
pub const MAKER_NOTE: u16 = 0x927C;
pub const USER_COMMENT: u16 = 0x9286;
pub const SUB_SEC_TIME: u16 = 0x9290;
pub const SUB_SEC_TIME_ORIGINAL: u16 = 0x9291;
pub const SUB_SEC_TIME_DIGITIZED: u16 = 0x9292;
pub const FLASHPIX_VERSION: u16 = 0xA000;
pub const COLOR_SPACE: u16 = 0xA001;
pub const PIXEL_X_DIMENSION: u16 = 0xA002;
pub const PIXEL_Y_DIMENSION: u16 = 0xA003;
pub const RELATED_SOUND_FILE: u16 = 0xA004;
pub const INTEROPERABILITY_IFD: u16 = 0xA005;
pub const FLASH_ENERGY: u16 = 0xA20B;
pub const SPATIAL_FREQUENCY_RESPONSE: u16 = 0xA20C;
pub const FOCAL_PLANE_X_RESOLUTION: u16 = 0xA20E;
pub const FOCAL_PLANE_Y_RESOLUTION: u16 = 0xA20F;
pub const FOCAL_PLANE_RESOLUTION_UNIT: u16 = 0xA210;
pub const SUBJECT_LOCATION: u16 = 0xA214;
pub const EXPOSURE_INDEX: u16 = 0xA215;
pub const SENSING_METHOD: u16 = 0xA217;
pub const FILE_SOURCE: u16 = 0xA300;
pub const SCENE_TYPE: u16 = 0xA301;
pub const CFA_PATTERN: u16 = 0xA302;
pub const CUSTOM_RENDERED: u16 = 0xA401;
pub const EXPOSURE_MODE: u16 = 0xA402;
pub const WHITE_BALANCE: u16 = 0xA403;
pub const DIGITAL_ZOOM_RATIO: u16 = 0xA404;
pub const FOCAL_LENGTH_IN_35_MM_FILE: u16 = 0xA405;
pub const SCENE_CAPTURE_TYPE: u16 = 0xA406;
pub const GAIN_CONTROL: u16 = 0xA407;
pub const CONTRAST: u16 = 0xA408;
pub const SATURATION: u16 = 0xA409;
pub const SHARPNESS: u16 = 0xA40A;
pub const DEVICE_SETTING_DESCRIPTION: u16 = 0xA40B;
pub const SUBJECT_DISTANCE_RANGE: u16 = 0xA40C;
pub const IMAGE_UNIQUE_ID: u16 = 0xA420;

// ── GPS tags ─────────────────────────────────────────────────────────

pub const GPS_VERSION_ID: u16 = 0x0000;
pub const GPS_LATITUDE_REF: u16 = 0x0001;
pub const GPS_LATITUDE: u16 = 0x0002;
pub const GPS_LONGITUDE_REF: u16 = 0x0003;
pub const GPS_LONGITUDE: u16 = 0x0004;
pub const GPS_ALTITUDE_REF: u16 = 0x0005;
pub const GPS_ALTITUDE: u16 = 0x0006;
pub const GPS_TIME_STAMP: u16 = 0x0007;
pub const GPS_SATELLITES: u16 = 0x0008;
pub const GPS_STATUS: u16 = 0x0009;
pub const GPS_MEASURE_MODE: u16 = 0x000A;
pub const GPS_DOP: u16 = 0x000B;
pub const GPS_SPEED_REF: u16 = 0x000C;
pub const GPS_SPEED: u16 = 0x000D;
pub const GPS_TRACK_REF: u16 = 0x000E;
pub const GPS_TRACK: u16 = 0x000F;
pub const GPS_IMG_DIRECTION_REF: u16 = 0x0010;
pub const GPS_IMG_DIRECTION: u16 = 0x0011;
pub const GPS_MAP_DATUM: u16 = 0x0012;
pub const GPS_DEST_LATITUDE_REF: u16 = 0x0013;
pub const GPS_DEST_LATITUDE: u16 = 0x0014;
pub const GPS_DEST_LONGITUDE_REF: u16 = 0x0015;
pub const GPS_DEST_LONGITUDE: u16 = 0x0016;
pub const GPS_DEST_BEARING_REF: u16 = 0x0017;
pub const GPS_DEST_BEARING: u16 = 0x0018;
pub const GPS_DEST_DISTANCE_REF: u16 = 0x0019;
pub const GPS_DEST_DISTANCE: u16 = 0x001A;
pub const GPS_PROCESSING_METHOD: u16 = 0x001B;
pub const GPS_AREA_INFORMATION: u16 = 0x001C;
pub const GPS_DATE_STAMP: u16 = 0x001D;
pub const GPS_DIFFERENTIAL: u16 = 0x001E;

// ── Interoperability tags ────────────────────────────────────────────

pub const INTEROPERABILITY_INDEX: u16 = 0x0001;

// ── Common values ────────────────────────────────────────────────────

pub mod orientation {
    pub const TOP_LEFT: u16 = 1;
    pub const TOP_RIGHT: u16 = 2;
    pub const BOTTOM_LEFT: u16 = 3;
    pub const BOTTOM_RIGHT: u16 = 4;
    pub const LEFT_TOP: u16 = 5;
    pub const RIGHT_TOP: u16 = 6;
    pub const LEFT_BOTTOM: u16 = 7;
    pub const RIGHT_BOTTOM: u16 = 8;
}

pub mod compression {
    pub const UNCOMPRESSED: u16 = 1;
    pub const JPEG: u16 = 6;
}

pub mod gps_ref {
    pub const NORTH: &str = "N";
    pub const SOUTH: &str = "S";
    pub const EAST: &str = "E";
    pub const WEST: &str = "W";
}

/// Registry entry for one tag id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagInfo {
    pub id: u16,
    pub name: &'static str,
    pub ifd: IfdKind,
    pub data_type: DataType,
    /// Component count mandated by the standard, `None` when variable.
    pub component_count: Option<u32>,
}

const fn info(
    id: u16,
    name: &'static str,
    ifd: IfdKind,
    data_type: DataType,
    component_count: Option<u32>,
) -> TagInfo {
    TagInfo {
        id,
        name,
        ifd,
        data_type,
        component_count,
    }
}

use DataType::*;
use IfdKind::{Exif, Gps, Ifd0, Interoperability};

const VAR: Option<u32> = None;

static TAGS: &[TagInfo] = &[
    info(IMAGE_WIDTH, "ImageWidth", Ifd0, UnsignedLong, Some(1)),
    info(IMAGE_LENGTH, "ImageLength", Ifd0, UnsignedLong, Some(1)),
    info(BITS_PER_SAMPLE, "BitsPerSample", Ifd0, UnsignedShort, Some(3)),
    info(COMPRESSION, "Compression", Ifd0, UnsignedShort, Some(1)),
    info(PHOTOMETRIC_INTERPRETATION, "PhotometricInterpretation", Ifd0, UnsignedShort, Some(1)),
    info(IMAGE_DESCRIPTION, "ImageDescription", Ifd0, Ascii, VAR),
    info(MAKE, "Make", Ifd0, Ascii, VAR),
    info(MODEL, "Model", Ifd0, Ascii, VAR),
    info(STRIP_OFFSETS, "StripOffsets", Ifd0, UnsignedLong, VAR),
    info(ORIENTATION, "Orientation", Ifd0, UnsignedShort, Some(1)),
    info(SAMPLES_PER_PIXEL, "SamplesPerPixel", Ifd0, UnsignedShort, Some(1)),
    info(ROWS_PER_STRIP, "RowsPerStrip", Ifd0, UnsignedLong, Some(1)),
    info(STRIP_BYTE_COUNTS, "StripByteCounts", Ifd0, UnsignedLong, VAR),
    info(X_RESOLUTION, "XResolution", Ifd0, UnsignedRational, Some(1)),
    info(Y_RESOLUTION, "YResolution", Ifd0, UnsignedRational, Some(1)),
    info(PLANAR_CONFIGURATION, "PlanarConfiguration", Ifd0, UnsignedShort, Some(1)),
    info(RESOLUTION_UNIT, "ResolutionUnit", Ifd0, UnsignedShort, Some(1)),
    info(TRANSFER_FUNCTION, "TransferFunction", Ifd0, UnsignedShort, Some(3 * 256)),
    info(SOFTWARE, "Software", Ifd0, Ascii, VAR),
    info(DATE_TIME, "DateTime", Ifd0, Ascii, Some(20)),
    info(ARTIST, "Artist", Ifd0, Ascii, VAR),
    info(WHITE_POINT, "WhitePoint", Ifd0, UnsignedRational, Some(2)),
    info(PRIMARY_CHROMATICITIES, "PrimaryChromaticities", Ifd0, UnsignedRational, Some(6)),
    info(JPEG_INTERCHANGE_FORMAT, "JPEGInterchangeFormat", Ifd0, UnsignedLong, Some(1)),
    info(JPEG_INTERCHANGE_FORMAT_LENGTH, "JPEGInterchangeFormatLength", Ifd0, UnsignedLong, Some(1)),
    info(Y_CB_CR_COEFFICIENTS, "YCbCrCoefficients", Ifd0, UnsignedRational, Some(3)),
    info(Y_CB_CR_SUB_SAMPLING, "YCbCrSubSampling", Ifd0, UnsignedShort, Some(2)),
    info(Y_CB_CR_POSITIONING, "YCbCrPositioning", Ifd0, UnsignedShort, Some(1)),
    info(REFERENCE_BLACK_WHITE, "ReferenceBlackWhite", Ifd0, UnsignedRational, Some(6)),
    info(COPYRIGHT, "Copyright", Ifd0, Ascii, VAR),
    info(EXIF_IFD, "ExifIFDPointer", Ifd0, UnsignedLong, Some(1)),
    info(GPS_IFD, "GPSInfoIFDPointer", Ifd0, UnsignedLong, Some(1)),
    // Exif
    info(EXPOSURE_TIME, "ExposureTime", Exif, UnsignedRational, Some(1)),
    info(F_NUMBER, "FNumber", Exif, UnsignedRational, Some(1)),
    info(EXPOSURE_PROGRAM, "ExposureProgram", Exif, UnsignedShort, Some(1)),
    info(SPECTRAL_SENSITIVITY, "SpectralSensitivity", Exif, Ascii, VAR),
    info(ISO_SPEED_RATINGS, "ISOSpeedRatings", Exif, UnsignedShort, VAR),
    info(OECF, "OECF", Exif, Undefined, VAR),
    info(EXIF_VERSION, "ExifVersion", Exif, Undefined, Some(4)),
    info(DATE_TIME_ORIGINAL, "DateTimeOriginal", Exif, Ascii, Some(20)),
    info(DATE_TIME_DIGITIZED, "DateTimeDigitized", Exif, Ascii, Some(20)),
    info(COMPONENTS_CONFIGURATION, "ComponentsConfiguration", Exif, Undefined, Some(4)),
    info(COMPRESSED_BITS_PER_PIXEL, "CompressedBitsPerPixel", Exif, UnsignedRational, Some(1)),
    info(SHUTTER_SPEED_VALUE, "ShutterSpeedValue", Exif, Rational, Some(1)),
    info(APERTURE_VALUE, "ApertureValue", Exif, UnsignedRational, Some(1)),
    info(BRIGHTNESS_VALUE, "BrightnessValue", Exif, Rational, Some(1)),
    info(EXPOSURE_BIAS_VALUE, "ExposureBiasValue", Exif, Rational, Some(1)),
    info(MAX_APERTURE_VALUE, "MaxApertureValue", Exif, UnsignedRational, Some(1)),
    info(SUBJECT_DISTANCE, "SubjectDistance", Exif, UnsignedRational, Some(1)),
    info(METERING_MODE, "MeteringMode", Exif, UnsignedShort, Some(1)),
    info(LIGHT_SOURCE, "LightSource", Exif, UnsignedShort, Some(1)),
    info(FLASH, "Flash", Exif, UnsignedShort, Some(1)),
    info(FOCAL_LENGTH, "FocalLength", Exif, UnsignedRational, Some(1)),
    info(SUBJECT_AREA, "SubjectArea", Exif, UnsignedShort, VAR),
    info(MAKER_NOTE, "MakerNote", Exif, Undefined, VAR),
    info(USER_COMMENT, "UserComment", Exif, Undefined, VAR),
    info(SUB_SEC_TIME, "SubSecTime", Exif, Ascii, VAR),
    info(SUB_SEC_TIME_ORIGINAL, "SubSecTimeOriginal", Exif, Ascii, VAR),
    info(SUB_SEC_TIME_DIGITIZED, "SubSecTimeDigitized", Exif, Ascii, VAR),
    info(FLASHPIX_VERSION, "FlashpixVersion", Exif, Undefined, Some(4)),
    info(COLOR_SPACE, "ColorSpace", Exif, UnsignedShort, Some(1)),
    info(PIXEL_X_DIMENSION, "PixelXDimension", Exif, UnsignedLong, Some(1)),
    info(PIXEL_Y_DIMENSION, "PixelYDimension", Exif, UnsignedLong, Some(1)),
    info(RELATED_SOUND_FILE, "RelatedSoundFile", Exif, Ascii, Some(13)),
    info(INTEROPERABILITY_IFD, "InteroperabilityIFDPointer", Exif, UnsignedLong, Some(1)),
    info(FLASH_ENERGY, "FlashEnergy", Exif, UnsignedRational, Some(1)),
    info(SPATIAL_FREQUENCY_RESPONSE, "SpatialFrequencyResponse", Exif, Undefined, VAR),
    info(FOCAL_PLANE_X_RESOLUTION, "FocalPlaneXResolution", Exif, UnsignedRational, Some(1)),
    info(FOCAL_PLANE_Y_RESOLUTION, "FocalPlaneYResolution", Exif, UnsignedRational, Some(1)),
    info(FOCAL_PLANE_RESOLUTION_UNIT, "FocalPlaneResolutionUnit", Exif, UnsignedShort, Some(1)),
    info(SUBJECT_LOCATION, "SubjectLocation", Exif, UnsignedShort, Some(2)),
    info(EXPOSURE_INDEX, "ExposureIndex", Exif, UnsignedRational, Some(1)),
    info(SENSING_METHOD, "SensingMethod", Exif, UnsignedShort, Some(1)),
    info(FILE_SOURCE, "FileSource", Exif, Undefined, Some(1)),
    info(SCENE_TYPE, "SceneType", Exif, Undefined, Some(1)),
    info(CFA_PATTERN, "CFAPattern", Exif, Undefined, VAR),
    info(CUSTOM_RENDERED, "CustomRendered", Exif, UnsignedShort, Some(1)),
    info(EXPOSURE_MODE, "ExposureMode", Exif, UnsignedShort, Some(1)),
    info(WHITE_BALANCE, "WhiteBalance", Exif, UnsignedShort, Some(1)),
    info(DIGITAL_ZOOM_RATIO, "DigitalZoomRatio", Exif, UnsignedRational, Some(1)),
    info(FOCAL_LENGTH_IN_35_MM_FILE, "FocalLengthIn35mmFilm", Exif, UnsignedShort, Some(1)),
    info(SCENE_CAPTURE_TYPE, "SceneCaptureType", Exif, UnsignedShort, Some(1)),
    info(GAIN_CONTROL, "GainControl", Exif, UnsignedShort, Some(1)),
    info(CONTRAST, "Contrast", Exif, UnsignedShort, Some(1)),
    info(SATURATION, "Saturation", Exif, UnsignedShort, Some(1)),
    info(SHARPNESS, "Sharpness", Exif, UnsignedShort, Some(1)),
    info(DEVICE_SETTING_DESCRIPTION, "DeviceSettingDescription", Exif, Undefined, VAR),
    info(SUBJECT_DISTANCE_RANGE, "SubjectDistanceRange", Exif, UnsignedShort, Some(1)),
    info(IMAGE_UNIQUE_ID, "ImageUniqueID", Exif, Ascii, Some(33)),
    // GPS
    info(GPS_VERSION_ID, "GPSVersionID", Gps, UnsignedByte, Some(4)),
    info(GPS_LATITUDE_REF, "GPSLatitudeRef", Gps, Ascii, Some(2)),
    info(GPS_LATITUDE, "GPSLatitude", Gps, UnsignedRational, Some(3)),
    info(GPS_LONGITUDE_REF, "GPSLongitudeRef", Gps, Ascii, Some(2)),
    info(GPS_LONGITUDE, "GPSLongitude", Gps, UnsignedRational, Some(3)),
    info(GPS_ALTITUDE_REF, "GPSAltitudeRef", Gps, UnsignedByte, Some(1)),
    info(GPS_ALTITUDE, "GPSAltitude", Gps, UnsignedRational, Some(1)),
    info(GPS_TIME_STAMP, "GPSTimeStamp", Gps, UnsignedRational, Some(3)),
    info(GPS_SATELLITES, "GPSSatellites", Gps, Ascii, VAR),
    info(GPS_STATUS, "GPSStatus", Gps, Ascii, Some(2)),
    info(GPS_MEASURE_MODE, "GPSMeasureMode", Gps, Ascii, Some(2)),
    info(GPS_DOP, "GPSDOP", Gps, UnsignedRational, Some(1)),
    info(GPS_SPEED_REF, "GPSSpeedRef", Gps, Ascii, Some(2)),
    info(GPS_SPEED, "GPSSpeed", Gps, UnsignedRational, Some(1)),
    info(GPS_TRACK_REF, "GPSTrackRef", Gps, Ascii, Some(2)),
    info(GPS_TRACK, "GPSTrack", Gps, UnsignedRational, Some(1)),
    info(GPS_IMG_DIRECTION_REF, "GPSImgDirectionRef", Gps, Ascii, Some(2)),
    info(GPS_IMG_DIRECTION, "GPSImgDirection", Gps, UnsignedRational, Some(1)),
    info(GPS_MAP_DATUM, "GPSMapDatum", Gps, Ascii, VAR),
    info(GPS_DEST_LATITUDE_REF, "GPSDestLatitudeRef", Gps, Ascii, Some(2)),
    info(GPS_DEST_LATITUDE, "GPSDestLatitude", Gps, UnsignedRational, Some(3)),
    info(GPS_DEST_LONGITUDE_REF, "GPSDestLongitudeRef", Gps, Ascii, Some(2)),
    info(GPS_DEST_LONGITUDE, "GPSDestLongitude", Gps, UnsignedRational, Some(3)),
    info(GPS_DEST_BEARING_REF, "GPSDestBearingRef", Gps, Ascii, Some(2)),
    info(GPS_DEST_BEARING, "GPSDestBearing", Gps, UnsignedRational, Some(1)),
    info(GPS_DEST_DISTANCE_REF, "GPSDestDistanceRef", Gps, Ascii, Some(2)),
    info(GPS_DEST_DISTANCE, "GPSDestDistance", Gps, UnsignedRational, Some(1)),
    info(GPS_PROCESSING_METHOD, "GPSProcessingMethod", Gps, Undefined, VAR),
    info(GPS_AREA_INFORMATION, "GPSAreaInformation", Gps, Undefined, VAR),
    info(GPS_DATE_STAMP, "GPSDateStamp", Gps, Ascii, Some(11)),
    info(GPS_DIFFERENTIAL, "GPSDifferential", Gps, UnsignedShort, Some(1)),
];

static INTEROPERABILITY_TAGS: &[TagInfo] = &[info(
    INTEROPERABILITY_INDEX,
    "InteroperabilityIndex",
    Interoperability,
    Ascii,
    VAR,
)];

/// Looks up a tag id in the general table.
pub fn lookup(tag_id: u16) -> Option<&'static TagInfo> {
    TAGS.iter().find(|info| info.id == tag_id)
}

/// Looks up a tag id in the Interoperability table.
pub fn lookup_interoperability(tag_id: u16) -> Option<&'static TagInfo> {
    INTEROPERABILITY_TAGS.iter().find(|info| info.id == tag_id)
}

/// Looks up the entry governing `tag_id` inside a directory of kind `ifd`.
pub fn lookup_in(tag_id: u16, ifd: IfdKind) -> Option<&'static TagInfo> {
    if ifd == IfdKind::Interoperability {
        lookup_interoperability(tag_id)
    } else {
        lookup(tag_id)
    }
}

/// Finds a tag by its registry name (case-insensitive) in either table.
pub fn lookup_by_name(name: &str) -> Option<&'static TagInfo> {
    TAGS.iter()
        .chain(INTEROPERABILITY_TAGS.iter())
        .find(|info| info.name.eq_ignore_ascii_case(name))
}

/// The canonical directory of a tag id.
pub fn ifd_for_tag(tag_id: u16) -> crate::Result<IfdKind> {
    lookup(tag_id)
        .map(|info| info.ifd)
        .ok_or(crate::ExifError::UnknownTag(tag_id))
}

/// Human-readable name of a tag id inside the given directory.
pub fn tag_name(tag_id: u16, ifd: IfdKind) -> Option<&'static str> {
    lookup_in(tag_id, ifd).map(|info| info.name)
}

/// Whether the tag carries a byte offset to another directory or to image
/// data rather than a directly usable value.
pub fn is_offset_tag(tag_id: u16) -> bool {
    matches!(
        tag_id,
        EXIF_IFD | GPS_IFD | JPEG_INTERCHANGE_FORMAT | STRIP_OFFSETS | INTEROPERABILITY_IFD
    )
}
