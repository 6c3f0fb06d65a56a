use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::error::{Result, VerdantError};
use crate::grid::Crs;
use crate::io::RasterSink;
use crate::series::Raster;

// Fixed layout: 8-byte header, one 15-entry IFD, then the out-of-line
// payloads back to back, then the single pixel strip.
const IFD_OFFSET: u32 = 8;
const ENTRY_COUNT: u16 = 15;
const PIXEL_SCALE_OFFSET: u32 = 194;
const TIEPOINT_OFFSET: u32 = 218;
const GEO_KEY_OFFSET: u32 = 266;
const STRIP_OFFSET: u32 = 298;

// TIFF field types.
const TYPE_ASCII: u16 = 2;
const TYPE_SHORT: u16 = 3;
const TYPE_LONG: u16 = 4;
const TYPE_DOUBLE: u16 = 12;

/// Writes single-band float32 GeoTIFFs at the raw byte level.
///
/// Little-endian classic TIFF: one uncompressed strip of IEEE float
/// samples, georeferenced through ModelPixelScale, ModelTiepoint and a
/// minimal GeoKey directory. Missing pixels become NaN, declared to
/// readers via a GDAL_NODATA tag.
pub struct GeoTiffSink;

impl RasterSink for GeoTiffSink {
    fn write(&self, raster: &Raster, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        write_geotiff(&mut writer, raster)?;
        writer.flush()?;
        Ok(())
    }
}

// Classic TIFF carries strip byte counts as 32-bit LONGs.
fn strip_byte_count(width: usize, height: usize) -> Result<u32> {
    let bytes = width as u64 * height as u64 * 4;
    u32::try_from(bytes).map_err(|_| VerdantError::RasterTooLarge { width, height })
}

fn write_geotiff(w: &mut impl Write, raster: &Raster) -> Result<()> {
    let strip_bytes = strip_byte_count(raster.width(), raster.height())?;
    let width = raster.width() as u32;
    let height = raster.height() as u32;

    // Byte order (2 bytes), magic (2 bytes), first IFD offset (4 bytes)
    w.write_all(b"II")?;
    w.write_u16::<LittleEndian>(42)?;
    w.write_u32::<LittleEndian>(IFD_OFFSET)?;

    // IFD, entries in ascending tag order
    w.write_u16::<LittleEndian>(ENTRY_COUNT)?;
    // ImageWidth / ImageLength
    write_entry_long(w, 256, width)?;
    write_entry_long(w, 257, height)?;
    // BitsPerSample: 32
    write_entry_short(w, 258, 32)?;
    // Compression: none
    write_entry_short(w, 259, 1)?;
    // PhotometricInterpretation: BlackIsZero
    write_entry_short(w, 262, 1)?;
    // StripOffsets: one strip
    write_entry_long(w, 273, STRIP_OFFSET)?;
    // SamplesPerPixel
    write_entry_short(w, 277, 1)?;
    // RowsPerStrip: the whole image
    write_entry_long(w, 278, height)?;
    // StripByteCounts
    write_entry_long(w, 279, strip_bytes)?;
    // PlanarConfiguration: chunky
    write_entry_short(w, 284, 1)?;
    // SampleFormat: IEEE float
    write_entry_short(w, 339, 3)?;
    // ModelPixelScaleTag, 3 doubles out of line
    write_entry(w, 33550, TYPE_DOUBLE, 3, PIXEL_SCALE_OFFSET)?;
    // ModelTiepointTag, 6 doubles out of line
    write_entry(w, 33922, TYPE_DOUBLE, 6, TIEPOINT_OFFSET)?;
    // GeoKeyDirectoryTag, 16 shorts out of line
    write_entry(w, 34735, TYPE_SHORT, 16, GEO_KEY_OFFSET)?;
    // GDAL_NODATA, ASCII inline in the value field
    w.write_u16::<LittleEndian>(42113)?;
    w.write_u16::<LittleEndian>(TYPE_ASCII)?;
    w.write_u32::<LittleEndian>(4)?;
    w.write_all(b"nan\0")?;
    // No further IFDs
    w.write_u32::<LittleEndian>(0)?;

    debug_assert_eq!(IFD_OFFSET + 2 + u32::from(ENTRY_COUNT) * 12 + 4, PIXEL_SCALE_OFFSET);
    debug_assert_eq!(PIXEL_SCALE_OFFSET + 3 * 8, TIEPOINT_OFFSET);
    debug_assert_eq!(TIEPOINT_OFFSET + 6 * 8, GEO_KEY_OFFSET);
    debug_assert_eq!(GEO_KEY_OFFSET + 16 * 2, STRIP_OFFSET);

    // ModelPixelScale: (sx, sy, 0), sy positive by convention
    let transform = &raster.profile.transform;
    w.write_f64::<LittleEndian>(transform.pixel_width)?;
    w.write_f64::<LittleEndian>(transform.pixel_height.abs())?;
    w.write_f64::<LittleEndian>(0.0)?;

    // ModelTiepoint: raster (0, 0, 0) pinned to the map origin
    w.write_f64::<LittleEndian>(0.0)?;
    w.write_f64::<LittleEndian>(0.0)?;
    w.write_f64::<LittleEndian>(0.0)?;
    w.write_f64::<LittleEndian>(transform.origin_x)?;
    w.write_f64::<LittleEndian>(transform.origin_y)?;
    w.write_f64::<LittleEndian>(0.0)?;

    write_geo_keys(w, &raster.profile.crs)?;

    // Pixel strip: row-major float32, NaN where missing
    for row in 0..raster.height() {
        for col in 0..raster.width() {
            let v = if raster.valid[[row, col]] {
                raster.values[[row, col]]
            } else {
                f32::NAN
            };
            w.write_f32::<LittleEndian>(v)?;
        }
    }
    Ok(())
}

fn write_entry(w: &mut impl Write, tag: u16, field_type: u16, count: u32, value: u32) -> Result<()> {
    w.write_u16::<LittleEndian>(tag)?;
    w.write_u16::<LittleEndian>(field_type)?;
    w.write_u32::<LittleEndian>(count)?;
    w.write_u32::<LittleEndian>(value)?;
    Ok(())
}

fn write_entry_long(w: &mut impl Write, tag: u16, value: u32) -> Result<()> {
    write_entry(w, tag, TYPE_LONG, 1, value)
}

fn write_entry_short(w: &mut impl Write, tag: u16, value: u16) -> Result<()> {
    w.write_u16::<LittleEndian>(tag)?;
    w.write_u16::<LittleEndian>(TYPE_SHORT)?;
    w.write_u32::<LittleEndian>(1)?;
    // SHORT values sit in the low half of the 4-byte value field
    w.write_u16::<LittleEndian>(value)?;
    w.write_u16::<LittleEndian>(0)?;
    Ok(())
}

fn write_geo_keys(w: &mut impl Write, crs: &Crs) -> Result<()> {
    // Directory header: version 1, revision 1.0, three keys follow
    for v in [1u16, 1, 0, 3] {
        w.write_u16::<LittleEndian>(v)?;
    }
    // GTModelTypeGeoKey: 1 = projected, 2 = geographic
    let model_type: u16 = if crs.is_projected() { 1 } else { 2 };
    write_geo_key(w, 1024, model_type)?;
    // GTRasterTypeGeoKey: RasterPixelIsArea
    write_geo_key(w, 1025, 1)?;
    // ProjectedCSTypeGeoKey / GeographicTypeGeoKey carries the EPSG code
    let code_key: u16 = if crs.is_projected() { 3072 } else { 2048 };
    write_geo_key(w, code_key, crs.epsg())?;
    Ok(())
}

fn write_geo_key(w: &mut impl Write, key: u16, value: u16) -> Result<()> {
    w.write_u16::<LittleEndian>(key)?;
    // Location 0: the value lives in the entry itself
    w.write_u16::<LittleEndian>(0)?;
    w.write_u16::<LittleEndian>(1)?;
    w.write_u16::<LittleEndian>(value)?;
    Ok(())
}
