//! Image extraction: header fields plus best-effort EXIF

use exif::{Context, In, Tag};
use fieldscan_inference::try_parse_datetime;
use image::codecs::bmp::BmpDecoder;
use image::codecs::gif::GifDecoder;
use image::codecs::jpeg::JpegDecoder;
use image::codecs::png::PngDecoder;
use image::codecs::tiff::TiffDecoder;
use image::codecs::webp::WebPDecoder;
use image::{ColorType, ImageDecoder, ImageFormat};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

use super::{
    begin_record, file_extension, file_name, finish, record_file_attributes, record_filename_tokens,
    record_path_tags, Extractor, SkipTier,
};
use crate::config::InventoryConfig;
use crate::error::{ExtractError, Result};
use crate::types::{round_to, DiscoveredItem, MetadataRecord, Value};

/// Values read from the image header.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ImageHeader {
    format: Option<ImageFormat>,
    color: ColorType,
    width: u32,
    height: u32,
}

/// Embedded capture metadata. `None` fields were not present.
#[derive(Debug, Clone, Default, PartialEq)]
struct CaptureInfo {
    make: Option<String>,
    model: Option<String>,
    datetime_original: Option<Value>,
    gps: bool,
}

pub fn extract_image(item: &DiscoveredItem, config: &InventoryConfig) -> MetadataRecord {
    let path = item.path();
    let mut record = begin_record(vec![
        ("image_path", Value::from(path.display().to_string())),
        ("file_name", Value::from(file_name(path))),
        ("file_extension", Value::from(file_extension(path))),
    ]);

    let outcome = fill_image(&mut record, path, config);
    finish(record, item, outcome, SkipTier::Never)
}

fn fill_image(record: &mut MetadataRecord, path: &Path, config: &InventoryConfig) -> Result<()> {
    record_file_attributes(record, path)?;
    record_path_tags(record, path, config);
    record_filename_tokens(record, path);

    let header = read_header(path)?;
    record.set("image_format", header.format.map(format_name));
    record.set("color_mode", color_mode(header.color));
    record.set("width_px", header.width);
    record.set("height_px", header.height);
    if header.height == 0 {
        return Err(ExtractError::ZeroHeight {
            path: path.to_path_buf(),
        });
    }
    record.set(
        "aspect_ratio",
        round_to(f64::from(header.width) / f64::from(header.height), 4),
    );

    match header.format.filter(|f| carries_exif(*f)).map(|_| read_exif(path)) {
        Some(Ok(Some(info))) => {
            record.set("has_exif", true);
            record.set("camera_make", info.make);
            record.set("camera_model", info.model);
            record.set("datetime_original", info.datetime_original.unwrap_or(Value::Null));
            record.set("gps_info", info.gps);
        }
        Some(Err(err)) => {
            debug!(path = %path.display(), error = %err, "Unreadable EXIF block");
            record.set("has_exif", Value::Unknown);
            record.set("camera_make", Value::Null);
            record.set("camera_model", Value::Null);
            record.set("datetime_original", Value::Null);
            record.set("gps_info", Value::Unknown);
        }
        Some(Ok(None)) | None => {
            record.set("has_exif", false);
            record.set("camera_make", Value::Null);
            record.set("camera_model", Value::Null);
            record.set("datetime_original", Value::Null);
            record.set("gps_info", false);
        }
    }
    Ok(())
}

fn image_error(path: &Path, source: image::ImageError) -> ExtractError {
    match source {
        image::ImageError::IoError(err) => ExtractError::from_io(path, err),
        source => ExtractError::Image {
            path: path.to_path_buf(),
            source,
        },
    }
}

fn header_of<'a, D: ImageDecoder<'a>>(decoder: D, format: ImageFormat) -> ImageHeader {
    let (width, height) = decoder.dimensions();
    ImageHeader {
        format: Some(format),
        color: decoder.color_type(),
        width,
        height,
    }
}

/// Read dimensions and color type from the header, decoding pixels only for
/// formats without a dedicated header path.
fn read_header(path: &Path) -> Result<ImageHeader> {
    let reader = image::io::Reader::open(path)
        .map_err(|err| ExtractError::from_io(path, err))?
        .with_guessed_format()
        .map_err(|err| ExtractError::from_io(path, err))?;
    let format = reader.format();

    let open = || -> Result<BufReader<File>> {
        File::open(path)
            .map(BufReader::new)
            .map_err(|err| ExtractError::from_io(path, err))
    };
    let header = match format {
        Some(ImageFormat::Png) => PngDecoder::new(open()?).map(|d| header_of(d, ImageFormat::Png)),
        Some(ImageFormat::Jpeg) => {
            JpegDecoder::new(open()?).map(|d| header_of(d, ImageFormat::Jpeg))
        }
        Some(ImageFormat::Gif) => GifDecoder::new(open()?).map(|d| header_of(d, ImageFormat::Gif)),
        Some(ImageFormat::Bmp) => BmpDecoder::new(open()?).map(|d| header_of(d, ImageFormat::Bmp)),
        Some(ImageFormat::Tiff) => {
            TiffDecoder::new(open()?).map(|d| header_of(d, ImageFormat::Tiff))
        }
        Some(ImageFormat::WebP) => {
            WebPDecoder::new(open()?).map(|d| header_of(d, ImageFormat::WebP))
        }
        _ => reader.decode().map(|img| ImageHeader {
            format,
            color: img.color(),
            width: img.width(),
            height: img.height(),
        }),
    };
    header.map_err(|err| image_error(path, err))
}

fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Png => "PNG".to_string(),
        ImageFormat::Jpeg => "JPEG".to_string(),
        ImageFormat::Gif => "GIF".to_string(),
        ImageFormat::Bmp => "BMP".to_string(),
        ImageFormat::Tiff => "TIFF".to_string(),
        ImageFormat::WebP => "WEBP".to_string(),
        other => format!("{:?}", other).to_uppercase(),
    }
}

/// Short channel-layout code, e.g. `RGB` or `LA;16`.
fn color_mode(color: ColorType) -> String {
    let mode = match color {
        ColorType::L8 => "L",
        ColorType::La8 => "LA",
        ColorType::Rgb8 => "RGB",
        ColorType::Rgba8 => "RGBA",
        ColorType::L16 => "I;16",
        ColorType::La16 => "LA;16",
        ColorType::Rgb16 => "RGB;16",
        ColorType::Rgba16 => "RGBA;16",
        ColorType::Rgb32F => "RGB;F",
        ColorType::Rgba32F => "RGBA;F",
        other => return format!("{:?}", other),
    };
    mode.to_string()
}

fn carries_exif(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Png | ImageFormat::Tiff | ImageFormat::WebP
    )
}

fn ascii_field(exif: &exif::Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        exif::Value::Ascii(parts) => parts
            .first()
            .map(|bytes| String::from_utf8_lossy(bytes).trim().to_string())
            .filter(|text| !text.is_empty()),
        _ => None,
    }
}

/// `Ok(None)` when the file has no EXIF block.
fn read_exif(path: &Path) -> std::result::Result<Option<CaptureInfo>, exif::Error> {
    let file = File::open(path)?;
    let exif = match exif::Reader::new().read_from_container(&mut BufReader::new(file)) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_))
        | Err(exif::Error::NotSupported(_))
        | Err(exif::Error::BlankValue(_)) => return Ok(None),
        Err(err) => return Err(err),
    };
    if exif.fields().next().is_none() {
        return Ok(None);
    }

    let datetime_original = ascii_field(&exif, Tag::DateTimeOriginal).map(|text| {
        try_parse_datetime(&text)
            .map(Value::DateTime)
            .unwrap_or(Value::Text(text))
    });
    let gps = exif.get_field(Tag::GPSInfoIFDPointer, In::PRIMARY).is_some()
        || exif.fields().any(|field| field.tag.context() == Context::Gps);

    Ok(Some(CaptureInfo {
        make: ascii_field(&exif, Tag::Make),
        model: ascii_field(&exif, Tag::Model),
        datetime_original,
        gps,
    }))
}

pub struct ImageExtractor<'a> {
    config: &'a InventoryConfig,
}

impl<'a> ImageExtractor<'a> {
    pub fn new(config: &'a InventoryConfig) -> Self {
        Self { config }
    }
}

impl Extractor for ImageExtractor<'_> {
    fn extract(&self, item: &DiscoveredItem) -> MetadataRecord {
        extract_image(item, self.config)
    }
}
