//! File level rendering: decode a photo, run the pipeline, encode the print.

use crate::core::error::Result;
use crate::pipeline::classic_print::ClassicPrint;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType, RgbaImage};
use log::{debug, info, warn};
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// JPEG quality used when saving prints.
pub const JPEG_QUALITY: u8 = 90;

/// Suffix appended to the photo's file stem for batch output.
pub const PRINT_SUFFIX: &str = "_print";

/// Decode a photo from disk as RGBA.
pub fn load_photo(path: impl AsRef<Path>) -> Result<RgbaImage> {
    let path = path.as_ref();
    let photo = image::open(path)?.to_rgba8();
    debug!("Loaded {} ({}x{})", path.display(), photo.width(), photo.height());
    Ok(photo)
}

/// Encode a print, choosing the format from the file extension.
///
/// JPEG output drops the alpha channel. Missing parent directories are created.
pub fn save_print(print: &RgbaImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => {
            let rgb = DynamicImage::ImageRgba8(print.clone()).to_rgb8();
            let mut output = BufWriter::new(File::create(path)?);
            let mut encoder = JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY);
            encoder.encode(&rgb, rgb.width(), rgb.height(), ExtendedColorType::Rgb8)?;
        }
        _ => print.save(path)?,
    }
    debug!("Saved {}", path.display());
    Ok(())
}

/// Where a batch render of `input` is written inside `output_dir`.
///
/// `holiday/beach.jpg` becomes `<output_dir>/beach_print.jpg`; a photo
/// without an extension is written as PNG.
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());
    let extension = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    output_dir.join(format!("{}{}.{}", stem, PRINT_SUFFIX, extension))
}

/// Render one photo file to a print file.
///
/// `width` and `height` bound the photo size before processing; pass 0
/// for either to keep the original size.
pub fn render_file(
    pipeline: &ClassicPrint,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    width: u32,
    height: u32,
    progress: &mut dyn FnMut(u32),
) -> Result<()> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let photo = load_photo(input)?;
    let print = pipeline.process_with_progress(&photo, width, height, progress)?;
    save_print(&print, output)?;
    info!("Rendered {} -> {}", input.display(), output.display());
    Ok(())
}

/// Outcome of one file in a batch render.
#[derive(Debug)]
pub struct BatchOutcome {
    /// The photo that was rendered
    pub input: PathBuf,
    /// Where the print was written, or why it was not
    pub result: Result<PathBuf>,
}

/// Render many photos into `output_dir` in parallel.
///
/// Each file succeeds or fails on its own; outcomes keep the input order.
pub fn render_batch(
    pipeline: &ClassicPrint,
    inputs: &[PathBuf],
    output_dir: &Path,
    width: u32,
    height: u32,
) -> Vec<BatchOutcome> {
    inputs
        .par_iter()
        .map(|input| {
            let output = output_path_for(input, output_dir);
            let result = render_file(pipeline, input, &output, width, height, &mut |_| {}).map(|()| output);
            if let Err(e) = &result {
                warn!("Failed to render {}: {}", input.display(), e);
            }
            BatchOutcome {
                input: input.clone(),
                result,
            }
        })
        .collect()
}
