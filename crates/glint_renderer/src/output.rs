//! Writing rendered images to disk.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::renderer::ImageBuffer;

/// Errors that can occur while saving an image.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Pixel buffer does not match {width}x{height}")]
    SizeMismatch { width: u32, height: u32 },
}

/// Write the image as binary PPM: a `P6 w h 255` header line followed by
/// packed RGB bytes in row-major order.
pub fn write_ppm<W: Write>(mut writer: W, image: &ImageBuffer) -> Result<(), OutputError> {
    writeln!(writer, "P6 {} {} 255", image.width, image.height)?;
    writer.write_all(&image.to_rgb())?;
    writer.flush()?;
    Ok(())
}

/// Save the image, choosing the format from the file extension.
///
/// `.ppm` is written directly; anything else goes through the `image` crate.
pub fn save_image<P: AsRef<Path>>(path: P, image: &ImageBuffer) -> Result<(), OutputError> {
    let path = path.as_ref();
    let is_ppm = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ppm"));

    if is_ppm {
        let file = File::create(path)?;
        write_ppm(BufWriter::new(file), image)?;
    } else {
        let rgb = image::RgbImage::from_raw(image.width, image.height, image.to_rgb()).ok_or(
            OutputError::SizeMismatch {
                width: image.width,
                height: image.height,
            },
        )?;
        rgb.save(path)?;
    }

    log::info!("Saved {}x{} image to {}", image.width, image.height, path.display());
    Ok(())
}
