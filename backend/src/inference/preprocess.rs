use image::DynamicImage;
use image::imageops::FilterType;
use ndarray::Array4;

pub const INPUT_SIZE: u32 = 224;
pub const CHANNELS: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Invalid image: {0}")]
    Image(#[from] image::ImageError),
    #[error("Invalid image: {0}x{1} has no pixels")]
    Empty(u32, u32),
}

pub fn decode(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    let image = image::load_from_memory(bytes)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(DecodeError::Empty(image.width(), image.height()));
    }
    Ok(image)
}

/// Resizes to `INPUT_SIZE` square, drops alpha / expands gray to RGB and lays
/// the pixels out as a `[1, H, W, C]` batch.
pub fn to_tensor(image: &DynamicImage, normalize: bool) -> Array4<f32> {
    let rgb = image
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom)
        .to_rgb8();
    let scale = if normalize { 1.0 / 255.0 } else { 1.0 };
    let side = INPUT_SIZE as usize;

    Array4::from_shape_fn((1, side, side, CHANNELS), |(_, y, x, c)| {
        f32::from(rgb.get_pixel(x as u32, y as u32)[c]) * scale
    })
}

pub fn preprocess(bytes: &[u8], normalize: bool) -> Result<Array4<f32>, DecodeError> {
    let image = decode(bytes)?;
    Ok(to_tensor(&image, normalize))
}
