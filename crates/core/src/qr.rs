//! QR code rendering for profile share links.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;

use crate::error::CoreError;
use crate::types::EntityId;

/// Rendered codes are at least this many pixels on each side.
pub const QR_MIN_DIMENSION: u32 = 512;

/// Object store key of a user's cached QR image.
pub fn qr_storage_key(user_id: EntityId) -> String {
    format!("qr/{user_id}.png")
}

/// Public profile page encoded into the QR code.
pub fn profile_url(public_base_url: &str, user_id: EntityId) -> String {
    format!("{}/profile/{user_id}", public_base_url.trim_end_matches('/'))
}

/// Encode `data` as a black-on-white PNG.
pub fn render_qr_png(data: &str) -> Result<Vec<u8>, CoreError> {
    let code = QrCode::new(data.as_bytes())
        .map_err(|e| CoreError::Internal(format!("QR encoding failed: {e}")))?;

    let image = code
        .render::<Luma<u8>>()
        .min_dimensions(QR_MIN_DIMENSION, QR_MIN_DIMENSION)
        .build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(image)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| CoreError::Internal(format!("PNG encoding failed: {e}")))?;
    Ok(png)
}
