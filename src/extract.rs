//! Recover a message by diffing an encoded image against its original.
//!
//! Only pixels whose red least significant bit changed are noticed, and
//! only the low three bits of their red value are kept. An even message
//! byte leaves its pixel's red value even, so that pixel is invisible, and
//! the bytes that are found come back as values 0 to 7. This is a known
//! limitation of the scheme: it does not round-trip ordinary text.
use crate::{Error, Image};
use log::debug;

/// Upper bound on the number of bytes [`extract`] returns for `image`
///
/// Three channels of eight bits per pixel, divided by eight bits per byte.
pub fn message_len(image: &Image) -> usize {
    image.pixel_count() * 3 / 8
}

/// Read back the bytes hidden in `encoded`
///
/// Fails if the two images do not hold the same number of pixels.
///
/// # Examples
/// ```rust
/// # use ppmsteg::{extract, Error, Image};
/// # fn main() -> Result<(), Error> {
/// let original = Image::decode(b"P3\n3 1\n255\n0 0 0 0 0 0 0 0 0")?;
/// let encoded = Image::decode(b"P3\n3 1\n255\n0 0 0 13 0 0 0 0 0")?;
/// assert_eq!(extract(&original, &encoded)?, vec![13 & 7]);
/// # Ok(())
/// # }
/// ```
pub fn extract(original: &Image, encoded: &Image) -> Result<Vec<u8>, Error> {
    if original.pixel_count() != encoded.pixel_count() {
        return Err(Error::SizeMismatch {
            original: original.pixel_count(),
            encoded: encoded.pixel_count(),
        });
    }

    let text_len = message_len(original);
    let message: Vec<u8> = original
        .pixels()
        .iter()
        .zip(encoded.pixels())
        .filter(|(old, new)| old.red & 1 != new.red & 1)
        .map(|(_, new)| new.red & 7)
        .take(text_len)
        .collect();

    debug!("Recovered {} of at most {text_len} bytes", message.len());
    Ok(message)
}
