use crate::{bits::BitSource, ppm::allocate_pixels, Error, Image};
use log::debug;

/// Hide `message` in the red channel of a copy of `original`
///
/// Every pixel draws one bit from `bits`. On a 1, while message bytes
/// remain, a pixel with an even red value gets `red | byte` and the next
/// byte becomes current; a pixel with an odd red value is left alone and
/// the same byte waits for a later pixel. Green and blue are never
/// touched.
///
/// Bytes left over once the pixels run out are dropped without error.
///
/// # Examples
/// ```rust
/// # use ppmsteg::{embed, CycleBits, Error, Image};
/// # fn main() -> Result<(), Error> {
/// let original = Image::decode(b"P3\n2 1\n255\n64 0 0 64 0 0")?;
/// let encoded = embed(&original, b"!", &mut CycleBits::alternating())?;
/// assert_eq!(encoded.pixels()[0].red, 64);
/// assert_eq!(encoded.pixels()[1].red, 64 | b'!');
/// # Ok(())
/// # }
/// ```
pub fn embed<B: BitSource + ?Sized>(
    original: &Image,
    message: &[u8],
    bits: &mut B,
) -> Result<Image, Error> {
    let mut pixels = allocate_pixels(original.pixel_count())?;
    let mut text_index = 0;

    for pixel in original.pixels() {
        let mut pixel = *pixel;
        if bits.next_bit() && text_index < message.len() && pixel.red % 2 == 0 {
            pixel.red |= message[text_index];
            text_index += 1;
        }
        pixels.push(pixel);
    }

    if text_index < message.len() {
        debug!(
            "Embedded {text_index} of {} message bytes, the rest did not fit",
            message.len()
        );
    } else {
        debug!("Embedded all {} message bytes", message.len());
    }

    Ok(original.with_pixels(pixels))
}

#[cfg(test)]
mod test {
    use super::embed;
    use crate::{BitSource, CycleBits, Format, Image, Pixel, RandomBits};

    fn image(reds: &[u8]) -> Image {
        let pixels = reds.iter().map(|&red| Pixel::new(red, 7, 9)).collect();
        Image::new(Format::Binary, reds.len(), 1, 255, pixels).unwrap()
    }

    #[test]
    fn alternating_bits() {
        let original = image(&[2, 4, 6, 8]);
        let encoded = embed(&original, b"AB", &mut CycleBits::alternating()).unwrap();
        let reds: Vec<u8> = encoded.pixels().iter().map(|p| p.red).collect();
        assert_eq!(reds, vec![2, 4 | b'A', 6, 8 | b'B']);
        assert!(encoded.pixels().iter().all(|p| p.green == 7 && p.blue == 9));
    }

    #[test]
    fn header_is_copied() {
        let original = Image::decode(b"P3\n2 2\n200\n0 0 0 0 0 0 0 0 0 0 0 0").unwrap();
        let encoded = embed(&original, b"hi", &mut CycleBits::ones()).unwrap();
        assert_eq!(encoded.format(), Format::Ascii);
        assert_eq!((encoded.width(), encoded.height()), (2, 2));
        assert_eq!(encoded.max_value(), 200);
    }

    #[test]
    fn odd_red_is_skipped_without_advancing() {
        let original = image(&[3, 4, 5, 6]);
        let encoded = embed(&original, b"\x01\x10", &mut CycleBits::ones()).unwrap();
        let reds: Vec<u8> = encoded.pixels().iter().map(|p| p.red).collect();
        assert_eq!(reds, vec![3, 4 | 0x01, 5, 6 | 0x10]);
    }

    #[test]
    fn zero_bits_embed_nothing() {
        let original = image(&[0, 2, 4]);
        let encoded = embed(&original, b"xyz", &mut CycleBits::new([false])).unwrap();
        assert_eq!(encoded, original);
    }

    #[test]
    fn long_message_is_truncated() {
        let original = image(&[0, 0]);
        let encoded = embed(&original, b"abcdef", &mut CycleBits::ones()).unwrap();
        let reds: Vec<u8> = encoded.pixels().iter().map(|p| p.red).collect();
        assert_eq!(reds, vec![b'a', b'b']);
    }

    #[test]
    fn empty_message_copies_pixels() {
        let original = image(&[10, 11, 12]);
        let encoded = embed(&original, b"", &mut RandomBits::seeded(7)).unwrap();
        assert_eq!(encoded, original);
    }

    #[test]
    fn one_draw_per_pixel() {
        struct Counting(usize);
        impl BitSource for Counting {
            fn next_bit(&mut self) -> bool {
                self.0 += 1;
                true
            }
        }
        let mut bits = Counting(0);
        embed(&image(&[0; 5]), b"a", &mut bits).unwrap();
        assert_eq!(bits.0, 5);
    }
}
