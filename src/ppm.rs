use crate::Error;
use log::{debug, trace, warn};
use std::{
    fmt, fs,
    io::{self, Read, Write},
    path::Path,
};

/// The two PPM variants understood by this crate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// `P3`, decimal samples separated by whitespace
    Ascii,
    /// `P6`, one raw byte per sample
    Binary,
}

impl Format {
    /// The magic number that opens a stream of this format
    pub const fn magic(self) -> &'static str {
        match self {
            Self::Ascii => "P3",
            Self::Binary => "P6",
        }
    }

    fn from_magic(token: &[u8]) -> Option<Self> {
        match token {
            b"P3" => Some(Self::Ascii),
            b"P6" => Some(Self::Binary),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.magic())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Pixel {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }
}

/// A decoded PPM image
///
/// Holds exactly `width * height` pixels in row-major order. Images are
/// never modified in place: [`crate::embed`] builds a new one from an
/// existing header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    format: Format,
    width: usize,
    height: usize,
    max_value: u16,
    pixels: Vec<Pixel>,
}

impl Image {
    /// Build an image from its parts
    ///
    /// Fails if either dimension is zero or `pixels` does not hold exactly
    /// `width * height` entries.
    pub fn new(
        format: Format,
        width: usize,
        height: usize,
        max_value: u16,
        pixels: Vec<Pixel>,
    ) -> Result<Self, Error> {
        let count = pixel_count(width as i64, height as i64)?;
        if pixels.len() < count {
            return Err(Error::TruncatedPixelData {
                expected: count,
                found: pixels.len(),
            });
        }
        if pixels.len() > count {
            return Err(Error::InvalidDimensions {
                width: width as i64,
                height: height as i64,
            });
        }
        Ok(Self {
            format,
            width,
            height,
            max_value,
            pixels,
        })
    }

    /// Copy this image's header around a new pixel sequence of the same length
    pub(crate) fn with_pixels(&self, pixels: Vec<Pixel>) -> Self {
        debug_assert_eq!(pixels.len(), self.pixels.len());
        Self {
            format: self.format,
            width: self.width,
            height: self.height,
            max_value: self.max_value,
            pixels,
        }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn max_value(&self) -> u16 {
        self.max_value
    }

    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Read and decode the PPM file at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => Error::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => Error::Io(err),
        })?;
        debug!("Read {} bytes from {}", data.len(), path.display());
        Self::decode(&data)
    }

    /// Read a whole PPM stream from `reader` and decode it
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self, Error> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::decode(&data)
    }

    /// Decode a complete PPM stream
    ///
    /// # Examples
    /// ```rust
    /// # use ppmsteg::{Error, Format, Image, Pixel};
    /// # fn main() -> Result<(), Error> {
    /// let image = Image::decode(b"P3\n2 1\n255\n10 20 30 40 50 60")?;
    /// assert_eq!(image.format(), Format::Ascii);
    /// assert_eq!(image.pixels()[1], Pixel::new(40, 50, 60));
    /// # Ok(())
    /// # }
    /// ```
    pub fn decode(data: &[u8]) -> Result<Self, Error> {
        let mut tokens = Tokens::new(data);

        let magic = tokens.magic();
        let format = Format::from_magic(magic).ok_or_else(|| Error::InvalidFormat {
            magic: String::from_utf8_lossy(magic).into_owned(),
        })?;

        let width = tokens.integer().ok_or(Error::InvalidHeader { field: "width" })?;
        let height = tokens
            .integer()
            .ok_or(Error::InvalidHeader { field: "height" })?;
        let max_value = tokens
            .integer()
            .and_then(|value| u16::try_from(value).ok())
            .ok_or(Error::InvalidHeader {
                field: "maximum colour value",
            })?;

        let count = pixel_count(width, height)?;
        debug!("{format} image, {width}x{height}, max value {max_value}");
        if max_value > u16::from(u8::MAX) {
            warn!("Max value {max_value} is above 255, samples are read as single bytes");
        }

        let pixels = match format {
            Format::Ascii => read_ascii_pixels(&mut tokens, count)?,
            Format::Binary => read_binary_pixels(&mut tokens, count)?,
        };

        Ok(Self {
            format,
            width: width as usize,
            height: height as usize,
            max_value,
            pixels,
        })
    }

    /// Serialize the image in its own format
    ///
    /// `P3` samples are written as `"r g b "` per pixel followed by one
    /// newline; `P6` samples as raw bytes.
    pub fn encode(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }

    /// Write the serialized image to `writer`
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<(), Error> {
        write!(
            writer,
            "{}\n{} {}\n{}\n",
            self.format, self.width, self.height, self.max_value
        )?;
        match self.format {
            Format::Ascii => {
                for pixel in &self.pixels {
                    write!(writer, "{} {} {} ", pixel.red, pixel.green, pixel.blue)?;
                }
                writer.write_all(b"\n")?;
            }
            Format::Binary => {
                let samples = self
                    .pixels
                    .iter()
                    .flat_map(|pixel| [pixel.red, pixel.green, pixel.blue])
                    .collect::<Vec<u8>>();
                writer.write_all(&samples)?;
            }
        }
        writer.flush()?;
        Ok(())
    }
}

/// Reserve room for `count` pixels without aborting on failure
pub(crate) fn allocate_pixels(count: usize) -> Result<Vec<Pixel>, Error> {
    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(count)
        .map_err(|source| Error::AllocationFailure {
            pixels: count,
            source,
        })?;
    Ok(pixels)
}

/// Validate header dimensions and return the number of pixels they describe
fn pixel_count(width: i64, height: i64) -> Result<usize, Error> {
    let invalid = || Error::InvalidDimensions { width, height };
    if width <= 0 || height <= 0 {
        return Err(invalid());
    }
    let w = usize::try_from(width).map_err(|_| invalid())?;
    let h = usize::try_from(height).map_err(|_| invalid())?;
    let count = w.checked_mul(h).ok_or_else(invalid)?;
    // every pixel has three samples, the sample count must be addressable too
    count.checked_mul(3).ok_or_else(invalid)?;
    Ok(count)
}

fn read_ascii_pixels(tokens: &mut Tokens, count: usize) -> Result<Vec<Pixel>, Error> {
    // every sample takes at least one byte, so the stream bounds how many
    // pixels can follow no matter what the header claims
    let mut pixels = allocate_pixels(count.min(tokens.rest().len() / 3))?;
    let mut clamped = 0_usize;
    let mut sample = || {
        let value = tokens.integer()?;
        let byte = value.clamp(0, i64::from(u8::MAX)) as u8;
        if i64::from(byte) != value {
            clamped += 1;
        }
        Some(byte)
    };
    while pixels.len() < count {
        match (sample(), sample(), sample()) {
            (Some(red), Some(green), Some(blue)) => pixels.push(Pixel { red, green, blue }),
            _ => {
                return Err(Error::TruncatedPixelData {
                    expected: count,
                    found: pixels.len(),
                })
            }
        }
    }
    if clamped > 0 {
        warn!("Clamped {clamped} samples outside 0..=255");
    }
    Ok(pixels)
}

fn read_binary_pixels(tokens: &mut Tokens, count: usize) -> Result<Vec<Pixel>, Error> {
    // a single whitespace byte separates the header from the samples
    tokens.skip(1);
    let data = tokens.rest();
    let size = count * 3;
    if data.len() < size {
        return Err(Error::TruncatedPixelData {
            expected: count,
            found: data.len() / 3,
        });
    }
    if data.len() > size {
        debug!("Ignoring {} trailing bytes", data.len() - size);
    }
    let mut pixels = allocate_pixels(count)?;
    pixels.extend(data[..size].chunks_exact(3).map(|rgb| Pixel {
        red: rgb[0],
        green: rgb[1],
        blue: rgb[2],
    }));
    trace!("Read {} binary pixels", pixels.len());
    Ok(pixels)
}

/// Whitespace separated tokens over an in-memory PPM stream
struct Tokens<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Tokens<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    fn skip_spaces(&mut self) {
        while self
            .data
            .get(self.position)
            .is_some_and(|byte| byte.is_ascii_whitespace())
        {
            self.position += 1;
        }
    }

    fn skip(&mut self, count: usize) {
        self.position = (self.position + count).min(self.data.len());
    }

    /// Take up to `limit` non-whitespace bytes after skipping leading whitespace
    fn take_word(&mut self, limit: usize) -> &'a [u8] {
        self.skip_spaces();
        let start = self.position;
        while self.position - start < limit
            && self
                .data
                .get(self.position)
                .is_some_and(|byte| !byte.is_ascii_whitespace())
        {
            self.position += 1;
        }
        &self.data[start..self.position]
    }

    fn magic(&mut self) -> &'a [u8] {
        self.take_word(2)
    }

    /// Next token as a signed decimal, `None` if missing or not a number
    fn integer(&mut self) -> Option<i64> {
        let word = self.take_word(usize::MAX);
        if word.is_empty() {
            return None;
        }
        std::str::from_utf8(word).ok()?.parse().ok()
    }

    fn rest(&self) -> &'a [u8] {
        &self.data[self.position..]
    }
}
