//! Multi-resolution `.ico` container.
//!
//! Every entry embeds a complete PNG stream. The builder only needs each
//! stream's byte length; it never looks inside.

use thiserror::Error;

/// Sizes packed into a favicon file, smallest first.
pub const FAVICON_SIZES: [u32; 6] = [16, 32, 48, 64, 128, 256];

const HEADER_LEN: usize = 6;
const ENTRY_LEN: usize = 16;
const TYPE_ICON: u16 = 1;
const COLOR_PLANES: u16 = 1;
const BITS_PER_PIXEL: u16 = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IconError {
    #[error("icon entries must be 1..=256 px, got {0}")]
    InvalidSize(u32),

    #[error("an icon file holds at most {max} images, got {0}", max = u16::MAX)]
    TooManyEntries(usize),

    #[error("icon image of {0} bytes does not fit the container")]
    TooLarge(usize),
}

/// One square image to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconEntry {
    /// Edge length in pixels.
    pub size: u32,
    /// Encoded PNG bytes.
    pub png: Vec<u8>,
}

impl IconEntry {
    pub fn new(size: u32, png: Vec<u8>) -> Self {
        Self { size, png }
    }
}

/// Packs `entries` into an icon file, keeping their order.
pub fn build_icon_file(entries: &[IconEntry]) -> Result<Vec<u8>, IconError> {
    let count = u16::try_from(entries.len()).map_err(|_| IconError::TooManyEntries(entries.len()))?;

    let directory_len = HEADER_LEN + ENTRY_LEN * entries.len();
    let images_len: usize = entries.iter().map(|e| e.png.len()).sum();
    let mut out = Vec::with_capacity(directory_len + images_len);

    out.extend_from_slice(&0u16.to_le_bytes()); // reserved
    out.extend_from_slice(&TYPE_ICON.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());

    let mut offset = directory_len;
    for entry in entries {
        let dimension = dimension_byte(entry.size)?;
        let len = u32::try_from(entry.png.len()).map_err(|_| IconError::TooLarge(entry.png.len()))?;
        let start = u32::try_from(offset).map_err(|_| IconError::TooLarge(offset))?;

        out.push(dimension); // width
        out.push(dimension); // height
        out.push(0); // palette colors
        out.push(0); // reserved
        out.extend_from_slice(&COLOR_PLANES.to_le_bytes());
        out.extend_from_slice(&BITS_PER_PIXEL.to_le_bytes());
        out.extend_from_slice(&len.to_le_bytes());
        out.extend_from_slice(&start.to_le_bytes());

        offset += entry.png.len();
    }

    for entry in entries {
        out.extend_from_slice(&entry.png);
    }

    Ok(out)
}

/// Width/height byte of a directory entry; 256 is stored as 0.
fn dimension_byte(size: u32) -> Result<u8, IconError> {
    match size {
        256 => Ok(0),
        1..=255 => Ok(size as u8),
        _ => Err(IconError::InvalidSize(size)),
    }
}
