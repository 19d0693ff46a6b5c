//! Tile sheet codec.
//!
//! Converts a 128x128 sprite sheet (16 columns of 8x8 tiles) into the
//! runtime's tile page layout: pixels grouped by tile, BGRA channel order.

use image::RgbaImage;

use crate::error::{PackError, Result};

/// Side length of one tile in pixels.
pub const TILE_SIZE: u32 = 8;

/// Tiles per sheet row.
pub const SHEET_COLUMNS: u32 = 16;

/// Required sheet width and height in pixels.
pub const SHEET_SIZE: u32 = TILE_SIZE * SHEET_COLUMNS;

/// Tiles in one sheet.
pub const TILE_COUNT: u32 = SHEET_COLUMNS * SHEET_COLUMNS;

/// Bytes produced for one sheet.
pub const ENCODED_LEN: usize = (TILE_COUNT * TILE_SIZE * TILE_SIZE * 4) as usize;

/// Decode an image file and encode it as a tile page.
pub fn encode(source: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(source)
        .map_err(|e| PackError::Decode {
            message: format!("Unreadable image data: {}", e),
            help: Some("Tile sheets must be PNG images".to_string()),
        })?
        .to_rgba8();

    encode_image(&img)
}

/// Encode an RGBA sheet in tile-major BGRA order.
pub fn encode_image(img: &RgbaImage) -> Result<Vec<u8>> {
    let (width, height) = img.dimensions();
    if width != SHEET_SIZE || height != SHEET_SIZE {
        return Err(PackError::Decode {
            message: format!(
                "Tile sheet is {}x{}, expected {}x{}",
                width, height, SHEET_SIZE, SHEET_SIZE
            ),
            help: Some(format!(
                "Sheets hold {} tiles of {}x{} pixels in {} columns",
                TILE_COUNT, TILE_SIZE, TILE_SIZE, SHEET_COLUMNS
            )),
        });
    }

    let mut out = Vec::with_capacity(ENCODED_LEN);

    for tile in 0..TILE_COUNT {
        let tile_row = tile / SHEET_COLUMNS;
        let tile_col = tile % SHEET_COLUMNS;

        for y in 0..TILE_SIZE {
            for x in 0..TILE_SIZE {
                let [r, g, b, a] = img
                    .get_pixel(tile_col * TILE_SIZE + x, tile_row * TILE_SIZE + y)
                    .0;
                out.extend_from_slice(&[b, g, r, a]);
            }
        }
    }

    Ok(out)
}

/// Byte offset of a tile's first pixel in the encoded output.
pub fn tile_offset(tile: u32) -> usize {
    (tile * TILE_SIZE * TILE_SIZE * 4) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, ImageFormat, Rgba};
    use std::io::Cursor;

    /// Each tile filled with a solid colour derived from its index.
    fn tile_colour(tile: u32) -> [u8; 4] {
        [tile as u8, 255 - tile as u8, (tile * 7) as u8, 200]
    }

    fn solid_tile_sheet() -> RgbaImage {
        ImageBuffer::from_fn(SHEET_SIZE, SHEET_SIZE, |x, y| {
            let tile = (y / TILE_SIZE) * SHEET_COLUMNS + x / TILE_SIZE;
            Rgba(tile_colour(tile))
        })
    }

    fn png_bytes(img: &RgbaImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_encoded_length() {
        let out = encode_image(&solid_tile_sheet()).unwrap();
        assert_eq!(out.len(), ENCODED_LEN);
        assert_eq!(ENCODED_LEN, 65536);
    }

    #[test]
    fn test_tiles_are_contiguous_blocks() {
        let out = encode_image(&solid_tile_sheet()).unwrap();

        for tile in 0..TILE_COUNT {
            let [r, g, b, a] = tile_colour(tile);
            let start = tile_offset(tile);
            let block = &out[start..start + 64 * 4];
            for pixel in block.chunks_exact(4) {
                assert_eq!(pixel, [b, g, r, a], "tile {}", tile);
            }
        }
    }

    #[test]
    fn test_tile_major_differs_from_raster_order() {
        let out = encode_image(&solid_tile_sheet()).unwrap();

        // Raster order would put tile 1's colour at pixel 8 of the first row;
        // tile-major order still has tile 0 there.
        let [r, g, b, a] = tile_colour(0);
        assert_eq!(&out[8 * 4..9 * 4], [b, g, r, a]);

        // Tile 16 starts the second tile row, 16 tiles in.
        let [r, g, b, a] = tile_colour(16);
        assert_eq!(&out[tile_offset(16)..tile_offset(16) + 4], [b, g, r, a]);
    }

    #[test]
    fn test_intra_tile_pixel_order() {
        // Distinct pixels inside tile 17 (row 1, col 1)
        let img = ImageBuffer::from_fn(SHEET_SIZE, SHEET_SIZE, |x, y| {
            if (8..16).contains(&x) && (8..16).contains(&y) {
                Rgba([(x - 8) as u8, (y - 8) as u8, 0, 255])
            } else {
                Rgba([0, 0, 0, 0])
            }
        });
        let out = encode_image(&img).unwrap();

        let start = tile_offset(17);
        // pixel (intra x=3, intra y=5) is index 5*8+3
        let offset = start + (5 * 8 + 3) * 4;
        assert_eq!(&out[offset..offset + 4], [0, 5, 3, 255]);
    }

    #[test]
    fn test_encode_from_png() {
        let bytes = png_bytes(&solid_tile_sheet());
        let out = encode(&bytes).unwrap();
        assert_eq!(out, encode_image(&solid_tile_sheet()).unwrap());
    }

    #[test]
    fn test_rejects_wrong_dimensions() {
        let img: RgbaImage = ImageBuffer::new(64, 128);
        let err = encode_image(&img).unwrap_err();
        assert!(err.to_string().contains("64x128"));
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            encode(b"definitely not a png"),
            Err(PackError::Decode { .. })
        ));
    }
}
