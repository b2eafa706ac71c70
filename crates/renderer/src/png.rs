//! PNG encoding for rendered figures.
//!
//! Supports two encoding modes:
//! - **Indexed PNG (color type 3)**: used when the figure has at most 256
//!   unique colors, typical of line and bar plots without antialiased fills.
//! - **RGBA PNG (color type 6)**: fallback for everything else.
//!
//! A `pHYs` chunk records the figure DPI so viewers print at the intended
//! size.

use std::collections::HashMap;
use std::io::Write;

use rayon::prelude::*;

use crate::error::{RenderError, RenderResult};

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel palette extraction
const PARALLEL_THRESHOLD: usize = 4096;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

type Palette = Vec<(u8, u8, u8, u8)>;

/// Encode straight-alpha RGBA pixels, choosing indexed output when possible.
pub fn create_png_auto(
    pixels: &[u8],
    width: usize,
    height: usize,
    dpi: Option<f32>,
) -> RenderResult<Vec<u8>> {
    check_len(pixels, width, height, 4)?;
    let palette = if width * height >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    };
    match palette {
        Some((palette, indices)) => create_png_indexed(width, height, &palette, &indices, dpi),
        None => create_png(pixels, width, height, dpi),
    }
}

fn check_len(data: &[u8], width: usize, height: usize, bpp: usize) -> RenderResult<()> {
    if width == 0 || height == 0 || data.len() != width * height * bpp {
        return Err(RenderError::Encode(format!(
            "{} bytes do not describe a {}x{} image",
            data.len(),
            width,
            height
        )));
    }
    Ok(())
}

#[inline(always)]
fn pack_color(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

#[inline(always)]
fn unpack_color(packed: u32) -> (u8, u8, u8, u8) {
    let [r, g, b, a] = packed.to_le_bytes();
    (r, g, b, a)
}

/// Palette and per-pixel indices, or `None` past 256 colors.
fn extract_palette_sequential(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let packed = pack_color(px);
        let index = match lookup.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push(unpack_color(packed));
                lookup.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }
    Some((palette, indices))
}

/// Parallel variant: collect unique colors per chunk, merge, then index.
fn extract_palette_parallel(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
    let chunk_px = (pixels.len() / 4 / rayon::current_num_threads()).max(256);

    let locals: Vec<Option<Vec<u32>>> = pixels
        .par_chunks(chunk_px * 4)
        .map(|chunk| {
            let mut seen: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            for px in chunk.chunks_exact(4) {
                seen.insert(pack_color(px), ());
                if seen.len() > MAX_PALETTE_SIZE {
                    return None;
                }
            }
            Some(seen.into_keys().collect())
        })
        .collect();

    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette = Vec::with_capacity(MAX_PALETTE_SIZE);
    for colors in locals {
        for packed in colors? {
            if lookup.contains_key(&packed) {
                continue;
            }
            if palette.len() >= MAX_PALETTE_SIZE {
                return None;
            }
            lookup.insert(packed, palette.len() as u8);
            palette.push(unpack_color(packed));
        }
    }

    let indices = pixels
        .par_chunks_exact(4)
        .map(|px| lookup.get(&pack_color(px)).copied().unwrap_or(0))
        .collect();
    Some((palette, indices))
}

fn write_header(png: &mut Vec<u8>, width: usize, height: usize, color_type: u8, dpi: Option<f32>) {
    png.extend_from_slice(&SIGNATURE);

    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&(width as u32).to_be_bytes());
    ihdr.extend_from_slice(&(height as u32).to_be_bytes());
    ihdr.extend_from_slice(&[8, color_type, 0, 0, 0]);
    write_chunk(png, b"IHDR", &ihdr);

    if let Some(dpi) = dpi.filter(|d| *d > 0.0) {
        // pixels per meter, unit specifier 1
        let ppm = (dpi / 0.0254).round() as u32;
        let mut phys = Vec::with_capacity(9);
        phys.extend_from_slice(&ppm.to_be_bytes());
        phys.extend_from_slice(&ppm.to_be_bytes());
        phys.push(1);
        write_chunk(png, b"pHYs", &phys);
    }
}

/// Indexed PNG (color type 3) from a palette and one index per pixel.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[(u8, u8, u8, u8)],
    indices: &[u8],
    dpi: Option<f32>,
) -> RenderResult<Vec<u8>> {
    check_len(indices, width, height, 1)?;
    let mut png = Vec::new();
    write_header(&mut png, width, height, 3, dpi);

    let plte: Vec<u8> = palette.iter().flat_map(|&(r, g, b, _)| [r, g, b]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.iter().any(|&(_, _, _, a)| a < 255) {
        let trns: Vec<u8> = palette.iter().map(|&(_, _, _, a)| a).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    write_chunk(&mut png, b"IDAT", &deflate_rows(indices, width, height, 1)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// RGBA PNG (color type 6).
pub fn create_png(pixels: &[u8], width: usize, height: usize, dpi: Option<f32>) -> RenderResult<Vec<u8>> {
    check_len(pixels, width, height, 4)?;
    let mut png = Vec::new();
    write_header(&mut png, width, height, 6, dpi);
    write_chunk(&mut png, b"IDAT", &deflate_rows(pixels, width, height, 4)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Prefix each scanline with filter byte 0 and zlib-compress.
fn deflate_rows(data: &[u8], width: usize, height: usize, bpp: usize) -> RenderResult<Vec<u8>> {
    let stride = width * bpp;
    let mut raw = Vec::with_capacity(height * (1 + stride));
    for row in data.chunks_exact(stride).take(height) {
        raw.push(0);
        raw.extend_from_slice(row);
    }
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(&raw)
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_palette_simple() {
        let pixels = [
            255, 0, 0, 255, // red
            0, 255, 0, 255, // green
            0, 0, 255, 255, // blue
            255, 0, 0, 255, // red again
        ];
        let (palette, indices) = extract_palette_sequential(&pixels).unwrap();
        assert_eq!(palette.len(), 3);
        assert_eq!(indices, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_parallel_matches_sequential_colors() {
        let mut pixels = Vec::with_capacity(128 * 128 * 4);
        for y in 0..128u32 {
            for x in 0..128u32 {
                let c = (((x / 8) + (y / 8)) % 50) as u8;
                pixels.extend_from_slice(&[c * 5, 100 + c * 3, 200 - c * 2, 255]);
            }
        }
        let (par_palette, par_indices) = extract_palette_parallel(&pixels).unwrap();
        let (seq_palette, _) = extract_palette_sequential(&pixels).unwrap();
        assert_eq!(par_palette.len(), seq_palette.len());
        // every index resolves back to the original pixel
        for (i, px) in pixels.chunks_exact(4).enumerate() {
            let (r, g, b, a) = par_palette[par_indices[i] as usize];
            assert_eq!([r, g, b, a], [px[0], px[1], px[2], px[3]]);
        }
    }

    #[test]
    fn test_too_many_colors() {
        let pixels: Vec<u8> = (0..300u32).flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 0, 255]).collect();
        assert!(extract_palette_sequential(&pixels).is_none());
    }

    #[test]
    fn test_phys_chunk_written() {
        let png = create_png(&[0, 0, 0, 255], 1, 1, Some(100.0)).unwrap();
        let pos = png.windows(4).position(|w| w == b"pHYs").unwrap();
        let ppm = u32::from_be_bytes([png[pos + 4], png[pos + 5], png[pos + 6], png[pos + 7]]);
        assert_eq!(ppm, 3937);
    }
}
