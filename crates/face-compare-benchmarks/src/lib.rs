#![warn(missing_docs)]
//! # face-compare-benchmarks
//!
//! Synthetic inputs for the latency smoke tests.

use std::io::Cursor;

use face_compare_core::{Role, SelectedFile};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};

/// PNG-encoded gradient of the given size, wrapped as a selected file.
///
/// # Panics
/// Panics when PNG encoding fails.
pub fn synthetic_png(role: Role, width: u32, height: u32) -> SelectedFile {
    let buffer = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 251) as u8, (y % 241) as u8, ((x ^ y) % 239) as u8])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(buffer)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("synthetic png should encode");
    SelectedFile::new(role, format!("{role}.png"), "image/png", bytes)
}

/// Opaque payload of `size_bytes`, used where only the byte count matters.
pub fn synthetic_blob(role: Role, size_bytes: usize) -> SelectedFile {
    let bytes: Vec<u8> = (0..size_bytes).map(|index| (index % 253) as u8).collect();
    SelectedFile::new(role, format!("{role}.jpg"), "image/jpeg", bytes)
}
