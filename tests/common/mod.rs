//! Common test utilities and helpers for the classification client tests
//!
//! Shared helpers for building input images and endpoints.

#![allow(dead_code)]

use std::io::Cursor;
use std::net::TcpListener;
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgb, RgbImage};

/// The request path the classifier listens on.
pub const CLASSIFY_PATH: &str = "/api/1.0/classify-image";

/// Encode a gradient test image of the given size as PNG.
pub fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(w, h, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 128]));
    let mut buffer = Vec::new();
    img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .expect("encode test png");
    buffer
}

/// Write a PNG test image into `dir` and return its path.
pub fn png_file(dir: &Path, name: &str, w: u32, h: u32) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, png_bytes(w, h)).expect("write test png");
    path
}

/// An http endpoint on a local port nothing is listening on.
pub fn unreachable_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind ephemeral port");
    let port = listener.local_addr().expect("local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}
