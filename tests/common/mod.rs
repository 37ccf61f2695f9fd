//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod fake_backend;

use std::time::Duration;
use visionflow::types::Asset;

/// Create a test timeout duration
pub fn test_timeout() -> Duration {
    Duration::from_secs(5)
}

/// A small PNG-typed asset; the bytes are never decoded
pub fn photo_asset() -> Asset {
    Asset::new("photo.png", "image/png", b"\x89PNG fake".to_vec()).unwrap()
}

pub fn video_asset(name: &str) -> Asset {
    Asset::new(name, "video/mp4", vec![0, 0, 0, 0x18, b'f', b't', b'y', b'p']).unwrap()
}
