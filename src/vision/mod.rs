pub mod client;
pub mod parse;

pub use client::{HttpVisionClient, VisionClient, VisionError};
