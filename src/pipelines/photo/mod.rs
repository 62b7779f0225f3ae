// SPDX-License-Identifier: MPL-2.0

//! Still photo pipeline
//!
//! ```text
//! Camera Backend → Still Frame → RGB Conversion → JPEG Encoding
//! ```
//!
//! The output bytes are handed to the transmutation pipeline exactly like an
//! uploaded file.

pub mod encoding;

pub use encoding::PhotoEncoder;
