// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines
//!
//! # Pipeline Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐
//! │ Camera Frame │ ──▶ │  Photo Pipeline   │ ──┐
//! │   (RGBA)     │     │  - RGBA→RGB       │   │
//! └──────────────┘     │  - JPEG encoding  │   │
//!                      └───────────────────┘   │   ┌─────────────────────────┐
//!                                              ├─▶ │ Transmutation Pipeline  │ ──▶ Record Store
//! ┌──────────────┐                             │   │ upload → transform →    │
//! │ Image File   │ ────────────────────────────┘   │ synthesize → persist    │
//! └──────────────┘                                 └─────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`photo`]: Still frame encoding for camera captures
//! - [`transmutation`]: Submit-to-persist orchestration and its state machine

pub mod photo;
pub mod transmutation;
