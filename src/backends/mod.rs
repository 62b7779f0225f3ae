// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer for capture devices and external services
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │          Transmutation Pipeline             │
//! └──────────┬──────────────────────┬───────────┘
//!            │                      │
//! ┌──────────┴──────────┐ ┌─────────┴───────────┐
//! │       Camera        │ │    Collaborators    │
//! │   (file source)     │ │ (storage, transform)│
//! └─────────────────────┘ └─────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`camera`]: Device capture surface and frame types
//! - [`collaborators`]: Blob storage and image transform services

pub mod camera;
pub mod collaborators;
