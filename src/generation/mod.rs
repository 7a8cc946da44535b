// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Composite generation via the external image API, plus watermarking

pub mod client;
pub mod watermark;

pub use client::{CompositeClient, CompositeJob, GenerationOutcome, ImageGenerator};
pub use watermark::{apply_watermark, WatermarkError};
