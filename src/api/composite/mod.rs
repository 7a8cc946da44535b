// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Photo composite endpoint

pub mod handler;
pub mod request;
pub mod response;

pub use handler::composite_handler;
pub use request::{CompositeRequest, MAX_IMAGE_BASE64_LEN};
pub use response::CompositeResponse;
