// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod composite;
pub mod errors;
pub mod http_server;
pub mod subject;
pub mod usage;

pub use composite::{composite_handler, CompositeRequest, CompositeResponse};
pub use errors::{ApiError, ErrorResponse};
pub use http_server::{build_router, start_server, AppState};
pub use subject::resolve_subject;
pub use usage::{health_handler, usage_handler, HealthResponse, UsageResponse};
