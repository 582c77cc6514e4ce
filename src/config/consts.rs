// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Base URL of the model hosting service when none is configured.
pub const DEFAULT_MODEL_SERVICE_ENDPOINT: &str = "http://model_api:8000";
/// Upper bound for a single model service request (deploys can be slow).
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 120;
/// Concurrency used when the platform cannot report its parallelism.
pub const FALLBACK_MAX_CONCURRENCY: usize = 4;
/// Directory used by the file run store when no path is configured.
pub const DEFAULT_RUN_STORE_DIR: &str = "runs";
/// Destination of `write_csv` when no `path` parameter is given.
pub const DEFAULT_CSV_OUTPUT_PATH: &str = "output.csv";
/// Public download endpoint for Google Drive files.
pub const GOOGLE_DRIVE_DOWNLOAD_URL: &str = "https://drive.google.com/uc";
