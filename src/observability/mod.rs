// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for the resolver.
//!
//! Every diagnostic the crate emits is a typed message struct implementing
//! `Display` (the human readable line) and [`messages::StructuredLog`] (the
//! leveled `tracing` event with its fields). Call sites never format log
//! strings themselves.
//!
//! Messages are organized by subsystem:
//! * `messages::engine` - run lifecycle, plan resolution, cancellation
//! * `messages::node` - per-node lifecycle
//! * `messages::validation` - rejected submissions
//!
//! ```rust
//! use pipeline_resolver::observability::messages::node::NodeSkipped;
//! use pipeline_resolver::observability::messages::StructuredLog;
//!
//! NodeSkipped {
//!     node_id: "dict_to_list (2)",
//!     blocked_by: Some("import_from_s3 (3)"),
//! }
//! .log();
//! ```

pub mod messages;
