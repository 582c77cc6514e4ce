// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors for operation registration and lookup.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// Two adapters were registered under the same operation name.
    #[error("operation '{0}' is already registered")]
    DuplicateOperation(String),

    /// No adapter is registered under the requested name.
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),
}
