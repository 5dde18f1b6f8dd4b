/*
Copyright 2025 Connor Nolan

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use thiserror::Error;

/// Every error the assembler can raise. All variants are fatal: the first
/// one encountered aborts the current pass and is handed back to the caller.
#[derive(Error, Debug, PartialEq, Eq, Clone)]
pub enum AssemblyError {
    #[error("Structural error: {reason}")]
    Structural { reason: String },

    #[error("Encoding error: {reason}")]
    Encoding { reason: String },

    #[error("Symbol error: {reason}")]
    Symbol { reason: String },

    #[error("Debug info error: {reason}")]
    Debug { reason: String },

    #[error("Input error: {reason}")]
    Input { reason: String },
}

impl AssemblyError {
    pub fn structural(reason: impl Into<String>) -> Self {
        Self::Structural { reason: reason.into() }
    }

    pub fn encoding(reason: impl Into<String>) -> Self {
        Self::Encoding { reason: reason.into() }
    }

    pub fn symbol(reason: impl Into<String>) -> Self {
        Self::Symbol { reason: reason.into() }
    }

    pub fn debug(reason: impl Into<String>) -> Self {
        Self::Debug { reason: reason.into() }
    }

    pub fn input(reason: impl Into<String>) -> Self {
        Self::Input { reason: reason.into() }
    }
}
