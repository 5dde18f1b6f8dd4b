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

//! Small free functions shared across the assembler's passes.

/// Ceiling division: the smallest `n` such that `n * divisor >= value`.
pub fn updiv(value: u64, divisor: u64) -> u64 {
    (value + divisor - 1) / divisor
}
