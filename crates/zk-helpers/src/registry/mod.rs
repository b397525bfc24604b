// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

//! Circuit registry and metadata.
//!
//! The registry maps circuit names (`credential`, `presentation`) to
//! [`CircuitMetadata`]: the witness signals each circuit consumes and the
//! outputs it attests.

pub mod registry;

pub use registry::*;
