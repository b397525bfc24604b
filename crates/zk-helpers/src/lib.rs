// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

pub mod circuits;
pub mod claims;
pub mod codec;
pub mod ecdsa;
pub mod field;
pub mod registry;
pub mod sd_jwt;
pub mod witness;

pub use circuits::*;
pub use claims::*;
pub use codec::*;
pub use ecdsa::*;
pub use field::*;
pub use registry::*;
pub use sd_jwt::*;
pub use witness::*;
