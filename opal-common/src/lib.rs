// SPDX-FileCopyrightText: 2025 opal contributors
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod attribute;
pub mod shader;
pub mod types;

pub use attribute::{Attribute, AttributeType};
pub use shader::*;
pub use types::*;
