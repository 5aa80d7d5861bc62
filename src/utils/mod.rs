// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod template;

pub use template::{format_template, referenced_variables, substitute_variables};
