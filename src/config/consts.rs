// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Separator between entity names and the literal name in a path
pub const DEFAULT_ENTITY_MARKER: &str = ".";
/// Maximum number of nested feedback hops within one delivery
pub const DEFAULT_MAX_FEEDBACK_DEPTH: usize = 16;
/// `flush_with` keyword for flushing at the end of the record
pub const RECORD_FLUSH_KEYWORD: &str = "record";
/// Path under which the record identifier is dispatched at `start_record`
pub const RECORD_ID_PATH: &str = "_id";
/// Output names starting with this character are fed back into the registry
pub const FEEDBACK_CHAR: char = '@';
/// Escapes a leading feedback character in output names
pub const ESCAPE_CHAR: char = '\\';
