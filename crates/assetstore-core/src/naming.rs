// AssetStore - Content-addressable asset storage
// Copyright (C) 2025 AssetStore Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.

//! Rename candidates for the `Rename` conflict policy

use crate::codec::VARIANT_DELIMITER;
use std::fmt::Debug;

/// Produces alternative file IDs for a taken one
///
/// Each call returns a fresh, finite sequence. The store stops at the first
/// candidate that is free and reports exhaustion when the sequence ends.
pub trait RenameCandidateGenerator: Send + Sync + Debug {
    /// Candidates to try, in order, for `file_id`
    fn candidates(&self, file_id: &str) -> Box<dyn Iterator<Item = String> + '_>;
}

/// Appends `-1`, `-2`, ... to the stem of the last path segment
///
/// `reports/aaf4c61ddc/q1.txt` yields `reports/aaf4c61ddc/q1-1.txt`,
/// `reports/aaf4c61ddc/q1-2.txt` and so on. A variant suffix stays after
/// the counter (`photo-1__thumb.jpg`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuffixRenameGenerator {
    max_attempts: usize,
}

impl SuffixRenameGenerator {
    /// Default candidate bound
    pub const DEFAULT_MAX_ATTEMPTS: usize = 100;

    /// Generator yielding at most `max_attempts` candidates
    pub fn new(max_attempts: usize) -> Self {
        SuffixRenameGenerator { max_attempts }
    }

    /// Upper bound on the number of candidates
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }
}

impl Default for SuffixRenameGenerator {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS)
    }
}

impl RenameCandidateGenerator for SuffixRenameGenerator {
    fn candidates(&self, file_id: &str) -> Box<dyn Iterator<Item = String> + '_> {
        let (head, base) = match file_id.rfind('/') {
            Some(pos) => file_id.split_at(pos + 1),
            None => ("", file_id),
        };
        let stem_end = base.find('.').unwrap_or(base.len());
        let stem_part = &base[..stem_end];
        let insert_at = stem_part.rfind(VARIANT_DELIMITER).unwrap_or(stem_end);

        let prefix = format!("{}{}", head, &base[..insert_at]);
        let suffix = base[insert_at..].to_string();

        Box::new((1..=self.max_attempts).map(move |n| format!("{}-{}{}", prefix, n, suffix)))
    }
}
