//! Latest-tag selection over `"<tag> <comment>"` listings.

use crate::domain::tag::{Tag, TagGrammar};
use std::cmp::Reverse;

/// One parsed line of a tag listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagCandidate {
    /// Tag text exactly as listed
    pub name: String,
    pub tag: Tag,
    pub comment: String,
}

impl TagGrammar {
    /// Parse listing lines, silently skipping blank lines and invalid tags.
    pub fn parse_candidates<'a, I>(&self, lines: I) -> Vec<TagCandidate>
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines
            .into_iter()
            .filter_map(|line| {
                let line = line.trim();
                if line.is_empty() {
                    return None;
                }
                let (name, comment) = match line.split_once(char::is_whitespace) {
                    Some((name, comment)) => (name, comment.trim()),
                    None => (line, ""),
                };
                let tag = self.parse(name).ok()?;
                Some(TagCandidate {
                    name: name.to_string(),
                    tag,
                    comment: comment.to_string(),
                })
            })
            .collect()
    }

    /// Pick the candidate with the highest release counter.
    ///
    /// See [`latest_candidate`]. `None` means no valid tag was listed.
    pub fn select_latest<'a, I>(&self, lines: I) -> Option<TagCandidate>
    where
        I: IntoIterator<Item = &'a str>,
    {
        latest_candidate(self.parse_candidates(lines))
    }
}

/// Pick the candidate with the highest release counter.
///
/// Hotfix counters are ignored (`x-3.1` ties with `x-3`); on a tie the
/// later candidate wins. A bare tag counts as release 0 and is returned only
/// when no candidate carries a release.
pub fn latest_candidate<I>(candidates: I) -> Option<TagCandidate>
where
    I: IntoIterator<Item = TagCandidate>,
{
    let mut best: Option<(u32, TagCandidate)> = None;
    let mut fallback: Option<TagCandidate> = None;

    for candidate in candidates {
        match candidate.tag.release() {
            Some(release) => {
                let replace = best
                    .as_ref()
                    .map_or(true, |(number, _)| release.number >= *number);
                if replace {
                    best = Some((release.number, candidate));
                }
            }
            None => fallback = Some(candidate),
        }
    }

    best.map(|(_, candidate)| candidate).or(fallback)
}

/// Order candidates newest first: by version, then release, then hotfix.
pub fn sort_newest_first(candidates: &mut [TagCandidate]) {
    candidates.sort_by_key(|c| {
        let release = c.tag.release();
        Reverse((
            c.tag.version().sort_key(),
            release.map_or(0, |r| r.number),
            release.and_then(|r| r.hotfix).unwrap_or(0),
        ))
    });
}
