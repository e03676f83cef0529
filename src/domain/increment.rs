use crate::domain::tag::{tag_prefix, Release, Tag, TagGrammar};
use crate::error::{Result, TagError};

impl TagGrammar {
    /// Next release or hotfix tag after `tag`, keeping its `[service_]env_version` prefix.
    ///
    /// - release: `stg6_1.2-0` -> `stg6_1.2-1`, and `stg6_1.2-1.2` -> `stg6_1.2-2`
    /// - hotfix:  `stg6_1.2-0` -> `stg6_1.2-0.1`, and `stg6_1.2-1.2` -> `stg6_1.2-1.3`
    ///
    /// Bare tags have no counter to increment and are rejected.
    pub fn increment_tag(&self, tag: &str, hotfix: bool) -> Result<Tag> {
        let current = self.parse(tag)?;
        let release = current
            .release()
            .ok_or_else(|| TagError::Unreleased(tag.to_string()))?;

        let out_of_range =
            || TagError::malformed_tag(format!("'{}': release counter out of range", tag));
        let next = if hotfix {
            let hotfix = release
                .hotfix
                .unwrap_or(0)
                .checked_add(1)
                .ok_or_else(out_of_range)?;
            Release::with_hotfix(release.number, hotfix)
        } else {
            Release::new(release.number.checked_add(1).ok_or_else(out_of_range)?)
        };

        Ok(current.with_release(next))
    }

    /// The first tag of a version line, `[service_]env_version-0`.
    pub fn first_tag(&self, env: &str, version: &str, service: &str) -> Result<Tag> {
        let candidate = format!("{}-0", tag_prefix(env, version, service));
        self.parse(&candidate)
    }
}
