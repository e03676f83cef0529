use crate::conventional::detect_bump_type;
use crate::domain::tag::{Release, Tag, TagGrammar, TagVersion};
use crate::error::{Result, TagError};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Semantic version representation (`major.minor.patch[-prerelease]`)
///
/// The prerelease suffix is stored verbatim and takes no part in ordering,
/// see [`SemanticVersion::compare`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SemanticVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub prerelease: String,
}

impl SemanticVersion {
    /// Create a release version (no prerelease)
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        SemanticVersion {
            major,
            minor,
            patch,
            prerelease: String::new(),
        }
    }

    /// Parse a version string (e.g., "v1.2.3-alpha.1" -> {1, 2, 3, "alpha.1"})
    ///
    /// A single leading `v` is stripped. The first `-` separates the numeric
    /// core from the prerelease suffix; dots at either end of the suffix are
    /// trimmed.
    pub fn parse(input: &str) -> Result<Self> {
        let version = input.strip_prefix('v').unwrap_or(input);

        let (core, prerelease) = match version.split_once('-') {
            Some((core, pre)) => (core, pre.trim_matches('.')),
            None => (version, ""),
        };

        let parts: Vec<&str> = core.split('.').collect();
        if parts.len() != 3 {
            return Err(TagError::malformed_version(format!(
                "'{}' - expected MAJOR.MINOR.PATCH",
                input
            )));
        }

        let major = parse_number(parts[0]).ok_or_else(|| {
            TagError::malformed_version(format!("invalid major version '{}'", parts[0]))
        })?;
        let minor = parse_number(parts[1]).ok_or_else(|| {
            TagError::malformed_version(format!("invalid minor version '{}'", parts[1]))
        })?;
        let patch = parse_number(parts[2]).ok_or_else(|| {
            TagError::malformed_version(format!("invalid patch version '{}'", parts[2]))
        })?;

        Ok(SemanticVersion {
            major,
            minor,
            patch,
            prerelease: prerelease.to_string(),
        })
    }

    /// Order by major, then minor, then patch. Prerelease is ignored, so
    /// `1.2.3-rc.1` and `1.2.3` compare equal.
    pub fn compare(&self, other: &SemanticVersion) -> Ordering {
        (self.major, self.minor, self.patch).cmp(&(other.major, other.minor, other.patch))
    }

    /// Bump version according to bump kind. The result is always a release.
    ///
    /// Fails when the bumped component would leave the `u32` range.
    pub fn bump(&self, kind: BumpKind) -> Result<Self> {
        let next = |value: u32| {
            value.checked_add(1).ok_or_else(|| {
                TagError::malformed_version(format!(
                    "cannot bump {} version of {}: out of range",
                    kind, self
                ))
            })
        };
        Ok(match kind {
            BumpKind::Major => SemanticVersion::new(next(self.major)?, 0, 0),
            BumpKind::Minor => SemanticVersion::new(self.major, next(self.minor)?, 0),
            BumpKind::Patch => SemanticVersion::new(self.major, self.minor, next(self.patch)?),
        })
    }

    pub fn is_prerelease(&self) -> bool {
        !self.prerelease.is_empty()
    }
}

impl FromStr for SemanticVersion {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self> {
        SemanticVersion::parse(s)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.prerelease.is_empty() {
            write!(f, "-{}", self.prerelease)?;
        }
        Ok(())
    }
}

/// Version bump kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BumpKind {
    Major,
    Minor,
    Patch,
}

impl BumpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BumpKind::Major => "major",
            BumpKind::Minor => "minor",
            BumpKind::Patch => "patch",
        }
    }
}

impl FromStr for BumpKind {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "major" => Ok(BumpKind::Major),
            "minor" => Ok(BumpKind::Minor),
            "patch" => Ok(BumpKind::Patch),
            _ => Err(TagError::unsupported_bump(s)),
        }
    }
}

impl fmt::Display for BumpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bump as requested by a caller: either explicit or inferred from commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpRequest {
    Explicit(BumpKind),
    Auto,
}

impl BumpRequest {
    /// Resolve `Auto` against the commit subjects since the last tag.
    pub fn resolve<S: AsRef<str>>(&self, commits: &[S]) -> BumpKind {
        match self {
            BumpRequest::Explicit(kind) => *kind,
            BumpRequest::Auto => detect_bump_type(commits),
        }
    }
}

impl FromStr for BumpRequest {
    type Err = TagError;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("auto") {
            Ok(BumpRequest::Auto)
        } else {
            s.parse().map(BumpRequest::Explicit)
        }
    }
}

/// Bump a version string, e.g. `("1.2.3", Major)` -> `"2.0.0"`.
pub fn bump_semantic_version(version: &str, kind: BumpKind) -> Result<String> {
    let parsed = SemanticVersion::parse(version)?;
    Ok(parsed.bump(kind)?.to_string())
}

/// Compare two version strings, ignoring prerelease suffixes.
pub fn compare_semantic_versions(left: &str, right: &str) -> Result<Ordering> {
    let left = SemanticVersion::parse(left)?;
    let right = SemanticVersion::parse(right)?;
    Ok(left.compare(&right))
}

/// Which component moved between two versions.
///
/// Returns `None` when `new` is not greater than `old`.
pub fn classify_change(old: &SemanticVersion, new: &SemanticVersion) -> Option<BumpKind> {
    if new.compare(old) != Ordering::Greater {
        return None;
    }
    if new.major != old.major {
        Some(BumpKind::Major)
    } else if new.minor != old.minor {
        Some(BumpKind::Minor)
    } else {
        Some(BumpKind::Patch)
    }
}

impl TagGrammar {
    /// Build a new tag line from the semantic version in `tag`.
    ///
    /// The release counter always restarts at `1` on the new version line:
    /// `("stg6_1.2.3-1", Minor, "stg6", "")` -> `stg6_1.3.0-1`.
    pub fn bump_tag_version(
        &self,
        tag: &str,
        kind: BumpKind,
        env: &str,
        service: &str,
    ) -> Result<Tag> {
        let current = self.parse(tag)?;
        let version = current.version().semantic().ok_or_else(|| {
            TagError::unsupported_dialect(format!(
                "'{}' uses the legacy MAJOR.MINOR version; semantic bumps need MAJOR.MINOR.PATCH",
                tag
            ))
        })?;

        let environment = self.environment(env)?;
        let service = self.service_segment(service)?;
        let bumped = version.bump(kind)?;

        Ok(Tag::new(
            service,
            environment,
            TagVersion::from(&bumped),
            Some(Release::new(1)),
        ))
    }
}

/// Parse an unsigned decimal made only of ASCII digits.
pub(crate) fn parse_number(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_prefix_and_prerelease() {
        let v = SemanticVersion::parse("v1.2.3-alpha.1").unwrap();
        assert_eq!(v.major, 1);
        assert_eq!(v.minor, 2);
        assert_eq!(v.patch, 3);
        assert_eq!(v.prerelease, "alpha.1");
        assert_eq!(v.to_string(), "1.2.3-alpha.1");
    }

    #[test]
    fn test_parse_without_prefix() {
        let v: SemanticVersion = "1.2.3".parse().unwrap();
        assert_eq!(v, SemanticVersion::new(1, 2, 3));
        assert!(!v.is_prerelease());
    }

    #[test]
    fn test_prerelease_keeps_later_hyphens() {
        let v = SemanticVersion::parse("1.0.0-rc-2").unwrap();
        assert_eq!(v.prerelease, "rc-2");
        assert_eq!(v.to_string(), "1.0.0-rc-2");
    }

    #[test]
    fn test_prerelease_dots_are_trimmed() {
        let v = SemanticVersion::parse("1.0.0-.beta.").unwrap();
        assert_eq!(v.prerelease, "beta");
        let empty = SemanticVersion::parse("1.0.0-").unwrap();
        assert_eq!(empty.to_string(), "1.0.0");
    }

    #[test]
    fn test_parse_invalid() {
        assert!(SemanticVersion::parse("1.2").is_err());
        assert!(SemanticVersion::parse("1.2.3.4").is_err());
        assert!(SemanticVersion::parse("1.x.3").is_err());
        assert!(SemanticVersion::parse("1.2.+3").is_err());
        assert!(SemanticVersion::parse("").is_err());
        assert!(SemanticVersion::parse("V1.2.3").is_err());
    }

    #[test]
    fn test_round_trip_strips_prefix() {
        for (input, expected) in [
            ("v0.1.0", "0.1.0"),
            ("10.20.30", "10.20.30"),
            ("v2.0.0-beta.3", "2.0.0-beta.3"),
        ] {
            assert_eq!(SemanticVersion::parse(input).unwrap().to_string(), expected);
        }
    }

    #[test]
    fn test_bump_major() {
        assert_eq!(bump_semantic_version("1.2.3", BumpKind::Major).unwrap(), "2.0.0");
    }

    #[test]
    fn test_bump_minor() {
        assert_eq!(bump_semantic_version("1.2.3", BumpKind::Minor).unwrap(), "1.3.0");
    }

    #[test]
    fn test_bump_patch() {
        assert_eq!(bump_semantic_version("1.2.3", BumpKind::Patch).unwrap(), "1.2.4");
    }

    #[test]
    fn test_bump_drops_prerelease() {
        assert_eq!(
            bump_semantic_version("v1.2.3-rc.1", BumpKind::Patch).unwrap(),
            "1.2.4"
        );
    }

    #[test]
    fn test_bump_invalid_version() {
        let err = bump_semantic_version("1.2", BumpKind::Patch).unwrap_err();
        assert!(matches!(err, TagError::MalformedVersion(_)));
    }

    #[test]
    fn test_bump_is_strictly_greater_and_resets() {
        let versions = ["0.0.0", "1.2.3", "9.9.9-rc", "0.10.0"];
        for raw in versions {
            let v = SemanticVersion::parse(raw).unwrap();
            for kind in [BumpKind::Major, BumpKind::Minor, BumpKind::Patch] {
                let bumped = v.bump(kind).unwrap();
                assert_eq!(v.compare(&bumped), Ordering::Less, "{} {}", raw, kind);
            }
            let major = v.bump(BumpKind::Major).unwrap();
            assert_eq!((major.minor, major.patch), (0, 0));
            assert_eq!(v.bump(BumpKind::Minor).unwrap().patch, 0);
        }
    }

    #[test]
    fn test_bump_at_u32_limit_is_an_error() {
        let max = u32::MAX;
        let cases = [
            (format!("{}.0.0", max), BumpKind::Major),
            (format!("0.{}.0", max), BumpKind::Minor),
            (format!("0.0.{}", max), BumpKind::Patch),
        ];
        for (version, kind) in cases {
            let err = bump_semantic_version(&version, kind).unwrap_err();
            assert!(matches!(err, TagError::MalformedVersion(_)), "{} {}", version, kind);
        }

        // Components that do not move may sit at the limit.
        let version = format!("1.{}.{}", max, max);
        assert_eq!(
            bump_semantic_version(&version, BumpKind::Major).unwrap(),
            "2.0.0"
        );
    }

    #[test]
    fn test_bump_tag_version_at_u32_limit() {
        let grammar = TagGrammar::default();
        let tag = format!("stg6_{}.0.0-1", u32::MAX);
        assert!(matches!(
            grammar.bump_tag_version(&tag, BumpKind::Major, "stg6", ""),
            Err(TagError::MalformedVersion(_))
        ));
    }

    #[test]
    fn test_compare_ignores_prerelease() {
        assert_eq!(
            compare_semantic_versions("1.2.3-rc.1", "1.2.3").unwrap(),
            Ordering::Equal
        );
        assert_eq!(
            compare_semantic_versions("1.10.0", "1.9.9").unwrap(),
            Ordering::Greater
        );
        assert_eq!(
            compare_semantic_versions("v0.9.9", "1.0.0").unwrap(),
            Ordering::Less
        );
        assert!(compare_semantic_versions("1.0", "1.0.0").is_err());
    }

    #[test]
    fn test_bump_kind_from_str() {
        assert_eq!("major".parse::<BumpKind>().unwrap(), BumpKind::Major);
        assert_eq!("Minor".parse::<BumpKind>().unwrap(), BumpKind::Minor);
        assert_eq!("PATCH".parse::<BumpKind>().unwrap(), BumpKind::Patch);
        let err = "auto".parse::<BumpKind>().unwrap_err();
        assert!(matches!(err, TagError::UnsupportedBump(_)));
    }

    #[test]
    fn test_bump_request_resolution() {
        let commits = vec!["feat: add login".to_string()];
        assert_eq!(
            "auto".parse::<BumpRequest>().unwrap().resolve(&commits),
            BumpKind::Minor
        );
        assert_eq!(
            "major".parse::<BumpRequest>().unwrap().resolve(&commits),
            BumpKind::Major
        );
        assert!("huge".parse::<BumpRequest>().is_err());
    }

    #[test]
    fn test_classify_change() {
        let v = |s: &str| SemanticVersion::parse(s).unwrap();
        assert_eq!(classify_change(&v("1.2.3"), &v("2.0.0")), Some(BumpKind::Major));
        assert_eq!(classify_change(&v("1.2.3"), &v("1.3.0")), Some(BumpKind::Minor));
        assert_eq!(classify_change(&v("1.2.3"), &v("1.2.9")), Some(BumpKind::Patch));
        assert_eq!(classify_change(&v("1.2.3"), &v("1.2.3")), None);
        assert_eq!(classify_change(&v("2.0.0"), &v("1.9.0")), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("007"), Some(7));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("+1"), None);
        assert_eq!(parse_number("99999999999"), None);
    }

    #[test]
    fn test_bump_tag_version_resets_release() {
        let grammar = TagGrammar::default();
        let tag = grammar
            .bump_tag_version("stg6_1.2.3-1", BumpKind::Minor, "stg6", "")
            .unwrap();
        assert_eq!(tag.to_string(), "stg6_1.3.0-1");

        let tag = grammar
            .bump_tag_version("stg6_1.2.3-7.2", BumpKind::Major, "stg6", "api")
            .unwrap();
        assert_eq!(tag.to_string(), "api_stg6_2.0.0-1");
    }

    #[test]
    fn test_bump_tag_version_from_bare_tag() {
        let grammar = TagGrammar::default();
        let tag = grammar
            .bump_tag_version("demo_0.1.1", BumpKind::Patch, "demo", "")
            .unwrap();
        assert_eq!(tag.to_string(), "demo_0.1.2-1");
    }

    #[test]
    fn test_bump_tag_version_rejects_legacy_dialect() {
        let grammar = TagGrammar::default();
        let err = grammar
            .bump_tag_version("stg6_1.2-3", BumpKind::Patch, "stg6", "")
            .unwrap_err();
        assert!(matches!(err, TagError::UnsupportedDialect(_)));
    }

    #[test]
    fn test_bump_tag_version_rejects_invalid_input() {
        let grammar = TagGrammar::default();
        assert!(matches!(
            grammar.bump_tag_version("nope", BumpKind::Patch, "stg6", ""),
            Err(TagError::MalformedTag(_))
        ));
        assert!(matches!(
            grammar.bump_tag_version("stg6_1.2.3-1", BumpKind::Patch, "prod", ""),
            Err(TagError::UnknownEnvironment(_))
        ));
    }
}
