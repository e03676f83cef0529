//! Tag grammar and parser.
//!
//! ```text
//! tag            := [service "_"] environment "_" version ["-" release]
//! version        := legacyVersion | semverVersion
//! legacyVersion  := digits "." digits
//! semverVersion  := digits "." digits "." digits
//! release        := digits ["." digits]     ; second digits = hotfix counter
//! digits         := "0" | [1-9][0-9]*
//! ```
//!
//! Numbers are canonical (no leading zeros), so every tag the grammar accepts
//! renders back to the exact text it was parsed from.

use crate::domain::environment::{Environment, EnvironmentSet};
use crate::domain::version::{parse_number, SemanticVersion};
use crate::error::{Result, TagError};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static LEGACY_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)$").expect("legacy version pattern")
});

static SEMANTIC_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)$")
        .expect("semantic version pattern")
});

static RELEASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0|[1-9][0-9]*)(?:\.(0|[1-9][0-9]*))?$").expect("release pattern")
});

/// Version component of a tag. A tag is exactly one dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagVersion {
    /// `major.minor`
    Legacy { major: u32, minor: u32 },
    /// `major.minor.patch`
    Semantic { major: u32, minor: u32, patch: u32 },
}

impl TagVersion {
    /// Parse either dialect; anything else is a malformed version.
    pub fn parse(input: &str) -> Result<Self> {
        let number = |s: &str| {
            parse_number(s)
                .ok_or_else(|| TagError::malformed_version(format!("'{}' is out of range", s)))
        };

        if let Some(caps) = LEGACY_VERSION.captures(input) {
            return Ok(TagVersion::Legacy {
                major: number(&caps[1])?,
                minor: number(&caps[2])?,
            });
        }
        if let Some(caps) = SEMANTIC_VERSION.captures(input) {
            return Ok(TagVersion::Semantic {
                major: number(&caps[1])?,
                minor: number(&caps[2])?,
                patch: number(&caps[3])?,
            });
        }
        Err(TagError::malformed_version(format!(
            "'{}' - expected MAJOR.MINOR or MAJOR.MINOR.PATCH",
            input
        )))
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, TagVersion::Legacy { .. })
    }

    /// The semantic version, if this is the semantic dialect.
    pub fn semantic(&self) -> Option<SemanticVersion> {
        match *self {
            TagVersion::Semantic {
                major,
                minor,
                patch,
            } => Some(SemanticVersion::new(major, minor, patch)),
            TagVersion::Legacy { .. } => None,
        }
    }

    /// Numeric components for ordering; legacy versions sort as `major.minor.0`.
    pub(crate) fn sort_key(&self) -> (u32, u32, u32) {
        match *self {
            TagVersion::Legacy { major, minor } => (major, minor, 0),
            TagVersion::Semantic {
                major,
                minor,
                patch,
            } => (major, minor, patch),
        }
    }
}

impl From<&SemanticVersion> for TagVersion {
    fn from(v: &SemanticVersion) -> Self {
        TagVersion::Semantic {
            major: v.major,
            minor: v.minor,
            patch: v.patch,
        }
    }
}

impl fmt::Display for TagVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagVersion::Legacy { major, minor } => write!(f, "{}.{}", major, minor),
            TagVersion::Semantic {
                major,
                minor,
                patch,
            } => write!(f, "{}.{}.{}", major, minor, patch),
        }
    }
}

/// Release counter, optionally followed by a hotfix counter (`3` or `3.1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Release {
    pub number: u32,
    pub hotfix: Option<u32>,
}

impl Release {
    pub fn new(number: u32) -> Self {
        Release {
            number,
            hotfix: None,
        }
    }

    pub fn with_hotfix(number: u32, hotfix: u32) -> Self {
        Release {
            number,
            hotfix: Some(hotfix),
        }
    }

    fn parse(input: &str) -> Option<Self> {
        let caps = RELEASE.captures(input)?;
        let number = parse_number(&caps[1])?;
        let hotfix = match caps.get(2) {
            Some(m) => Some(parse_number(m.as_str())?),
            None => None,
        };
        Some(Release { number, hotfix })
    }
}

impl fmt::Display for Release {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hotfix {
            Some(hotfix) => write!(f, "{}.{}", self.number, hotfix),
            None => write!(f, "{}", self.number),
        }
    }
}

/// A parsed deployment tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    service: Option<String>,
    environment: Environment,
    version: TagVersion,
    release: Option<Release>,
}

impl Tag {
    pub(crate) fn new(
        service: Option<String>,
        environment: Environment,
        version: TagVersion,
        release: Option<Release>,
    ) -> Self {
        Tag {
            service,
            environment,
            version,
            release,
        }
    }

    pub fn service(&self) -> Option<&str> {
        self.service.as_deref()
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn version(&self) -> TagVersion {
        self.version
    }

    pub fn release(&self) -> Option<Release> {
        self.release
    }

    /// A tag without a release segment denotes an unreleased base.
    pub fn is_bare(&self) -> bool {
        self.release.is_none()
    }

    /// `[service_]env_version`, the part shared by every release of this version.
    pub fn prefix(&self) -> String {
        tag_prefix(
            self.environment.as_str(),
            &self.version.to_string(),
            self.service.as_deref().unwrap_or(""),
        )
    }

    /// Same tag with a different release segment.
    pub fn with_release(&self, release: Release) -> Tag {
        Tag {
            release: Some(release),
            ..self.clone()
        }
    }

    /// Same tag moved to another environment, keeping version and counters.
    pub fn promote(&self, environment: Environment) -> Tag {
        Tag {
            environment,
            ..self.clone()
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(service) = &self.service {
            write!(f, "{}_", service)?;
        }
        write!(f, "{}_{}", self.environment, self.version)?;
        if let Some(release) = &self.release {
            write!(f, "-{}", release)?;
        }
        Ok(())
    }
}

/// Parser/validator over an injected environment vocabulary.
#[derive(Debug, Clone, Default)]
pub struct TagGrammar {
    environments: EnvironmentSet,
}

impl TagGrammar {
    pub fn new(environments: EnvironmentSet) -> Self {
        TagGrammar { environments }
    }

    pub fn environments(&self) -> &EnvironmentSet {
        &self.environments
    }

    /// Validate an environment name against this grammar's vocabulary.
    pub fn environment(&self, name: &str) -> Result<Environment> {
        self.environments.parse(name)
    }

    /// Decompose a tag string. Every grammar violation is a `MalformedTag`.
    pub fn parse(&self, input: &str) -> Result<Tag> {
        let malformed = |reason: &str| TagError::malformed_tag(format!("'{}': {}", input, reason));

        let segments: Vec<&str> = input.split('_').collect();
        let (service, environment, trailing) = match segments.as_slice() {
            [env, rest] => (None, *env, *rest),
            [service, env, rest] => (Some(*service), *env, *rest),
            _ => return Err(malformed("expected 2 or 3 '_'-separated segments")),
        };

        if service.is_some_and(str::is_empty) {
            return Err(malformed("empty service segment"));
        }

        let environment = self
            .environments
            .parse(environment)
            .map_err(|_| malformed(&format!("unknown environment '{}'", environment)))?;

        let (version_text, release_text) = match trailing.rsplit_once('-') {
            Some((version, release)) => (version, Some(release)),
            None => (trailing, None),
        };

        let version = TagVersion::parse(version_text)
            .map_err(|_| malformed(&format!("invalid version '{}'", version_text)))?;

        let release = match release_text {
            Some(text) => Some(
                Release::parse(text)
                    .ok_or_else(|| malformed(&format!("invalid release '{}'", text)))?,
            ),
            None => None,
        };

        Ok(Tag::new(
            service.map(str::to_string),
            environment,
            version,
            release,
        ))
    }

    /// True exactly when [`TagGrammar::parse`] succeeds.
    pub fn is_valid(&self, input: &str) -> bool {
        self.parse(input).is_ok()
    }

    /// Normalize an optional service name; empty means none.
    pub(crate) fn service_segment(&self, service: &str) -> Result<Option<String>> {
        if service.is_empty() {
            return Ok(None);
        }
        if service.contains('_') {
            return Err(TagError::malformed_tag(format!(
                "service name '{}' must not contain '_'",
                service
            )));
        }
        Ok(Some(service.to_string()))
    }
}

/// Render the glob prefix `[service_]env_version` for tag queries.
pub fn tag_prefix(env: &str, version: &str, service: &str) -> String {
    if service.is_empty() {
        format!("{}_{}", env, version)
    } else {
        format!("{}_{}_{}", service, env, version)
    }
}

/// Extract the environment segment of a 2- or 3-segment tag without validating it.
pub fn environment_of(tag: &str) -> Result<&str> {
    let segments: Vec<&str> = tag.split('_').collect();
    match segments.as_slice() {
        [env, _] | [_, env, _] => Ok(*env),
        _ => Err(TagError::malformed_tag(format!(
            "'{}': tag must have 2 or 3 parts",
            tag
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grammar() -> TagGrammar {
        TagGrammar::default()
    }

    #[test]
    fn test_parse_legacy_tag() {
        let tag = grammar().parse("stg6_1.2-0").unwrap();
        assert_eq!(tag.service(), None);
        assert_eq!(tag.environment().as_str(), "stg6");
        assert_eq!(tag.version(), TagVersion::Legacy { major: 1, minor: 2 });
        assert_eq!(tag.release(), Some(Release::new(0)));
    }

    #[test]
    fn test_parse_semantic_tag_with_service_and_hotfix() {
        let tag = grammar().parse("api_demo_0.1.1-3.2").unwrap();
        assert_eq!(tag.service(), Some("api"));
        assert_eq!(tag.environment().as_str(), "demo");
        assert_eq!(
            tag.version(),
            TagVersion::Semantic {
                major: 0,
                minor: 1,
                patch: 1
            }
        );
        assert_eq!(tag.release(), Some(Release::with_hotfix(3, 2)));
    }

    #[test]
    fn test_parse_bare_tag() {
        let tag = grammar().parse("dev_0.0.1").unwrap();
        assert!(tag.is_bare());
        assert_eq!(tag.to_string(), "dev_0.0.1");
    }

    #[test]
    fn test_validity_table() {
        let cases = [
            ("stg6_1.2-0", true),
            ("stg6_1.2-1.0", true),
            ("service_stg6_1.2-0", true),
            ("stg6_1.2.3-0", true),
            ("stg6_1.2", true),
            ("invalid_env_1.2-0", false),
            ("invalid", false),
            ("too_many_parts_here_1.2-0", false),
            ("_stg6_1.2-0", false),
            ("stg6_1-0", false),
            ("stg6_1.2.3.4-0", false),
            ("stg6_1.2-", false),
            ("stg6_1.2-a", false),
            ("stg6_1.2-1.2.3", false),
            ("stg6_v1.2.3-1", false),
            ("stg6_1.2-+1", false),
            ("stg6_1.2-007", false),
            ("stg6_01.2-0", false),
            ("stg6_1.2.03-1", false),
            ("stg6_1.2-1.00", false),
            ("stg6_1.0-0.0", true),
            ("stg6_10.20-100", true),
            ("STG6_1.2-0", false),
            ("", false),
        ];

        let grammar = grammar();
        for (tag, expected) in cases {
            assert_eq!(grammar.is_valid(tag), expected, "tag: {}", tag);
            assert_eq!(grammar.parse(tag).is_ok(), expected, "tag: {}", tag);
        }
    }

    #[test]
    fn test_parse_errors_are_malformed_tag() {
        for tag in ["nope", "prod_1.2-0", "stg6_1.2.x-0", "stg6_1.2-0.1.2"] {
            let err = grammar().parse(tag).unwrap_err();
            assert!(matches!(err, TagError::MalformedTag(_)), "tag: {}", tag);
        }
    }

    #[test]
    fn test_round_trip() {
        let grammar = grammar();
        for tag in [
            "stg6_1.2-0",
            "stg6_1.2-1.0",
            "svc_production2_10.20-30.40",
            "demo_0.1.1-3",
            "api_dev_1.2.3",
            "mimic2_4.5",
            "stg6_0.0-0.0",
            "stg6_100.0.10-10.100",
        ] {
            assert_eq!(grammar.parse(tag).unwrap().to_string(), tag);
        }
    }

    #[test]
    fn test_leading_zeros_are_rejected() {
        let grammar = grammar();
        for tag in ["stg6_1.2-007", "stg6_01.2-7", "api_dev_1.02.3", "dev_1.2-3.01"] {
            assert!(
                matches!(grammar.parse(tag), Err(TagError::MalformedTag(_))),
                "tag: {}",
                tag
            );
        }
        assert!(TagVersion::parse("1.02").is_err());
        assert_eq!(
            TagVersion::parse("10.0").unwrap(),
            TagVersion::Legacy { major: 10, minor: 0 }
        );
    }

    #[test]
    fn test_custom_environment_set() {
        let grammar = TagGrammar::new(EnvironmentSet::new(["staging", "production"]));
        assert!(grammar.is_valid("staging_1.0.0-1"));
        assert!(!grammar.is_valid("stg6_1.0.0-1"));
    }

    #[test]
    fn test_tag_prefix() {
        assert_eq!(tag_prefix("stg6", "1.2", ""), "stg6_1.2");
        assert_eq!(tag_prefix("stg6", "1.2", "myservice"), "myservice_stg6_1.2");
        assert_eq!(tag_prefix("production2", "2.1", "api"), "api_production2_2.1");
    }

    #[test]
    fn test_tag_prefix_from_parsed_tag() {
        let tag = grammar().parse("api_stg6_1.2.3-4").unwrap();
        assert_eq!(tag.prefix(), "api_stg6_1.2.3");
    }

    #[test]
    fn test_environment_of() {
        assert_eq!(environment_of("stg6_1.2-0").unwrap(), "stg6");
        assert_eq!(environment_of("service_stg6_1.2-0").unwrap(), "stg6");
        assert!(environment_of("invalid").is_err());
        assert!(environment_of("too_many_parts_here_test").is_err());
    }

    #[test]
    fn test_promote_keeps_version_and_release() {
        let grammar = grammar();
        let tag = grammar.parse("stg6_stg6_1.2-3").unwrap();
        let promoted = tag.promote(grammar.environment("production2").unwrap());
        assert_eq!(promoted.to_string(), "stg6_production2_1.2-3");
    }

    #[test]
    fn test_service_segment() {
        let grammar = grammar();
        assert_eq!(grammar.service_segment("").unwrap(), None);
        assert_eq!(grammar.service_segment("api").unwrap(), Some("api".to_string()));
        assert!(grammar.service_segment("my_api").is_err());
    }
}
