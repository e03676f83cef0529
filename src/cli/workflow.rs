//! Tag workflows behind the CLI subcommands
//!
//! Each workflow reads from a [`TagRepository`], applies the domain rules and
//! returns a plan. Nothing here prompts or writes: `main.rs` shows the plan,
//! asks for confirmation and persists it with [`apply_tag`]. Keeping the
//! workflows free of I/O lets them run against `MockRepository` in tests.

use std::collections::HashSet;

use anyhow::{bail, Context, Result};
use git2::Oid;
use serde::Serialize;
use tracing::{debug, warn};

use crate::boundary::BoundaryWarning;
use crate::conventional::detect_bump_type;
use crate::domain::{
    classify_branch, classify_change, environment_of, is_mainline_branch, is_release_branch,
    latest_candidate, sort_newest_first, tag_prefix, BranchInfo, BranchKind, BumpKind,
    BumpRequest, SemanticVersion, Tag, TagCandidate, TagGrammar, TagVersion,
};
use crate::git::TagRepository;

/// Commits inspected when a branch does not imply its own bump
pub const BRANCH_ANALYSIS_DEPTH: usize = 10;

/// Tags of one environment (and service) found in the repository
#[derive(Debug, Clone, PartialEq)]
pub struct TagListing {
    /// Glob the repository was queried with
    pub pattern: String,
    pub candidates: Vec<TagCandidate>,
    pub warnings: Vec<BoundaryWarning>,
}

/// Result of the last-tag query
#[derive(Debug, Clone, PartialEq)]
pub struct LastTagReport {
    pub latest: Option<TagCandidate>,
    pub warnings: Vec<BoundaryWarning>,
}

/// Arguments for the add-tag workflow
#[derive(Debug, Clone, PartialEq)]
pub struct AddTagArgs {
    pub environment: String,
    pub version: String,
    /// Existing tag to promote into `environment`
    pub from: Option<String>,
    pub hotfix: bool,
    pub service: String,
    pub remote: String,
    pub require_synced_remote: bool,
}

/// Tag the add-tag workflow would create
#[derive(Debug, Clone, PartialEq)]
pub struct AddTagPlan {
    pub new_tag: Tag,
    /// Latest existing tag of the version line, when incrementing
    pub previous: Option<String>,
    /// Source tag, when promoting
    pub promoted_from: Option<String>,
    pub target: Oid,
    pub branch: String,
    pub warnings: Vec<BoundaryWarning>,
}

impl AddTagPlan {
    /// Annotation used when the user gives none
    pub fn default_comment(&self) -> String {
        self.new_tag.to_string()
    }
}

/// Arguments for the bump-version workflow
#[derive(Debug, Clone, PartialEq)]
pub struct BumpVersionArgs {
    pub environment: String,
    pub request: BumpRequest,
    pub service: String,
    /// Revision the new tag points at
    pub from_commit: String,
}

/// Tag the bump-version workflow would create
#[derive(Debug, Clone, PartialEq)]
pub struct BumpPlan {
    pub previous: TagCandidate,
    pub kind: BumpKind,
    pub new_tag: Tag,
    pub target: Oid,
    /// Subjects analyzed for an automatic bump; empty for explicit bumps
    pub commits: Vec<String>,
}

impl BumpPlan {
    /// Annotation used when the user gives none
    pub fn default_comment(&self) -> String {
        format!("Bump {} version: {}", self.kind, self.new_tag)
    }
}

/// Comparison of two tags
#[derive(Debug, Clone, PartialEq)]
pub struct VersionDiff {
    pub older: Tag,
    pub newer: Tag,
    /// Component that moved, `None` when `newer` is not greater
    pub change: Option<BumpKind>,
    /// Subjects reachable from `newer` but not `older`
    pub commits: Vec<String>,
    /// Bump the commits would call for
    pub suggested: BumpKind,
}

fn environment_pattern(environment: &str, service: &str) -> String {
    if service.is_empty() {
        format!("{}_*", environment)
    } else {
        format!("{}_{}_*", service, environment)
    }
}

/// Parse the tags matching `pattern`, keeping those accepted by `keep`.
///
/// Lines that match the glob but not the tag grammar become warnings.
fn scan_tags<R, F>(
    repo: &R,
    grammar: &TagGrammar,
    pattern: &str,
    keep: F,
) -> Result<(Vec<TagCandidate>, Vec<BoundaryWarning>)>
where
    R: TagRepository + ?Sized,
    F: Fn(&Tag) -> bool,
{
    let lines = repo.list_tag_lines(pattern)?;
    debug!(pattern = %pattern, count = lines.len(), "tags listed");

    let mut warnings = Vec::new();
    for line in &lines {
        let Some(name) = line.split_whitespace().next() else {
            continue;
        };
        if let Err(e) = grammar.parse(name) {
            warn!(tag = name, "skipping unparsable tag");
            warnings.push(BoundaryWarning::UnparsableTag {
                tag: name.to_string(),
                reason: e.to_string(),
            });
        }
    }

    let candidates = grammar
        .parse_candidates(lines.iter().map(String::as_str))
        .into_iter()
        .filter(|c| keep(&c.tag))
        .collect();
    Ok((candidates, warnings))
}

/// List the tags of an environment, optionally scoped to a service.
///
/// Lines that match the glob but not the tag grammar are reported as
/// warnings; tags of other services or environments are dropped.
pub fn list_environment_tags<R: TagRepository + ?Sized>(
    repo: &R,
    grammar: &TagGrammar,
    environment: &str,
    service: &str,
) -> Result<TagListing> {
    let environment = grammar.environment(environment)?;
    let pattern = environment_pattern(environment.as_str(), service);
    let wanted_service = if service.is_empty() {
        None
    } else {
        Some(service)
    };

    let (candidates, warnings) = scan_tags(repo, grammar, &pattern, |tag| {
        tag.environment() == &environment && tag.service() == wanted_service
    })?;

    Ok(TagListing {
        pattern,
        candidates,
        warnings,
    })
}

/// List the tags of an environment across every service, unscoped ones included.
pub fn list_all_service_tags<R: TagRepository + ?Sized>(
    repo: &R,
    grammar: &TagGrammar,
    environment: &str,
) -> Result<TagListing> {
    let environment = grammar.environment(environment)?;
    let mut candidates = Vec::new();
    let mut warnings = Vec::new();

    for pattern in [
        format!("{}_*", environment),
        format!("*_{}_*", environment),
    ] {
        let (found, skipped) =
            scan_tags(repo, grammar, &pattern, |tag| tag.environment() == &environment)?;
        candidates.extend(found);
        warnings.extend(skipped);
    }

    // `stg6_stg6_1.2-0` matches both globs.
    let mut seen = HashSet::new();
    candidates.retain(|c: &TagCandidate| seen.insert(c.name.clone()));
    let mut reported = HashSet::new();
    warnings.retain(|w| reported.insert(w.to_string()));

    Ok(TagListing {
        pattern: format!("[*_]{}_*", environment),
        candidates,
        warnings,
    })
}

/// Latest tag of an environment: highest version, then highest release.
pub fn last_tag<R: TagRepository + ?Sized>(
    repo: &R,
    grammar: &TagGrammar,
    environment: &str,
    service: &str,
) -> Result<LastTagReport> {
    let TagListing {
        pattern,
        mut candidates,
        mut warnings,
    } = list_environment_tags(repo, grammar, environment, service)?;

    sort_newest_first(&mut candidates);
    let latest = candidates.into_iter().next();
    if latest.is_none() {
        warnings.push(BoundaryWarning::NoTagsFound { pattern });
    }

    Ok(LastTagReport { latest, warnings })
}

/// Plan a new tag: promote `from`, or increment the latest tag of the
/// `[service_]env_version` line, or start that line at `-0`.
///
/// Regular tags must not be cut from a release branch and hotfix tags must
/// be. Tagging from any other non-mainline branch yields a warning. When
/// `require_synced_remote` is set, HEAD must equal the remote branch head.
pub fn plan_add_tag<R: TagRepository + ?Sized>(
    repo: &R,
    grammar: &TagGrammar,
    args: &AddTagArgs,
) -> Result<AddTagPlan> {
    let environment = grammar.environment(&args.environment)?;
    let version = TagVersion::parse(&args.version)
        .with_context(|| format!("version '{}' is not valid", args.version))?;

    let source = match &args.from {
        Some(from) => {
            let source_environment =
                environment_of(from).with_context(|| format!("tag '{}' is not valid", from))?;
            if source_environment == environment.as_str() {
                bail!(
                    "tag '{}' is already in environment '{}'",
                    from,
                    environment
                );
            }
            Some(
                grammar
                    .parse(from)
                    .with_context(|| format!("tag '{}' is not valid", from))?,
            )
        }
        None => None,
    };

    let branch = repo.current_branch()?;
    let mut warnings = Vec::new();
    if is_release_branch(&branch) && !args.hotfix {
        bail!("you can tag only hot fix (use --hot-fix flag) from release branch");
    }
    if args.hotfix && !is_release_branch(&branch) {
        bail!("hot fix must be tagged from release branch");
    }
    if !args.hotfix && !is_mainline_branch(&branch) {
        warnings.push(BoundaryWarning::OffMainline {
            branch: branch.clone(),
        });
    }

    let head = repo.resolve_commit("HEAD")?;
    if args.require_synced_remote {
        match repo.remote_branch_oid(&args.remote, &branch)? {
            Some(remote_head) if remote_head == head => {}
            Some(remote_head) => bail!(
                "remote is not synced: HEAD is {} but {}/{} is {}",
                head,
                args.remote,
                branch,
                remote_head
            ),
            None => bail!(
                "remote is not synced: {}/{} does not exist",
                args.remote,
                branch
            ),
        }
    }

    if let (Some(from), Some(source)) = (&args.from, source) {
        let target = repo
            .resolve_commit(from)
            .with_context(|| format!("tag '{}' not found", from))?;
        let new_tag = source.promote(environment);
        debug!(from = %from, to = %new_tag, "promoting tag");
        return Ok(AddTagPlan {
            new_tag,
            previous: None,
            promoted_from: Some(from.clone()),
            target,
            branch,
            warnings,
        });
    }

    let prefix = tag_prefix(environment.as_str(), &version.to_string(), &args.service);
    let pattern = format!("{}*", prefix);
    let lines = repo.list_tag_lines(&pattern)?;
    let wanted_service = if args.service.is_empty() {
        None
    } else {
        Some(args.service.as_str())
    };
    let line = grammar
        .parse_candidates(lines.iter().map(String::as_str))
        .into_iter()
        .filter(|c| {
            c.tag.environment() == &environment
                && c.tag.version() == version
                && c.tag.service() == wanted_service
        });

    let (new_tag, previous) = match latest_candidate(line) {
        Some(latest) => {
            if repo.resolve_commit(&latest.name)? == head {
                warnings.push(BoundaryWarning::NoNewCommits {
                    latest_tag: latest.name.clone(),
                    current_commit_hash: head.to_string(),
                });
            }
            let next = grammar.increment_tag(&latest.name, args.hotfix)?;
            debug!(latest = %latest.name, next = %next, "incrementing tag");
            (next, Some(latest.name))
        }
        None => {
            warnings.push(BoundaryWarning::NoTagsFound { pattern });
            let first =
                grammar.first_tag(environment.as_str(), &version.to_string(), &args.service)?;
            debug!(first = %first, "starting version line");
            (first, None)
        }
    };

    Ok(AddTagPlan {
        new_tag,
        previous,
        promoted_from: None,
        target: head,
        branch,
        warnings,
    })
}

/// Plan a semantic bump of the latest semantic tag of an environment.
///
/// An automatic bump classifies the commits between that tag and
/// `from_commit` and fails when there are none.
pub fn plan_bump_version<R: TagRepository + ?Sized>(
    repo: &R,
    grammar: &TagGrammar,
    args: &BumpVersionArgs,
) -> Result<BumpPlan> {
    let listing = list_environment_tags(repo, grammar, &args.environment, &args.service)?;
    let mut semantic: Vec<TagCandidate> = listing
        .candidates
        .into_iter()
        .filter(|c| !c.tag.version().is_legacy())
        .collect();
    sort_newest_first(&mut semantic);

    let Some(previous) = semantic.into_iter().next() else {
        bail!(
            "no semantic version tags found for environment '{}'",
            args.environment
        );
    };

    let commits = match args.request {
        BumpRequest::Explicit(_) => Vec::new(),
        BumpRequest::Auto => {
            let commits = repo.commit_subjects_between(&previous.name, &args.from_commit)?;
            if commits.is_empty() {
                bail!("no commits found since last tag {}", previous.name);
            }
            commits
        }
    };
    let kind = args.request.resolve(&commits);
    debug!(previous = %previous.name, kind = %kind, analyzed = commits.len(), "bump resolved");

    let new_tag = grammar.bump_tag_version(&previous.name, kind, &args.environment, &args.service)?;
    let target = repo
        .resolve_commit(&args.from_commit)
        .with_context(|| format!("cannot resolve commit {}", args.from_commit))?;

    Ok(BumpPlan {
        previous,
        kind,
        new_tag,
        target,
        commits,
    })
}

fn numeric_version(version: TagVersion) -> SemanticVersion {
    let (major, minor, patch) = version.sort_key();
    SemanticVersion::new(major, minor, patch)
}

/// The tag released just before `name` in its environment and service.
///
/// Tags are ordered newest first by version, release and hotfix; the
/// predecessor is the next one down.
pub fn previous_tag<R: TagRepository + ?Sized>(
    repo: &R,
    grammar: &TagGrammar,
    name: &str,
) -> Result<TagCandidate> {
    let tag = grammar
        .parse(name)
        .with_context(|| format!("invalid tag format '{}'", name))?;
    let listing = list_environment_tags(
        repo,
        grammar,
        tag.environment().as_str(),
        tag.service().unwrap_or(""),
    )?;

    let mut candidates = listing.candidates;
    sort_newest_first(&mut candidates);
    let Some(position) = candidates.iter().position(|c| c.name == name) else {
        bail!("tag '{}' not found", name);
    };
    match candidates.into_iter().nth(position + 1) {
        Some(previous) => Ok(previous),
        None => bail!("no tag before {} in {}", name, listing.pattern),
    }
}

/// Compare two tags and collect the commits between them.
///
/// Without `older`, `newer` is compared with its [`previous_tag`].
pub fn version_diff<R: TagRepository + ?Sized>(
    repo: &R,
    grammar: &TagGrammar,
    newer: &str,
    older: Option<&str>,
) -> Result<VersionDiff> {
    let newer_tag = grammar
        .parse(newer)
        .with_context(|| format!("invalid tag format '{}'", newer))?;
    let older = match older {
        Some(older) => older.to_string(),
        None => previous_tag(repo, grammar, newer)
            .context("error finding previous tag")?
            .name,
    };
    let older_tag = grammar
        .parse(&older)
        .with_context(|| format!("invalid tag format '{}'", older))?;

    let change = classify_change(
        &numeric_version(older_tag.version()),
        &numeric_version(newer_tag.version()),
    );
    let commits = repo.commit_subjects_between(&older, newer)?;
    let suggested = detect_bump_type(&commits);

    Ok(VersionDiff {
        older: older_tag,
        newer: newer_tag,
        change,
        commits,
        suggested,
    })
}

/// One tag of an environment's history
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub candidate: TagCandidate,
    /// Version change from the entry below; `None` within a version line
    /// and for the oldest tag
    pub change: Option<BumpKind>,
}

/// Counts of version changes across a history
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BumpStats {
    pub releases: usize,
    pub major: usize,
    pub minor: usize,
    pub patch: usize,
}

impl BumpStats {
    /// Version changes counted, releases within a version line excluded
    pub fn changes(&self) -> usize {
        self.major + self.minor + self.patch
    }

    /// Share of `count` among the version changes, in percent
    pub fn percent(&self, count: usize) -> f64 {
        match self.changes() {
            0 => 0.0,
            total => count as f64 / total as f64 * 100.0,
        }
    }
}

/// Tags of an environment, newest first, with the change each introduced
#[derive(Debug, Clone, PartialEq)]
pub struct VersionHistory {
    pub environment: String,
    pub entries: Vec<HistoryEntry>,
    pub stats: BumpStats,
    pub warnings: Vec<BoundaryWarning>,
}

/// Version history of an environment, optionally scoped to a service.
pub fn environment_history<R: TagRepository + ?Sized>(
    repo: &R,
    grammar: &TagGrammar,
    environment: &str,
    service: &str,
) -> Result<VersionHistory> {
    let TagListing {
        mut candidates,
        warnings,
        ..
    } = list_environment_tags(repo, grammar, environment, service)?;
    sort_newest_first(&mut candidates);

    let changes: Vec<Option<BumpKind>> = candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            candidates.get(i + 1).and_then(|older| {
                classify_change(
                    &numeric_version(older.tag.version()),
                    &numeric_version(candidate.tag.version()),
                )
            })
        })
        .collect();

    let mut stats = BumpStats {
        releases: candidates.len(),
        ..BumpStats::default()
    };
    for change in changes.iter().flatten() {
        match change {
            BumpKind::Major => stats.major += 1,
            BumpKind::Minor => stats.minor += 1,
            BumpKind::Patch => stats.patch += 1,
        }
    }

    let entries = candidates
        .into_iter()
        .zip(changes)
        .map(|(candidate, change)| HistoryEntry { candidate, change })
        .collect();

    Ok(VersionHistory {
        environment: environment.to_string(),
        entries,
        stats,
        warnings,
    })
}

/// Filters for the version listing
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VersionListArgs {
    /// Environments to list, in output order
    pub environments: Vec<String>,
    /// Restrict to one service; `None` lists every service and unscoped tags
    pub service: Option<String>,
    pub major: Option<u32>,
    pub minor: Option<u32>,
    /// Maximum entries per environment; 0 lists everything
    pub limit: usize,
}

/// One row of the version listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionEntry {
    pub tag: String,
    pub environment: String,
    pub service: Option<String>,
    pub version: String,
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub release: Option<String>,
    /// Commit the tag points at, when it resolves
    pub commit: Option<String>,
    pub message: String,
}

impl VersionEntry {
    fn from_candidate<R: TagRepository + ?Sized>(repo: &R, candidate: TagCandidate) -> Self {
        let (major, minor, patch) = candidate.tag.version().sort_key();
        VersionEntry {
            environment: candidate.tag.environment().to_string(),
            service: candidate.tag.service().map(str::to_string),
            version: candidate.tag.version().to_string(),
            major,
            minor,
            patch,
            release: candidate.tag.release().map(|r| r.to_string()),
            commit: repo
                .resolve_commit(&candidate.name)
                .ok()
                .map(|oid| oid.to_string()),
            message: candidate.comment,
            tag: candidate.name,
        }
    }
}

/// Result of the version listing
#[derive(Debug, Clone, PartialEq)]
pub struct VersionListing {
    pub entries: Vec<VersionEntry>,
    pub warnings: Vec<BoundaryWarning>,
}

/// List tags of one or more environments newest first, filtered by version.
pub fn version_list<R: TagRepository + ?Sized>(
    repo: &R,
    grammar: &TagGrammar,
    args: &VersionListArgs,
) -> Result<VersionListing> {
    if args.environments.is_empty() {
        bail!("must specify an environment or list all of them");
    }

    let mut entries = Vec::new();
    let mut warnings = Vec::new();
    for environment in &args.environments {
        let listing = match &args.service {
            Some(service) => list_environment_tags(repo, grammar, environment, service)?,
            None => list_all_service_tags(repo, grammar, environment)?,
        };
        warnings.extend(listing.warnings);

        let mut candidates: Vec<TagCandidate> = listing
            .candidates
            .into_iter()
            .filter(|c| {
                let (major, minor, _) = c.tag.version().sort_key();
                args.major.map_or(true, |m| m == major) && args.minor.map_or(true, |m| m == minor)
            })
            .collect();
        sort_newest_first(&mut candidates);
        if args.limit > 0 {
            candidates.truncate(args.limit);
        }
        debug!(environment = %environment, count = candidates.len(), "versions listed");

        entries.extend(
            candidates
                .into_iter()
                .map(|candidate| VersionEntry::from_candidate(repo, candidate)),
        );
    }

    Ok(VersionListing { entries, warnings })
}

/// Where a branch bump suggestion came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpBasis {
    /// The branch name implies the bump
    BranchName,
    /// Conventional commits decided it
    Commits { analyzed: usize },
    /// Release branches finalize a version instead of bumping it
    Release,
}

/// Bump suggested for the checked-out branch
#[derive(Debug, Clone, PartialEq)]
pub struct BranchSuggestion {
    pub branch: BranchInfo,
    pub bump: Option<BumpKind>,
    pub basis: BumpBasis,
}

/// Suggest a bump from the branch name, falling back to the last
/// [`BRANCH_ANALYSIS_DEPTH`] commit subjects. No commits means patch.
pub fn suggest_branch_bump<R: TagRepository + ?Sized>(repo: &R) -> Result<BranchSuggestion> {
    let branch = classify_branch(&repo.current_branch()?);
    debug!(branch = %branch.name, kind = %branch.kind, "branch classified");

    let (bump, basis) = match branch.kind.implied_bump() {
        Some(kind) => (Some(kind), BumpBasis::BranchName),
        None if branch.kind == BranchKind::Release => (None, BumpBasis::Release),
        None => {
            let commits = repo.recent_commit_subjects("HEAD", BRANCH_ANALYSIS_DEPTH)?;
            (
                Some(detect_bump_type(&commits)),
                BumpBasis::Commits {
                    analyzed: commits.len(),
                },
            )
        }
    };

    Ok(BranchSuggestion {
        branch,
        bump,
        basis,
    })
}

/// Plan the tag a branch suggestion calls for in `environment`.
pub fn plan_branch_tag<R: TagRepository + ?Sized>(
    repo: &R,
    grammar: &TagGrammar,
    suggestion: &BranchSuggestion,
    environment: &str,
    service: &str,
) -> Result<BumpPlan> {
    let Some(kind) = suggestion.bump else {
        bail!(
            "release branch {} has no bump to tag; add release tags with add-tag",
            suggestion.branch.name
        );
    };
    plan_bump_version(
        repo,
        grammar,
        &BumpVersionArgs {
            environment: environment.to_string(),
            request: BumpRequest::Explicit(kind),
            service: service.to_string(),
            from_commit: "HEAD".to_string(),
        },
    )
}

/// Create the planned tag and optionally push it.
pub fn apply_tag<R: TagRepository + ?Sized>(
    repo: &R,
    tag: &Tag,
    comment: &str,
    target: Oid,
    push_to: Option<&str>,
) -> Result<()> {
    let name = tag.to_string();
    repo.create_annotated_tag(&name, comment, target)
        .with_context(|| format!("error creating tag {}", name))?;
    if let Some(remote) = push_to {
        repo.push_tag(remote, &name)
            .with_context(|| format!("error pushing tag {} to {}", name, remote))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    fn oid(byte: u8) -> Oid {
        Oid::from_bytes(&[byte; 20]).unwrap()
    }

    fn synced_repo() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.add_revision("HEAD", oid(9));
        repo.set_remote_head("origin", "main", oid(9));
        repo
    }

    fn add_args(env: &str, version: &str) -> AddTagArgs {
        AddTagArgs {
            environment: env.to_string(),
            version: version.to_string(),
            from: None,
            hotfix: false,
            service: String::new(),
            remote: "origin".to_string(),
            require_synced_remote: true,
        }
    }

    #[test]
    fn test_environment_pattern() {
        assert_eq!(environment_pattern("stg6", ""), "stg6_*");
        assert_eq!(environment_pattern("stg6", "api"), "api_stg6_*");
    }

    #[test]
    fn test_last_tag_prefers_highest_version() {
        let mut repo = MockRepository::new();
        repo.add_tag("stg6_1.2-7", "older line");
        repo.add_tag("stg6_1.10-1", "newer line");
        repo.add_tag("stg6_bogus", "");

        let report = last_tag(&repo, &TagGrammar::default(), "stg6", "").unwrap();
        assert_eq!(report.latest.unwrap().name, "stg6_1.10-1");
        assert!(matches!(
            report.warnings.as_slice(),
            [BoundaryWarning::UnparsableTag { .. }]
        ));
    }

    #[test]
    fn test_add_tag_increments_numeric_max() {
        let mut repo = synced_repo();
        repo.add_tag("stg6_1.2-9", "");
        repo.add_tag("stg6_1.2-10", "");
        repo.add_tag("stg6_1.20-3", "other line");
        repo.add_revision("stg6_1.2-10", oid(1));

        let plan = plan_add_tag(&repo, &TagGrammar::default(), &add_args("stg6", "1.2")).unwrap();
        assert_eq!(plan.new_tag.to_string(), "stg6_1.2-11");
        assert_eq!(plan.previous.as_deref(), Some("stg6_1.2-10"));
        assert_eq!(plan.target, oid(9));
        assert!(plan.warnings.is_empty());
    }

    #[test]
    fn test_add_tag_unsynced_remote_fails() {
        let mut repo = synced_repo();
        repo.set_remote_head("origin", "main", oid(3));
        let err = plan_add_tag(&repo, &TagGrammar::default(), &add_args("stg6", "1.2"))
            .unwrap_err();
        assert!(err.to_string().contains("remote is not synced"));
    }

    #[test]
    fn test_apply_tag_creates_and_pushes() {
        let repo = MockRepository::new();
        let tag = TagGrammar::default().parse("dev_1.0-0").unwrap();
        apply_tag(&repo, &tag, "first", oid(1), Some("origin")).unwrap();
        assert_eq!(
            repo.created_tags(),
            vec![("dev_1.0-0".to_string(), "first".to_string())]
        );
        assert_eq!(repo.pushed_tags().len(), 1);
    }
}
