use crate::domain::version::BumpKind;
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static RELEASE_BRANCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^release_[0-9]+\.[0-9]+").expect("release branch pattern"));

/// Branches that are always acceptable for regular (non-hotfix) tags
pub const MAINLINE_BRANCHES: &[&str] = &["main", "master"];

/// Git-flow prefixes, matched case-insensitively.
const FLOW_PREFIXES: &[(&str, BranchKind)] = &[
    ("feature/", BranchKind::Feature),
    ("feat/", BranchKind::Feature),
    ("hotfix/", BranchKind::Hotfix),
    ("fix/", BranchKind::Hotfix),
    ("bugfix/", BranchKind::Bugfix),
    ("chore/", BranchKind::Chore),
    ("release/", BranchKind::Release),
];

/// `release_<major>.<minor>` branches; only hotfix tags are cut from them.
pub fn is_release_branch(branch: &str) -> bool {
    RELEASE_BRANCH.is_match(branch)
}

pub fn is_mainline_branch(branch: &str) -> bool {
    MAINLINE_BRANCHES.contains(&branch)
}

/// Role of a branch, derived from its name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BranchKind {
    Feature,
    Hotfix,
    Bugfix,
    Chore,
    Release,
    Develop,
    Main,
    Custom,
}

impl BranchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchKind::Feature => "feature",
            BranchKind::Hotfix => "hotfix",
            BranchKind::Bugfix => "bugfix",
            BranchKind::Chore => "chore",
            BranchKind::Release => "release",
            BranchKind::Develop => "develop",
            BranchKind::Main => "main",
            BranchKind::Custom => "custom",
        }
    }

    /// Bump implied by the branch name alone.
    ///
    /// `None` for release branches (the version is being finalized) and for
    /// branches whose bump has to come from their commits.
    pub fn implied_bump(&self) -> Option<BumpKind> {
        match self {
            BranchKind::Feature => Some(BumpKind::Minor),
            BranchKind::Hotfix | BranchKind::Bugfix | BranchKind::Chore => Some(BumpKind::Patch),
            BranchKind::Release | BranchKind::Develop | BranchKind::Main | BranchKind::Custom => {
                None
            }
        }
    }

    pub fn strategy(&self) -> &'static str {
        match self {
            BranchKind::Feature => "minor version bump (new features)",
            BranchKind::Hotfix | BranchKind::Bugfix => "patch version bump (bug fixes)",
            BranchKind::Chore => "patch version bump (maintenance)",
            BranchKind::Release => "prepare for release tagging",
            BranchKind::Develop | BranchKind::Main => "analyze commits for bump type",
            BranchKind::Custom => "analyze commits or manual specification",
        }
    }
}

impl fmt::Display for BranchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified branch name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub name: String,
    pub kind: BranchKind,
    /// Text after the flow prefix (`feature/login` -> `login`)
    pub topic: Option<String>,
}

impl BranchInfo {
    /// Annotation for tags created from this branch's suggestion.
    pub fn tag_comment(&self) -> String {
        format!("Auto-tagged from {} branch: {}", self.kind, self.name)
    }
}

/// Classify a branch by its git-flow prefix or well-known name.
///
/// `release_<major>.<minor>` branches count as release branches too, with
/// the version as topic.
pub fn classify_branch(name: &str) -> BranchInfo {
    let lower = name.to_ascii_lowercase();
    let with_topic = |kind: BranchKind, prefix_len: usize| BranchInfo {
        name: name.to_string(),
        kind,
        topic: Some(&name[prefix_len..])
            .filter(|topic| !topic.is_empty())
            .map(str::to_string),
    };

    if let Some((prefix, kind)) = FLOW_PREFIXES
        .iter()
        .find(|(prefix, _)| lower.starts_with(prefix))
    {
        return with_topic(*kind, prefix.len());
    }
    if is_release_branch(name) {
        return with_topic(BranchKind::Release, "release_".len());
    }

    let kind = match lower.as_str() {
        "develop" | "development" => BranchKind::Develop,
        "main" | "master" => BranchKind::Main,
        _ => BranchKind::Custom,
    };
    BranchInfo {
        name: name.to_string(),
        kind,
        topic: None,
    }
}
