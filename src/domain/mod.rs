//! Domain logic - pure tag rules independent of git operations

pub mod branch;
pub mod environment;
pub mod increment;
pub mod selector;
pub mod tag;
pub mod version;

pub use branch::{classify_branch, is_mainline_branch, is_release_branch, BranchInfo, BranchKind};
pub use environment::{Environment, EnvironmentSet, DEFAULT_ENVIRONMENTS};
pub use selector::{latest_candidate, sort_newest_first, TagCandidate};
pub use tag::{environment_of, tag_prefix, Release, Tag, TagGrammar, TagVersion};
pub use version::{
    bump_semantic_version, classify_change, compare_semantic_versions, BumpKind, BumpRequest,
    SemanticVersion,
};
