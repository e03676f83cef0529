//! Version-control collaborator
//!
//! The tag engine never talks to git itself. Everything it needs from the
//! repository (tag listings, commit subjects, commit ids) and everything it
//! persists (annotated tags, pushes) goes through the [`TagRepository`]
//! trait:
//!
//! - [`repository::Git2Repository`]: real implementation on top of `git2`
//! - [`mock::MockRepository`]: in-memory implementation for tests

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use git2::Oid;

/// Repository operations used by the tag workflows.
///
/// Implementations map underlying failures to [`crate::error::TagError`].
pub trait TagRepository: Send {
    /// List `"<tag> <subject>"` lines for tags matching a glob pattern.
    ///
    /// The subject is the first line of the annotation for annotated tags
    /// and the commit summary for lightweight tags. Order is unspecified.
    fn list_tag_lines(&self, pattern: &str) -> Result<Vec<String>>;

    /// Commit subjects reachable from `to` but not from `from`, newest first.
    fn commit_subjects_between(&self, from: &str, to: &str) -> Result<Vec<String>>;

    /// Subjects of the last `limit` commits reachable from `rev`, newest first.
    fn recent_commit_subjects(&self, rev: &str, limit: usize) -> Result<Vec<String>>;

    /// Resolve a revision (tag, branch, `HEAD`, sha) to a commit id.
    fn resolve_commit(&self, rev: &str) -> Result<Oid>;

    /// Short name of the checked-out branch, or `HEAD` when detached.
    fn current_branch(&self) -> Result<String>;

    /// Commit the remote-tracking branch points at, if it exists.
    fn remote_branch_oid(&self, remote: &str, branch: &str) -> Result<Option<Oid>>;

    /// Create an annotated tag on `target`. Fails if the tag already exists.
    fn create_annotated_tag(&self, name: &str, message: &str, target: Oid) -> Result<()>;

    /// Push a single tag to a remote.
    fn push_tag(&self, remote: &str, name: &str) -> Result<()>;
}
