use crate::error::{Result, TagError};
use crate::git::TagRepository;
use git2::Oid;
use globset::Glob;
use std::cell::RefCell;
use std::collections::HashMap;

/// Mock repository for testing without actual git operations.
///
/// Tags created through the trait are recorded and show up in later
/// listings, so a workflow can be replayed against the same mock.
pub struct MockRepository {
    tags: RefCell<Vec<(String, String)>>,
    revisions: HashMap<String, Oid>,
    commit_ranges: HashMap<(String, String), Vec<String>>,
    history: HashMap<String, Vec<String>>,
    branch: String,
    remote_heads: HashMap<(String, String), Oid>,
    created: RefCell<Vec<(String, String)>>,
    pushed: RefCell<Vec<(String, String)>>,
}

impl MockRepository {
    /// Create a new empty mock repository on branch `main`
    pub fn new() -> Self {
        MockRepository {
            tags: RefCell::new(Vec::new()),
            revisions: HashMap::new(),
            commit_ranges: HashMap::new(),
            history: HashMap::new(),
            branch: "main".to_string(),
            remote_heads: HashMap::new(),
            created: RefCell::new(Vec::new()),
            pushed: RefCell::new(Vec::new()),
        }
    }

    /// Add a tag with its listing subject
    pub fn add_tag(&mut self, name: impl Into<String>, subject: impl Into<String>) {
        self.tags.get_mut().push((name.into(), subject.into()));
    }

    /// Make a revision resolvable
    pub fn add_revision(&mut self, rev: impl Into<String>, oid: Oid) {
        self.revisions.insert(rev.into(), oid);
    }

    /// Set the subjects returned for `from..to`
    pub fn set_commits(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
        subjects: &[&str],
    ) {
        self.commit_ranges.insert(
            (from.into(), to.into()),
            subjects.iter().map(|s| s.to_string()).collect(),
        );
    }

    /// Set the subjects reachable from `rev`, newest first
    pub fn set_history(&mut self, rev: impl Into<String>, subjects: &[&str]) {
        self.history.insert(
            rev.into(),
            subjects.iter().map(|s| s.to_string()).collect(),
        );
    }

    /// Set the checked-out branch
    pub fn set_branch(&mut self, branch: impl Into<String>) {
        self.branch = branch.into();
    }

    /// Set a remote-tracking branch head
    pub fn set_remote_head(
        &mut self,
        remote: impl Into<String>,
        branch: impl Into<String>,
        oid: Oid,
    ) {
        self.remote_heads.insert((remote.into(), branch.into()), oid);
    }

    /// Tags created so far, as `(name, message)`
    pub fn created_tags(&self) -> Vec<(String, String)> {
        self.created.borrow().clone()
    }

    /// Tags pushed so far, as `(remote, name)`
    pub fn pushed_tags(&self) -> Vec<(String, String)> {
        self.pushed.borrow().clone()
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl TagRepository for MockRepository {
    fn list_tag_lines(&self, pattern: &str) -> Result<Vec<String>> {
        let matcher = Glob::new(pattern)
            .map_err(|e| {
                TagError::Git(git2::Error::from_str(&format!(
                    "invalid tag pattern '{}': {}",
                    pattern, e
                )))
            })?
            .compile_matcher();
        Ok(self
            .tags
            .borrow()
            .iter()
            .filter(|(name, _)| matcher.is_match(name.as_str()))
            .map(|(name, subject)| {
                if subject.is_empty() {
                    name.clone()
                } else {
                    format!("{} {}", name, subject)
                }
            })
            .collect())
    }

    fn commit_subjects_between(&self, from: &str, to: &str) -> Result<Vec<String>> {
        Ok(self
            .commit_ranges
            .get(&(from.to_string(), to.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn recent_commit_subjects(&self, rev: &str, limit: usize) -> Result<Vec<String>> {
        Ok(self
            .history
            .get(rev)
            .map(|subjects| subjects.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    fn resolve_commit(&self, rev: &str) -> Result<Oid> {
        self.revisions.get(rev).copied().ok_or_else(|| {
            TagError::Git(git2::Error::from_str(&format!(
                "revspec '{}' not found",
                rev
            )))
        })
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self.branch.clone())
    }

    fn remote_branch_oid(&self, remote: &str, branch: &str) -> Result<Option<Oid>> {
        Ok(self
            .remote_heads
            .get(&(remote.to_string(), branch.to_string()))
            .copied())
    }

    fn create_annotated_tag(&self, name: &str, message: &str, _target: Oid) -> Result<()> {
        let mut tags = self.tags.borrow_mut();
        if tags.iter().any(|(existing, _)| existing == name) {
            return Err(TagError::Git(git2::Error::from_str(&format!(
                "tag '{}' already exists",
                name
            ))));
        }
        tags.push((name.to_string(), message.to_string()));
        self.created
            .borrow_mut()
            .push((name.to_string(), message.to_string()));
        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        self.pushed
            .borrow_mut()
            .push((remote.to_string(), name.to_string()));
        Ok(())
    }
}
