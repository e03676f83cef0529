use crate::error::Result;
use crate::git::TagRepository;
use git2::{Oid, Repository as Git2Repo};
use std::path::Path;
use tracing::debug;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn tag_subject(&self, tag_name: &str) -> Result<String> {
        let reference = self.repo.find_reference(&format!("refs/tags/{}", tag_name))?;

        if let Ok(tag) = reference.peel_to_tag() {
            let subject = tag.message().and_then(|m| m.lines().next()).unwrap_or("");
            return Ok(subject.trim().to_string());
        }

        let commit = reference.peel_to_commit()?;
        Ok(commit.summary().unwrap_or("").trim().to_string())
    }
}

impl TagRepository for Git2Repository {
    fn list_tag_lines(&self, pattern: &str) -> Result<Vec<String>> {
        debug!(pattern, "listing tags");
        let names = self.repo.tag_names(Some(pattern))?;

        let mut lines = Vec::new();
        for name in names.iter().flatten() {
            let subject = self.tag_subject(name)?;
            if subject.is_empty() {
                lines.push(name.to_string());
            } else {
                lines.push(format!("{} {}", name, subject));
            }
        }
        Ok(lines)
    }

    fn commit_subjects_between(&self, from: &str, to: &str) -> Result<Vec<String>> {
        debug!(from, to, "listing commits");
        let from_oid = self.resolve_commit(from)?;
        let to_oid = self.resolve_commit(to)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(to_oid)?;
        revwalk.hide(from_oid)?;

        let mut subjects = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            subjects.push(commit.summary().unwrap_or("").to_string());
        }
        Ok(subjects)
    }

    fn recent_commit_subjects(&self, rev: &str, limit: usize) -> Result<Vec<String>> {
        debug!(rev, limit, "listing recent commits");
        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(self.resolve_commit(rev)?)?;

        let mut subjects = Vec::new();
        for oid in revwalk.take(limit) {
            let commit = self.repo.find_commit(oid?)?;
            subjects.push(commit.summary().unwrap_or("").to_string());
        }
        Ok(subjects)
    }

    fn resolve_commit(&self, rev: &str) -> Result<Oid> {
        let object = self.repo.revparse_single(rev)?;
        Ok(object.peel_to_commit()?.id())
    }

    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if head.is_branch() {
            Ok(head.shorthand().unwrap_or("HEAD").to_string())
        } else {
            Ok("HEAD".to_string())
        }
    }

    fn remote_branch_oid(&self, remote: &str, branch: &str) -> Result<Option<Oid>> {
        let name = format!("refs/remotes/{}/{}", remote, branch);
        match self.repo.find_reference(&name) {
            Ok(reference) => Ok(reference.peel_to_commit().ok().map(|c| c.id())),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn create_annotated_tag(&self, name: &str, message: &str, target: Oid) -> Result<()> {
        debug!(name, %target, "creating annotated tag");
        let object = self.repo.find_object(target, None)?;
        let tagger = self.repo.signature()?;
        self.repo.tag(name, &object, &tagger, message, false)?;
        Ok(())
    }

    fn push_tag(&self, remote: &str, name: &str) -> Result<()> {
        debug!(remote, name, "pushing tag");
        let mut remote = self.repo.find_remote(remote)?;

        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            let username = username_from_url.unwrap_or("git");
            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }
            }
            git2::Cred::default()
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = format!("refs/tags/{}:refs/tags/{}", name, name);
        remote.push(&[refspec.as_str()], Some(&mut push_options))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use tempfile::TempDir;

    fn commit(repo: &Git2Repo, message: &str) -> Oid {
        let sig = Signature::now("Test", "test@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let parents: Vec<git2::Commit> = match repo.head() {
            Ok(head) => vec![head.peel_to_commit().unwrap()],
            Err(_) => Vec::new(),
        };
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();
        repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    fn fixture() -> (TempDir, Git2Repository) {
        let dir = TempDir::new().unwrap();
        let repo = Git2Repo::init(dir.path()).unwrap();
        {
            let mut config = repo.config().unwrap();
            config.set_str("user.name", "Test").unwrap();
            config.set_str("user.email", "test@example.com").unwrap();
        }
        (dir, Git2Repository::from_git2(repo))
    }

    #[test]
    fn test_annotated_tags_are_listed_with_subject() {
        let (_dir, repo) = fixture();
        let first = commit(&repo.repo, "feat: first");
        repo.create_annotated_tag("stg6_1.2-0", "initial deploy\n\nbody", first)
            .unwrap();
        let object = repo.repo.find_object(first, None).unwrap();
        repo.repo.tag_lightweight("demo_1.2-0", &object, false).unwrap();

        let mut lines = repo.list_tag_lines("stg6_*").unwrap();
        lines.sort();
        assert_eq!(lines, vec!["stg6_1.2-0 initial deploy".to_string()]);

        let lines = repo.list_tag_lines("demo_*").unwrap();
        assert_eq!(lines, vec!["demo_1.2-0 feat: first".to_string()]);
    }

    #[test]
    fn test_commit_subjects_between_tag_and_head() {
        let (_dir, repo) = fixture();
        let first = commit(&repo.repo, "chore: init");
        repo.create_annotated_tag("stg6_1.0.0-1", "base", first).unwrap();
        commit(&repo.repo, "fix: one");
        commit(&repo.repo, "feat: two");

        let subjects = repo.commit_subjects_between("stg6_1.0.0-1", "HEAD").unwrap();
        assert_eq!(subjects, vec!["feat: two".to_string(), "fix: one".to_string()]);
        assert_eq!(repo.resolve_commit("stg6_1.0.0-1").unwrap(), first);
    }

    #[test]
    fn test_recent_commit_subjects_are_limited() {
        let (_dir, repo) = fixture();
        commit(&repo.repo, "chore: init");
        commit(&repo.repo, "fix: one");
        commit(&repo.repo, "feat: two");

        let subjects = repo.recent_commit_subjects("HEAD", 2).unwrap();
        assert_eq!(subjects, vec!["feat: two".to_string(), "fix: one".to_string()]);
        assert_eq!(repo.recent_commit_subjects("HEAD", 10).unwrap().len(), 3);
    }

    #[test]
    fn test_current_branch_and_missing_remote() {
        let (_dir, repo) = fixture();
        commit(&repo.repo, "chore: init");
        let branch = repo.current_branch().unwrap();
        assert!(branch == "master" || branch == "main");
        assert_eq!(repo.remote_branch_oid("origin", &branch).unwrap(), None);
    }

    #[test]
    fn test_duplicate_tag_is_rejected() {
        let (_dir, repo) = fixture();
        let oid = commit(&repo.repo, "chore: init");
        repo.create_annotated_tag("dev_1.0-0", "a", oid).unwrap();
        assert!(repo.create_annotated_tag("dev_1.0-0", "b", oid).is_err());
    }
}
