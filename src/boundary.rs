use std::fmt;

/// Non-fatal conditions met while planning a tag.
/// These are reported to the user, who decides whether to continue.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// No tag exists yet for the queried prefix
    NoTagsFound { pattern: String },
    /// No new commits since the latest tag
    NoNewCommits {
        latest_tag: String,
        current_commit_hash: String,
    },
    /// Tag exists but cannot be parsed by the tag grammar
    UnparsableTag { tag: String, reason: String },
    /// Regular tags are expected to come from a mainline branch
    OffMainline { branch: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::NoTagsFound { pattern } => {
                write!(f, "No tags found matching '{}'", pattern)
            }
            BoundaryWarning::NoNewCommits {
                latest_tag,
                current_commit_hash,
            } => {
                let short_hash = if current_commit_hash.len() > 7 {
                    &current_commit_hash[..7]
                } else {
                    current_commit_hash.as_str()
                };
                write!(
                    f,
                    "No new commits since tag '{}' (current: {})",
                    latest_tag, short_hash
                )
            }
            BoundaryWarning::UnparsableTag { tag, reason } => {
                write!(f, "Cannot parse tag '{}': {}", tag, reason)
            }
            BoundaryWarning::OffMainline { branch } => {
                write!(f, "Current branch is '{}', not main or master", branch)
            }
        }
    }
}
