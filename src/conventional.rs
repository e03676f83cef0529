//! Conventional-commit bump classification.

pub use crate::domain::BumpKind;
use regex::Regex;
use std::sync::LazyLock;

static BREAKING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(BREAKING|BREAKING CHANGE|!:)").expect("breaking pattern"));

static FEATURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(feat|feature)(\(.+\))?:").expect("feature pattern"));

static FIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(fix|bugfix)(\(.+\))?:").expect("fix pattern"));

/// Marker found in a single commit subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMarker {
    Breaking,
    Feature,
    Fix,
    Other,
}

/// Classify one subject; breaking markers win over the commit type.
pub fn classify_commit(message: &str) -> CommitMarker {
    if BREAKING.is_match(message) {
        CommitMarker::Breaking
    } else if FEATURE.is_match(message) {
        CommitMarker::Feature
    } else if FIX.is_match(message) {
        CommitMarker::Fix
    } else {
        CommitMarker::Other
    }
}

/// Suggest a bump kind for a list of commit subjects.
///
/// Any breaking marker yields `Major`, else any feature yields `Minor`;
/// fixes, unrecognized subjects and an empty list all yield `Patch`.
pub fn detect_bump_type<S: AsRef<str>>(commits: &[S]) -> BumpKind {
    let mut has_feature = false;

    for commit in commits {
        match classify_commit(commit.as_ref()) {
            CommitMarker::Breaking => return BumpKind::Major,
            CommitMarker::Feature => has_feature = true,
            CommitMarker::Fix | CommitMarker::Other => {}
        }
    }

    if has_feature {
        BumpKind::Minor
    } else {
        BumpKind::Patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_beats_fix() {
        assert_eq!(detect_bump_type(&["feat: x", "fix: y"]), BumpKind::Minor);
    }

    #[test]
    fn test_bang_is_breaking() {
        assert_eq!(detect_bump_type(&["feat!: x"]), BumpKind::Major);
        assert_eq!(detect_bump_type(&["refactor(api)!: drop v1"]), BumpKind::Major);
    }

    #[test]
    fn test_other_types_default_to_patch() {
        assert_eq!(detect_bump_type(&["docs: x"]), BumpKind::Patch);
        assert_eq!(detect_bump_type(&["fix: y"]), BumpKind::Patch);
        assert_eq!(detect_bump_type(&["Merge branch 'main'"]), BumpKind::Patch);
    }

    #[test]
    fn test_empty_list_defaults_to_patch() {
        let commits: Vec<String> = Vec::new();
        assert_eq!(detect_bump_type(&commits), BumpKind::Patch);
    }

    #[test]
    fn test_breaking_wins_regardless_of_position() {
        let commits = vec![
            "feat: new endpoint".to_string(),
            "fix: typo".to_string(),
            "chore: BREAKING CHANGE remove legacy flag".to_string(),
        ];
        assert_eq!(detect_bump_type(&commits), BumpKind::Major);
    }

    #[test]
    fn test_markers_are_case_insensitive() {
        assert_eq!(detect_bump_type(&["FEAT: shout"]), BumpKind::Minor);
        assert_eq!(detect_bump_type(&["Feature(ui): panel"]), BumpKind::Minor);
        assert_eq!(detect_bump_type(&["docs: note breaking behaviour"]), BumpKind::Major);
    }

    #[test]
    fn test_feature_must_start_the_subject() {
        assert_eq!(detect_bump_type(&["docs: describe feat: usage"]), BumpKind::Patch);
        assert_eq!(detect_bump_type(&["feature without colon"]), BumpKind::Patch);
    }

    #[test]
    fn test_classify_commit() {
        assert_eq!(classify_commit("feat(api): x"), CommitMarker::Feature);
        assert_eq!(classify_commit("bugfix: x"), CommitMarker::Fix);
        assert_eq!(classify_commit("fix!: x"), CommitMarker::Breaking);
        assert_eq!(classify_commit("chore: x"), CommitMarker::Other);
    }
}
