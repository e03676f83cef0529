//! Pure formatting functions for UI output.
//!
//! `format_*` functions build the text; `display_*` functions print it.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::cli::workflow::{BranchSuggestion, BumpBasis, BumpStats, VersionEntry, VersionHistory};
use crate::config::Project;
use crate::domain::{BranchInfo, BumpKind, TagCandidate};

/// Shape of every tag the grammar accepts.
const TAG_FORMAT: &str = "[service_]env_MAJOR.MINOR[.PATCH][-RELEASE[.HOTFIX]]";

/// Longest commit subject shown before truncation.
const MAX_SUBJECT_WIDTH: usize = 72;

/// Commits shown before the remainder is summarized.
const MAX_LISTED_COMMITS: usize = 10;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green().bold(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Remind the user of the tag format after an input error.
pub fn display_tag_format_hint() {
    eprintln!(
        "{} tags look like {}, e.g. stg6_1.2-3 or api_demo_1.2.3-1.1",
        style("hint:").cyan(),
        TAG_FORMAT
    );
}

/// Display a boundary warning to the user.
pub fn display_boundary_warning(warning: &BoundaryWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow().bold(), warning);
}

/// Numbered commit list, truncated to the first ten subjects.
pub fn format_commit_list(commit_messages: &[String]) -> String {
    let mut out = String::new();
    for (i, message) in commit_messages.iter().take(MAX_LISTED_COMMITS).enumerate() {
        out.push_str(&format!("  {}. {}\n", i + 1, truncate(message, MAX_SUBJECT_WIDTH)));
    }
    if commit_messages.len() > MAX_LISTED_COMMITS {
        out.push_str(&format!(
            "  ... and {} more commits\n",
            commit_messages.len() - MAX_LISTED_COMMITS
        ));
    }
    out
}

/// Display commit analysis for a range.
pub fn display_commit_analysis(commit_messages: &[String], from: &str, to: &str) {
    println!(
        "\n{}",
        style(format!("Commits between '{}' and '{}'", from, to)).bold()
    );
    if commit_messages.is_empty() {
        println!("  (none)");
    } else {
        print!("{}", format_commit_list(commit_messages));
    }
}

/// Display the proposed tag change (or initial tag).
pub fn display_proposed_tag(old_tag: Option<&str>, new_tag: &str) {
    match old_tag {
        Some(old) => {
            println!("\n{}", style("Proposed Tag Change:").bold());
            println!("  From: {}", style(old).red());
            println!("  To:   {}", style(new_tag).green());
        }
        None => {
            println!("\n{}", style("Initial Tag:").bold());
            println!("  New tag: {}", style(new_tag).green());
        }
    }
}

/// Display the latest tag found for an environment.
pub fn display_latest_tag(candidate: &TagCandidate) {
    if candidate.comment.is_empty() {
        println!("{}", style(&candidate.name).green());
    } else {
        println!("{}  {}", style(&candidate.name).green(), candidate.comment);
    }
}

/// One-line summary of a version transition.
pub fn format_version_change(older: &str, newer: &str, change: Option<BumpKind>) -> String {
    match change {
        Some(kind) => format!("{} -> {}: {} change", older, newer, kind),
        None => format!("{} -> {}: no version increase", older, newer),
    }
}

/// Display a version transition.
pub fn display_version_change(older: &str, newer: &str, change: Option<BumpKind>) {
    println!(
        "\n{}",
        style(format_version_change(older, newer, change)).bold()
    );
}

/// Table of configured projects.
pub fn format_projects(projects: &[Project]) -> String {
    let width = projects.iter().map(|p| p.name.len()).max().unwrap_or(0);
    projects
        .iter()
        .map(|p| {
            format!(
                "  {:<width$}  {:<8}  {}\n",
                p.name,
                p.kind,
                p.path.display(),
                width = width
            )
        })
        .collect()
}

/// Display configured projects.
pub fn display_projects(projects: &[Project]) {
    if projects.is_empty() {
        display_status("No projects configured");
        return;
    }
    println!("{}", style("Configured projects:").bold());
    print!("{}", format_projects(projects));
}

/// Display manual push instruction for a tag.
pub fn display_manual_push_instruction(tag: &str, remote: &str) {
    println!(
        "\n{} To push this tag later, run:\n  {}",
        style("→").yellow(),
        style(format!("git push {} {}", remote, tag)).cyan()
    );
}

/// Version listing grouped by environment.
pub fn format_version_table(entries: &[VersionEntry]) -> String {
    if entries.is_empty() {
        return "No versions found matching criteria\n".to_string();
    }

    let mut environments: Vec<&str> = Vec::new();
    for entry in entries {
        if !environments.contains(&entry.environment.as_str()) {
            environments.push(&entry.environment);
        }
    }

    let mut out = String::new();
    for environment in environments {
        out.push_str(&format!("\nEnvironment: {}\n", environment));
        out.push_str(&format!(
            "{:<30} {:<12} {:<8} {:<10} {}\n",
            "Tag", "Version", "Release", "Commit", "Message"
        ));
        out.push_str(&format!("{}\n", "-".repeat(80)));
        for entry in entries.iter().filter(|e| e.environment == environment) {
            let commit = entry.commit.as_deref().unwrap_or("unknown");
            out.push_str(&format!(
                "{:<30} {:<12} {:<8} {:<10} {}\n",
                entry.tag,
                entry.version,
                entry.release.as_deref().unwrap_or("-"),
                truncate(commit, 8),
                truncate(&entry.message, MAX_SUBJECT_WIDTH)
            ));
        }
    }
    out
}

/// One `tag (version)` line per entry.
pub fn format_version_compact(entries: &[VersionEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{} ({})\n", e.tag, e.version))
        .collect()
}

/// Version listing as a JSON array.
pub fn format_version_json(entries: &[VersionEntry]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(entries)
}

/// Environment history, newest first, with the change each tag introduced.
pub fn format_history(history: &VersionHistory) -> String {
    if history.entries.is_empty() {
        return format!("No tags found for environment '{}'\n", history.environment);
    }

    let mut out = format!("Found {} versions:\n\n", history.entries.len());
    for entry in &history.entries {
        let change = entry
            .change
            .map(|kind| format!(" ({})", kind.as_str().to_uppercase()))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {} ({}){}\n",
            entry.candidate.name,
            entry.candidate.tag.version(),
            change
        ));
    }
    out
}

/// Release and bump counts with each bump kind's share.
pub fn format_bump_stats(stats: &BumpStats) -> String {
    let mut out = format!(
        "  Total releases: {}\n  Major bumps: {}\n  Minor bumps: {}\n  Patch bumps: {}\n",
        stats.releases, stats.major, stats.minor, stats.patch
    );
    if stats.changes() > 0 {
        out.push_str(&format!(
            "  Bump types: {:.1}% patch, {:.1}% minor, {:.1}% major\n",
            stats.percent(stats.patch),
            stats.percent(stats.minor),
            stats.percent(stats.major)
        ));
    }
    out
}

/// Display an environment's version history.
pub fn display_history(history: &VersionHistory, with_stats: bool) {
    println!(
        "{}\n",
        style(format!("Version history for environment: {}", history.environment)).bold()
    );
    print!("{}", format_history(history));
    if with_stats {
        println!("\n{}", style("Environment statistics:").bold());
        print!("{}", format_bump_stats(&history.stats));
    }
}

/// Display what the branch name says about versioning.
pub fn display_branch_analysis(branch: &BranchInfo) {
    println!("{}", style("Branch analysis").bold());
    println!("  Current branch:     {}", branch.name);
    println!("  Branch type:        {}", branch.kind);
    if let Some(topic) = &branch.topic {
        println!("  Feature/issue:      {}", topic);
    }
    println!("  Suggested strategy: {}", branch.kind.strategy());
}

/// Recommendation lines for a branch suggestion.
///
/// Release branches get one add-tag line per entry of `environments`.
pub fn format_branch_suggestion(
    suggestion: &BranchSuggestion,
    environment: Option<&str>,
    service: &str,
    environments: &[String],
) -> String {
    let Some(kind) = suggestion.bump else {
        let mut out = String::from(
            "Recommended: finalize the release version and tag each environment\n",
        );
        if let Some(version) = &suggestion.branch.topic {
            for env in environments {
                out.push_str(&format!("  deploy-tagger add-tag {} {}\n", env, version));
            }
        }
        return out;
    };

    let reason = match suggestion.basis {
        BumpBasis::Commits { analyzed } => {
            format!("based on {} recent commits", analyzed)
        }
        _ => format!("{} branch", suggestion.branch.kind),
    };
    let mut command = format!(
        "deploy-tagger bump-version {} --{}",
        environment.unwrap_or("<environment>"),
        kind
    );
    if !service.is_empty() {
        command.push_str(&format!(" --service {}", service));
    }

    format!(
        "Recommended: {} bump ({})\n  {}\n  {} --preview\n",
        kind.as_str().to_uppercase(),
        reason,
        command,
        command
    )
}

fn truncate(message: &str, width: usize) -> &str {
    match message.char_indices().nth(width) {
        Some((idx, _)) => &message[..idx],
        None => message,
    }
}
