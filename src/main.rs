use std::process::ExitCode;

use anyhow::{bail, Result};
use clap::Parser;
use git2::Oid;
use tracing::debug;

use deploy_tagger::boundary::BoundaryWarning;
use deploy_tagger::cli::workflow::{
    self, AddTagArgs, BumpPlan, BumpVersionArgs, VersionListArgs, VersionListing,
};
use deploy_tagger::cli::{
    caused_by_malformed_input, BumpVersionCommand, Cli, Command, ListFormat, VersionListCommand,
};
use deploy_tagger::config::{self, Config};
use deploy_tagger::domain::{BumpRequest, Tag, TagGrammar};
use deploy_tagger::git::Git2Repository;
use deploy_tagger::ui::{self, formatter};

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.parse().unwrap_or_default()),
        )
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::display_error(&format!("{:#}", e));
            if caused_by_malformed_input(&e) {
                ui::display_tag_format_hint();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config::load_config(cli.config.as_deref())?;
    let grammar = config.grammar();

    match cli.command {
        Command::LastTag {
            environment,
            service,
        } => last_tag(&config, &grammar, &environment, &service),
        Command::AddTag {
            environment,
            version,
            from,
            hot_fix,
            service,
            no_push,
        } => {
            let args = AddTagArgs {
                environment,
                version,
                from,
                hotfix: hot_fix,
                service,
                remote: config.remote.clone(),
                require_synced_remote: config.behavior.require_synced_remote,
            };
            add_tag(&config, &grammar, &args, no_push)
        }
        Command::BumpVersion(command) => bump_version(&config, &grammar, &command),
        Command::VersionList(command) => version_list(&config, &grammar, &command),
        Command::VersionDiff {
            target,
            older,
            service,
            stats,
        } => version_diff(&config, &grammar, &target, older.as_deref(), &service, stats),
        Command::BranchVersion {
            env,
            service,
            auto_tag,
            no_push,
        } => branch_version(&config, &grammar, env.as_deref(), &service, auto_tag, no_push),
        Command::Projects => {
            ui::display_projects(&config.projects);
            Ok(())
        }
    }
}

/// Open the checkout of `service`, or the current directory when empty.
fn open_repository(config: &Config, service: &str) -> Result<Git2Repository> {
    if service.is_empty() {
        return Ok(Git2Repository::open(".")?);
    }
    match config.project_path(service) {
        Some(path) => {
            debug!(service, path = %path.display(), "using project checkout");
            Ok(Git2Repository::open(path)?)
        }
        None => {
            ui::display_projects(&config.projects);
            bail!("service '{}' not found in configuration", service)
        }
    }
}

/// Show warnings; returns false when the user declines to continue.
fn review_warnings(warnings: &[BoundaryWarning]) -> Result<bool> {
    for warning in warnings {
        ui::display_boundary_warning(warning);
        if matches!(warning, BoundaryWarning::OffMainline { .. })
            && !ui::confirm_action("Continue?")?
        {
            return Ok(false);
        }
    }
    Ok(true)
}

fn last_tag(config: &Config, grammar: &TagGrammar, environment: &str, service: &str) -> Result<()> {
    let repo = open_repository(config, service)?;
    let report = workflow::last_tag(&repo, grammar, environment, service)?;

    for warning in &report.warnings {
        if let BoundaryWarning::UnparsableTag { .. } = warning {
            ui::display_boundary_warning(warning);
        }
    }
    match report.latest {
        Some(candidate) => ui::display_latest_tag(&candidate),
        None if service.is_empty() => println!(
            "No tags found in current directory for environment '{}'",
            environment
        ),
        None => println!(
            "No tags found for service '{}' in environment '{}'",
            service, environment
        ),
    }
    Ok(())
}

fn add_tag(config: &Config, grammar: &TagGrammar, args: &AddTagArgs, no_push: bool) -> Result<()> {
    let repo = open_repository(config, &args.service)?;
    let plan = workflow::plan_add_tag(&repo, grammar, args)?;

    if !review_warnings(&plan.warnings)? {
        println!("Operation cancelled by user.");
        return Ok(());
    }

    let new_tag = plan.new_tag.to_string();
    let question = match &plan.promoted_from {
        Some(from) => {
            ui::display_proposed_tag(Some(from.as_str()), &new_tag);
            format!("Promote {} to {}?", from, new_tag)
        }
        None => {
            ui::display_proposed_tag(plan.previous.as_deref(), &new_tag);
            format!("Add {}?", new_tag)
        }
    };
    if !ui::confirm_action(&question)? {
        println!("Operation cancelled by user.");
        return Ok(());
    }

    let comment = ui::ask("Tag comment", &plan.default_comment())?;
    persist(&repo, config, &plan.new_tag, &comment, plan.target, no_push)
}

fn bump_version(config: &Config, grammar: &TagGrammar, command: &BumpVersionCommand) -> Result<()> {
    let repo = open_repository(config, &command.service)?;
    let args = BumpVersionArgs {
        environment: command.environment.clone(),
        request: command.request(),
        service: command.service.clone(),
        from_commit: command.from_commit.clone(),
    };
    let plan = workflow::plan_bump_version(&repo, grammar, &args)?;

    ui::display_status(&format!(
        "Current latest tag: {} (version: {})",
        plan.previous.name,
        plan.previous.tag.version()
    ));
    if args.request == BumpRequest::Auto {
        ui::display_status(&format!(
            "Auto-detected bump type: {} (analyzed {} commits)",
            plan.kind,
            plan.commits.len()
        ));
    }

    if command.preview {
        println!("\nPreview:");
        println!("  Current tag:   {}", plan.previous.name);
        println!("  Bump type:     {}", plan.kind);
        println!("  New tag:       {}", plan.new_tag);
        println!("  Target commit: {}", command.from_commit);
        println!("\nTo create this tag, run the same command without --preview");
        return Ok(());
    }

    let default_comment = plan.default_comment();
    confirm_bump(&repo, config, &plan, &default_comment, command.no_push)
}

/// Ask before creating a bumped tag, then persist it.
fn confirm_bump(
    repo: &Git2Repository,
    config: &Config,
    plan: &BumpPlan,
    default_comment: &str,
    no_push: bool,
) -> Result<()> {
    ui::display_proposed_tag(Some(plan.previous.name.as_str()), &plan.new_tag.to_string());
    if !ui::confirm_action(&format!("Create new tag {}?", plan.new_tag))? {
        println!("Operation cancelled by user.");
        return Ok(());
    }

    let comment = ui::ask("Tag comment", default_comment)?;
    persist(repo, config, &plan.new_tag, &comment, plan.target, no_push)
}

fn version_list(config: &Config, grammar: &TagGrammar, command: &VersionListCommand) -> Result<()> {
    let environments = match &command.environment {
        Some(environment) if !command.all => vec![environment.clone()],
        _ => grammar.environments().names().to_vec(),
    };
    let args = VersionListArgs {
        environments,
        service: command.service.clone(),
        major: command.major,
        minor: command.minor,
        limit: command.limit,
    };

    let repo = open_repository(config, command.service.as_deref().unwrap_or(""))?;
    let VersionListing { entries, warnings } = workflow::version_list(&repo, grammar, &args)?;
    for warning in &warnings {
        ui::display_boundary_warning(warning);
    }

    match command.format {
        ListFormat::Table => print!("{}", formatter::format_version_table(&entries)),
        ListFormat::Compact => print!("{}", formatter::format_version_compact(&entries)),
        ListFormat::Json => println!("{}", formatter::format_version_json(&entries)?),
    }
    Ok(())
}

fn version_diff(
    config: &Config,
    grammar: &TagGrammar,
    target: &str,
    older: Option<&str>,
    service: &str,
    stats: bool,
) -> Result<()> {
    let repo = open_repository(config, service)?;

    // A lone argument that is not a tag names an environment.
    if older.is_none() && !grammar.is_valid(target) {
        let history = workflow::environment_history(&repo, grammar, target, service)?;
        for warning in &history.warnings {
            ui::display_boundary_warning(warning);
        }
        ui::display_history(&history, stats);
        return Ok(());
    }

    let diff = workflow::version_diff(&repo, grammar, target, older)?;
    let (older, newer) = (diff.older.to_string(), diff.newer.to_string());
    ui::display_version_change(&older, &newer, diff.change);
    ui::display_commit_analysis(&diff.commits, &older, &newer);
    if !diff.commits.is_empty() {
        ui::display_status(&format!("Commits suggest a {} bump", diff.suggested));
    }
    Ok(())
}

fn branch_version(
    config: &Config,
    grammar: &TagGrammar,
    environment: Option<&str>,
    service: &str,
    auto_tag: bool,
    no_push: bool,
) -> Result<()> {
    let repo = open_repository(config, service)?;
    let suggestion = workflow::suggest_branch_bump(&repo)?;

    ui::display_branch_analysis(&suggestion.branch);
    println!();
    print!(
        "{}",
        formatter::format_branch_suggestion(
            &suggestion,
            environment,
            service,
            grammar.environments().names()
        )
    );

    let Some(environment) = environment.filter(|_| auto_tag) else {
        return Ok(());
    };
    let plan = workflow::plan_branch_tag(&repo, grammar, &suggestion, environment, service)?;
    ui::display_status(&format!(
        "Current latest: {} (version: {})",
        plan.previous.name,
        plan.previous.tag.version()
    ));
    confirm_bump(&repo, config, &plan, &suggestion.branch.tag_comment(), no_push)
}

fn persist(
    repo: &Git2Repository,
    config: &Config,
    tag: &Tag,
    comment: &str,
    target: Oid,
    no_push: bool,
) -> Result<()> {
    let push_to = if no_push {
        None
    } else {
        Some(config.remote.as_str())
    };
    workflow::apply_tag(repo, tag, comment, target, push_to)?;

    if no_push {
        ui::display_success(&format!("Created tag {}", tag));
        ui::display_manual_push_instruction(&tag.to_string(), &config.remote);
    } else {
        ui::display_success(&format!("Created and pushed tag {}", tag));
    }
    Ok(())
}
