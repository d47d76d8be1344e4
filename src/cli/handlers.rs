//! Command handlers: run a parsed command against the store.

use std::fs;
use std::path::Path;

use colored::*;
use eyre::{Context, Result, bail, eyre};
use log::info;
use tokio_util::sync::CancellationToken;

use qadesk::assistant::{AnthropicClient, AnthropicConfig, AssistantSession, AssistantTurn, ERROR_REPLY, SuiteRef};
use qadesk::config::Config;
use qadesk::domain::{
    NewTestCase, NewTestSuite, NewUser, Priority, StatusSummary, TestCase, TestStatus, TestSuitePatch, TesterRole,
    UserRole,
};
use qadesk::execution::{ExecutionRun, StepVerdict};
use qadesk::export::export_suite;
use qadesk::link::clear_suite_param;
use qadesk::store::{CaseSortKey, DomainStore, SortDirection};

use crate::cli::commands::{CaseCommands, SuiteCommands, UserCommands};

fn paint_status(status: TestStatus) -> ColoredString {
    match status {
        TestStatus::Pass => status.as_str().green(),
        TestStatus::Fail => status.as_str().red(),
        TestStatus::Blocked => status.as_str().yellow(),
        TestStatus::Skipped => status.as_str().blue(),
        TestStatus::Untested => status.as_str().dimmed(),
    }
}

fn paint_priority(priority: Priority) -> ColoredString {
    match priority {
        Priority::High => priority.as_str().red().bold(),
        Priority::Medium => priority.as_str().yellow(),
        Priority::Low => priority.as_str().normal(),
    }
}

/// Accept either the internal id or the human-readable label
fn resolve_case_id(store: &DomainStore, key: &str) -> Result<String> {
    store
        .test_case(key)
        .or_else(|| store.test_cases().iter().find(|c| c.test_case_id == key))
        .map(|c| c.id.clone())
        .ok_or_else(|| eyre!("No test case matching '{}'", key))
}

fn require_suite(store: &DomainStore, id: &str) -> Result<()> {
    if store.test_suite(id).is_none() {
        bail!("No test suite with id '{}'", id);
    }
    Ok(())
}

/// `Some("")` clears an optional reference, anything else sets it
fn optional_reference(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| if v.is_empty() { None } else { Some(v) })
}

fn print_case_line(store: &DomainStore, case: &TestCase, verbose: bool) {
    let suite = case
        .test_suite_id
        .as_deref()
        .and_then(|id| store.test_suite(id))
        .map(|s| s.name.as_str())
        .unwrap_or("-");
    println!(
        "{:<20} {:<8} QA:{:<9} UAT:{:<9} BAT:{:<9} {} {}",
        case.test_case_id.bold(),
        paint_priority(case.priority),
        paint_status(case.qa_status),
        paint_status(case.uat_status),
        paint_status(case.bat_status),
        case.title,
        format!("[{}]", suite).dimmed()
    );
    if verbose {
        println!("    id: {}", case.id.dimmed());
    }
}

fn print_summary(role: TesterRole, summary: &StatusSummary) {
    println!("{} ({} cases)", role.to_string().bold(), summary.total);
    println!("  {:<9} {}", "Pass".green(), summary.passed);
    println!("  {:<9} {}", "Fail".red(), summary.failed);
    println!("  {:<9} {}", "Blocked".yellow(), summary.blocked);
    println!("  {:<9} {}", "Skipped".blue(), summary.skipped);
    println!("  {:<9} {}", "Untested".dimmed(), summary.untested);
    println!("  Pass rate: {}%", summary.pass_rate());
}

pub fn handle_suite_command(store: &mut DomainStore, command: SuiteCommands, verbose: bool) -> Result<()> {
    info!("Handling suite command: {:?}", command);
    match command {
        SuiteCommands::List { all } => {
            let suites: Vec<_> = if all {
                store.test_suites().iter().collect()
            } else {
                store.visible_suites()
            };
            if suites.is_empty() {
                println!("{}", "No test suites".dimmed());
            }
            for suite in suites {
                let hidden = if suite.is_hidden { " (hidden)".dimmed() } else { "".normal() };
                println!(
                    "{} {}{} - {} cases, owner: {}",
                    suite.id.dimmed(),
                    suite.name.bold(),
                    hidden,
                    store.suite_case_count(&suite.id),
                    store.suite_owner(suite)
                );
                if verbose && !suite.description.is_empty() {
                    println!("    {}", suite.description);
                }
            }
        }
        SuiteCommands::Create {
            name,
            description,
            owner,
            jira,
        } => {
            let mut fields = NewTestSuite::new(name, description);
            if let Some(owner) = owner {
                fields = fields.owned_by(owner);
            }
            if let Some(jira) = jira {
                fields = fields.with_jira(jira);
            }
            let suite = &store.create_test_suite(fields)[0];
            println!("{} {} ({})", "Created suite:".green(), suite.name, suite.id);
        }
        SuiteCommands::Update {
            id,
            name,
            description,
            owner,
            jira,
        } => {
            require_suite(store, &id)?;
            let patch = TestSuitePatch {
                name,
                description,
                owner_id: optional_reference(owner),
                jira_number: optional_reference(jira),
                is_hidden: None,
            };
            store.update_test_suite(&id, patch);
            println!("{} {}", "Updated suite:".green(), id);
        }
        SuiteCommands::Delete { id } => {
            require_suite(store, &id)?;
            let linked = store.suite_case_count(&id);
            store.delete_test_suite(&id);
            println!("{} {} ({} cases unlinked)", "Deleted suite:".red(), id, linked);
        }
        SuiteCommands::ToggleHidden { id } => {
            require_suite(store, &id)?;
            let hidden = store
                .toggle_test_suite_visibility(&id)
                .iter()
                .find(|s| s.id == id)
                .map(|s| s.is_hidden)
                .unwrap_or_default();
            let state = if hidden { "hidden" } else { "visible" };
            println!("{} {} is now {}", "Suite:".cyan(), id, state);
        }
        SuiteCommands::Export { id, output } => {
            let export = export_suite(store, &id)?;
            write_export(&output, &export.file_name, &export.contents)?;
            println!(
                "{} {}",
                "Exported:".green(),
                output.join(&export.file_name).display()
            );
        }
    }
    Ok(())
}

fn write_export(dir: &Path, file_name: &str, contents: &str) -> Result<()> {
    fs::create_dir_all(dir).context(format!("Failed to create {}", dir.display()))?;
    let path = dir.join(file_name);
    fs::write(&path, contents).context(format!("Failed to write {}", path.display()))
}

pub fn handle_case_command(store: &mut DomainStore, command: CaseCommands, verbose: bool) -> Result<()> {
    info!("Handling case command: {:?}", command);
    match command {
        CaseCommands::List { suite, sort, desc } => {
            let direction = if desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            };
            let cases = match sort {
                Some(key) => store.sorted_cases(key, direction),
                None if desc => store.sorted_cases(CaseSortKey::default(), direction),
                None => store.test_cases().iter().collect(),
            };
            let cases: Vec<&TestCase> = match &suite {
                Some(sid) => cases
                    .into_iter()
                    .filter(|c| c.test_suite_id.as_deref() == Some(sid.as_str()))
                    .collect(),
                None => cases,
            };
            if cases.is_empty() {
                println!("{}", "No test cases".dimmed());
            }
            for case in cases {
                print_case_line(store, case, verbose);
            }
        }
        CaseCommands::Create {
            test_case_id,
            title,
            description,
            preconditions,
            test_data,
            priority,
            suite,
            steps,
            requirements,
        } => {
            if let Some(sid) = &suite {
                require_suite(store, sid)?;
            }
            let mut fields = NewTestCase::new(test_case_id, title)
                .with_description(description)
                .with_preconditions(preconditions)
                .with_test_data(test_data)
                .with_priority(priority)
                .with_related_requirements(requirements);
            for (action, expected) in steps {
                fields = fields.with_step(action, expected);
            }
            if let Some(sid) = suite {
                fields = fields.in_suite(sid);
            }
            let case = &store.create_test_case(fields)[0];
            println!("{} {} ({})", "Created case:".green(), case.test_case_id, case.id);
        }
        CaseCommands::Copy { id } => {
            let id = resolve_case_id(store, &id)?;
            let copy = &store.copy_test_case(&id)[0];
            println!("{} {} ({})", "Copied to:".green(), copy.test_case_id, copy.id);
        }
        CaseCommands::Delete { id } => {
            let id = resolve_case_id(store, &id)?;
            store.delete_test_case(&id);
            println!("{} {}", "Deleted case:".red(), id);
        }
        CaseCommands::Show { id } => {
            let id = resolve_case_id(store, &id)?;
            let case = store
                .test_case(&id)
                .ok_or_else(|| eyre!("No test case with id '{}'", id))?;
            show_case(store, case);
        }
    }
    Ok(())
}

fn show_case(store: &DomainStore, case: &TestCase) {
    println!("{} {}", case.test_case_id.bold(), case.title);
    println!("  Priority:     {}", paint_priority(case.priority));
    println!(
        "  Status:       QA {} / UAT {} / BAT {}",
        paint_status(case.qa_status),
        paint_status(case.uat_status),
        paint_status(case.bat_status)
    );
    if let Some(suite) = case.test_suite_id.as_deref().and_then(|id| store.test_suite(id)) {
        println!("  Suite:        {}", suite.name);
    }
    if case.executor_id.is_some() || case.executor.is_some() {
        println!("  Executor:     {}", store.case_executor(case));
    }
    for (label, value) in [
        ("Description", &case.description),
        ("Preconditions", &case.preconditions),
        ("Test data", &case.test_data),
        ("Requirements", &case.related_requirements),
    ] {
        if !value.is_empty() {
            println!("  {}:", label);
            for line in value.lines() {
                println!("    {}", line);
            }
        }
    }
    println!("  Steps:");
    for (i, step) in case.steps.iter().enumerate() {
        println!("    {}. {}", i + 1, step.action);
        println!("       {} {}", "=>".dimmed(), step.expected_result);
    }
    println!(
        "  Updated:      {}",
        case.updated_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
    );
}

pub fn handle_user_command(store: &mut DomainStore, command: UserCommands) -> Result<()> {
    info!("Handling user command: {:?}", command);
    match command {
        UserCommands::List => {
            if store.users().is_empty() {
                println!("{}", "No users".dimmed());
            }
            for user in store.users() {
                let roles: Vec<&str> = user.roles.iter().map(UserRole::as_str).collect();
                println!(
                    "{} {} <{}> {}",
                    user.id.dimmed(),
                    user.name.bold(),
                    user.email,
                    roles.join(", ").cyan()
                );
            }
        }
        UserCommands::Create { name, email, roles } => {
            let fields = roles
                .into_iter()
                .fold(NewUser::new(name, email), |fields, role| fields.with_role(role));
            let user = &store.create_user(fields)[0];
            println!("{} {} ({})", "Created user:".green(), user.name, user.id);
        }
        UserCommands::Delete { id } => {
            if store.user(&id).is_none() {
                bail!("No user with id '{}'", id);
            }
            store.delete_user(&id);
            println!("{} {}", "Deleted user:".red(), id);
        }
    }
    Ok(())
}

pub fn handle_run_command(
    store: &mut DomainStore,
    case_key: &str,
    role: TesterRole,
    executor: Option<String>,
    verdicts: &[StepVerdict],
    status: Option<TestStatus>,
) -> Result<()> {
    let id = resolve_case_id(store, case_key)?;
    let case = store
        .test_case(&id)
        .ok_or_else(|| eyre!("No test case with id '{}'", id))?;
    let steps = case.steps.clone();
    println!("{} {} as {}", "Running".cyan(), case.test_case_id.bold(), role);

    if verdicts.len() > steps.len() {
        bail!("{} verdicts given but the case has {} steps", verdicts.len(), steps.len());
    }

    let mut run = ExecutionRun::start(case, role);
    if let Some(executor) = executor {
        if store.user(&executor).is_none() {
            println!("{} unknown executor {}", "Warning:".yellow(), executor);
        }
        run = run.with_executor(executor);
    }

    for verdict in verdicts {
        let index = run.current_step_index();
        run.record_current(*verdict)?;
        let mark = match verdict {
            StepVerdict::Pass => "PASS".green(),
            StepVerdict::Fail => "FAIL".red(),
        };
        println!("  {}. {} {}", index + 1, steps[index].action, mark);
    }
    if run.completed_steps() < run.step_count() {
        println!(
            "  {} of {} steps recorded",
            run.completed_steps(),
            run.step_count()
        );
    }

    if let Some(status) = status {
        run.set_overall_status(status);
    }

    let commit = run.commit();
    store.record_execution(&commit);
    println!("{} {}", "Result:".bold(), paint_status(commit.status));
    Ok(())
}

pub fn handle_open_command(store: &DomainStore, locator: &str) -> Result<()> {
    match store.resolve_deep_link(locator) {
        Some(suite) => {
            println!("{} {}", "Suite:".cyan(), suite.name.bold());
            if !suite.description.is_empty() {
                println!("  {}", suite.description);
            }
            if let Some(jira) = &suite.jira_number {
                println!("  Jira: {}", jira);
            }
            println!("  Owner: {}", store.suite_owner(suite));
            for case in store.cases_in_suite(&suite.id) {
                print_case_line(store, case, false);
            }
        }
        None => println!("{}", "No test suite for this link".yellow()),
    }
    println!("{} {}", "Location:".dimmed(), clear_suite_param(locator));
    Ok(())
}

pub fn handle_summary_command(store: &DomainStore, role: TesterRole, suite: Option<&str>) -> Result<()> {
    let summary = match suite {
        Some(sid) => {
            require_suite(store, sid)?;
            let cases = store.cases_in_suite(sid);
            store.status_summary(role, Some(&cases))
        }
        None => store.status_summary(role, None),
    };
    print_summary(role, &summary);
    Ok(())
}

pub fn handle_chat_command(store: &mut DomainStore, config: &Config, message: &str, verbose: bool) -> Result<()> {
    let client = AnthropicClient::new(AnthropicConfig::from(&config.assistant)).context("Assistant unavailable")?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    let mut session = AssistantSession::new(&config.assistant);
    let suites = SuiteRef::snapshot(store);
    let cancel = CancellationToken::new();

    let turn = runtime.block_on(async {
        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupt.cancel();
            }
        });
        session.send(&client, message, &suites, &cancel).await
    });

    match turn {
        Ok(AssistantTurn::Reply(reply)) => println!("{} {}", "assistant:".magenta(), reply),
        Ok(AssistantTurn::Actions(actions)) => {
            for confirmation in session.apply(actions, store) {
                println!("{} {}", "assistant:".magenta(), confirmation);
            }
        }
        Err(e) => {
            println!("{} {}", "assistant:".magenta(), ERROR_REPLY.red());
            log::error!("Chat failed: {}", e);
        }
    }

    let usage = client.total_usage();
    log::info!("Chat used {} input / {} output tokens", usage.input_tokens, usage.output_tokens);
    if verbose {
        println!("{}", format!("tokens: {} in, {} out", usage.input_tokens, usage.output_tokens).dimmed());
    }
    Ok(())
}
