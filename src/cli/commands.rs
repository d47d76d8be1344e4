//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - suite / case / user: manage the three collections
//! - run: execute a test case step by step
//! - open: resolve a suite deep link
//! - chat: ask the assistant to create suites and cases
//! - summary: status roll-up for a tester role

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use qadesk::domain::{Priority, TestStatus, TesterRole, UserRole};
use qadesk::execution::StepVerdict;
use qadesk::store::CaseSortKey;

/// qadesk - test case management from the command line
#[derive(Parser, Debug)]
#[command(name = "qadesk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the data directory from config
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage test suites
    Suite {
        #[command(subcommand)]
        command: SuiteCommands,
    },

    /// Manage test cases
    Case {
        #[command(subcommand)]
        command: CaseCommands,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Execute a test case, one verdict per step
    Run {
        /// Test case id (internal id or test case label)
        case: String,

        /// Tester role the run is recorded for (qa, uat, bat)
        #[arg(short, long, default_value = "qa")]
        role: TesterRole,

        /// User id of the executor
        #[arg(short, long)]
        executor: Option<String>,

        /// Step verdicts in order, e.g. pass,pass,fail
        #[arg(long, value_delimiter = ',')]
        verdicts: Vec<StepVerdict>,

        /// Overall status, overriding the suggested one
        #[arg(short, long)]
        status: Option<TestStatus>,
    },

    /// Open a suite deep link
    Open {
        /// Locator carrying a suiteId parameter
        locator: String,
    },

    /// Ask the QA assistant
    Chat {
        /// Message to send
        message: String,
    },

    /// Status summary for a tester role
    Summary {
        #[arg(short, long, default_value = "qa")]
        role: TesterRole,

        /// Only count cases of this suite
        #[arg(short, long)]
        suite: Option<String>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum SuiteCommands {
    /// List suites
    List {
        /// Include hidden suites
        #[arg(short, long)]
        all: bool,
    },

    /// Create a suite
    Create {
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Owner user id
        #[arg(short, long)]
        owner: Option<String>,

        /// Jira ticket number
        #[arg(short, long)]
        jira: Option<String>,
    },

    /// Update a suite
    Update {
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        description: Option<String>,

        /// Owner user id (empty string clears it)
        #[arg(short, long)]
        owner: Option<String>,

        /// Jira ticket number (empty string clears it)
        #[arg(short, long)]
        jira: Option<String>,
    },

    /// Delete a suite, unlinking its cases
    Delete { id: String },

    /// Hide or unhide a suite
    ToggleHidden { id: String },

    /// Export a suite's cases as CSV
    Export {
        id: String,

        /// Directory to write into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum CaseCommands {
    /// List cases
    List {
        /// Only cases of this suite
        #[arg(short, long)]
        suite: Option<String>,

        /// Sort column (id, title, priority, qa, uat, bat, created, updated)
        #[arg(long)]
        sort: Option<CaseSortKey>,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Create a case
    Create {
        /// Human-readable label, e.g. TC-001
        test_case_id: String,

        title: String,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(long, default_value = "")]
        preconditions: String,

        #[arg(long, default_value = "")]
        test_data: String,

        #[arg(short, long, default_value = "medium")]
        priority: Priority,

        #[arg(short, long)]
        suite: Option<String>,

        /// Step as "action|expected result" (repeatable)
        #[arg(long = "step", value_parser = parse_step)]
        steps: Vec<(String, String)>,

        #[arg(long, default_value = "")]
        requirements: String,
    },

    /// Duplicate a case
    Copy { id: String },

    /// Delete a case
    Delete { id: String },

    /// Show a case with its steps
    Show { id: String },
}

#[derive(Subcommand, Debug, Clone)]
pub enum UserCommands {
    /// List users
    List,

    /// Create a user
    Create {
        name: String,

        email: String,

        /// Role (repeatable): bsa, developer, qa, uat, business-user, other
        #[arg(short, long = "role")]
        roles: Vec<UserRole>,
    },

    /// Delete a user
    Delete { id: String },
}

fn parse_step(s: &str) -> Result<(String, String), String> {
    match s.split_once('|') {
        Some((action, expected)) => Ok((action.trim().to_string(), expected.trim().to_string())),
        None => Err(format!("expected \"action|expected result\", got \"{}\"", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["qadesk"]).is_err());
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::try_parse_from(["qadesk", "-v", "-c", "/tmp/q.yml", "suite", "list"]).unwrap();
        assert!(cli.is_verbose());
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/tmp/q.yml")));
    }

    #[test]
    fn test_suite_create() {
        let cli = Cli::try_parse_from(["qadesk", "suite", "create", "Checkout", "-d", "Payments", "-j", "QA-1"]).unwrap();
        match cli.command {
            Commands::Suite {
                command:
                    SuiteCommands::Create {
                        name,
                        description,
                        owner,
                        jira,
                    },
            } => {
                assert_eq!(name, "Checkout");
                assert_eq!(description, "Payments");
                assert_eq!(owner, None);
                assert_eq!(jira.as_deref(), Some("QA-1"));
            }
            _ => panic!("Expected suite create command"),
        }
    }

    #[test]
    fn test_suite_toggle_hidden() {
        let cli = Cli::try_parse_from(["qadesk", "suite", "toggle-hidden", "s1"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Suite {
                command: SuiteCommands::ToggleHidden { .. }
            }
        ));
    }

    #[test]
    fn test_case_create_with_steps() {
        let cli = Cli::try_parse_from([
            "qadesk",
            "case",
            "create",
            "TC-1",
            "Login",
            "-p",
            "high",
            "--step",
            "open app | app opens",
            "--step",
            "log in|home page",
        ])
        .unwrap();
        match cli.command {
            Commands::Case {
                command: CaseCommands::Create { priority, steps, .. },
            } => {
                assert_eq!(priority, Priority::High);
                assert_eq!(
                    steps,
                    vec![
                        ("open app".to_string(), "app opens".to_string()),
                        ("log in".to_string(), "home page".to_string()),
                    ]
                );
            }
            _ => panic!("Expected case create command"),
        }
    }

    #[test]
    fn test_case_create_rejects_bad_step() {
        assert!(Cli::try_parse_from(["qadesk", "case", "create", "TC-1", "t", "--step", "no separator"]).is_err());
    }

    #[test]
    fn test_case_list_sort() {
        let cli = Cli::try_parse_from(["qadesk", "case", "list", "--sort", "priority", "--desc"]).unwrap();
        match cli.command {
            Commands::Case {
                command: CaseCommands::List { sort, desc, .. },
            } => {
                assert_eq!(sort, Some(CaseSortKey::Priority));
                assert!(desc);
            }
            _ => panic!("Expected case list command"),
        }
    }

    #[test]
    fn test_run_command() {
        let cli = Cli::try_parse_from([
            "qadesk",
            "run",
            "TC-1",
            "--role",
            "uat",
            "--executor",
            "u1",
            "--verdicts",
            "pass,pass,fail",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                case,
                role,
                executor,
                verdicts,
                status,
            } => {
                assert_eq!(case, "TC-1");
                assert_eq!(role, TesterRole::Uat);
                assert_eq!(executor.as_deref(), Some("u1"));
                assert_eq!(verdicts, vec![StepVerdict::Pass, StepVerdict::Pass, StepVerdict::Fail]);
                assert_eq!(status, None);
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_run_status_override() {
        let cli = Cli::try_parse_from(["qadesk", "run", "TC-1", "--status", "skipped"]).unwrap();
        match cli.command {
            Commands::Run { status, role, .. } => {
                assert_eq!(status, Some(TestStatus::Skipped));
                assert_eq!(role, TesterRole::Qa);
            }
            _ => panic!("Expected run command"),
        }
    }

    #[test]
    fn test_user_create_roles() {
        let cli = Cli::try_parse_from(["qadesk", "user", "create", "Ada", "ada@example.com", "-r", "qa", "-r", "bsa"]).unwrap();
        match cli.command {
            Commands::User {
                command: UserCommands::Create { roles, .. },
            } => {
                assert_eq!(roles, vec![UserRole::Qa, UserRole::Bsa]);
            }
            _ => panic!("Expected user create command"),
        }
    }

    #[test]
    fn test_open_and_chat() {
        let cli = Cli::try_parse_from(["qadesk", "open", "https://qa.example.com/?suiteId=s1"]).unwrap();
        assert!(matches!(cli.command, Commands::Open { .. }));
        let cli = Cli::try_parse_from(["qadesk", "chat", "create a login suite"]).unwrap();
        assert!(matches!(cli.command, Commands::Chat { .. }));
    }
}
