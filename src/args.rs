//! These structs provide the CLI interface for the saldo CLI.

use crate::model::{Amount, TransactionType};
use crate::report::Period;
use crate::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// saldo: A command-line personal finance tracker.
///
/// The purpose of this program is to record income and expense transactions
/// in a hosted data store, define percentage-based budget allocations across
/// spending categories, and view computed summaries: a monthly dashboard with
/// per-category budget consumption, and a yearly trend report.
///
/// You will need the URL and publishable API key of a hosted-store project to
/// run `saldo init`, and an account on that project to run `saldo auth login`.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn new(common: Common, command: Command) -> Self {
        Self { common, command }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and initialize the configuration file.
    ///
    /// This is the first command you should run when setting up the saldo
    /// CLI. You need two things beforehand:
    ///
    /// - The URL of your hosted-store project, passed as --project-url.
    ///
    /// - The project's publishable API key, passed as --api-key. It will be
    ///   stored in the secrets directory inside the saldo home.
    ///
    /// Decide what directory you want to store configuration in and pass it
    /// as --saldo-home. By default it will be $HOME/saldo.
    Init(InitArgs),
    /// Sign in to the hosted store, or verify the stored session.
    Auth(AuthArgs),
    /// Record a transaction or create a budget allocation.
    Add(AddArgs),
    /// Delete a transaction or a budget allocation by id.
    Delete(DeleteArgs),
    /// List a month's transactions, or the budget allocations.
    List(ListArgs),
    /// Show the monthly dashboard: balances and budget usage per category.
    Dashboard(DashboardArgs),
    /// Show the yearly report: monthly totals and top expense categories.
    Report(ReportArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate
    /// for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where saldo configuration is held. Defaults to ~/saldo
    #[arg(long, env = "SALDO_HOME", default_value_t = default_saldo_home())]
    saldo_home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, saldo_home: PathBuf) -> Self {
        Self {
            log_level,
            saldo_home: saldo_home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn saldo_home(&self) -> &DisplayPath {
        &self.saldo_home
    }
}

/// Args for the `saldo init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The URL of your hosted-store project. It looks like this:
    /// https://nlcpkxqmrafqyzfxzibw.supabase.co
    #[arg(long)]
    project_url: String,

    /// The project's publishable API key. This will be written to the default
    /// secrets location in the saldo home directory.
    #[arg(long)]
    api_key: String,
}

impl InitArgs {
    pub fn new(project_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            project_url: project_url.into(),
            api_key: api_key.into(),
        }
    }

    pub fn project_url(&self) -> &str {
        &self.project_url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

/// Args for the `saldo auth` command.
#[derive(Debug, Parser, Clone)]
pub struct AuthArgs {
    #[command(subcommand)]
    action: AuthSubcommand,
}

impl AuthArgs {
    pub fn new(action: AuthSubcommand) -> Self {
        Self { action }
    }

    pub fn action(&self) -> &AuthSubcommand {
        &self.action
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum AuthSubcommand {
    /// Sign in with email and password and store the session.
    Login(LoginArgs),
    /// Verify the stored session without ever starting a sign-in.
    Verify,
}

/// Args for the `saldo auth login` command.
#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    /// The email address of your account on the hosted-store project.
    #[arg(long)]
    email: String,

    /// The account password.
    #[arg(long)]
    password: String,
}

impl LoginArgs {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

/// Args for the `saldo add` command.
#[derive(Debug, Parser, Clone)]
pub struct AddArgs {
    #[command(subcommand)]
    entity: AddSubcommand,
}

impl AddArgs {
    pub fn new(entity: AddSubcommand) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &AddSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum AddSubcommand {
    /// Record an income or expense transaction.
    Transaction(AddTransactionArgs),
    /// Create a budget allocation: a percentage of monthly income earmarked
    /// for a spending category.
    Allocation(AddAllocationArgs),
}

/// Args for the `saldo add transaction` command.
#[derive(Debug, Parser, Clone)]
pub struct AddTransactionArgs {
    /// Whether this is income or an expense.
    #[arg(long = "type", value_enum)]
    transaction_type: TransactionType,

    /// The category. Income categories are free-form (e.g. Gaji, Freelance);
    /// expense categories should match an allocation to count against its
    /// budget.
    #[arg(long)]
    category: String,

    /// The amount, e.g. 200000 or 'Rp 200.000'.
    #[arg(long)]
    amount: Amount,

    /// The transaction date as YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// An optional note.
    #[arg(long)]
    description: Option<String>,
}

impl AddTransactionArgs {
    pub fn new(
        transaction_type: TransactionType,
        category: impl Into<String>,
        amount: Amount,
        date: Option<NaiveDate>,
        description: Option<String>,
    ) -> Self {
        Self {
            transaction_type,
            category: category.into(),
            amount,
            date,
            description,
        }
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Args for the `saldo add allocation` command.
#[derive(Debug, Parser, Clone)]
pub struct AddAllocationArgs {
    /// The spending category, e.g. Nabung or Sodaqoh.
    #[arg(long)]
    category: String,

    /// The percentage of monthly income to earmark, in (0, 100].
    #[arg(long)]
    percentage: Decimal,
}

impl AddAllocationArgs {
    pub fn new(category: impl Into<String>, percentage: Decimal) -> Self {
        Self {
            category: category.into(),
            percentage,
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn percentage(&self) -> Decimal {
        self.percentage
    }
}

/// Args for the `saldo delete` command.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    #[command(subcommand)]
    entity: DeleteSubcommand,
}

impl DeleteArgs {
    pub fn new(entity: DeleteSubcommand) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &DeleteSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum DeleteSubcommand {
    /// Delete a transaction by id.
    Transaction(DeleteByIdArgs),
    /// Delete a budget allocation by id.
    Allocation(DeleteByIdArgs),
}

/// Args for the `saldo delete` subcommands.
#[derive(Debug, Parser, Clone)]
pub struct DeleteByIdArgs {
    /// The row id to delete.
    #[arg(long)]
    id: String,
}

impl DeleteByIdArgs {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Args for the `saldo list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    #[command(subcommand)]
    entity: ListSubcommand,
}

impl ListArgs {
    pub fn new(entity: ListSubcommand) -> Self {
        Self { entity }
    }

    pub fn entity(&self) -> &ListSubcommand {
        &self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum ListSubcommand {
    /// List the transactions of one month.
    Transactions(PeriodArgs),
    /// List the budget allocations.
    Allocations,
}

/// A month and year selection; both default to the current local month.
#[derive(Debug, Parser, Clone)]
pub struct PeriodArgs {
    /// The month, 1 through 12. Defaults to the current month.
    #[arg(long)]
    month: Option<u32>,

    /// The year, e.g. 2024. Defaults to the current year.
    #[arg(long)]
    year: Option<i32>,
}

impl PeriodArgs {
    pub fn new(month: Option<u32>, year: Option<i32>) -> Self {
        Self { month, year }
    }

    /// Resolves the selection, filling missing parts from the current month.
    pub fn period(&self) -> Result<Period> {
        let current = Period::current();
        Period::new(
            self.month.unwrap_or_else(|| current.month()),
            self.year.unwrap_or_else(|| current.year()),
        )
    }
}

/// Args for the `saldo dashboard` command.
pub type DashboardArgs = PeriodArgs;

/// Args for the `saldo report` command.
#[derive(Debug, Parser, Clone)]
pub struct ReportArgs {
    /// The year to report on. Defaults to the current year.
    #[arg(long)]
    year: Option<i32>,
}

impl ReportArgs {
    pub fn new(year: Option<i32>) -> Self {
        Self { year }
    }

    /// Resolves the selection, defaulting to the current year.
    pub fn year(&self) -> i32 {
        self.year.unwrap_or_else(|| Period::current().year())
    }
}

fn default_saldo_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("saldo"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --saldo-home or SALDO_HOME instead of relying on the default \
                saldo home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("saldo")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl From<PathBuf> for DisplayPath {
    fn from(value: PathBuf) -> Self {
        DisplayPath(value)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<Path> for DisplayPath {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn new(path: PathBuf) -> Self {
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}
