//! These structs provide the CLI interface for lendbook.

use crate::model::{ApStatus, CustomerField, PartyRole, TransactionType};
use crate::table::Direction;
use crate::views::{CompanyColumn, CustomerColumn, OutputFormat, TransactionColumn};
use chrono::NaiveDate;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// lendbook: the back office of a lending business, on the command line.
///
/// Register companies and the customers who lend or borrow through them, record loan
/// transactions, print transaction slips and read the cashbook. Everything is stored by the
/// lending REST API; lendbook signs in to it and keeps a short-lived cache of what it reads.
///
/// Start with `lendbook init --api-url <URL>`, then `lendbook login`.
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
    /// Create the home directory and its configuration file.
    ///
    /// Run this first. The API URL is the base that every endpoint is appended to, e.g.
    /// https://lending.example.com/api
    Init(InitArgs),
    /// Sign in and store the access token for one day.
    Login(LoginArgs),
    /// Remove the stored access token.
    Logout,
    /// Show who the stored access token belongs to.
    Whoami,
    /// Create and list companies.
    #[command(subcommand)]
    Company(CompanyCommand),
    /// Register, list, activate/deactivate and delete customers.
    #[command(subcommand)]
    Customer(CustomerCommand),
    /// Record, list, show, edit and delete transactions.
    #[command(subcommand)]
    Transaction(TransactionCommand),
    /// Print the slip of a transaction for its lenders or its borrowers.
    Slip(SlipArgs),
    /// Show the cashbook ledger.
    Cashbook(CashbookArgs),
    /// Open a page by its path, e.g. `/view-slips/4?type=borrower`.
    Open(OpenArgs),
    /// Start an interactive session that keeps the sign-in and cache between commands.
    Console,
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where lendbook keeps its configuration and access token. Defaults to
    /// ~/lendbook
    #[arg(long, env = "LENDBOOK_HOME", default_value_t = default_home())]
    home: DisplayPath,
}

impl Common {
    pub fn new(log_level: LevelFilter, home: PathBuf) -> Self {
        Self {
            log_level,
            home: home.into(),
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn home(&self) -> &DisplayPath {
        &self.home
    }
}

/// (Not shown): Args for the `lendbook init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The base URL of the lending REST API.
    #[arg(long)]
    api_url: String,
}

impl InitArgs {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

/// (Not shown): Args for the `lendbook login` command.
#[derive(Debug, Parser, Clone)]
pub struct LoginArgs {
    #[arg(long, env = "LENDBOOK_EMAIL", default_value = "")]
    email: String,

    #[arg(long, env = "LENDBOOK_PASSWORD", default_value = "", hide_env_values = true)]
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

const DEFAULT_LIST_PAGE_SIZE: usize = 25;

/// Paging and output options shared by the list commands.
#[derive(Debug, ClapArgs, Clone, PartialEq, Eq)]
pub struct ListArgs {
    /// Sort descending instead of ascending. Only used with --sort.
    #[arg(long)]
    pub desc: bool,

    /// The page to show, starting from 1.
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page.
    #[arg(long, default_value_t = DEFAULT_LIST_PAGE_SIZE)]
    pub page_size: usize,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl Default for ListArgs {
    fn default() -> Self {
        Self {
            desc: false,
            page: 1,
            page_size: DEFAULT_LIST_PAGE_SIZE,
            format: OutputFormat::Table,
        }
    }
}

impl ListArgs {
    pub fn direction(&self) -> Direction {
        if self.desc {
            Direction::Desc
        } else {
            Direction::Asc
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum CompanyCommand {
    /// Create a company.
    Create(CreateCompanyArgs),
    /// List companies.
    List(CompanyListArgs),
}

#[derive(Debug, Parser, Clone)]
pub struct CreateCompanyArgs {
    /// The company name, at most 150 characters.
    #[arg(long, default_value = "")]
    name: String,

    /// A description, at most 500 characters.
    #[arg(long, default_value = "")]
    description: String,
}

impl CreateCompanyArgs {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Parser, Clone, Default)]
pub struct CompanyListArgs {
    /// Only show companies whose name contains this text.
    #[arg(long)]
    pub search: Option<String>,

    #[arg(long, value_enum)]
    pub sort: Option<CompanyColumn>,

    #[clap(flatten)]
    pub list: ListArgs,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CustomerCommand {
    /// Register a customer as a lender, a borrower or both.
    Create(Box<CreateCustomerArgs>),
    /// List customers.
    List(CustomerListArgs),
    /// Activate an inactive customer or deactivate an active one.
    ToggleStatus(IdArgs),
    /// Delete a customer.
    Delete(DeleteArgs),
}

/// (Not shown): Args for `lendbook customer create`.
#[derive(Debug, Parser, Clone, Default)]
pub struct CreateCustomerArgs {
    /// The customer lends money.
    #[arg(long)]
    pub lender: bool,

    /// The customer borrows money.
    #[arg(long)]
    pub borrower: bool,

    #[arg(long, default_value = "")]
    pub full_name: String,

    #[arg(long, default_value = "")]
    pub email: String,

    #[arg(long, default_value = "")]
    pub mobile: String,

    /// The id of the company the customer belongs to.
    #[arg(long, default_value = "")]
    pub company_id: String,

    /// Any other detail as `name=value`, e.g. `panNumber=ABCDE1234F`. May be repeated.
    #[arg(long = "detail", value_parser = parse_detail)]
    pub details: Vec<(CustomerField, String)>,

    /// Scan of the PAN card.
    #[arg(long)]
    pub pan_card: Option<PathBuf>,

    /// Scan of the Aadhaar card.
    #[arg(long)]
    pub aadhar: Option<PathBuf>,

    /// Scan of the company PAN card.
    #[arg(long)]
    pub company_pan: Option<PathBuf>,

    /// Scan of the visiting card.
    #[arg(long)]
    pub visiting_card: Option<PathBuf>,
}

fn parse_detail(s: &str) -> std::result::Result<(CustomerField, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    let field = CustomerField::from_str(name.trim()).map_err(|_| {
        let names: Vec<String> = CustomerField::ALL.iter().map(|f| f.to_string()).collect();
        format!("unknown detail '{name}', expected one of {}", names.join(", "))
    })?;
    Ok((field, value.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    Active,
    Inactive,
}

serde_plain::derive_display_from_serialize!(CustomerStatus);
serde_plain::derive_fromstr_from_deserialize!(CustomerStatus);

#[derive(Debug, Parser, Clone, Default)]
pub struct CustomerListArgs {
    /// Only show customers whose name contains this text.
    #[arg(long)]
    pub search: Option<String>,

    /// Only show lenders or only borrowers.
    #[arg(long)]
    pub role: Option<PartyRole>,

    #[arg(long, value_enum)]
    pub status: Option<CustomerStatus>,

    #[arg(long, value_enum)]
    pub sort: Option<CustomerColumn>,

    #[clap(flatten)]
    pub list: ListArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct IdArgs {
    id: u64,
}

impl IdArgs {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    id: u64,

    /// Confirm the deletion. Nothing is deleted without it.
    #[arg(long)]
    yes: bool,
}

impl DeleteArgs {
    pub fn new(id: u64, yes: bool) -> Self {
        Self { id, yes }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn yes(&self) -> bool {
        self.yes
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum TransactionCommand {
    /// Record a transaction.
    Create(Box<TransactionFields>),
    /// List transactions.
    List(TransactionListArgs),
    /// Show every field of one transaction.
    Show(IdArgs),
    /// Edit a transaction. Fields that are not given keep their current value.
    Update(Box<UpdateTransactionArgs>),
    /// Delete a transaction.
    Delete(DeleteArgs),
}

/// The transaction form. Values are checked before anything is sent.
#[derive(Debug, ClapArgs, Clone, Default, PartialEq, Eq)]
pub struct TransactionFields {
    #[arg(long)]
    pub company_id: Option<String>,

    /// S (single) or M (monthly).
    #[arg(long = "type")]
    pub transaction_type: Option<TransactionType>,

    /// The number of months.
    #[arg(long)]
    pub months: Option<String>,

    /// The transaction date as YYYY-MM-DD.
    #[arg(long)]
    pub date: Option<String>,

    #[arg(long)]
    pub month: Option<String>,

    /// The amount in thousands of rupees.
    #[arg(long)]
    pub amount: Option<String>,

    /// advanced or past.
    #[arg(long)]
    pub status: Option<ApStatus>,

    /// A lender's customer id. May be repeated; replaces the current lenders when editing.
    #[arg(long = "lender")]
    pub lenders: Vec<u64>,

    /// A borrower's customer id. May be repeated; replaces the current borrowers when editing.
    #[arg(long = "borrower")]
    pub borrowers: Vec<u64>,

    #[arg(long)]
    pub interest_received: Option<String>,

    #[arg(long)]
    pub interest_paid: Option<String>,

    /// A commission percentage. May be repeated; replaces the current list when editing.
    #[arg(long = "commission")]
    pub commissions: Vec<String>,

    #[arg(long)]
    pub remarks: Option<String>,
}

#[derive(Debug, Parser, Clone)]
pub struct UpdateTransactionArgs {
    id: u64,

    #[clap(flatten)]
    fields: TransactionFields,
}

impl UpdateTransactionArgs {
    pub fn new(id: u64, fields: TransactionFields) -> Self {
        Self { id, fields }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn fields(&self) -> &TransactionFields {
        &self.fields
    }
}

#[derive(Debug, Parser, Clone, Default)]
pub struct TransactionListArgs {
    /// Only show transactions whose company name contains this text.
    #[arg(long)]
    pub search: Option<String>,

    /// Only show advanced or only past transactions.
    #[arg(long)]
    pub status: Option<ApStatus>,

    #[arg(long, value_enum)]
    pub sort: Option<TransactionColumn>,

    #[clap(flatten)]
    pub list: ListArgs,
}

#[derive(Debug, Parser, Clone)]
pub struct SlipArgs {
    /// The transaction id.
    id: u64,

    /// Whose slip to print: lender or borrower.
    #[arg(long = "type", default_value_t = PartyRole::Lender)]
    role: PartyRole,
}

impl SlipArgs {
    pub fn new(id: u64, role: PartyRole) -> Self {
        Self { id, role }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn role(&self) -> PartyRole {
        self.role
    }
}

#[derive(Debug, Parser, Clone, Default)]
pub struct CashbookArgs {
    #[arg(long)]
    pub company_id: Option<u64>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// YYYY-MM-DD
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// The page to show, starting from 1.
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page: 10, 15, 25, 50 or 100. Defaults to the configured page size.
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Print the table alone, without filters or paging.
    #[arg(long)]
    pub print: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

#[derive(Debug, Parser, Clone)]
pub struct OpenArgs {
    /// The page path, e.g. `/view-cashbook`.
    path: String,
}

impl OpenArgs {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A line typed at the console: any command except `init` and `console`.
#[derive(Debug, Parser, Clone)]
#[command(no_binary_name = true, name = "lendbook")]
pub struct ConsoleLine {
    #[command(subcommand)]
    command: Command,
}

impl ConsoleLine {
    pub fn command(&self) -> &Command {
        &self.command
    }
}

fn default_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("lendbook"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --home or LENDBOOK_HOME instead of relying on the default \
                home directory. If you continue using the program right now, you may have \
                problems!",
            );
            PathBuf::from("lendbook")
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

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
