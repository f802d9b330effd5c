//! # Command Line
//!
//! One subcommand per tool, one nested subcommand per action.
//!
//! ```text
//! kero [--config FILE] [--db FILE] [--yes] [--json] <command>
//!
//!   price      derived unit/case price (calculator)
//!   catalog    item database: load | refresh | view | clear | suppliers
//!   search     autocomplete over the catalog (--watch reads stdin)
//!   lookup     name and supplier for an exact code
//!   ledger     local entries: add | list | remove | clear | export
//!   branch     ledger branch: show | list | select
//!   supplier   alternate supplier: use | clear | list
//!   labels     shelf labels: setup | items | select | ... | preview
//!   returns    supplier returns: branches | suppliers | submit | logs
//!   users      accounts: list | add | password | grant | revoke | delete
//!   session    stored login: show | store | clear | watch
//!   config     settings: show | path | init
//! ```

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use kero_core::label::LabelSearchField;
use kero_core::EntryType;

#[derive(Debug, Parser)]
#[command(
    name = "kero",
    version,
    about = "Store tools: pricing ledger, shelf labels, supplier returns and user accounts"
)]
pub struct Cli {
    /// Config file (default: kero.toml in the platform config dir)
    #[arg(long, global = true, env = "KERO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Local storage file; overrides the configured path
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Print results as JSON where supported
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Derive unit and case prices from a case cost
    Price(PriceArgs),

    /// Item database from the pricing endpoint
    #[command(subcommand)]
    Catalog(CatalogCommand),

    /// Autocomplete suggestions for a code or name
    Search(SearchArgs),

    /// Name and supplier for an exact code
    Lookup {
        code: String,
    },

    /// Local pricing entries
    #[command(subcommand)]
    Ledger(LedgerCommand),

    /// Branch the ledger belongs to
    #[command(subcommand)]
    Branch(BranchCommand),

    /// Alternate supplier for new entries
    #[command(subcommand)]
    Supplier(SupplierCommand),

    /// Shelf-label staging and print queue
    #[command(subcommand)]
    Labels(LabelsCommand),

    /// Supplier return declarations
    #[command(subcommand)]
    Returns(ReturnsCommand),

    /// User accounts and permissions
    #[command(subcommand)]
    Users(UsersCommand),

    /// Stored login record
    #[command(subcommand)]
    Session(SessionCommand),

    /// Configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

// =============================================================================
// Pricing
// =============================================================================

#[derive(Debug, Clone, Args)]
pub struct PriceArgs {
    /// Case cost before discount and VAT
    #[arg(long)]
    pub cost: String,

    /// Pieces per case
    #[arg(long, default_value = "1")]
    pub units: String,

    /// Discount (%)
    #[arg(long, default_value = "0")]
    pub discount: String,

    /// VAT (%)
    #[arg(long, default_value = "0")]
    pub vat: String,

    /// Put the unit price in the entry form and keep units/discount/VAT
    /// for the next ledger line
    #[arg(long)]
    pub apply: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CatalogCommand {
    /// Fetch the item database
    Load,
    /// Fetch again, bypassing caches
    Refresh,
    /// Show the loaded items
    View,
    /// Drop the loaded items
    Clear,
    /// Distinct supplier names
    Suppliers {
        /// Substring filter
        filter: Option<String>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Code or name fragment
    pub term: Option<String>,

    /// Read terms line by line from stdin, searching once input goes quiet
    #[arg(long, conflicts_with = "term")]
    pub watch: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum LedgerCommand {
    /// Validate and add an entry
    Add(AddEntryArgs),
    /// Show every entry
    List,
    /// Delete the entry at a 1-based position
    Remove {
        position: usize,
    },
    /// Delete every entry
    Clear,
    /// Write the entries to CSV
    Export {
        /// Output file (default: <branch>_pricing_entries.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct AddEntryArgs {
    /// Item code
    pub code: String,

    /// Item name (default: from the catalog)
    #[arg(long)]
    pub name: Option<String>,

    /// Piece price (default: the price applied from `kero price --apply`)
    #[arg(long = "price")]
    pub unit_price: Option<String>,

    /// purchase or return
    #[arg(long = "type", default_value = "purchase")]
    pub entry_type: EntryType,

    /// Shelf price at return time (returns only)
    #[arg(long = "current")]
    pub current_price: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum BranchCommand {
    /// Show the selected branch
    Show,
    /// List branches with their numbers
    List,
    /// Select a branch by name or number
    Select {
        branch: String,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum SupplierCommand {
    /// Use this supplier for new entries
    Use {
        name: String,
    },
    /// Go back to the catalog supplier
    Clear,
    /// Distinct supplier names from the catalog
    List {
        filter: Option<String>,
    },
}

// =============================================================================
// Shelf Labels
// =============================================================================

#[derive(Debug, Clone, Args)]
pub struct LabelFilterArgs {
    /// Search text; empty shows every item
    pub query: Option<String>,

    /// Field to search: name or code
    #[arg(long, default_value = "name")]
    pub field: LabelSearchField,
}

#[derive(Debug, Clone, Subcommand)]
pub enum LabelsCommand {
    /// Load label items and resolve the price category
    Setup {
        /// Price category when the assigned branch has none
        #[arg(long)]
        category: Option<String>,
    },
    /// Search label items
    Items(LabelFilterArgs),
    /// Select items by id
    Select {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// Deselect items by id
    Deselect {
        #[arg(required = true)]
        ids: Vec<u64>,
    },
    /// Select every item matching the search
    SelectAll(LabelFilterArgs),
    /// Deselect every item matching the search
    DeselectAll(LabelFilterArgs),
    /// Selected items with their default prices
    Staged,
    /// Move a staged item into the print queue
    Queue {
        id: u64,
        /// Label price (default: the category price)
        #[arg(long)]
        price: Option<String>,
        #[arg(long = "qty", default_value = "1")]
        quantity: String,
    },
    /// Remove a print job
    Dequeue {
        job: u64,
    },
    /// Every label in print order, with page count
    Preview,
    /// Empty the print queue
    ClearQueue,
}

// =============================================================================
// Returns
// =============================================================================

#[derive(Debug, Clone, Subcommand)]
pub enum ReturnsCommand {
    /// List branches
    Branches,
    /// Search suppliers (two characters minimum)
    Suppliers {
        query: String,
    },
    /// Choose the branch by code
    UseBranch {
        code: String,
    },
    /// Save a return declaration
    Submit(SubmitReturnArgs),
    /// Saved declarations for the current branch
    Logs(LogFilterArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SubmitReturnArgs {
    /// Supplier code
    #[arg(long)]
    pub supplier: String,

    #[arg(long = "rep-name")]
    pub representative_name: String,

    #[arg(long = "rep-id")]
    pub representative_id: String,

    /// Goods were taken back; requires --value and --serial
    #[arg(long)]
    pub has_returns: bool,

    #[arg(long, default_value = "")]
    pub value: String,

    #[arg(long, default_value = "")]
    pub serial: String,
}

#[derive(Debug, Clone, Args)]
pub struct LogFilterArgs {
    /// Supplier or representative name fragment
    #[arg(long, default_value = "")]
    pub search: String,

    /// First day (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Last day (YYYY-MM-DD), inclusive
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Subcommand)]
pub enum UsersCommand {
    /// List accounts and permission columns
    List,
    /// Create an account
    Add {
        username: String,
        #[arg(long, default_value = "")]
        password: String,
        #[arg(long, default_value = "")]
        branch: String,
        #[arg(long, default_value = "")]
        position: String,
    },
    /// Reset a password
    Password {
        username: String,
        password: String,
    },
    /// Grant a permission flag
    Grant {
        username: String,
        flag: String,
    },
    /// Revoke a permission flag
    Revoke {
        username: String,
        flag: String,
    },
    /// Change the assigned branch code
    SetBranch {
        username: String,
        code: String,
    },
    /// Change the position
    SetPosition {
        username: String,
        position: String,
    },
    /// Delete an account
    Delete {
        username: String,
    },
}

// =============================================================================
// Session & Config
// =============================================================================

#[derive(Debug, Clone, Subcommand)]
pub enum SessionCommand {
    /// Show the stored login
    Show,
    /// Store a login record (JSON as written by the login page)
    Store {
        record: String,
    },
    /// Log out
    Clear,
    /// Log out after the idle timeout; each stdin line counts as activity
    Watch,
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigCommand {
    /// Effective configuration
    Show,
    /// Config file location
    Path,
    /// Write the effective configuration to the config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_ledger_add() {
        let cli = Cli::try_parse_from([
            "kero", "--yes", "ledger", "add", "1001", "--price", "51.3", "--type", "return", "--current", "55",
        ])
        .unwrap();
        assert!(cli.yes);
        match cli.command {
            Command::Ledger(LedgerCommand::Add(args)) => {
                assert_eq!(args.code, "1001");
                assert_eq!(args.entry_type, EntryType::Return);
                assert_eq!(args.current_price.as_deref(), Some("55"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_search_watch_excludes_term() {
        assert!(Cli::try_parse_from(["kero", "search", "rice", "--watch"]).is_err());
    }
}
