use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use walletbook::audit::EntityType;
use walletbook::cli::{handle_bank_command, handle_card_command, handle_goal_command};
use walletbook::config::{Settings, WalletPaths};
use walletbook::services::BankService;
use walletbook::storage::Storage;
use walletbook::validation;

#[derive(Parser)]
#[command(
    name = "walletbook",
    version,
    about = "Terminal personal-finance ledger",
    long_about = "walletbook tracks bank accounts, credit cards and savings goals \
                  from the command line. Card spending is capped per month by the \
                  card's limit, and monthly bills are paid from a saving account."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Credit card commands
    #[command(subcommand)]
    Card(walletbook::cli::CardCommands),

    /// Bank account commands
    #[command(subcommand)]
    Bank(walletbook::cli::BankCommands),

    /// Savings goal commands
    #[command(subcommand)]
    Goal(walletbook::cli::GoalCommands),

    /// Create the data directory and default settings
    Init,

    /// Show or change settings
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },

    /// Show the most recent audit log entries
    Audit {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration and paths
    Show,
    /// Change one setting
    Set {
        /// Setting name (currency_symbol, date_format, ledger_capacity, default_display_count)
        key: String,
        /// New value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    walletbook::init_tracing();

    // Initialize paths and settings
    let paths = WalletPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    debug!(base_dir = %paths.base_dir().display(), "resolved data directory");

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;
    storage.set_ledger_capacity(settings.ledger_capacity)?;

    // Post recurring expenditures that fell due since the last run
    let posted = BankService::new(&storage).apply_recurring(validation::today())?;
    debug!(posted, "recurring expenditures checked");

    match cli.command {
        Some(Commands::Card(cmd)) => {
            handle_card_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Bank(cmd)) => {
            handle_bank_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Goal(cmd)) => {
            handle_goal_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Init) => {
            let fresh = !paths.is_initialized();
            println!("Initializing walletbook at: {}", paths.base_dir().display());
            settings.save(&paths)?;
            storage.save_all()?;
            if fresh {
                println!("Initialization complete!");
            } else {
                println!("Already initialized; existing data was kept.");
            }
            println!();
            println!("Run 'walletbook card create <name> --limit <amount>' to add a card.");
            println!("Run 'walletbook bank create <name> --balance <amount>' to add an account.");
        }
        Some(Commands::Config { action }) => match action {
            None | Some(ConfigCommands::Show) => print_config(&paths, &settings),
            Some(ConfigCommands::Set { key, value }) => {
                let before = settings.clone();
                settings.set(&key, &value)?;
                settings.save(&paths)?;

                if settings.ledger_capacity != before.ledger_capacity {
                    storage.set_ledger_capacity(settings.ledger_capacity)?;
                    storage.save_all()?;
                }

                storage.log_update(
                    EntityType::Settings,
                    "settings",
                    None,
                    &before,
                    &settings,
                    Some(format!("{}: set to {}", key, value)),
                )?;
                println!("Set {} = {}", key, value);
            }
        },
        Some(Commands::Audit { count }) => {
            let entries = storage.audit().read_recent(count)?;
            if entries.is_empty() {
                println!("No audit entries yet.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
        None => {
            println!("walletbook - terminal personal-finance ledger");
            println!();
            println!("Run 'walletbook --help' for usage information.");
        }
    }

    Ok(())
}

fn print_config(paths: &WalletPaths, settings: &Settings) {
    println!("walletbook Configuration");
    println!("========================");
    println!("Base directory:   {}", paths.base_dir().display());
    println!("Data directory:   {}", paths.data_dir().display());
    println!("Audit log:        {}", paths.audit_log().display());
    println!();
    println!("Settings:");
    println!("  currency_symbol:       {}", settings.currency_symbol);
    println!("  date_format:           {}", settings.date_format);
    println!("  ledger_capacity:       {}", settings.ledger_capacity);
    println!("  default_display_count: {}", settings.default_display_count);
}
