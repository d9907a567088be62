// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// SAVINGS POOL CLI - Deposits, Withdrawals & Voter Management
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

mod commands;
mod gateway;
mod logging;

#[derive(Parser)]
#[command(name = "sav-cli")]
#[command(about = "Savings pool CLI - deposit, withdraw, vote", long_about = None)]
#[command(version)]
struct Cli {
    /// Ledger gateway URL (reads SAV_RPC_URL, then the config file, default http://127.0.0.1:7545)
    #[arg(short, long, env = "SAV_RPC_URL")]
    rpc: Option<String>,

    /// Savings pool contract address
    #[arg(short, long)]
    pool: Option<String>,

    /// Sending account (the gateway's node must hold its key)
    #[arg(short, long)]
    from: Option<String>,

    /// Config directory (default: ~/.sav)
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Log filter, e.g. "debug" or "info,root=debug"
    #[arg(long, env = "SAV_LOG")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Deposit underlying asset into the pool for shares
    Deposit {
        /// Amount in tokens, e.g. 1.5
        amount: String,
    },

    /// Show share balance, its value and pending withdrawals
    Balance {
        /// Account to inspect (default: --from)
        #[arg(short, long)]
        account: Option<String>,
    },

    /// Convert between shares and underlying at the current rate
    Convert {
        #[command(subcommand)]
        action: ConvertCommands,
    },

    /// Withdrawal lifecycle
    Withdraw {
        #[command(subcommand)]
        action: WithdrawCommands,
    },

    /// Voter contract operations
    Voter {
        #[command(subcommand)]
        action: VoterCommands,
    },

    /// Operator commands for a pool-owned validator group contract
    Vgroup {
        /// Validator group contract address
        #[arg(long, env = "SAV_VGROUP")]
        address: String,

        #[command(subcommand)]
        action: VGroupCommands,
    },

    /// Client configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConvertCommands {
    /// Shares → underlying
    ToUnderlying {
        /// Share amount in tokens
        amount: String,
    },

    /// Underlying → shares
    ToShares {
        /// Underlying amount in tokens
        amount: String,
    },
}

#[derive(Subcommand)]
enum WithdrawCommands {
    /// Start withdrawing shares (unvotes stake if needed)
    Start {
        /// Share amount in tokens
        amount: String,
    },

    /// Finish an unlocked pending withdrawal
    Finish {
        /// Index in the account's pending withdrawals (see `balance`)
        index: usize,
    },

    /// Cancel a pending withdrawal and get shares back
    Cancel {
        /// Index in the account's pending withdrawals (see `balance`)
        index: usize,
    },
}

#[derive(Subcommand)]
enum VoterCommands {
    /// Show the voter's group, votes and free stake
    Status,

    /// Activate pending votes and vote free stake (no-op if nothing to do)
    Activate,

    /// Move all votes to another validator group
    ChangeGroup {
        /// New validator group address
        group: String,
    },
}

#[derive(Subcommand)]
enum VGroupCommands {
    /// Lock value held by the group contract
    Lock {
        /// Amount in tokens
        amount: String,
    },

    /// Start unlocking nonvoting locked value
    Unlock {
        /// Amount in tokens
        amount: String,
    },

    /// Show the savings pool and validator group addresses
    Contracts,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write <config_dir>/config.toml from the current flags
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    print_banner();

    if let Err(e) = run(cli).await {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Get config directory
    let config_dir = cli.config_dir.clone().unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join(".sav")
    });

    let overrides = commands::common::Overrides {
        rpc: cli.rpc.clone(),
        pool: cli.pool.clone(),
        from: cli.from.clone(),
        log_level: cli.log_level.clone(),
    };

    if let Commands::Config { action } = cli.command {
        logging::init_logger(cli.log_level.as_deref().unwrap_or("info"));
        return commands::config::handle(action, &overrides, &config_dir);
    }

    let config = commands::common::resolve_config(&overrides, &config_dir)?;
    logging::init_logger(&config.log_level);
    let ctx = commands::common::Context::new(config);

    match cli.command {
        Commands::Deposit { amount } => commands::pool::deposit(&ctx, &amount).await?,
        Commands::Balance { account } => {
            commands::pool::balance(&ctx, account.as_deref()).await?
        }
        Commands::Convert { action } => commands::pool::convert(&ctx, action).await?,
        Commands::Withdraw { action } => commands::withdraw::handle(action, &ctx).await?,
        Commands::Voter { action } => commands::voter::handle(action, &ctx).await?,
        Commands::Vgroup { address, action } => {
            commands::vgroup::handle(&address, action, &ctx).await?
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn print_banner() {
    println!(
        "{}",
        "╔═══════════════════════════════════════════════╗".cyan()
    );
    println!(
        "{}",
        "║           SAVINGS POOL - CLI v0.3.0           ║"
            .cyan()
            .bold()
    );
    println!(
        "{}",
        "╚═══════════════════════════════════════════════╝".cyan()
    );
    println!();
}

fn print_success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

fn print_info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

// ─────────────────────────────────────────────────────────────────
// UNIT TESTS
// ─────────────────────────────────────────────────────────────────
