use crate::commands::common::{fmt_amount, now_secs, parse_amount, Context};
use crate::{print_info, print_success, ConvertCommands};
use colored::*;
use sav_sdk::LedgerQuery;

pub async fn deposit(ctx: &Context, amount: &str) -> Result<(), Box<dyn std::error::Error>> {
    let value = parse_amount(amount)?;
    if value.is_zero() {
        return Err("Deposit amount must be greater than zero".into());
    }
    let withdrawals = ctx.withdrawals();
    let expected = withdrawals.predict_deposit_shares(value).await?;
    print_info(&format!(
        "Depositing {} (≈ {} shares at the current rate)...",
        fmt_amount(value),
        fmt_amount(expected)
    ));

    let receipt = withdrawals.deposit(value).await?;
    print_success(&format!("Deposit confirmed in block {}", receipt.block_number));
    println!("  {} {}", "TX Hash:".bold(), receipt.tx_hash.to_string().green());
    Ok(())
}

pub async fn balance(ctx: &Context, account: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let account = ctx.account(account)?;
    print_info(&format!("Fetching position of {}...", account));

    let position = ctx.withdrawals().balance(account).await?;
    let now = now_secs()?;

    println!();
    println!("{} {}", "Account:".bold(), account.to_string().green());
    println!("{} {}", "Shares:".bold(), fmt_amount(position.shares).cyan());
    println!(
        "{} {}",
        "Value:".bold(),
        fmt_amount(position.underlying).cyan().bold()
    );
    println!(
        "{} {} shares / {} underlying",
        "Pool:".bold(),
        fmt_amount(position.totals.shares_outstanding),
        fmt_amount(position.totals.underlying_held)
    );

    if position.pending.is_empty() {
        return Ok(());
    }
    println!();
    println!("{}", "═══ PENDING WITHDRAWALS ═══".cyan().bold());
    for (i, pending) in position.pending.iter().enumerate() {
        let state = if pending.is_unlocked(now) {
            "ready".green()
        } else {
            format!("ready in {}", fmt_duration(pending.seconds_remaining(now))).yellow()
        };
        println!(
            "  [{}] {} (unlock time {}) {}",
            i,
            fmt_amount(pending.value),
            pending.unlock_time,
            state
        );
    }
    Ok(())
}

pub async fn convert(
    ctx: &Context,
    action: ConvertCommands,
) -> Result<(), Box<dyn std::error::Error>> {
    let totals = ctx.ledger.get_pool_totals(ctx.config.pool_address).await?;
    match action {
        ConvertCommands::ToUnderlying { amount } => {
            let shares = parse_amount(&amount)?;
            println!(
                "{} shares = {} underlying",
                fmt_amount(shares),
                fmt_amount(totals.shares_to_underlying(shares)).cyan()
            );
        }
        ConvertCommands::ToShares { amount } => {
            let underlying = parse_amount(&amount)?;
            println!(
                "{} underlying = {} shares",
                fmt_amount(underlying),
                fmt_amount(totals.underlying_to_shares(underlying)).cyan()
            );
        }
    }
    Ok(())
}

/// `3d 4h 5m` style countdown.
pub fn fmt_duration(secs: u64) -> String {
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_duration() {
        assert_eq!(fmt_duration(45), "45s");
        assert_eq!(fmt_duration(125), "2m");
        assert_eq!(fmt_duration(3 * 3_600 + 60), "3h 1m");
        assert_eq!(fmt_duration(3 * 86_400 + 7_200), "3d 2h 0m");
    }
}
