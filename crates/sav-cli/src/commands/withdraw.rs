use crate::commands::common::{fmt_amount, now_secs, parse_amount, Context};
use crate::commands::pool::fmt_duration;
use crate::{print_info, print_success, WithdrawCommands};
use colored::*;
use sav_core::PendingWithdrawal;
use sav_sdk::{Receipt, TxSubmitter};

pub async fn handle(
    action: WithdrawCommands,
    ctx: &Context,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        WithdrawCommands::Start { amount } => start(ctx, &amount).await?,
        WithdrawCommands::Finish { index } => finish(ctx, index).await?,
        WithdrawCommands::Cancel { index } => cancel(ctx, index).await?,
    }
    Ok(())
}

async fn start(ctx: &Context, amount: &str) -> Result<(), Box<dyn std::error::Error>> {
    let shares = parse_amount(amount)?;
    let withdrawals = ctx.withdrawals();

    let (plan, call) = withdrawals.prepare_start(shares).await?;
    print_info(&format!(
        "Withdrawing {} shares for {} underlying...",
        fmt_amount(shares),
        fmt_amount(plan.amount_to_unlock)
    ));
    if let Some(group) = plan.group {
        print_info(&format!(
            "Revoking {} from group {} ({} pending, {} active)",
            fmt_amount(plan.amount_to_revoke),
            group,
            fmt_amount(plan.pending_portion),
            fmt_amount(plan.active_portion())
        ));
    }

    let receipt = ctx.submitter.send_and_confirm(&call).await?;
    report(&receipt, "Withdrawal started");
    Ok(())
}

/// Refuse to submit a finish the pool would revert for an unexpired lock.
pub fn check_unlocked(
    pending: &[PendingWithdrawal],
    index: usize,
    now: u64,
) -> Result<PendingWithdrawal, String> {
    let entry = pending.get(index).ok_or_else(|| {
        format!(
            "No pending withdrawal at index {} ({} pending)",
            index,
            pending.len()
        )
    })?;
    if !entry.is_unlocked(now) {
        return Err(format!(
            "Pending withdrawal {} is not ready yet: unlocks at {} (in {})",
            index,
            entry.unlock_time,
            fmt_duration(entry.seconds_remaining(now))
        ));
    }
    Ok(*entry)
}

async fn finish(ctx: &Context, index: usize) -> Result<(), Box<dyn std::error::Error>> {
    let account = ctx.account(None)?;
    let withdrawals = ctx.withdrawals();

    let pending = withdrawals.pending_withdrawals(account).await?;
    let entry = check_unlocked(&pending, index, now_secs()?)?;
    print_info(&format!(
        "Finishing withdrawal [{}] of {}...",
        index,
        fmt_amount(entry.value)
    ));

    let receipt = withdrawals.finish(account, index).await?;
    report(&receipt, "Withdrawal finished");
    Ok(())
}

async fn cancel(ctx: &Context, index: usize) -> Result<(), Box<dyn std::error::Error>> {
    let account = ctx.account(None)?;
    let withdrawals = ctx.withdrawals();

    let (entry, call) = withdrawals.prepare_cancel(account, index).await?;
    print_info(&format!(
        "Cancelling withdrawal [{}] of {}...",
        index,
        fmt_amount(entry.value)
    ));

    let receipt = ctx.submitter.send_and_confirm(&call).await?;
    report(&receipt, "Withdrawal cancelled");
    Ok(())
}

fn report(receipt: &Receipt, what: &str) {
    print_success(&format!("{} in block {}", what, receipt.block_number));
    println!("  {} {}", "TX Hash:".bold(), receipt.tx_hash.to_string().green());
}

#[cfg(test)]
mod tests {
    use super::*;
    use sav_core::U256;

    #[test]
    fn test_check_unlocked() {
        let pending = vec![
            PendingWithdrawal::new(U256::from(5u64), 1_000),
            PendingWithdrawal::new(U256::from(7u64), 5_000),
        ];
        assert_eq!(check_unlocked(&pending, 0, 1_000).unwrap().value, U256::from(5u64));

        let err = check_unlocked(&pending, 1, 1_400).unwrap_err();
        assert!(err.contains("not ready"), "{}", err);
        assert!(err.contains("1h 0m"), "{}", err);

        let err = check_unlocked(&pending, 2, 9_999).unwrap_err();
        assert!(err.contains("2 pending"), "{}", err);
    }
}
