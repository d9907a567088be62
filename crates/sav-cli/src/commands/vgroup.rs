use crate::commands::common::{fmt_amount, parse_address, parse_amount, Context};
use crate::{print_info, print_success, VGroupCommands};
use colored::*;

pub async fn handle(
    address: &str,
    action: VGroupCommands,
    ctx: &Context,
) -> Result<(), Box<dyn std::error::Error>> {
    let vgroup = ctx.vgroup(parse_address("validator group", address)?);
    match action {
        VGroupCommands::Lock { amount } => {
            let value = positive_amount(&amount)?;
            print_info(&format!("Locking {}...", fmt_amount(value)));
            let receipt = vgroup.lock(value).await?;
            print_success(&format!("Locked in block {}", receipt.block_number));
            println!("  {} {}", "TX Hash:".bold(), receipt.tx_hash.to_string().green());
        }
        VGroupCommands::Unlock { amount } => {
            let value = positive_amount(&amount)?;
            print_info(&format!("Unlocking {}...", fmt_amount(value)));
            let receipt = vgroup.unlock(value).await?;
            print_success(&format!("Unlock started in block {}", receipt.block_number));
            println!("  {} {}", "TX Hash:".bold(), receipt.tx_hash.to_string().green());
        }
        VGroupCommands::Contracts => {
            let contracts = vgroup.contracts().await?;
            println!();
            println!("{}", "═══ CONTRACTS ═══".cyan().bold());
            println!("{} {}", "Savings pool:   ".bold(), contracts.savings_pool);
            println!("{} {}", "Validator group:".bold(), contracts.vgroup);
            if contracts.savings_pool != ctx.config.pool_address {
                println!(
                    "{} configured pool is {}",
                    "⚠".yellow().bold(),
                    ctx.config.pool_address
                );
            }
        }
    }
    Ok(())
}

fn positive_amount(amount: &str) -> Result<sav_core::U256, Box<dyn std::error::Error>> {
    let value = parse_amount(amount)?;
    if value.is_zero() {
        return Err("Amount must be greater than zero".into());
    }
    Ok(value)
}
