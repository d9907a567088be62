use crate::commands::common::{fmt_amount, parse_address, Context};
use crate::{print_info, print_success, VoterCommands};
use colored::*;

pub async fn handle(action: VoterCommands, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let voter = ctx.voter().await?;
    match action {
        VoterCommands::Status => {
            let status = voter.status().await?;
            println!();
            println!("{}", "═══ VOTER STATUS ═══".cyan().bold());
            println!("{} {}", "Voter:".bold(), status.voter);
            println!("{} {}", "Pool:".bold(), status.pool);
            println!(
                "{} {}",
                "Voted group:".bold(),
                status.voted_group.to_string().green()
            );
            println!(
                "{} {} pending / {} active",
                "Votes:".bold(),
                fmt_amount(status.votes.pending),
                fmt_amount(status.votes.active)
            );
            println!("{} {}", "Nonvoting:".bold(), fmt_amount(status.nonvoting));
            println!(
                "{} {}",
                "Group capacity left:".bold(),
                fmt_amount(status.group_capacity)
            );
            let action = if status.needs_action() {
                format!(
                    "yes (activatable: {}, votable: {})",
                    status.has_activatable,
                    fmt_amount(status.votable)
                )
                .yellow()
            } else {
                "no".green()
            };
            println!("{} {}", "Needs activate:".bold(), action);
        }
        VoterCommands::Activate => match voter.activate_and_vote_if_needed().await? {
            Some(receipt) => {
                print_success(&format!(
                    "Votes activated in block {}",
                    receipt.block_number
                ));
                println!("  {} {}", "TX Hash:".bold(), receipt.tx_hash.to_string().green());
            }
            None => print_info("Nothing to activate or vote."),
        },
        VoterCommands::ChangeGroup { group } => {
            let group = parse_address("group", &group)?;
            print_info(&format!("Changing voted group to {}...", group));
            let receipt = voter.change_group(group).await?;
            print_success(&format!("Voted group changed in block {}", receipt.block_number));
            println!("  {} {}", "TX Hash:".bold(), receipt.tx_hash.to_string().green());
        }
    }
    Ok(())
}
