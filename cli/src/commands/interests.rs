//! Interest commands

use colored::Colorize;
use rishta_profile::domain::aggregates::InterestRecord;
use rishta_profile::{MatchService, UserId};
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::output::or_dash;
use crate::InterestCommands;

#[derive(Debug, Serialize, Tabled)]
pub struct InterestRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Direction")]
    pub direction: String,
    #[tabled(rename = "Member")]
    pub member: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Message")]
    pub message: String,
}

impl InterestRow {
    fn new(record: &InterestRecord, me: &UserId) -> Self {
        let incoming = &record.to_user_id == me;
        let (direction, member) = if incoming {
            ("received", &record.from_user_id)
        } else {
            ("sent", &record.to_user_id)
        };
        Self {
            id: record.id.clone(),
            direction: direction.to_string(),
            member: member.to_string(),
            status: record.status.to_string(),
            message: or_dash(record.message.as_deref()),
        }
    }
}

pub async fn handle(action: InterestCommands, ctx: &Context) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let service = MatchService::new(ctx.client());

    match action {
        InterestCommands::Send { user_id, message } => {
            let (record, _) = service.send_interest(&session, UserId::from_string(user_id), message).await?;
            println!("{} to {} ({})", "Interest sent".green(), record.to_user_id, record.id);
        }
        InterestCommands::List { pending } => {
            let records = if pending {
                service.pending_incoming(&session).await?
            } else {
                service.interests(&session).await?
            };

            if ctx.format.is_table() {
                let rows: Vec<InterestRow> = records.iter().map(|r| InterestRow::new(r, session.user_id())).collect();
                ctx.format.print(&rows)?;
            } else {
                ctx.format.print_value(&records)?;
            }
        }
        InterestCommands::Accept { id } => {
            let (record, _) = service.respond(&session, &id, true).await?;
            println!("Interest {} {}", record.id, record.status.to_string().green());
        }
        InterestCommands::Decline { id } => {
            let (record, _) = service.respond(&session, &id, false).await?;
            println!("Interest {} {}", record.id, record.status.to_string().yellow());
        }
        InterestCommands::Withdraw { id } => {
            let (record, _) = service.withdraw(&session, &id).await?;
            println!("Interest {} {}", record.id, record.status.to_string().dimmed());
        }
    }
    Ok(())
}
