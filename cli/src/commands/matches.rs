//! Match browsing command

use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use rishta_profile::domain::services::{CandidateSummary, MatchFilter, MatchSort};
use rishta_profile::MatchService;
use serde::Serialize;
use tabled::Tabled;

use super::Context;
use crate::output::{or_dash, percent_badge};
use crate::MatchArgs;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortArg {
    Newest,
    AgeAsc,
    AgeDesc,
    Completion,
}

impl From<SortArg> for MatchSort {
    fn from(sort: SortArg) -> Self {
        match sort {
            SortArg::Newest => MatchSort::Newest,
            SortArg::AgeAsc => MatchSort::AgeAsc,
            SortArg::AgeDesc => MatchSort::AgeDesc,
            SortArg::Completion => MatchSort::Completion,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct CandidateRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Age")]
    pub age: String,
    #[tabled(rename = "City")]
    pub city: String,
    #[tabled(rename = "Religion")]
    pub religion: String,
    #[tabled(rename = "Height")]
    pub height: String,
    #[tabled(rename = "Profile")]
    pub completion: String,
}

impl CandidateRow {
    fn new(candidate: &CandidateSummary, today: NaiveDate) -> Self {
        Self {
            id: candidate.id.to_string(),
            name: candidate.name.clone(),
            age: or_dash(candidate.age_on(today)),
            city: or_dash(candidate.city.as_deref()),
            religion: or_dash(candidate.religion.as_deref()),
            height: or_dash(candidate.height_cm.map(|cm| format!("{} cm", cm))),
            completion: percent_badge(candidate.completion),
        }
    }
}

impl From<MatchArgs> for MatchFilter {
    fn from(args: MatchArgs) -> Self {
        MatchFilter {
            min_age: args.min_age,
            max_age: args.max_age,
            gender: args.gender,
            religion: args.religion,
            city: args.city,
            marital_status: args.marital_status,
            min_height_cm: args.min_height,
        }
    }
}

pub async fn handle(args: MatchArgs, ctx: &Context) -> anyhow::Result<()> {
    let session = ctx.session()?;
    let service = MatchService::new(ctx.client());
    let today = Local::now().date_naive();
    let sort = MatchSort::from(args.sort);
    let filter = MatchFilter::from(args);

    let candidates = service.browse(&session, &filter, sort, today).await?;
    if ctx.format.is_table() {
        let rows: Vec<CandidateRow> = candidates.iter().map(|c| CandidateRow::new(c, today)).collect();
        ctx.format.print(&rows)?;
    } else {
        ctx.format.print_value(&candidates)?;
    }
    Ok(())
}
