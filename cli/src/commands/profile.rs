//! Profile and photo commands

use anyhow::anyhow;
use chrono::Utc;
use colored::Colorize;
use rishta_profile::application::{LoadOutcome, SaveOutcome};
use rishta_profile::domain::alias::{normalize_label, resolve_alias};
use rishta_profile::{CompletionReport, ProfileEditor, SectionDefinition};
use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;

use super::Context;
use crate::output::{or_dash, percent_badge};
use crate::{PhotoCommands, ProfileCommands};

#[derive(Debug, Serialize, Tabled)]
pub struct SectionRow {
    #[tabled(rename = "Section")]
    pub section: String,
    #[tabled(rename = "Filled")]
    pub filled: usize,
    #[tabled(rename = "Total")]
    pub total: usize,
    #[tabled(rename = "Complete")]
    pub percent: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct FieldRow {
    #[tabled(rename = "Section")]
    pub section: String,
    #[tabled(rename = "Field")]
    pub field: String,
    #[tabled(rename = "Type")]
    pub kind: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct PhotoRow {
    #[tabled(rename = "Slot")]
    pub slot: u8,
    #[tabled(rename = "URL")]
    pub url: String,
    #[tabled(rename = "Primary")]
    pub primary: bool,
}

pub async fn handle(action: ProfileCommands, ctx: &Context) -> anyhow::Result<()> {
    let editor = open_editor(ctx).await?;

    match action {
        ProfileCommands::Show { fields } => {
            let report = editor.completion()?;
            if fields {
                ctx.format.print(&field_rows(&editor)?)?;
            } else {
                print_report(ctx, &report)?;
            }
        }
        ProfileCommands::Set { field, value } => {
            let name = field_name(&editor.schema()?, &field)?;
            editor.set_input(&name, &value)?;
            save(ctx, &editor).await?;
        }
        ProfileCommands::Unset { field } => {
            let name = field_name(&editor.schema()?, &field)?;
            editor.set_field(&name, Value::Null)?;
            save(ctx, &editor).await?;
        }
        ProfileCommands::Save => save(ctx, &editor).await?,
    }
    Ok(())
}

pub async fn handle_photo(action: PhotoCommands, ctx: &Context) -> anyhow::Result<()> {
    let editor = open_editor(ctx).await?;

    match action {
        PhotoCommands::List => {
            let rows: Vec<PhotoRow> = editor
                .photos()
                .slots()
                .iter()
                .map(|slot| PhotoRow {
                    slot: slot.id,
                    url: or_dash(slot.url.as_deref()),
                    primary: slot.is_primary,
                })
                .collect();
            ctx.format.print(&rows)?;
            return Ok(());
        }
        PhotoCommands::Set { slot, url } => editor.set_photo(slot, &url)?,
        PhotoCommands::Clear { slot } => editor.clear_photo(slot)?,
        PhotoCommands::Primary { slot } => editor.make_primary(slot)?,
    };

    save(ctx, &editor).await
}

async fn open_editor(ctx: &Context) -> anyhow::Result<ProfileEditor> {
    let session = ctx.session()?;
    let editor = ProfileEditor::for_session(ctx.client(), &session);
    match editor.load().await? {
        LoadOutcome::Applied(_) => Ok(editor),
        LoadOutcome::Stale => Err(anyhow!("profile changed while loading; try again")),
    }
}

async fn save(ctx: &Context, editor: &ProfileEditor) -> anyhow::Result<()> {
    if let Some(flash) = editor.flash(Utc::now()).filter(|_| ctx.format.is_table()) {
        println!("{} {} complete", "Progress:".cyan().bold(), percent_badge(flash.percent));
    }

    let SaveOutcome { completion, verification } = editor.save().await?;

    if ctx.format.is_table() {
        println!("Profile saved, {} complete", percent_badge(completion));
        if let Some(receipt) = &verification {
            println!("{} (status: {})", "Submitted for verification".green().bold(), receipt.status);
        }
    } else {
        ctx.format.print_value(&serde_json::json!({
            "completion": completion,
            "verification": verification,
        }))?;
    }
    Ok(())
}

fn print_report(ctx: &Context, report: &CompletionReport) -> anyhow::Result<()> {
    if !ctx.format.is_table() {
        return ctx.format.print_value(report);
    }

    let rows: Vec<SectionRow> = report
        .sections
        .iter()
        .map(|s| SectionRow {
            section: s.label.clone(),
            filled: s.filled,
            total: s.total,
            percent: percent_badge(s.percent),
        })
        .collect();
    ctx.format.print(&rows)?;
    println!("Overall: {}", percent_badge(report.overall));
    Ok(())
}

fn field_rows(editor: &ProfileEditor) -> anyhow::Result<Vec<FieldRow>> {
    let form = editor.form();
    let rows = editor
        .schema()?
        .iter()
        .flat_map(|section| {
            let form = &form;
            section.fields.iter().map(move |field| FieldRow {
                section: section.label.clone(),
                field: field.label.clone(),
                kind: field.kind.as_str().to_string(),
                value: match form.get(&field.name) {
                    None | Some(Value::Null) => "-".to_string(),
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                },
            })
        })
        .collect();
    Ok(rows)
}

/// Field name for a user-supplied name or label
fn field_name(schema: &[SectionDefinition], input: &str) -> anyhow::Result<String> {
    let wanted = normalize_label(input);
    let fields = || schema.iter().flat_map(|s| s.fields.iter());

    fields()
        .find(|f| f.name == input)
        .or_else(|| fields().find(|f| normalize_label(&f.label) == wanted))
        .or_else(|| resolve_alias(input).and_then(|key| fields().find(|f| f.name == key)))
        .map(|f| f.name.clone())
        .ok_or_else(|| anyhow!("No profile field named {:?}", input))
}
