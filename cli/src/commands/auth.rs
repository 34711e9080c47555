//! Login commands

use colored::Colorize;
use rishta_profile::AuthService;

use super::Context;
use crate::config::Config;

pub async fn login(ctx: &Context, phone: &str, code: Option<&str>) -> anyhow::Result<()> {
    let auth = AuthService::new(ctx.otp_verifier());

    let Some(code) = code else {
        let phone = auth.request_code(phone).await?;
        println!("Code sent to {}. Run again with --code <code>.", phone.masked());
        return Ok(());
    };

    let session = auth.login(phone, code).await?;

    let profile = ctx.profile.as_deref();
    let mut config = Config::load(profile)?;
    config.user_id = Some(session.user_id().to_string());
    config.token = Some(session.token().to_string());
    config.save(profile)?;

    match session.phone() {
        Some(phone) => println!("{} as {} ({})", "Logged in".green(), session.user_id(), phone.masked()),
        None => println!("{} as {}", "Logged in".green(), session.user_id()),
    }
    Ok(())
}

pub fn logout(ctx: &Context) -> anyhow::Result<()> {
    let Ok(session) = ctx.session() else {
        println!("No stored session");
        return Ok(());
    };

    let profile = ctx.profile.as_deref();
    let mut config = Config::load(profile)?;
    config.user_id = None;
    config.token = None;
    config.save(profile)?;

    let user = AuthService::new(ctx.otp_verifier()).logout(session);
    println!("Logged out {}", user);
    Ok(())
}
