use std::io::{BufRead, IsTerminal};

use anyhow::{Result, bail};

use crate::app::App;

const PASSWORD_ENV: &str = "STOCKDESK_PASSWORD";

fn resolve_password(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        return Ok(password);
    }
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        eprint!("Password: ");
    }
    let mut line = String::new();
    stdin.lock().read_line(&mut line)?;
    let password = line.trim_end_matches(['\r', '\n']).to_owned();
    if password.is_empty() {
        bail!("no password given (use --password, {PASSWORD_ENV} or stdin)");
    }
    Ok(password)
}

pub(crate) async fn run_login(app: &App, username: &str, password: Option<String>) -> Result<()> {
    let password = resolve_password(password)?;
    let user = app.client.sign_in(username, &password).await?;
    app.notify_success(&format!("Signed in as {}.", user.display_name()));
    Ok(())
}

pub(crate) async fn run_logout(app: &App) -> Result<()> {
    if !app.auth.is_signed_in() {
        app.notify_success("Not signed in.");
        return Ok(());
    }
    app.client.logout().await?;
    app.notify_success("Signed out.");
    Ok(())
}

pub(crate) fn run_whoami(app: &App) -> Result<()> {
    match app.auth.snapshot().user {
        Some(mut user) => {
            user.token = "<redacted>".to_owned();
            println!("{}", serde_json::to_string_pretty(&user)?);
        },
        None => eprintln!("Not signed in."),
    }
    Ok(())
}
