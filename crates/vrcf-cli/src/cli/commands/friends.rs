//! Interactive login and friends listing.
//!
//! This is the presentation layer: it validates input before it reaches
//! the session controller (non-empty credentials, 6-digit codes) and
//! renders the observable state the controller publishes.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use tracing::info;
use vrcf_core::api::{Friend, VrchatClient};
use vrcf_core::presence;
use vrcf_core::session::{SessionController, SessionState};

pub async fn run(base_url: &str) -> Result<()> {
    info!(base_url, "starting session");
    let client = VrchatClient::new(base_url)?;
    let controller = SessionController::new(client);

    let stdin = io::stdin();
    let mut input = stdin.lock();

    let username = prompt_nonempty(&mut input, "Username: ")?;
    let password = prompt_nonempty(&mut input, "Password: ")?;
    controller.submit(&username, &password).await;

    loop {
        let state = controller.state().borrow().clone();
        match state {
            SessionState::RequiresEmailVerification => {
                println!("A code was sent to your email.");
                let Some(code) = prompt_code(&mut input, "Email code: ")? else {
                    controller.reset();
                    println!("Login cancelled.");
                    return Ok(());
                };
                controller.submit_otp(&code).await;
            }

            SessionState::RequiresTwoFactorVerification => {
                let Some(code) = prompt_code(&mut input, "Authenticator code: ")? else {
                    controller.reset();
                    println!("Login cancelled.");
                    return Ok(());
                };
                controller.submit_totp(&code).await;
            }

            SessionState::Authenticated(user) => {
                println!("Logged in as {}.", user.display_name);
                break;
            }

            SessionState::Failed(message) => bail!("login failed: {message}"),

            // Operations are awaited to completion above, so the loop
            // never observes an in-flight attempt.
            SessionState::Idle | SessionState::Authenticating => bail!("login did not complete"),
        }
    }

    render_friends(&controller);
    Ok(())
}

fn render_friends(controller: &SessionController) {
    let friends = controller.friends().borrow().clone();
    let now = Utc::now();
    let (online, offline) = presence::partition(&friends);

    println!();
    print_group("Online", &online, now);
    println!();
    print_group("Offline", &offline, now);
}

fn print_group(title: &str, friends: &[&Friend], now: DateTime<Utc>) {
    println!("{title} ({})", friends.len());
    for friend in friends {
        println!(
            "  {:<24} {:<8} {}",
            friend.display_name,
            presence::status_label(&friend.status),
            presence::status_description(friend, now)
        );
    }
}

/// Prompts until a non-blank line arrives.
fn prompt_nonempty(input: &mut impl BufRead, label: &str) -> Result<String> {
    loop {
        let line = prompt(input, label)?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }
}

/// Prompts for a 6-digit code; an empty line backs out (returns None).
fn prompt_code(input: &mut impl BufRead, label: &str) -> Result<Option<String>> {
    loop {
        let line = prompt(input, label)?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.len() == 6 && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Some(trimmed.to_string()));
        }
        println!("Codes are 6 digits.");
    }
}

fn prompt(input: &mut impl BufRead, label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush().context("flush stdout")?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("read input")?;
    if read == 0 {
        bail!("unexpected end of input");
    }
    Ok(line)
}
