//! Session commands

use anyhow::{Result, bail};
use clap::Subcommand;
use colored::*;
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;

use crate::api::{RegisterRequest, User};
use crate::cli::{AppContext, Reported, require_terminal};

#[derive(Subcommand)]
pub enum AuthCommands {
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: Option<String>,
    },
    /// Create an account and sign in
    Register,
    /// Sign out and forget the stored session
    Logout,
    /// Show the signed-in user
    Me,
}

pub async fn handle_auth_command(ctx: &AppContext, command: AuthCommands) -> Result<()> {
    match command {
        AuthCommands::Login { email } => login(ctx, email).await,
        AuthCommands::Register => register(ctx).await,
        AuthCommands::Logout => {
            ctx.client.logout().await;
            ctx.notifier.success("Signed out");
            Ok(())
        }
        AuthCommands::Me => {
            ctx.require_login()?;
            let user = ctx
                .client
                .me()
                .await
                .map_err(|e| Reported::notify(ctx, &e, "Failed to load profile"))?;
            print_user(&user);
            Ok(())
        }
    }
}

async fn login(ctx: &AppContext, email: Option<String>) -> Result<()> {
    require_terminal("auth login")?;
    let theme = ColorfulTheme::default();
    let email = match email {
        Some(email) => email,
        None => Input::<String>::with_theme(&theme)
            .with_prompt("Email")
            .interact_text()?,
    };
    let password = rpassword::prompt_password("Password: ")?;

    match ctx.client.login(email.trim(), &password).await {
        Ok(user) => {
            ctx.notifier
                .success(&format!("Signed in as {}", user.full_name()));
            Ok(())
        }
        Err(e) => Err(Reported::notify(ctx, &e, "Login failed")),
    }
}

async fn register(ctx: &AppContext) -> Result<()> {
    require_terminal("auth register")?;
    let theme = ColorfulTheme::default();
    let ask = |prompt: &str| -> Result<String> {
        Ok(Input::<String>::with_theme(&theme)
            .with_prompt(prompt)
            .interact_text()?
            .trim()
            .to_string())
    };
    let first_name = ask("First name")?;
    let last_name = ask("Last name")?;
    let email = ask("Email")?;

    let password = rpassword::prompt_password("Password: ")?;
    let confirm = rpassword::prompt_password("Confirm password: ")?;
    if password != confirm {
        bail!("Passwords do not match");
    }

    let request = RegisterRequest {
        first_name,
        last_name,
        email,
        password,
    };
    match ctx.client.register(request).await {
        Ok(user) => {
            ctx.notifier
                .success(&format!("Welcome, {}", user.full_name()));
            Ok(())
        }
        Err(e) => Err(Reported::notify(ctx, &e, "Registration failed")),
    }
}

fn print_user(user: &User) {
    println!("{}", user.full_name().bold());
    println!("  {} {}", "Email:".dimmed(), user.email);
    if !user.role.is_empty() {
        println!("  {} {}", "Role:".dimmed(), user.role);
    }
    if !user.job_title.is_empty() {
        println!("  {} {}", "Job title:".dimmed(), user.job_title);
    }
    let status = if user.active { "Active".green() } else { "Inactive".red() };
    println!("  {} {}", "Status:".dimmed(), status);
}
