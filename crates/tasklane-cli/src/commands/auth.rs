use anyhow::{Result, anyhow};
use colored::Colorize;
use tasklane_application::Route;
use tasklane_core::auth::{LoginRequest, RegisterRequest};

use super::context::AppContext;

const LOGIN_FAILED: &str = "Login failed. Please try again.";
const REGISTRATION_FAILED: &str = "Registration failed. Please try again.";

fn already_signed_in(ctx: &AppContext) -> String {
    let name = ctx.session.user().map(|u| u.name).unwrap_or_default();
    format!(
        "Already logged in as {}. Run `tasklane logout` to switch accounts.",
        name
    )
}

pub async fn register(
    ctx: &AppContext,
    name: String,
    email: String,
    password: String,
) -> Result<()> {
    if ctx.land_on(Route::Register) != Route::Register {
        println!("{}", already_signed_in(ctx));
        return Ok(());
    }

    let profile = ctx
        .session
        .register(RegisterRequest::new(name, email, password))
        .await
        .map_err(|e| anyhow!(e.user_message(REGISTRATION_FAILED)))?;

    println!(
        "{}",
        format!("Account created for {}.", profile.name).green()
    );
    println!("Run `tasklane login` to sign in.");
    Ok(())
}

pub async fn login(ctx: &AppContext, email: String, password: String) -> Result<()> {
    if ctx.land_on(Route::Login) != Route::Login {
        println!("{}", already_signed_in(ctx));
        return Ok(());
    }

    let session = ctx
        .session
        .login(LoginRequest::new(email, password))
        .await
        .map_err(|e| anyhow!(e.user_message(LOGIN_FAILED)))?;

    println!("{}", format!("Welcome back, {}!", session.user.name).green());
    Ok(())
}

pub fn logout(ctx: &AppContext) -> Result<()> {
    let was_signed_in = ctx.session.is_authenticated();
    ctx.session.logout();

    if was_signed_in {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

pub fn whoami(ctx: &AppContext) -> Result<()> {
    match ctx.session.user() {
        Some(user) => {
            println!("Welcome, {}", user.name.bold());
            if let Some(email) = &user.email {
                println!("{}", email.dimmed());
            }
        }
        None => println!("Not logged in."),
    }
    Ok(())
}
