use anyhow::Context;
use std::path::Path;
use workroom_core::{config::ClientConfig, user::UserStore};

pub fn run(
    root: &Path,
    token: &str,
    api_base: Option<&str>,
    name: Option<&str>,
) -> anyhow::Result<()> {
    // Stores live under .workroom/, so init must have run first.
    ClientConfig::load(root).context("failed to load config")?;

    let mut user = UserStore::load(root).context("failed to load user store")?;
    user.token = Some(token.to_string());
    if let Some(base) = api_base {
        user.api_base = Some(base.to_string());
    }
    if let Some(name) = name {
        user.display_name = Some(name.to_string());
    }
    user.save(root).context("failed to save user store")?;

    match &user.display_name {
        Some(name) => println!("Logged in as {name}."),
        None => println!("Logged in."),
    }
    Ok(())
}

pub fn run_logout(root: &Path) -> anyhow::Result<()> {
    let mut user = UserStore::load(root).context("failed to load user store")?;
    if user.token.is_none() {
        println!("Not logged in.");
        return Ok(());
    }

    user.logout();
    user.save(root).context("failed to save user store")?;
    println!("Logged out.");
    Ok(())
}
