use anyhow::Context;
use std::path::Path;
use workroom_core::{config::ClientConfig, io, paths};

pub fn run(root: &Path) -> anyhow::Result<()> {
    println!("Initializing Workroom in: {}", root.display());

    // 1. Create .workroom directory structure
    let dirs = [paths::WORKROOM_DIR, paths::SESSIONS_DIR];
    for dir in dirs {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    // 2. Write config.yaml if missing
    let config_path = paths::config_path(root);
    if !config_path.exists() {
        let cfg = ClientConfig::default();
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: .workroom/config.yaml");
    } else {
        println!("  exists:  .workroom/config.yaml");
    }

    println!("\nWorkroom initialized successfully.");
    println!("Next: workroom login --token <token>, then workroom connect <provider>");
    Ok(())
}
