use std::path::{Path, PathBuf};

/// Resolve the Workroom root directory.
///
/// Priority:
/// 1. `--root` flag / `WORKROOM_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.workroom/`
/// 3. Walk upward from `cwd` looking for `.git/`
/// 4. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    if let Some(dir) = find_up(&cwd, ".workroom") {
        return dir;
    }
    if let Some(dir) = find_up(&cwd, ".git") {
        return dir;
    }

    cwd
}

/// Walk upward from `start` until a directory containing `marker` is found.
fn find_up(start: &Path, marker: &str) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        if dir.join(marker).is_dir() {
            return Some(dir);
        }
        dir = dir.parent()?.to_path_buf();
    }
}
