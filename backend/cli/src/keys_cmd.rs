//! CLI Keys Command
//!
//! Runs the status command once and lists the keys `/verify` would accept.

use anyhow::{Context, Result};

use peerverify_core::KeySet;
use peerverify_status::{known_keys, StatusSource};

pub async fn run(source: &dyn StatusSource) -> Result<()> {
    let keys = known_keys(source)
        .await
        .context("failed to query mesh daemon status")?;
    print!("{}", render(&keys));
    Ok(())
}

fn render(keys: &KeySet) -> String {
    let mut sorted: Vec<&str> = keys.iter().collect();
    sorted.sort_unstable();

    let mut out = format!("{} known node key(s)\n", sorted.len());
    for key in sorted {
        out.push_str("  ");
        out.push_str(key);
        out.push('\n');
    }
    out
}
