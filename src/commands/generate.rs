//! Generate static files

use anyhow::Result;
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::path::{Path, PathBuf};
use std::sync::mpsc::channel;
use std::time::Duration;

use crate::generator::Generator;
use crate::{Site, CONFIG_FILE};

/// Generate the static site
pub fn run(site: &Site) -> Result<()> {
    let start = std::time::Instant::now();

    // Reload so config edits are picked up in watch mode
    let site = Site::new(&site.base_dir)?;
    let generator = Generator::new(&site)?;
    let posts = generator.generate()?;

    tracing::info!(
        "Generated {} posts into {:?} in {:.2}s",
        posts.len(),
        site.output_dir,
        start.elapsed().as_secs_f64()
    );

    Ok(())
}

/// Watch for file changes and regenerate once per settled batch
pub async fn watch(site: &Site) -> Result<()> {
    let (tx, rx) = channel();

    let mut debouncer = new_debouncer(Duration::from_millis(300), tx)?;

    for dir in [&site.posts_dir, &site.public_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    let config_path = site.base_dir.join(CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
    }

    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let paths: Vec<PathBuf> = events.into_iter().map(|e| e.path).collect();
                rebuild_for(site, &paths);
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Regenerate for one debounced batch of changed paths.
/// Returns whether a rebuild ran.
fn rebuild_for(site: &Site, paths: &[PathBuf]) -> bool {
    let relevant: Vec<&PathBuf> = paths.iter().filter(|p| is_relevant_change(p)).collect();
    if relevant.is_empty() {
        return false;
    }

    for path in &relevant {
        tracing::info!("File changed: {}", path.display());
    }

    if let Err(e) = run(site) {
        tracing::error!("Generation failed: {}", e);
    }
    true
}

/// Editor droppings do not trigger a rebuild
fn is_relevant_change(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".DS_Store") && !path_str.ends_with('~')
}
