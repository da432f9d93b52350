//! Build command implementation.
//!
//! Loads configuration, runs one build pass of the injector against the
//! polyfill library on disk and writes every emitted asset.

use crate::cli::BuildArgs;
use crate::config::PolyfillConfig;
use crate::error::{CliError, Result};
use fob_polyfill::{Compilation, Compiler, EntryPoint, LibraryProvider, PolyfillInjectorPlugin};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Execute the build command.
///
/// 1. Load and validate configuration (CLI > Env > File > Defaults)
/// 2. Run the compiler with the injector plugin
/// 3. Write output files and list them on stdout
pub async fn execute(args: BuildArgs) -> Result<()> {
    let start_time = Instant::now();
    let cwd = std::env::current_dir()?;

    let config = PolyfillConfig::load(&args, &cwd)?;
    config.validate()?;
    debug!(?config, "loaded configuration");

    let compilation = build(&config).await?;
    write_assets(&config.out_dir, &compilation).await?;

    for (filename, content) in &compilation.assets {
        println!("{filename}  {} bytes", content.len());
    }
    info!(
        assets = compilation.assets.len(),
        out_dir = %config.out_dir.display(),
        elapsed_ms = start_time.elapsed().as_millis() as u64,
        "build completed"
    );
    Ok(())
}

/// Run one build pass for every configured entry.
pub async fn build(config: &PolyfillConfig) -> Result<Compilation> {
    let provider = Arc::new(LibraryProvider::new(&config.library));
    let plugin = PolyfillInjectorPlugin::new(config.defaults.clone(), provider);

    let entries: Vec<EntryPoint> = config
        .entries
        .iter()
        .map(|(name, options)| EntryPoint::with_loader(name.clone(), options.clone()))
        .collect();

    info!(entries = entries.len(), library = %config.library.display(), "building polyfills");
    let mut compiler = Compiler::new(config.output_options()).with_plugin(plugin);
    Ok(compiler.run(&entries).await?)
}

/// Write every asset of `compilation` below `out_dir`.
pub async fn write_assets(out_dir: &Path, compilation: &Compilation) -> Result<()> {
    tokio::fs::create_dir_all(out_dir).await?;

    for (filename, content) in &compilation.assets {
        let path = out_dir.join(filename);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| CliError::WriteFailed {
                path: path.clone(),
                source,
            })?;
        debug!(path = %path.display(), "wrote asset");
    }
    Ok(())
}
