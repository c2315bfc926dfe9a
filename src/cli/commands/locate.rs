//! The `locate` command: print the source of a symbol.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::cli::LocateArgs;
use crate::infrastructure::config::ConfigLoader;
use crate::services::locator;

pub async fn execute(args: LocateArgs, json_mode: bool) -> Result<()> {
    let config = ConfigLoader::load()?;
    let target = if args.file.exists() {
        args.file.clone()
    } else {
        Path::new(&config.source_root).join(&args.file)
    };

    let (source, path): (String, PathBuf) = locator::locate(&target, &args.symbol)?;

    if json_mode {
        let payload = serde_json::json!({
            "symbol": args.symbol,
            "path": path,
            "source": source,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("{source}");
    }
    Ok(())
}
