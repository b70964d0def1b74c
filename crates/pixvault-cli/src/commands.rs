use std::sync::Arc;

use anyhow::Context;

use pixvault_index::{InMemoryPictureIndex, PictureIndex};
use pixvault_rendition::{PassThroughProcessor, RenditionGenerator};
use pixvault_server::{
    AppState, PictureService, PixvaultServer, ServerConfig, StaticTokenSessions,
};
use pixvault_store::{BlobStore, FsBlobStore};
use pixvault_types::ContentId;

use crate::cli::{Cli, Command, HashArgs, ServeArgs};

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => serve(args),
        Command::Config(_) => print_default_config(),
        Command::Hash(args) => hash(args),
    }
}

fn load_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {path}"))?;
            toml::from_str(&raw).with_context(|| format!("parsing config file {path}"))?
        }
        None => ServerConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.bind_addr = bind.parse().context("parsing --bind address")?;
    }
    if let Some(root) = &args.root {
        config.storage_root = root.into();
    }
    Ok(config)
}

fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = load_config(&args)?;
    tracing::info!(
        bind = %config.bind_addr,
        prefix = %config.normalized_prefix(),
        sessions = config.tokens.len(),
        "loaded configuration"
    );

    let store: Arc<dyn BlobStore> = Arc::new(
        FsBlobStore::open(&config.storage_root)
            .with_context(|| format!("opening blob store at {}", config.storage_root.display()))?,
    );
    tracing::info!(root = %config.storage_root.display(), "opened blob store");

    let index: Arc<dyn PictureIndex> = Arc::new(InMemoryPictureIndex::new());
    let generator = Arc::new(RenditionGenerator::new(
        index.clone(),
        store.clone(),
        Arc::new(PassThroughProcessor),
    ));
    let state = Arc::new(AppState {
        service: PictureService::new(index, store, generator),
        sessions: Arc::new(StaticTokenSessions::from_table(&config.tokens)),
        prefix: config.normalized_prefix(),
        max_upload_bytes: config.max_upload_bytes,
    });

    let server = PixvaultServer::new(config, state);
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    runtime.block_on(server.serve()).context("serving requests")
}

fn print_default_config() -> anyhow::Result<()> {
    let rendered = toml::to_string_pretty(&ServerConfig::default())?;
    print!("{rendered}");
    Ok(())
}

fn hash(args: HashArgs) -> anyhow::Result<()> {
    let data =
        std::fs::read(&args.path).with_context(|| format!("reading {}", args.path))?;
    println!("{}", ContentId::of(&data).to_hex());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ServeArgs;

    #[test]
    fn default_config_when_no_file() {
        let args = ServeArgs {
            config: None,
            bind: None,
            root: None,
        };
        let config = load_config(&args).unwrap();
        assert_eq!(config.path_prefix, "/pic");
    }

    #[test]
    fn overrides_apply() {
        let args = ServeArgs {
            config: None,
            bind: Some("0.0.0.0:9000".into()),
            root: Some("/srv/pix".into()),
        };
        let config = load_config(&args).unwrap();
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.storage_root, std::path::PathBuf::from("/srv/pix"));
    }

    #[test]
    fn bad_bind_is_an_error() {
        let args = ServeArgs {
            config: None,
            bind: Some("not an address".into()),
            root: None,
        };
        assert!(load_config(&args).is_err());
    }

    #[test]
    fn default_config_renders_as_toml() {
        let rendered = toml::to_string_pretty(&ServerConfig::default()).unwrap();
        let parsed: ServerConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed.path_prefix, "/pic");
    }
}
