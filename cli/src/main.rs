mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use bynder_core::diagnostics::Severity;
use bynder_core::{
    AssetContext, AssetResolver, BynderDriver, StorageDriver, asset_types_by_allowed_elements, attach_assets,
    check_api_user, preview_url, render,
};
use clap::Parser;
use clap_derive::{Parser, Subcommand, ValueEnum};
use config::{PathManager, Settings, load_env_file};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect Bynder assets through the read-only storage driver", long_about = None)]
struct Args {
    /// Log to stderr instead of the log file
    #[arg(long, short, global = true)]
    tracing: bool,

    /// Directory for settings, scratch files, and logs
    #[arg(long, env = "BYNDER_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show file properties of an asset (default set unless --keys is given)
    Info {
        id: String,
        #[arg(long, value_delimiter = ',')]
        keys: Vec<String>,
    },
    /// Print the URL of a derivative
    Thumbnail {
        id: String,
        #[arg(long, default_value = "webimage")]
        derivative: String,
    },
    /// Print the preview URL for a target size, e.g. 200, 200m, or 200c
    Url {
        id: String,
        #[arg(long, default_value = "")]
        width: String,
        #[arg(long, default_value = "")]
        height: String,
    },
    /// Show how the asset would be embedded
    Render {
        id: String,
        #[arg(long, default_value = "")]
        width: String,
        #[arg(long, default_value = "")]
        height: String,
    },
    /// Download a derivative into the scratch directory and print its path
    Fetch {
        id: String,
        #[arg(long, default_value = "webimage")]
        derivative: String,
        /// Print the path relative to the site root
        #[arg(long)]
        relative: bool,
    },
    /// List playable sources of a video or audio asset
    Streams { id: String },
    /// Index picked assets, as the picker callback does
    Attach {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Register or remove a usage of an asset
    Usage {
        #[command(subcommand)]
        action: UsageAction,
    },
    /// Check that the API user is reachable and active
    Check,
    /// Asset kinds offered for a comma-separated list of allowed extensions
    Types {
        #[arg(default_value = "")]
        allowed: String,
    },
    /// Store an OAuth secret encrypted in the settings file
    SetSecret {
        #[arg(value_enum)]
        which: SecretKind,
        value: String,
    },
}

#[derive(Subcommand, Debug)]
enum UsageAction {
    Add {
        id: String,
        uri: String,
        #[arg(long)]
        note: Option<String>,
    },
    Remove { id: String, uri: String },
}

#[derive(Copy, Clone, ValueEnum, Debug, PartialEq, Eq)]
#[clap(rename_all = "lowercase")]
enum SecretKind {
    Consumer,
    Token,
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn set_secret(which: SecretKind, value: &str) -> anyhow::Result<()> {
    let mut settings = Settings::load_file()?;
    match which {
        SecretKind::Consumer => settings.set_consumer_secret(value)?,
        SecretKind::Token => settings.set_token_secret(value)?,
    }
    settings.save()?;
    println!("Stored {:?} secret in {:?}", which, PathManager::settings_path());
    Ok(())
}

/// Live driver stack for commands that talk to Bynder
struct Remote {
    settings: Settings,
    context: AssetContext,
    resolver: Arc<AssetResolver>,
    driver: BynderDriver,
}

impl Remote {
    fn connect() -> anyhow::Result<Self> {
        let settings = Settings::load()?;
        let context = AssetContext::from_settings(&settings)?;
        let resolver = Arc::new(AssetResolver::new(context.clone()));
        let mut driver = BynderDriver::new(resolver.clone());
        driver.initialize();
        info!(url = %settings.api_base_url(), storage = %context.storage, "Driver initialized");
        Ok(Self {
            settings,
            context,
            resolver,
            driver,
        })
    }

    fn asset(&self, id: &str) -> anyhow::Result<Arc<bynder_core::Asset>> {
        Ok(self.resolver.get_or_create(id)?)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_env_file();
    let args = Args::parse();

    if let Some(dir) = &args.data_dir {
        PathManager::set_data_dir(dir.clone());
    }
    let _log_guard = logging::init_logging(args.tracing);

    match args.command {
        Command::Info { id, keys } => {
            let remote = Remote::connect()?;
            print_json(&remote.driver.file_info_by_identifier(&id, &keys).await?)?;
        }
        Command::Thumbnail { id, derivative } => {
            let remote = Remote::connect()?;
            println!("{}", remote.asset(&id)?.thumbnail(&derivative).await?);
        }
        Command::Url { id, width, height } => {
            let remote = Remote::connect()?;
            let asset = remote.asset(&id)?;
            let url = preview_url(&asset, &width, &height, remote.settings.unavailable_image()).await;
            println!("{}", url);
        }
        Command::Render { id, width, height } => {
            let remote = Remote::connect()?;
            let asset = remote.asset(&id)?;
            print_json(&render(&asset, &width, &height, remote.settings.unavailable_image()).await?)?;
        }
        Command::Fetch {
            id,
            derivative,
            relative,
        } => {
            let remote = Remote::connect()?;
            println!("{}", remote.asset(&id)?.local_thumbnail(&derivative, !relative).await?);
        }
        Command::Streams { id } => {
            let remote = Remote::connect()?;
            for stream in remote.asset(&id)?.streams().await {
                println!("{}\t{}", stream.content_type, stream.url);
            }
        }
        Command::Attach { ids } => {
            let remote = Remote::connect()?;
            print_json(&attach_assets(&remote.resolver, ids.as_slice()).await?)?;
        }
        Command::Usage { action } => {
            let remote = Remote::connect()?;
            match action {
                UsageAction::Add { id, uri, note } => {
                    if !remote.asset(&id)?.record_usage(&uri, note.as_deref(), None).await {
                        anyhow::bail!("Recording usage of {} failed; see the log for details", id);
                    }
                    println!("Recorded usage of {} at {}", id, uri);
                }
                UsageAction::Remove { id, uri } => {
                    if !remote.asset(&id)?.clear_usage(&uri).await {
                        anyhow::bail!("Removing usage of {} failed; see the log for details", id);
                    }
                    println!("Removed usage of {} at {}", id, uri);
                }
            }
        }
        Command::Check => {
            let remote = Remote::connect()?;
            let status = check_api_user(remote.context.client.as_ref()).await;
            println!("{}", status);
            if status.severity == Severity::Error {
                anyhow::bail!("API check failed");
            }
        }
        Command::Types { allowed } => {
            let settings = Settings::load_unvalidated()?;
            for kind in asset_types_by_allowed_elements(&allowed, &settings.asset_types) {
                println!("{}", kind);
            }
        }
        Command::SetSecret { which, value } => set_secret(which, &value)?,
    }

    Ok(())
}
