use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use dcspray::app::ports::BrandingSourcePort;
use dcspray::common::constants::DEFAULT_ARCHIVE_NAME;
use dcspray::common::url::normalize_instance_url;
use dcspray::common::version::check_version;
use dcspray::infra::auth::{Grant, OAuthClient};
use dcspray::infra::http_client::DracoonClient;
use dcspray::metrics::registry::register_all_metrics;
use dcspray::observability::{init_logging, ConsoleReporter};
use dcspray::pipeline::StagingStore;
use dcspray::{BrandingError, BrandingScope, Config, TransferOrchestrator};

#[derive(Parser, Debug)]
#[command(name = "dcspray")]
#[command(about = "Copy DRACOON branding between instances or keep it in a zip file")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct TargetAuth {
    /// Client id of an OAuth app registered in the target instance
    #[arg(long)]
    client_id: Option<String>,
    /// Client secret of that OAuth app; without it the password flow is used
    #[arg(long)]
    client_secret: Option<String>,
    /// Use the authorization code flow instead of the password flow
    #[arg(long)]
    auth_code: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Copy the branding of a source instance to a target instance (requires config manager role)
    Spray {
        /// Source instance to copy the branding from
        source: String,
        /// Target instance to upload the branding to
        target: String,
        #[command(flatten)]
        auth: TargetAuth,
        /// Copy everything including texts, legal urls and emails (default)
        #[arg(long, conflicts_with = "styles_only")]
        full_branding: bool,
        /// Copy colors, images and layout only; the target keeps its texts, urls and emails
        #[arg(long)]
        styles_only: bool,
        /// Source is an on-premises installation using DRACOON Cloud branding
        #[arg(long)]
        on_prem_source: bool,
    },
    /// Download the branding of an instance into a zip file
    Save {
        /// Source instance to get the branding from
        source: String,
        /// Zip file name and path
        #[arg(default_value = DEFAULT_ARCHIVE_NAME)]
        zip_name: PathBuf,
        /// Source is an on-premises installation using DRACOON Cloud branding
        #[arg(long)]
        on_prem_source: bool,
    },
    /// Upload the branding stored in a zip file to a target instance
    Load {
        /// Zip file created by `save`
        zip_file: PathBuf,
        /// Target instance to upload the branding to
        target: String,
        #[command(flatten)]
        auth: TargetAuth,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let label = e.downcast_ref::<BrandingError>().map_or("Error", BrandingError::label);
            eprintln!("{}: {:#}", label, e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load()?;
    init_logging(&config.log_dir)?;
    register_all_metrics();
    info!("dcspray {} starting", env!("CARGO_PKG_VERSION"));

    let store = StagingStore::open(&config.working_dir)
        .with_context(|| format!("cannot use working directory {}", config.working_dir.display()))?;
    let orchestrator = TransferOrchestrator::new(store, Arc::new(ConsoleReporter::new()));

    match cli.command {
        Commands::Spray {
            source,
            target,
            auth,
            full_branding,
            styles_only,
            on_prem_source,
        } => {
            let scope = if styles_only { BrandingScope::StylesOnly } else { BrandingScope::Full };
            if full_branding {
                info!("Full branding requested explicitly");
            }
            let source = connect_source(&config, &source, on_prem_source)?;
            let target = connect_target(&config, &target, &auth).await?;
            orchestrator.spray(&source, &target, scope).await?;
        }
        Commands::Save {
            source,
            zip_name,
            on_prem_source,
        } => {
            let source = connect_source(&config, &source, on_prem_source)?;
            orchestrator.save(&source, &zip_name).await?;
        }
        Commands::Load { zip_file, target, auth } => {
            if !zip_file.is_file() {
                return Err(BrandingError::NotFound(zip_file).into());
            }
            let target = connect_target(&config, &target, &auth).await?;
            orchestrator.load(&zip_file, &target).await?;
        }
    }

    Ok(())
}

/// Anonymous session for reading public branding. The version gate runs inside the pipeline.
fn connect_source(config: &Config, url: &str, on_prem: bool) -> anyhow::Result<DracoonClient> {
    let base_url = normalize_instance_url(url)?;
    let client = DracoonClient::new(&base_url, config.request_timeout())?;
    if on_prem {
        info!("Routing branding of {} via {}", base_url, config.cloud_host);
        return Ok(client.routed_via(&config.cloud_host)?);
    }
    Ok(client)
}

/// Checks reachability and version of the target, then logs in.
async fn connect_target(config: &Config, url: &str, auth: &TargetAuth) -> anyhow::Result<DracoonClient> {
    let base_url = normalize_instance_url(url)?;
    let client = DracoonClient::new(&base_url, config.request_timeout())?;
    let version = client.software_version().await?;
    check_version(&version)?;

    let client_id = auth.client_id.clone().unwrap_or_else(|| config.client_id.clone());
    let oauth = OAuthClient::new(client_id, auth.client_secret.clone());

    let grant = if oauth.uses_authorization_code(auth.auth_code) {
        println!("Open the following url in your browser and log in:");
        println!("{}", oauth.authorization_url(&base_url)?);
        Grant::AuthorizationCode {
            code: prompt("Authorization code")?,
        }
    } else {
        if auth.auth_code {
            warn!("No client secret provided, using password flow");
            println!("No client secret provided. Using password flow.");
        }
        Grant::Password {
            username: prompt("Username")?,
            password: prompt("Password")?,
        }
    };

    let session = oauth.authenticate(client, grant).await?;
    println!("🔑 Logged in to {}", base_url);
    Ok(session)
}

fn prompt(label: &str) -> anyhow::Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim().to_string();
    if value.is_empty() {
        anyhow::bail!(BrandingError::Authentication(format!("{} must not be empty", label.to_lowercase())));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spray_defaults_to_full_branding() {
        let cli = Cli::try_parse_from(["dcspray", "spray", "a.example", "b.example"]).unwrap();
        match cli.command {
            Commands::Spray { styles_only, auth, .. } => {
                assert!(!styles_only);
                assert!(auth.client_id.is_none());
                assert!(!auth.auth_code);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn styles_only_conflicts_with_full_branding() {
        let parsed = Cli::try_parse_from(["dcspray", "spray", "a", "b", "--full-branding", "--styles-only"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn save_uses_default_archive_name() {
        let cli = Cli::try_parse_from(["dcspray", "save", "a.example", "--on-prem-source"]).unwrap();
        match cli.command {
            Commands::Save { zip_name, on_prem_source, .. } => {
                assert_eq!(zip_name, PathBuf::from("branding.zip"));
                assert!(on_prem_source);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn load_accepts_oauth_options() {
        let cli = Cli::try_parse_from([
            "dcspray", "load", "branding.zip", "b.example", "--client-id", "app", "--client-secret", "s3cret", "--auth-code",
        ])
        .unwrap();
        match cli.command {
            Commands::Load { auth, .. } => {
                assert_eq!(auth.client_id.as_deref(), Some("app"));
                assert_eq!(auth.client_secret.as_deref(), Some("s3cret"));
                assert!(auth.auth_code);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
