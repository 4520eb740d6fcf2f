//! `dossier`: command-line client for the Dossier API.
//!
//! Collections are fetched from the server; search, case scope, facets and
//! filters run locally through `dossier-core`.
//!
//! # Usage
//!
//! ```
//! dossier --url http://localhost:8001 contacts --search popescu --filter source=WhatsApp
//! dossier credentials --case C1 --filter service=Gmail
//! dossier set-category 3f2a… Social
//! dossier credentials --set 3f2a…=Social --filter category=Social
//! dossier export --type wordlist --filter case=C1
//! ```

mod client;
mod render;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use dossier_core::{
  export::{ExportRequest, ExportType},
  selection::FilterSelection,
  view::{View, contacts_view, password_view, suspect_view, whatsapp_view},
  whatsapp::GroupFilter,
};
use serde::Deserialize;
use session::Session;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

const DEFAULT_URL: &str = "http://localhost:8001";

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "dossier", about = "Browse forensic extraction records")]
struct Cli {
  /// Path to a TOML config file (url).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the dossier server (default: http://localhost:8001).
  #[arg(long, env = "DOSSIER_URL")]
  url: Option<String>,

  #[command(subcommand)]
  command: Command,
}

/// Search, case scope and `FIELD=VALUE` filters shared by list commands.
#[derive(Args, Debug, Default)]
struct ViewArgs {
  /// Free-text search; digits-only queries match phone numbers.
  #[arg(short, long, default_value = "")]
  search: String,

  /// Restrict to one case number.
  #[arg(long)]
  case: Option<String>,

  /// Filter as FIELD=VALUE, e.g. `service=Gmail` (repeatable).
  #[arg(short, long = "filter", value_name = "FIELD=VALUE")]
  filters: Vec<String>,

  /// Also print the filter options left for each field.
  #[arg(long)]
  facets: bool,
}

impl ViewArgs {
  fn selection(&self) -> Result<FilterSelection> {
    FilterSelection::from_pairs(&self.filters).context("invalid --filter")
  }
}

#[derive(Subcommand, Debug)]
enum Command {
  /// List contacts.
  Contacts {
    #[command(flatten)]
    view:  ViewArgs,
    /// Merge records sharing a phone number.
    #[arg(long)]
    dedup: bool,
  },
  /// Show one contact with its duplicates and WhatsApp groups.
  Contact { id: String },
  /// List passwords and user accounts.
  Credentials {
    #[command(flatten)]
    view:  ViewArgs,
    /// Merge records sharing an account and application.
    #[arg(long)]
    dedup: bool,
    /// Recategorize a credential before listing, as ID=CATEGORY.
    #[arg(long = "set", value_name = "ID=CATEGORY", conflicts_with = "dedup")]
    set:   Option<String>,
  },
  /// Show one credential with its duplicates.
  Credential { id: String },
  /// Password reuse analysis.
  Reuse {
    /// Filter usages as FIELD=VALUE (repeatable).
    #[arg(short, long = "filter", value_name = "FIELD=VALUE")]
    filters: Vec<String>,
  },
  /// List WhatsApp groups.
  Groups {
    #[arg(short, long, default_value = "")]
    search:  String,
    #[arg(long)]
    case:    Option<String>,
    #[arg(long)]
    device:  Option<String>,
    #[arg(long)]
    suspect: Option<String>,
  },
  /// List suspect profiles.
  Suspects {
    #[arg(short, long, default_value = "")]
    search: String,
    #[arg(long)]
    case:   Option<String>,
  },
  /// Phone, name and photo of each case's device owner.
  Owners,
  /// Contacts of a case sharing the same photo.
  Photos { case: String },
  /// Cases with their upload sessions and record counts.
  Cases,
  /// Delete every record of a case.
  DeleteCase { case: String },
  /// Delete the upload session of a suspect profile.
  DeleteSession { profile_id: String },
  /// Change the category of a password or user account.
  SetCategory { id: String, category: String },
  /// Download a wordlist or full CSV export.
  Export {
    #[arg(long = "type", default_value = "full")]
    export_type: ExportType,
    /// Credential filters as FIELD=VALUE (repeatable).
    #[arg(short, long = "filter", value_name = "FIELD=VALUE")]
    filters:     Vec<String>,
    /// Where to write the file (default: the server's file name).
    #[arg(short, long)]
    output:      Option<PathBuf>,
  },
  /// Record counts.
  Stats,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let file_cfg: ConfigFile = if let Some(path) = &cli.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url: cli
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| DEFAULT_URL.to_string()),
  };

  let client = ApiClient::new(api_config)?;
  run(cli.command, client).await
}

async fn run(command: Command, client: ApiClient) -> Result<()> {
  match command {
    Command::Contacts { view, dedup } => {
      let selection = view.selection()?;
      let contacts =
        if dedup { client.deduplicated_contacts().await? } else { client.contacts().await? };
      let shown = contacts_view(&contacts, &view.search, view.case.as_deref(), &selection);
      print!("{}", render::contacts(&shown.records, shown.scoped));
      if view.facets {
        print!("{}", render::facets(&shown.facets));
      }
    }

    Command::Contact { id } => {
      print!("{}", render::contact_details(&client.contact_details(&id).await?));
    }

    Command::Credentials { view, dedup, set } => {
      let selection = view.selection()?;
      let credentials = if dedup {
        client.deduplicated_credentials().await?
      } else {
        let mut session = Session::new(client);
        refresh(&mut session).await;
        if let Some(pair) = set {
          let (id, category) = pair.split_once('=').context("--set expects ID=CATEGORY")?;
          if let Err(e) = session.set_category(id, category).await {
            eprintln!("warning: failed to set category of {id}: {e:#}");
          }
        }
        session.credentials()
      };
      let shown = View::build(&credentials, &view.search, view.case.as_deref(), &selection);
      print!("{}", render::credentials(&shown.records, shown.scoped));
      if view.facets {
        print!("{}", render::facets(&shown.facets));
      }
    }

    Command::Credential { id } => {
      print!("{}", render::credential_details(&client.credential_details(&id).await?));
    }

    Command::Reuse { filters } => {
      let selection = FilterSelection::from_pairs(&filters).context("invalid --filter")?;
      let groups = client.password_analysis().await?;
      print!("{}", render::password_groups(&password_view(&groups, &selection)));
    }

    Command::Groups { search, case, device, suspect } => {
      let groups = client.whatsapp_groups().await?;
      let filter = GroupFilter { device, suspect, case: None };
      let shown = whatsapp_view(&groups, &search, case.as_deref(), &filter);
      print!("{}", render::whatsapp_groups(&shown.groups, groups.len()));
      print!("{}", render::group_options(&shown.options));
    }

    Command::Suspects { search, case } => {
      let profiles = client.suspect_profiles().await?;
      print!("{}", render::suspects(&suspect_view(&profiles, &search, case.as_deref())));
    }

    Command::Owners => print!("{}", render::suspect_info(&client.suspect_info().await?)),

    Command::Photos { case } => {
      print!("{}", render::photo_groups(&case, &client.contacts_by_photo(&case).await?));
    }

    Command::Cases => print!("{}", render::cases(&client.cases().await?)),

    Command::DeleteCase { case } => {
      let deleted = client.delete_case(&case).await?;
      print!("case {case}\n{}", render::deleted(&deleted));
    }

    Command::DeleteSession { profile_id } => {
      let deleted = client.delete_session(&profile_id).await?;
      print!("session of {profile_id}\n{}", render::deleted(&deleted));
    }

    Command::SetCategory { id, category } => {
      let category = category.trim();
      if category.is_empty() {
        bail!("category is required");
      }
      client
        .set_category(&id, category)
        .await
        .with_context(|| format!("failed to set category of {id}"))?;
      println!("{id}: {category}");
    }

    Command::Export { export_type, filters, output } => {
      let selection = FilterSelection::from_pairs(&filters).context("invalid --filter")?;
      let request = ExportRequest::from_selection(export_type, &selection);
      let download = client.export(&request).await?;
      let path = output.unwrap_or_else(|| PathBuf::from(&download.filename));
      std::fs::write(&path, &download.body)
        .with_context(|| format!("writing {}", path.display()))?;
      println!("wrote {} ({} bytes)", path.display(), download.body.len());
    }

    Command::Stats => print!("{}", render::stats(&client.stats().await?)),
  }
  Ok(())
}

/// Refresh `session`, echoing fetch failures to stderr.
async fn refresh(session: &mut Session<ApiClient>) {
  if session.refresh().await > 0 {
    for warning in &session.warnings {
      eprintln!("warning: {warning}");
    }
  }
}
