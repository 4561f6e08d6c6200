use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use esp_connector::{ConnectorSettings, Email, EmailFields, Mailer, ProviderCatalog};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    esp_telemetry::install("esp-cli")?;
    match cli.command {
        CliCommand::Check { config } => handle_check(config),
        CliCommand::Providers => handle_providers(),
        CliCommand::Send {
            config,
            provider,
            message,
        } => handle_send(config, provider, message).await,
    }
}

#[derive(Parser, Debug)]
#[command(name = "esp", version, about = "Send email through configured ESP providers")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Validate a configuration file and list the providers it registers
    Check {
        /// Provider configuration (.json, .yaml or .yml); defaults to $ESP_CONNECTOR_CONFIG.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
    /// List the provider kinds compiled into this build
    Providers,
    /// Send one email and print the vendor receipt
    Send {
        /// Provider configuration (.json, .yaml or .yml); defaults to $ESP_CONNECTOR_CONFIG.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Registered provider name; the first configured provider when omitted.
        #[arg(long)]
        provider: Option<String>,
        #[command(flatten)]
        message: MessageArgs,
    },
}

#[derive(clap::Args, Debug)]
struct MessageArgs {
    #[arg(long)]
    from: String,
    /// Recipient address; can be repeated.
    #[arg(long, required = true)]
    to: Vec<String>,
    #[arg(long)]
    cc: Vec<String>,
    #[arg(long)]
    bcc: Vec<String>,
    #[arg(long)]
    subject: Option<String>,
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    html: Option<String>,
}

impl MessageArgs {
    fn into_email(self) -> Email {
        Email::new(EmailFields {
            from: self.from,
            to: self.to.into(),
            cc: self.cc.into(),
            bcc: self.bcc.into(),
            subject: self.subject,
            html: self.html,
            text: self.text,
        })
    }
}

fn load_mailer(config: Option<PathBuf>) -> Result<&'static Mailer> {
    let settings = ConnectorSettings::resolve(config.as_deref())
        .context("failed to load provider configuration")?;
    let mailer = esp_connector::global();
    settings.apply(mailer)?;
    Ok(mailer)
}

fn handle_check(config: Option<PathBuf>) -> Result<()> {
    let mailer = load_mailer(config)?;
    let names = mailer.provider_names()?;
    println!("{} provider(s) registered", names.len());
    for name in names {
        println!("  {name}");
    }
    Ok(())
}

fn handle_providers() -> Result<()> {
    for kind in ProviderCatalog::builtin().kinds() {
        println!("{kind}");
    }
    Ok(())
}

async fn handle_send(
    config: Option<PathBuf>,
    provider: Option<String>,
    message: MessageArgs,
) -> Result<()> {
    let mailer = load_mailer(config)?;
    let email = message.into_email();
    let dispatch = match provider.as_deref() {
        Some(name) => mailer.send_by_provider(name, &email)?,
        None => mailer.send(&email)?,
    };
    let receipt = dispatch.await?;
    println!("{}", serde_json::to_string_pretty(&receipt)?);
    Ok(())
}
