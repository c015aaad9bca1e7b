//! clientgen CLI entrypoint
//! Parses command-line arguments, loads the document and writes the generated client.
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use clientgen::openapi::{CompositeOpenApiLoader, OpenApiLoader, SchemaDocument};
use clientgen::output::{OutputDestination, write_output};
use clientgen::{GeneratorConfig, TargetLanguage, generate_source, generation};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser)]
#[command(name = "clientgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate a client from an OpenAPI or Swagger document
    Generate {
        /// Path or URL to the OpenAPI document (YAML or JSON)
        #[arg(long)]
        schema: String,
        /// File to write the client to; stdout when omitted
        #[arg(long)]
        output: Option<PathBuf>,
        /// Name of the generated client class
        #[arg(long)]
        client_name: Option<String>,
        /// Base URL baked into the client, overriding the document's
        #[arg(long)]
        base_url: Option<Url>,
        /// TOML configuration file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Target language
        #[arg(long)]
        target: Option<String>,
        /// Leave out the import header
        #[arg(long)]
        no_preamble: bool,
        /// Print the intermediate client model as JSON instead of source
        #[arg(long)]
        dump_model: bool,
    },
}

/// Parameters for client generation
struct GenerateParams<'a> {
    schema: &'a str,
    output: &'a Option<PathBuf>,
    client_name: &'a Option<String>,
    base_url: &'a Option<Url>,
    config: &'a Option<PathBuf>,
    target: &'a Option<String>,
    no_preamble: bool,
    dump_model: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout can carry the generated code
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Commands::Generate {
            schema,
            output,
            client_name,
            base_url,
            config,
            target,
            no_preamble,
            dump_model,
        } => {
            generate_client(GenerateParams {
                schema,
                output,
                client_name,
                base_url,
                config,
                target,
                no_preamble: *no_preamble,
                dump_model: *dump_model,
            })
            .await?
        }
    }
    Ok(())
}

/// Build the effective configuration: file values first, then flags
async fn resolve_config(params: &GenerateParams<'_>) -> anyhow::Result<GeneratorConfig> {
    let mut config = match params.config {
        Some(path) => GeneratorConfig::from_file(path)
            .await
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => GeneratorConfig::default(),
    };

    if let Some(name) = params.client_name {
        config.client_name = name.clone();
    }
    if let Some(url) = params.base_url {
        config.base_url = Some(url.as_str().trim_end_matches('/').to_string());
    }
    if let Some(target) = params.target {
        config.target = target
            .parse::<TargetLanguage>()
            .with_context(|| format!("Invalid target '{target}'"))?;
    }
    if params.no_preamble {
        config.include_preamble = false;
    }

    Ok(config)
}

/// Generate a client from an OpenAPI document
async fn generate_client(params: GenerateParams<'_>) -> anyhow::Result<()> {
    let config = resolve_config(&params).await?;
    info!(
        schema = %params.schema,
        target = %config.target,
        "Generating client"
    );

    let loader = CompositeOpenApiLoader::new().context("Failed to create OpenAPI loader")?;
    let spec = loader
        .load(params.schema)
        .await
        .with_context(|| format!("Failed to load OpenAPI schema from {}", params.schema))?;

    // Everything is generated in memory first; nothing is written on failure
    let text = if params.dump_model {
        let document = SchemaDocument::from_json(&spec).context("Failed to parse OpenAPI schema")?;
        let module =
            generation::generate(&document, &config).context("Failed to generate client")?;
        let mut json = serde_json::to_string_pretty(&module)?;
        json.push('\n');
        json
    } else {
        generate_source(&spec, &config).context("Failed to generate client")?
    };

    let destination = OutputDestination::from_path(params.output.as_deref());
    write_output(&text, &destination)
        .await
        .with_context(|| format!("Failed to write client to {destination}"))?;

    info!(destination = %destination, "Successfully generated client");
    Ok(())
}
