use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use embedmap::config::{SettingsSource, load_settings};
use embedmap::{
    Bias, DocumentRegistry, DocumentSourceMap, DocumentStore, EmbedError, EmbedResult,
    EmbeddedDocuments, EmbeddingProvider, MappingCapabilities, MappingRange,
    StaticEmbeddingProvider, VirtualFile, accept_all,
};
use serde::Deserialize;
use serde_json::{Value, json};
use url::Url;

/// Inspect source maps and teleports of an embedded-document fixture
#[derive(Parser)]
#[command(name = "embedmap")]
#[command(version)]
#[command(about = "Inspect source maps and teleports of an embedded-document fixture")]
struct Cli {
    /// Settings override as JSON (e.g. '{"registry":{"cacheCapacity":4}}')
    #[arg(long, global = true)]
    settings: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Map a source offset into every embedded document
    ToGenerated {
        fixture: PathBuf,
        #[arg(long)]
        offset: usize,
        #[arg(long, value_enum, default_value_t = BiasArg::Left)]
        bias: BiasArg,
    },
    /// Map an offset of one embedded document back to the source
    ToSource {
        fixture: PathBuf,
        /// File name of the embedded document
        #[arg(long)]
        file: String,
        #[arg(long)]
        offset: usize,
        #[arg(long, value_enum, default_value_t = BiasArg::Left)]
        bias: BiasArg,
    },
    /// Map a range between the source and one embedded document
    Range {
        fixture: PathBuf,
        #[arg(long)]
        file: String,
        #[arg(long)]
        start: usize,
        #[arg(long)]
        end: usize,
        /// Treat the range as generated and map it to the source
        #[arg(long)]
        to_source: bool,
    },
    /// List teleport targets of an offset in one embedded document
    Teleports {
        fixture: PathBuf,
        #[arg(long)]
        file: String,
        #[arg(long)]
        offset: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BiasArg {
    Left,
    Right,
}

impl From<BiasArg> for Bias {
    fn from(bias: BiasArg) -> Self {
        match bias {
            BiasArg::Left => Bias::Left,
            BiasArg::Right => Bias::Right,
        }
    }
}

/// A source document together with the virtual file tree derived from it
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Fixture {
    uri: Url,
    language_id: String,
    text: String,
    root: VirtualFile,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string())
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> EmbedResult<Value> {
    let override_settings = cli
        .settings
        .as_deref()
        .map(serde_json::from_str::<Value>)
        .transpose()?
        .map(|value| (SettingsSource::CommandLine, value));

    match cli.command {
        Commands::ToGenerated {
            fixture,
            offset,
            bias,
        } => {
            let bundle = load_bundle(&fixture, override_settings)?;
            let matches: Vec<Value> = bundle
                .documents()
                .flat_map(|document| {
                    document
                        .map()
                        .map()
                        .to_generated_offsets(offset, accept_all, bias.into())
                        .map(|(generated, mapping)| {
                            json!({
                                "file": document.file_name(),
                                "offset": generated,
                                "sourceRange": mapping.source_range,
                                "generatedRange": mapping.generated_range,
                            })
                        })
                        .collect::<Vec<_>>()
                })
                .collect();
            Ok(Value::Array(matches))
        }
        Commands::ToSource {
            fixture,
            file,
            offset,
            bias,
        } => {
            let bundle = load_bundle(&fixture, override_settings)?;
            let map = document_map(&bundle, &file)?;
            let source = map
                .map()
                .to_source_offset(offset, accept_all, bias.into());
            Ok(json!({ "file": file, "offset": source }))
        }
        Commands::Range {
            fixture,
            file,
            start,
            end,
            to_source,
        } => {
            if end < start {
                return Err(EmbedError::fixture(format!(
                    "range end {} precedes start {}",
                    end, start
                )));
            }
            let bundle = load_bundle(&fixture, override_settings)?;
            let map = document_map(&bundle, &file)?;
            let range = MappingRange::new(start, end);
            let mapped = if to_source {
                map.map().to_source_range(range, accept_all)
            } else {
                map.map().to_generated_range(range, accept_all)
            };
            Ok(json!({ "file": file, "range": mapped }))
        }
        Commands::Teleports {
            fixture,
            file,
            offset,
        } => {
            let bundle = load_bundle(&fixture, override_settings)?;
            let document = bundle
                .documents()
                .find(|document| document.file_name().eq_ignore_ascii_case(&file))
                .ok_or_else(|| EmbedError::fixture(format!("no embedded file named {}", file)))?;
            let targets: Vec<Value> = document
                .teleport()
                .map(|teleport| {
                    teleport
                        .map()
                        .find_teleports(offset)
                        .map(|(target, caps)| json!({ "offset": target, "capabilities": caps }))
                        .collect()
                })
                .unwrap_or_default();
            Ok(Value::Array(targets))
        }
    }
}

fn load_bundle(
    path: &Path,
    override_settings: Option<(SettingsSource, Value)>,
) -> EmbedResult<Arc<EmbeddedDocuments>> {
    let outcome = load_settings(std::env::current_dir().ok().as_deref(), override_settings);
    for event in &outcome.events {
        event.log();
    }

    let fixture: Fixture = serde_json::from_str(&fs::read_to_string(path)?)?;
    log::debug!(
        target: "embedmap::cli",
        "Loaded fixture {} with {} embedded file(s)",
        fixture.uri,
        fixture.root.walk().count()
    );

    let provider = Arc::new(StaticEmbeddingProvider::new());
    provider.insert(fixture.uri.clone(), fixture.root);
    let store = Arc::new(DocumentStore::new());
    let registry = DocumentRegistry::new(
        Arc::clone(&store),
        provider as Arc<dyn EmbeddingProvider>,
        outcome.settings.registry.cache_capacity,
    );

    store.open(fixture.uri.clone(), fixture.language_id, 0, fixture.text);
    registry.get(&fixture.uri).ok_or_else(|| {
        EmbedError::fixture(format!("{} has no embedded documents", fixture.uri))
    })
}

fn document_map<'a>(
    bundle: &'a EmbeddedDocuments,
    file: &str,
) -> EmbedResult<&'a DocumentSourceMap<MappingCapabilities>> {
    bundle
        .documents()
        .find(|document| document.file_name().eq_ignore_ascii_case(file))
        .map(|document| document.map().as_ref())
        .ok_or_else(|| EmbedError::fixture(format!("no embedded file named {}", file)))
}
