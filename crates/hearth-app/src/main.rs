//! Hearth console binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize session storage (memory or SQLite)
//! 3. Pick a generation service (HTTP, or the offline echo service)
//! 4. Read one user message per line from stdin and print each
//!    response as a JSON line on stdout

mod cli;

use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use hearth_core::config::HearthConfig;
use hearth_dialogue::{
    DialogueEngine, EchoGenerationService, GenerationService, HttpGenerationService, Schema,
    SchemaRegistry, TurnRequest, TurnResponse,
};
use hearth_storage::{Database, MemorySessions, SessionPersistence, SessionRepository};

use cli::CliArgs;

fn open_storage(config: &HearthConfig) -> Result<Arc<dyn SessionPersistence>, Box<dyn std::error::Error>> {
    match config.storage.backend.as_str() {
        "memory" => {
            tracing::info!("Using in-memory session storage");
            Ok(Arc::new(MemorySessions::new()))
        }
        "sqlite" => {
            let db_path = config.database_path();
            if let Some(dir) = db_path.parent() {
                if let Err(e) = std::fs::create_dir_all(dir) {
                    tracing::error!(path = %dir.display(), error = %e, "Failed to create data directory");
                    return Err(e.into());
                }
            }
            let db = Database::new(&db_path)?;
            tracing::info!(path = %db_path.display(), "SQLite session store opened");
            Ok(Arc::new(SessionRepository::new(Arc::new(db))))
        }
        other => Err(format!("unknown storage backend: {}", other).into()),
    }
}

/// Resolve the console's domain, naming the known ones when it is unknown.
fn resolve_schema(
    registry: &SchemaRegistry,
    domain: &str,
) -> Result<Arc<Schema>, Box<dyn std::error::Error>> {
    registry.resolve(domain).map_err(|e| {
        let available = registry.domains().join(", ");
        Box::<dyn std::error::Error>::from(format!("{} (available: {})", e, available))
    })
}

fn pick_generator(config: &HearthConfig, offline: bool) -> Arc<dyn GenerationService> {
    if offline {
        tracing::info!("Offline mode: using echo generator");
        return Arc::new(EchoGenerationService::new());
    }
    let http = HttpGenerationService::new(&config.generation);
    if http.is_configured() {
        tracing::info!(
            endpoint = %config.generation.endpoint,
            model = %config.generation.model,
            "Using HTTP generator"
        );
        Arc::new(http)
    } else {
        tracing::warn!(
            env = %config.generation.api_key_env,
            "API key not set, falling back to echo generator"
        );
        Arc::new(EchoGenerationService::new())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config = HearthConfig::load_or_default(&config_file);

    // Tracing goes to stderr so stdout stays one JSON document per line.
    let log_level = args.resolve_log_level(&config);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .init();

    tracing::info!("Starting Hearth v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    let storage = open_storage(&config)?;
    let generator = pick_generator(&config, args.offline);
    let engine = DialogueEngine::from_config(&config, storage, generator);

    let domain = args.resolve_domain(&config);
    let session_id = args.resolve_session();
    let schema = resolve_schema(engine.registry(), &domain)?;
    tracing::info!(session_id = %session_id, domain = %schema.id, "Session ready");

    println!(
        "{}",
        serde_json::to_string(&TurnResponse::ChooseMode {
            prompt: schema.choose_mode_prompt.clone(),
            options: schema.mode_options.to_vec(),
        })?
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text == ":quit" || text == ":q" {
            break;
        }

        let request = TurnRequest::new(session_id.as_str(), domain.as_str(), text);
        let response = match engine.handle_turn(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Turn rejected");
                TurnResponse::error(&e)
            }
        };
        println!("{}", serde_json::to_string(&response)?);
    }

    tracing::info!(session_id = %session_id, "Console closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend() {
        let mut config = HearthConfig::default();
        config.storage.backend = "memory".into();
        let storage = open_storage(&config).unwrap();
        assert!(storage.get("nobody").unwrap().is_none());
    }

    #[test]
    fn test_sqlite_backend_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = HearthConfig::default();
        config.general.data_dir = dir.path().join("nested").to_string_lossy().to_string();
        let storage = open_storage(&config).unwrap();
        assert!(storage.get("nobody").unwrap().is_none());
        assert!(config.database_path().exists());
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let mut config = HearthConfig::default();
        config.storage.backend = "postgres".into();
        let err = open_storage(&config).err().unwrap();
        assert!(err.to_string().contains("postgres"));
    }

    #[test]
    fn test_unknown_domain_lists_available() {
        let registry = SchemaRegistry::builtin();
        assert_eq!(resolve_schema(&registry, "Breads").unwrap().id, "bread");
        let err = resolve_schema(&registry, "pizza").err().unwrap();
        assert_eq!(
            err.to_string(),
            "unknown domain: pizza (available: bread, recipe)"
        );
    }

    #[test]
    fn test_generator_selection() {
        let mut config = HearthConfig::default();
        assert_eq!(pick_generator(&config, true).name(), "echo");

        config.generation.api_key_env = "HEARTH_TEST_NEVER_SET_KEY".into();
        assert_eq!(pick_generator(&config, false).name(), "echo");
    }
}
