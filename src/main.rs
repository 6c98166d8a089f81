use std::{fs, process, sync::Arc, time::Duration};

use marquee::{
    application::{
        error::AppError,
        registry::{AppContext, ServiceRegistry},
        store::DocumentStore,
    },
    cache::{CacheConfig, CacheState, CacheStore, MemoryCacheStore, RedisCacheStore},
    config::{self, CacheBackend, CacheSettings, SearchBackend, SearchSettings},
    infra::{
        error::InfraError,
        http::{self, ApiState},
        search::{ElasticDocumentStore, MemoryDocumentStore, SeedData},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

const REDIS_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const REDIS_COMMAND_TIMEOUT: Duration = Duration::from_millis(500);

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::from(InfraError::configuration(err.to_string())))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let documents = init_document_store(&settings.search)?;
    let cache = init_cache_store(&settings.cache).await;

    let context = AppContext::new(documents, cache, settings.search.role_query_limit);
    let registry = ServiceRegistry::from_context(&context);
    let api = ApiState::from_registry(&registry)?;

    let cache_state = context
        .cache
        .clone()
        .map(|store| CacheState::new(CacheConfig::from(&settings.cache), store));

    let router = http::build_router(api, cache_state);

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(addr = %settings.server.addr, "listening");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    info!("server stopped");
    Ok(())
}

fn init_document_store(search: &SearchSettings) -> Result<Arc<dyn DocumentStore>, AppError> {
    match search.backend {
        SearchBackend::Elastic => {
            let store = ElasticDocumentStore::new(
                search.url.clone(),
                search.indices.clone(),
                search.request_timeout,
            )?;
            info!(url = %search.url, "using elasticsearch document store");
            Ok(Arc::new(store))
        }
        SearchBackend::Memory => {
            let seed = match &search.seed_path {
                Some(path) => {
                    let raw = fs::read_to_string(path).map_err(InfraError::from)?;
                    serde_json::from_str::<SeedData>(&raw).map_err(|err| {
                        InfraError::configuration(format!(
                            "invalid seed file `{}`: {err}",
                            path.display()
                        ))
                    })?
                }
                None => SeedData::default(),
            };
            info!(
                films = seed.films.len(),
                genres = seed.genres.len(),
                persons = seed.persons.len(),
                "using in-memory document store"
            );
            Ok(Arc::new(MemoryDocumentStore::from_seed(seed)))
        }
    }
}

/// `None` disables the response cache; an unreachable Redis does too.
async fn init_cache_store(cache: &CacheSettings) -> Option<Arc<dyn CacheStore>> {
    let config = CacheConfig::from(cache);
    match cache.backend {
        CacheBackend::None => {
            info!("response cache disabled");
            None
        }
        CacheBackend::Memory => Some(Arc::new(MemoryCacheStore::new(config.memory_capacity))),
        CacheBackend::Redis => {
            match RedisCacheStore::connect(
                &cache.redis_url,
                REDIS_CONNECT_TIMEOUT,
                REDIS_COMMAND_TIMEOUT,
            )
            .await
            {
                Ok(store) => Some(Arc::new(store)),
                Err(err) => {
                    warn!(
                        error = %err,
                        "redis unavailable; serving without response cache"
                    );
                    None
                }
            }
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}
