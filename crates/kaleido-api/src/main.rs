use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kaleido_api::{app::build_router, config::Config, state::AppState};
use kaleido_llm::{ClientFactory, ProviderConfig};
use kaleido_persist::{CheckpointStore, InMemoryStore, MongoStore, ProductLookup, ThreadStore};
use kaleido_search::{
    ChromaRetriever, HttpReranker, LlmOracle, RerankRetriever, Retriever, SearchOrchestrator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config);

    tracing::info!("Starting Kaleido API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    // LLM clients
    let mut provider = ProviderConfig::openai(config.openai_api_key.clone());
    if let Some(base_url) = &config.llm.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    let chat_client = ClientFactory::create_chat_client(&provider)?;
    let embedding_client = ClientFactory::create_embedding_client(&provider)?;
    let oracle = Arc::new(
        LlmOracle::new(chat_client, config.llm.model.clone())
            .with_temperature(config.llm.temperature),
    );

    // Stores
    let ((threads, checkpoints, products), storage) = match &config.mongodb_uri {
        Some(uri) => {
            tracing::info!("Connecting to MongoDB");
            let store = MongoStore::connect(uri, &config.mongodb.database).await?;
            tracing::info!("MongoDB connected");
            (split_store(Arc::new(store)), "mongodb")
        }
        None => {
            tracing::warn!("MONGODB_URI not set, threads are kept in memory");
            (split_store(Arc::new(InMemoryStore::new())), "memory")
        }
    };

    // Retrieval
    let retrieval = &config.retrieval;
    let retriever = Arc::new(
        ChromaRetriever::new(
            retrieval.chroma_url(),
            retrieval.collection.clone(),
            Arc::clone(&embedding_client),
            config.llm.embedding_model.clone(),
        )
        .with_k(retrieval.k),
    );

    let mut builder = SearchOrchestrator::builder()
        .oracle(oracle)
        .thread_store(threads)
        .checkpoint_store(checkpoints)
        .product_lookup(products)
        .retriever(retriever)
        .pipeline_config(config.pipeline_config());

    if let Some(reranker_url) = &retrieval.reranker_url {
        tracing::info!(reranker_url = %reranker_url, "Reranking enabled");
        let candidates = Arc::new(
            ChromaRetriever::new(
                retrieval.chroma_url(),
                retrieval.collection.clone(),
                embedding_client,
                config.llm.embedding_model.clone(),
            )
            .with_k(retrieval.candidate_k),
        );
        let rerank: Arc<dyn Retriever> = Arc::new(
            RerankRetriever::new(candidates, Arc::new(HttpReranker::new(reranker_url.clone())))
                .with_top_n(retrieval.top_n),
        );
        builder = builder.rerank_retriever(rerank);
    }

    let search = builder.build()?;

    let state = Arc::new(AppState::new(config.clone(), search, storage));
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

type Stores = (
    Arc<dyn ThreadStore>,
    Arc<dyn CheckpointStore>,
    Arc<dyn ProductLookup>,
);

fn split_store<S>(store: Arc<S>) -> Stores
where
    S: ThreadStore + CheckpointStore + ProductLookup + 'static,
{
    (store.clone(), store.clone(), store)
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry.with(tracing_subscriber::fmt::layer().json()).init();
        }
        _ => {
            registry.with(tracing_subscriber::fmt::layer().pretty()).init();
        }
    }
}
