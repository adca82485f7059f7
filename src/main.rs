// src/main.rs

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vechain_mcp_server::{
    config::Config,
    core::{aggregate_tools, Plugin},
    mcp::{
        handler::handle_mcp_request,
        protocol::{error_codes, Request, Response},
        McpToolAdapter,
    },
    plugins::{DexPlugin, NftPlugin, TokenPlugin, VeChainStatsPlugin},
    registry::networks::get_network,
    registry::vechainstats::VeChainStatsClient,
    wallet::VeChainWallet,
    AppState,
};

// --- HTTP Server Logic ---
async fn run_http_server(state: AppState) {
    let app = Router::new()
        .route("/health", get(health_handler))
        // JSON-RPC endpoint for MCP tool calls
        .route("/rpc", post(rpc_handler))
        .with_state(state.clone())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", state.config.host, state.config.port)
        .parse()
        .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], state.config.port)));
    info!("🚀 HTTP Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// Forward JSON-RPC requests over HTTP to the MCP handler
async fn rpc_handler(State(state): State<AppState>, Json(req): Json<Request>) -> Json<Response> {
    match handle_mcp_request(req, state).await {
        Some(resp) => Json(resp),
        None => Json(Response::error(
            serde_json::Value::Null,
            error_codes::INVALID_REQUEST,
            "Notifications are not supported over HTTP".into(),
        )),
    }
}

// --- MCP Server Logic ---
async fn run_mcp_server(state: AppState) {
    info!("🚀 Starting MCP server on stdin/stdout...");

    let mut stdin = io::BufReader::new(io::stdin());
    let mut stdout = io::stdout();

    loop {
        let mut line = String::new();

        match stdin.read_line(&mut line).await {
            Ok(0) => {
                info!("EOF received, shutting down MCP server");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                debug!("Received: {}", line);

                let response = match serde_json::from_str::<Request>(line) {
                    Ok(request) => handle_mcp_request(request, state.clone()).await,
                    Err(parse_error) => {
                        error!("JSON parse error: {}", parse_error);
                        Some(Response::error(
                            serde_json::Value::Null,
                            error_codes::PARSE_ERROR,
                            format!("Parse error: {}", parse_error),
                        ))
                    }
                };

                if let Some(response) = response {
                    if let Ok(response_json) = serde_json::to_string(&response) {
                        debug!("Sending: {}", response_json);
                        if let Err(e) = stdout
                            .write_all(format!("{}\n", response_json).as_bytes())
                            .await
                        {
                            error!("Failed to write response: {}", e);
                            break;
                        }
                        if let Err(e) = stdout.flush().await {
                            error!("Failed to flush stdout: {}", e);
                            break;
                        }
                    }
                }
            }
            Err(e) => {
                error!("Failed to read from stdin: {}", e);
                break;
            }
        }
    }

    info!("MCP server shutting down");
}

#[tokio::main]
async fn main() {
    // Initialize tracing; logs go to stderr so stdout stays a clean
    // protocol stream in MCP mode.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vechain_mcp_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load configuration: {}", e);
            return;
        }
    };

    let network = match get_network(&config.network) {
        Ok(network) => network,
        Err(e) => {
            error!("❌ {}", e);
            return;
        }
    };

    // Initialize the wallet against the selected Thor network
    let wallet = match VeChainWallet::new(&config, network.clone()) {
        Ok(wallet) => Arc::new(wallet),
        Err(e) => {
            error!("❌ Failed to initialize wallet: {}", e);
            return;
        }
    };

    let stats_client = Arc::new(VeChainStatsClient::new(config.vechainstats_api_key.clone()));

    let plugins: Vec<Box<dyn Plugin<VeChainWallet>>> = vec![
        Box::new(TokenPlugin::new(network.clone())),
        Box::new(VeChainStatsPlugin::new(stats_client)),
        Box::new(DexPlugin::new(network.clone())),
        Box::new(NftPlugin::new(network.clone())),
    ];

    // Bind every compatible plugin's tools behind the core wallet set
    let tools = match aggregate_tools(&wallet, &plugins) {
        Ok(tools) => tools,
        Err(e) => {
            error!("❌ Tool registration failed: {}", e);
            return;
        }
    };

    let adapter = Arc::new(McpToolAdapter::new(tools));
    info!(
        "Serving {} tools on {}",
        adapter.len(),
        network.display_name
    );

    let app_state = AppState { config, adapter };

    // Check if running in HTTP server mode or MCP mode (stdin/stdout)
    let args: Vec<String> = env::args().collect();
    if args.contains(&"--http".to_string()) || app_state.config.http_mode {
        run_http_server(app_state).await;
    } else {
        run_mcp_server(app_state).await;
    }
}
