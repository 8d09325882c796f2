use onehop_migrator::{
    adapters::{CompoundAdapter, Erc20Adapter, MakerDaoAdapter, OneHopAdapter},
    blockchain::{EthereumClient, WalletSession},
    config::{parse_address, Settings},
    handlers::create_api_routes,
    models::TokenRegistry,
    services::{CompoundRateCalculator, GasPriceOracle, MigrationService, PositionPoller, TransactionService},
    AppState,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(settings: &Settings) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("onehop_migrator={},tower_http=info", settings.logging.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if settings.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = Settings::new()?;
    init_tracing(&settings);

    info!("Starting OneHop migrator");

    let ethereum_client = EthereumClient::connect_lazy(&settings.blockchain.ethereum_rpc_url)?;
    if let Err(e) = ethereum_client.test_connection().await {
        // Contract handles keep retrying initialisation in the background
        warn!(error = %e, "Ethereum RPC not reachable yet");
    }

    let registry = Arc::new(TokenRegistry::mainnet());
    let wallet = Arc::new(WalletSession::new());
    let init_timeout = settings.contract_init_timeout();

    let savings = Arc::new(MakerDaoAdapter::new(
        ethereum_client.clone(),
        parse_address("contracts.mcd_pot_address", &settings.contracts.mcd_pot_address)?,
        init_timeout,
    ));
    let one_hop = OneHopAdapter::new(
        ethereum_client.clone(),
        parse_address("contracts.token_address", &settings.contracts.token_address)?,
        parse_address("contracts.holder_address", &settings.contracts.holder_address)?,
        init_timeout,
    );

    let gas_oracle = Arc::new(GasPriceOracle::new(&settings.gas_price)?);
    let gas_refresh = gas_oracle.clone().spawn_refresh_loop(settings.gas_refresh_interval());

    let transactions = Arc::new(TransactionService::new(
        Arc::new(ethereum_client.clone()),
        Duration::from_millis(settings.blockchain.confirmation_poll_ms),
        Duration::from_secs(settings.blockchain.confirmation_timeout_seconds),
    ));

    let migrations = Arc::new(MigrationService::new(
        wallet.clone(),
        registry.clone(),
        one_hop,
        Erc20Adapter::new(ethereum_client.clone()),
        transactions.clone(),
        gas_oracle.clone(),
    ));

    let poller = Arc::new(PositionPoller::new(
        wallet.clone(),
        registry.clone(),
        Arc::new(CompoundAdapter::new(ethereum_client.clone())),
        savings,
        CompoundRateCalculator::new(settings.blockchain.seconds_per_block),
        settings.poll_interval(),
    ));
    let poller_handle = tokio::spawn(poller.clone().run());

    if let Some(address) = settings.wallet.address.as_deref() {
        wallet.connect(parse_address("wallet.address", address)?).await;
    }

    let state = AppState {
        settings: settings.clone(),
        registry,
        wallet,
        poller: poller.clone(),
        gas_oracle,
        transactions,
        migrations,
    };

    let app = create_api_routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr: SocketAddr = format!("{}:{}", settings.api.host, settings.api.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");

    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
        }
        info!("Received shutdown signal");
    });

    if let Err(e) = server.await {
        error!(error = %e, "API server failed");
    }

    poller.shutdown();
    gas_refresh.abort();
    if let Err(e) = poller_handle.await {
        error!(error = %e, "Position poller task panicked");
    }

    info!("OneHop migrator stopped");
    Ok(())
}
