/*!
 * QueryDesk - interactive lookup terminal
 *
 * Wires configuration, logging, the lookup client, the audit trail and the
 * telemetry relay together, then hands control to the terminal loop.
 */

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use querydesk::{
    admin::AdminConsole,
    cli_style::print_error,
    config::{AppConfig, ADMIN_PIN},
    error::{exit_code_for, QueryDeskError, EXIT_SUCCESS},
    logging,
    lookup::HttpLookupClient,
    orchestrator::QueryOrchestrator,
    terminal::Terminal,
};
use querydesk_core_audit::{
    AuditLogStore, ClientContext, FileKeyValueStore, HttpTelemetrySink, KeyValueStore,
    MemoryKeyValueStore, TelemetryRelay,
};
use tracing::{error, info, warn};

fn main() {
    let code = match run() {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            if let Some(err) = e.downcast_ref::<QueryDeskError>() {
                error!(category = %err.category(), "QueryDesk stopped: {}", err);
            }
            print_error(&format!("{:#}", e));
            exit_code_for(&e)
        }
    };
    std::process::exit(code);
}

fn run() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    config.validate()?;
    logging::init_logging(&config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let data_dir = config.resolved_data_dir();
    let medium: Arc<dyn KeyValueStore> = match FileKeyValueStore::new(&data_dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("Audit log not persisted, falling back to memory: {}", e);
            Arc::new(MemoryKeyValueStore::new())
        }
    };
    let store = Arc::new(AuditLogStore::new(medium));

    let relay = match (&config.telemetry.endpoint, config.telemetry.is_enabled()) {
        (Some(endpoint), true) => TelemetryRelay::new(
            Arc::new(HttpTelemetrySink::new(endpoint.clone())),
            &config.telemetry.chat_id,
        )
        .with_timeout(Duration::from_secs(config.telemetry.timeout_secs)),
        _ => TelemetryRelay::disabled(),
    };

    let client = HttpLookupClient::new(
        config.lookup_url.clone(),
        Duration::from_secs(config.lookup_timeout_secs),
    )?;

    info!(
        data_dir = %data_dir.display(),
        telemetry = relay.is_enabled(),
        "QueryDesk starting"
    );

    let orchestrator = QueryOrchestrator::new(
        Arc::new(client),
        store.clone(),
        relay,
        ClientContext::detect(env!("CARGO_PKG_NAME"), querydesk::VERSION),
    );
    let admin = AdminConsole::new(ADMIN_PIN, store);

    Terminal::new(runtime, orchestrator, admin).run()?;
    Ok(())
}
