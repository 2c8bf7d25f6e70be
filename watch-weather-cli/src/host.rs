use anyhow::Context;
use std::sync::Arc;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    task::JoinSet,
};
use tracing::{debug, info, warn};

use watch_weather_core::{
    BridgeEvent, Config, Credentials, JsonLinesBridge, Relay, Services, locator_from_config,
    provider_from_config,
};

/// Long-lived companion loop over stdin/stdout.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    let services = Services {
        locator: locator_from_config(&config.location),
        provider: provider_from_config(&config.weather),
        bridge: Arc::new(JsonLinesBridge::new(tokio::io::stdout())),
    };
    let mut relay = Relay::new(
        services,
        Credentials::new(config.weather.default_api_key.clone()),
        config.location.locate_options(),
    );

    info!("companion started, waiting for bridge events on stdin");
    let handled = relay_events(BufReader::new(tokio::io::stdin()), &mut relay).await?;
    info!(handled, "bridge closed");
    Ok(())
}

/// Feed JSON-line events to `relay` until EOF.
///
/// Weather jobs are spawned so overlapping requests may race; all of them are
/// awaited before returning. Returns the number of events handled.
pub async fn relay_events<R>(reader: R, relay: &mut Relay) -> anyhow::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut jobs = JoinSet::new();
    let mut handled = 0;

    while let Some(line) = lines.next_line().await.context("Failed to read bridge event")? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event = match BridgeEvent::from_json_line(line) {
            Ok(event) => event,
            Err(err) => {
                warn!(error = ?err, line, "skipping undecodable bridge event");
                continue;
            }
        };

        handled += 1;
        if let Some(job) = relay.dispatch(event).await {
            jobs.spawn(job.run_logged());
        }

        // Reap finished jobs without blocking.
        while let Some(done) = jobs.try_join_next() {
            if let Err(err) = done {
                warn!(error = %err, "weather job panicked");
            }
        }
    }

    debug!(pending = jobs.len(), "waiting for in-flight weather jobs");
    while let Some(done) = jobs.join_next().await {
        if let Err(err) = done {
            warn!(error = %err, "weather job panicked");
        }
    }

    Ok(handled)
}
