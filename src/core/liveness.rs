use anyhow::Result;

use crate::config::RunConfig;
use crate::core::errors::TelescopeError;
use crate::plugins::types::LivenessProbe;
use crate::ui::printer::{Printer, Source};

/// Probes the target until it answers or the attempt budget runs out.
///
/// Returns `Ok(false)` once every attempt has failed. Probe failures other
/// than a non-zero exit (e.g. nmap missing) abort the check.
pub async fn is_alive(probe: &dyn LivenessProbe, config: &RunConfig, printer: Printer) -> Result<bool> {
    if config.skip_liveness {
        printer.say(3, Source::Telescope, "Skipping ping check");
        return Ok(true);
    }

    let policy = &config.liveness;
    let marker = &config.tools.nmap.up_marker;
    let delay = policy.retry_delay();

    for attempt in 1..=policy.max_attempts {
        tracing::debug!("{} attempt {}/{}", probe.name(), attempt, policy.max_attempts);

        match probe.probe(config).await {
            Ok(output) if output.contains(marker.as_str()) => {
                printer.say(1, Source::Telescope, "Host is up");
                return Ok(true);
            }
            Ok(_) => {}
            Err(e) => match e.downcast_ref::<TelescopeError>() {
                Some(te) if te.is_best_effort() => {
                    tracing::warn!("{} failed: {}", probe.name(), te);
                }
                _ => return Err(e),
            },
        }

        if attempt < policy.max_attempts {
            printer.warn(
                Source::Telescope,
                format!(
                    "Host is not up, does it respond to pings? Retrying in {}s",
                    delay.as_secs()
                ),
            );
            tokio::time::sleep(delay).await;
        }
    }

    printer.error(
        Source::Telescope,
        format!(
            "Tried {} times, no result, check if host is up or if it responds to pings.",
            policy.max_attempts
        ),
    );
    Ok(false)
}
