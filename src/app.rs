use crate::{
    cli::args::Cli,
    config::{ConfigLoader, RunConfig},
    core::{
        coordinator::Coordinator,
        errors::TelescopeError,
        liveness,
        models::{Answer, ScanJob, WebService},
        orchestrator::Orchestrator,
    },
    executors::toolchain,
    organizers::layout,
    parser::nmap as nmap_report,
    plugins::{
        gobuster::Gobuster,
        nmap::{self, NmapPing, QUICK_SCAN, ScanFiles},
    },
    ui::{
        printer::{self, Printer, RunSummary, Source},
        prompt::{Prompter, StdinPrompter},
    },
    utils::{logging, privileges},
};
use anyhow::Result;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

pub async fn run(cli: Cli) -> Result<()> {
    let level = logging::level_from_verbosity(cli.verbosity);
    logging::init(level)?;

    privileges::require_root()?;

    let global = ConfigLoader::load_with_custom_path(cli.config.as_deref())?;
    let config = RunConfig::from_cli(&cli, global)?;
    let printer = Printer::new(config.verbosity);
    tracing::info!("Starting telescope for target: {}", config.target);

    if config.show_banner {
        printer::print_banner();
    }

    let active: OnceLock<Coordinator> = OnceLock::new();
    tokio::select! {
        result = scan_target(config, printer, &active) => result,
        _ = tokio::signal::ctrl_c() => {
            if let Some(coordinator) = active.get() {
                printer.say(1, Source::Telescope, format!("Stopping {} running scans", coordinator.active()));
                coordinator.shutdown();
                // Let aborted scans drop their child processes
                let _ = tokio::time::timeout(SHUTDOWN_GRACE, coordinator.await_all()).await;
            }
            printer.say(0, Source::Telescope, "Goodbye");
            Ok(())
        }
    }
}

async fn scan_target(config: RunConfig, printer: Printer, active: &OnceLock<Coordinator>) -> Result<()> {
    toolchain::verify_or_bail(&config)?;

    printer.say(0, Source::Telescope, "Checking if host is alive...");
    if !liveness::is_alive(&NmapPing, &config, printer).await? {
        return Err(TelescopeError::LivenessCheckExhausted {
            target: config.target.value.clone(),
            attempts: config.liveness.max_attempts,
        }
        .into());
    }

    printer.say(0, Source::Telescope, "Starting initial scan...");
    let dir = layout::create_result_dir(&config.output_base)?;
    printer.say(2, Source::Telescope, format!("Set output directory to {}", dir.display()));
    let config = Arc::new(config.with_results_dir(dir));

    tolerate(nmap::quick_scan(&config).await, printer)?;
    let quick = nmap::read_report(&ScanFiles::new(&config.results_dir, QUICK_SCAN).xml)?;
    let ports = nmap_report::open_ports(&quick)?;
    let web = nmap_report::web_services(&quick)?;
    printer.say(1, Source::Nmap, format!("Open ports: {:?}", ports));

    printer.say(0, Source::Telescope, "Starting in depth scan...");
    match tolerate(nmap::full_scan(&config, &ports).await, printer)? {
        Some(Some(files)) => {
            printer.say(1, Source::Nmap, format!("In depth results written to {}", files.xml.display()));
        }
        Some(None) => printer.say(0, Source::Nmap, "No open ports, nothing to scan in depth"),
        None => {}
    }

    printer.say(0, Source::Telescope, "Starting services scan...");
    let prompter: Arc<dyn Prompter> = Arc::new(StdinPrompter::new());
    let orchestrator = Orchestrator::new(
        Arc::clone(&config),
        Arc::new(Gobuster),
        Arc::clone(&prompter),
        printer,
    );
    let coordinator = active.get_or_init(|| Coordinator::new(Arc::new(orchestrator)));

    for service in &web {
        if offer(prompter.as_ref(), service).await {
            coordinator.launch(ScanJob::root(*service));
        }
    }

    coordinator.await_all().await;

    let stats = coordinator.stats();
    printer::print_summary(&RunSummary {
        target: &config.target.value,
        results_dir: &config.results_dir,
        open_ports: ports.len(),
        web_services: web.len(),
        scans_launched: stats.launched,
        scans_failed: stats.failed,
    });
    Ok(())
}

async fn offer(prompter: &dyn Prompter, service: &WebService) -> bool {
    let question = format!(
        "Found a webservice using {} on {}, scan with gobuster?",
        service.protocol, service.port
    );
    match prompter.ask(Source::Telescope, &question, Answer::YES_NO).await {
        Ok(answer) => answer == Answer::Yes,
        Err(e) => {
            tracing::warn!("Prompt failed, skipping {}:{}: {:#}", service.protocol, service.port, e);
            false
        }
    }
}

/// Turns a tool that ran but exited badly into a warning; partial results
/// are still worth reading. Anything else stays fatal.
fn tolerate<T>(result: Result<T>, printer: Printer) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) => match e.downcast_ref::<TelescopeError>() {
            Some(te) if te.is_best_effort() => {
                printer.warn(Source::Nmap, te.to_string());
                Ok(None)
            }
            _ => Err(e),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ExecError;

    #[test]
    fn test_tolerate_keeps_process_errors_out_of_the_way() {
        let failed: Result<u8> = Err(TelescopeError::Process(ExecError {
            tool: "nmap".to_string(),
            args: vec![],
            exit_code: Some(1),
            stderr_tail: "QUITTING!".to_string(),
        })
        .into());
        assert_eq!(tolerate(failed, Printer::new(0)).unwrap(), None);
        assert_eq!(tolerate(Ok(7u8), Printer::new(0)).unwrap(), Some(7));

        let fatal: Result<u8> = Err(TelescopeError::MalformedScanOutput("empty".into()).into());
        assert!(tolerate(fatal, Printer::new(0)).is_err());
    }
}
