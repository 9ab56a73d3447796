//! `search` subcommand.

use anyhow::Context;
use tracing::info;

use transparency_browser::{BrowserManager, PersistedSession, SessionPaths};
use transparency_config::Config;
use transparency_core::{PersonSearchService, SearchRequest, SearchSettings};

use crate::cli::SearchArgs;

pub(crate) async fn run_search(
    manager: &BrowserManager,
    config: &Config,
    args: SearchArgs,
) -> anyhow::Result<()> {
    let request = SearchRequest::new(
        &args.name,
        &args.cpf,
        args.nis.as_deref(),
        args.mode,
        &args.filters,
    )?;

    let mut settings = SearchSettings::from_config(config);
    if args.no_save {
        settings.output_dir = None;
    }

    manager.connect().await.context("Failed to start the browser")?;
    let restorer = PersistedSession::new(manager, SessionPaths::from(&config.paths));

    let report = PersonSearchService::new(manager, &settings)
        .with_session_restorer(&restorer)
        .search(&request)
        .await
        .with_context(|| format!("Search by {} failed", request.search_mode()))?;

    if report.is_empty() {
        info!("No records found");
    } else {
        info!(
            "Found {} record(s) for identifier {} ({})",
            report.records.len(),
            report.primary_identifier,
            report.location
        );
    }

    if args.print {
        println!("{}", report.to_json()?);
    }
    Ok(())
}
