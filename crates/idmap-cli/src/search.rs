//! `idmap search`: runs the progressive search and streams progress to
//! stderr while it walks the radius ladder.

use std::time::Duration;

use clap::Args;
use idmap_core::{AppConfig, LocationQuery};
use idmap_places::{
    present, GeoapifyClient, PlaceSearch, Presentation, SearchEvent, SearchRequest,
};
use tokio::sync::mpsc;

#[derive(Debug, Args)]
pub struct SearchArgs {
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub country: String,
    /// Category phrase or canonical token, e.g. "grocery" or "catering.cafe"
    #[arg(long)]
    pub category: Option<String>,
    /// Name hint, e.g. "Giant"
    #[arg(long)]
    pub name: Option<String>,
    /// Starting radius in kilometres (defaults to IDMAP_DEFAULT_RADIUS_KM)
    #[arg(long)]
    pub radius_km: Option<f64>,
    /// Search only the starting radius
    #[arg(long)]
    pub no_progressive: bool,
    /// Print the full run report as JSON instead of a list
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    /// # Errors
    ///
    /// Returns an error when the country is blank.
    pub fn to_request(&self) -> anyhow::Result<SearchRequest> {
        let location =
            LocationQuery::new(self.city.as_deref(), self.state.as_deref(), &self.country)?;
        let mut request = SearchRequest::new(location).with_progressive(!self.no_progressive);
        if let Some(category) = self.category.as_deref() {
            request = request.with_category(category);
        }
        if let Some(name) = self.name.as_deref() {
            request = request.with_name_hint(name);
        }
        if let Some(km) = self.radius_km {
            request = request.with_start_radius_km(km);
        }
        Ok(request)
    }
}

pub(crate) fn progress_line(event: &SearchEvent) -> Option<String> {
    match event {
        SearchEvent::Progress {
            radius_m: Some(radius_m),
            stage,
            ..
        } => Some(format!(
            "searching within {:.1} km ({})",
            f64::from(*radius_m) / 1000.0,
            stage.label()
        )),
        SearchEvent::Progress {
            radius_m: None,
            stage,
            ..
        } => Some(format!("searching bounding box ({})", stage.label())),
        SearchEvent::Finished { .. } => None,
    }
}

/// # Errors
///
/// Returns an error if the input is invalid, the client cannot be built, or
/// the search fails upstream.
pub(crate) async fn run_search(config: &AppConfig, args: &SearchArgs) -> anyhow::Result<()> {
    let request = args.to_request()?;
    let client = GeoapifyClient::from_config(config)
        .map_err(|e| anyhow::anyhow!("failed to build Geoapify client: {e}"))?;
    let search = PlaceSearch::new(client)
        .with_attempt_timeout(Duration::from_secs(config.request_timeout_secs))
        .with_default_radius_km(config.default_radius_km);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if let Some(line) = progress_line(&event) {
                eprintln!("{line}");
            }
        }
    });

    let report = tokio::select! {
        report = search.run(&request, Some(&tx)) => report,
        _ = tokio::signal::ctrl_c() => {
            search.cancel();
            None
        }
    };
    drop(tx);
    if let Err(e) = printer.await {
        tracing::warn!(error = %e, "progress printer task failed");
    }

    let Some(report) = report else {
        eprintln!("search cancelled");
        return Ok(());
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match present(&report.outcome) {
        Presentation::Items(items) => {
            for item in items {
                println!("{} [{}]", item.title, item.category);
                if !item.subtitle.is_empty() {
                    println!("    {}", item.subtitle);
                }
                println!(
                    "    {:.5}, {:.5}  (matched: {})",
                    item.coords.lat, item.coords.lon, item.stage_label
                );
            }
            Ok(())
        }
        Presentation::EmptyState(message) => {
            println!("{message}");
            Ok(())
        }
        Presentation::Error(message) => anyhow::bail!(message),
    }
}
