use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use backoffice_client::{ApiClient, HttpReportApi, HttpResourceApi};
use backoffice_controller::{
    ResourceListController, SalesReportController, StatusToggleCoordinator, ToggleOutcome,
};
use backoffice_core::entities::{
    EventOrigin, Operation, Resource, Role, SalesTargetConfig, Store, ToggleAction, User,
};
use backoffice_core::period::{ChartSyncInput, Granularity, PeriodRange, PeriodSyncPlanner};
use backoffice_core::query::{FilterValue, Filters, QueryState, SortDir, MAX_PAGE_SIZE};
use backoffice_core::report::ReportScope;
use backoffice_core::types::DbId;

use config::DashboardConfig;

mod config;

#[derive(Parser)]
#[command(name = "backoffice")]
#[command(about = "Operator console for the back-office admin API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch one page of an entity list and print it as JSON.
    List(ListArgs),
    /// Flip a status flag on one resource, retrying transient failures.
    Toggle {
        entity: Entity,
        id: DbId,
        /// `active` or `lock`.
        action: ToggleAction,
    },
    /// Print the chart window the planner picks for a query range. Offline.
    ChartWindow {
        #[command(flatten)]
        range: RangeArgs,
        /// Reference date, defaults to today.
        #[arg(long)]
        today: Option<NaiveDate>,
        #[arg(long)]
        first_load: bool,
    },
    /// Fetch the sales report for a range and its chart window.
    Report {
        #[command(flatten)]
        range: RangeArgs,
        /// Restrict to one store.
        #[arg(long)]
        store: Option<DbId>,
    },
}

#[derive(Args)]
struct ListArgs {
    entity: Entity,
    #[arg(long, default_value_t = 0)]
    page: u32,
    /// Page size, defaults to `DEFAULT_PAGE_SIZE`.
    #[arg(long)]
    size: Option<u32>,
    #[arg(long)]
    sort: Option<String>,
    #[arg(long)]
    desc: bool,
    /// `key=value`, repeatable. `true`/`false` are sent as flags.
    #[arg(long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,
}

#[derive(Args)]
struct RangeArgs {
    /// `day`, `month` or `year`.
    #[arg(long)]
    granularity: Granularity,
    #[arg(long)]
    start: String,
    #[arg(long)]
    end: String,
}

impl RangeArgs {
    fn to_range(&self) -> Result<PeriodRange> {
        Ok(PeriodRange::parse(self.granularity, &self.start, &self.end)?)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Entity {
    Users,
    Roles,
    Stores,
    EventOrigins,
    Operations,
    SalesTargets,
}

fn parse_filter(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    Ok((key.trim().to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    if let Command::ChartWindow {
        range,
        today,
        first_load,
    } = &cli.command
    {
        return chart_window(range, today.unwrap_or_else(local_today), *first_load);
    }

    let config = DashboardConfig::from_env()?;
    let client = ApiClient::from_config(&config.client)?;
    tracing::info!(base_url = %client.base_url(), "Loaded console configuration");

    match cli.command {
        Command::List(args) => match args.entity {
            Entity::Users => list::<User>(client, &config, &args).await,
            Entity::Roles => list::<Role>(client, &config, &args).await,
            Entity::Stores => list::<Store>(client, &config, &args).await,
            Entity::EventOrigins => list::<EventOrigin>(client, &config, &args).await,
            Entity::Operations => list::<Operation>(client, &config, &args).await,
            Entity::SalesTargets => list::<SalesTargetConfig>(client, &config, &args).await,
        },
        Command::Toggle { entity, id, action } => match entity {
            Entity::Users => toggle::<User>(client, &config, id, action).await,
            Entity::Roles => toggle::<Role>(client, &config, id, action).await,
            Entity::Stores => toggle::<Store>(client, &config, id, action).await,
            Entity::EventOrigins => toggle::<EventOrigin>(client, &config, id, action).await,
            Entity::Operations => toggle::<Operation>(client, &config, id, action).await,
            Entity::SalesTargets => toggle::<SalesTargetConfig>(client, &config, id, action).await,
        },
        Command::Report { range, store } => report(client, &range, store).await,
        Command::ChartWindow { .. } => Ok(()),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "backoffice_console=info,backoffice_controller=info,backoffice_client=info".into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output; logs go to stderr.
    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

async fn list<R: Resource>(client: ApiClient, config: &DashboardConfig, args: &ListArgs) -> Result<()> {
    let filters: Filters = args
        .filters
        .iter()
        .map(|(k, v)| {
            let value = match v.as_str() {
                "true" => FilterValue::from(true),
                "false" => FilterValue::from(false),
                other => FilterValue::from(other),
            };
            (k.clone(), value)
        })
        .collect();

    let sort_by = args.sort.as_deref().unwrap_or(R::DEFAULT_SORT);
    let sort_dir = if args.desc { SortDir::Desc } else { SortDir::Asc };
    let query = QueryState::new(sort_by, args.size.unwrap_or(config.default_page_size))
        .with_sort_dir(sort_by, sort_dir)
        .with_filters(filters)
        .with_page(args.page);

    let controller = ResourceListController::with_query(Arc::new(HttpResourceApi::<R>::new(client)), query);
    controller.load().await;

    let snapshot = controller.snapshot().await;
    if let Some(error) = snapshot.error {
        bail!(error);
    }
    print_json(&snapshot.page)
}

async fn toggle<R: Resource>(
    client: ApiClient,
    config: &DashboardConfig,
    id: DbId,
    action: ToggleAction,
) -> Result<()> {
    let controller = Arc::new(ResourceListController::with_query(
        Arc::new(HttpResourceApi::<R>::new(client)),
        QueryState::new(R::DEFAULT_SORT, MAX_PAGE_SIZE),
    ));
    let coordinator = StatusToggleCoordinator::for_list(&controller, config.toggle_retry.clone());

    // Walk the pages until the row turns up.
    controller.load().await;
    let resource = loop {
        let snapshot = controller.snapshot().await;
        if let Some(error) = snapshot.error {
            bail!(error);
        }
        if let Some(found) = snapshot.page.content.iter().find(|r| r.id() == id) {
            break found.clone();
        }
        if !snapshot.page.has_next {
            bail!("{} {id} not found", R::KIND);
        }
        controller.change_page(snapshot.page.current_page + 1).await;
    };

    match coordinator.toggle(&resource, action).await {
        ToggleOutcome::Succeeded { attempts } => {
            println!("{} {id}: {action} succeeded after {attempts} attempt(s)", R::KIND);
            Ok(())
        }
        ToggleOutcome::Failed { attempts, reason } => {
            bail!("{} {id}: {action} failed after {attempts} attempt(s): {reason}", R::KIND)
        }
        ToggleOutcome::Rejected(rejection) => {
            bail!("{} {id}: {action} rejected ({rejection:?})", R::KIND)
        }
    }
}

fn chart_window(range: &RangeArgs, today: NaiveDate, first_load: bool) -> Result<()> {
    let query = range.to_range()?;
    let plan = PeriodSyncPlanner::default().plan(&ChartSyncInput::for_today(query, today, first_load));
    print_json(&json!({
        "query": query,
        "window": plan.window,
        "decision": format!("{:?}", plan.decision),
    }))
}

async fn report(client: ApiClient, range: &RangeArgs, store: Option<DbId>) -> Result<()> {
    let query = range.to_range()?;
    let scope = store.map_or(ReportScope::All, ReportScope::Store);
    let controller = SalesReportController::new(Arc::new(HttpReportApi::new(client)), query, local_today())
        .with_scope(scope);

    let plan = controller.load_initial().await.context("invalid report range")?;
    let snapshot = controller.snapshot().await;
    if let Some(error) = snapshot.table_error.or(snapshot.chart_error) {
        bail!(error);
    }
    print_json(&json!({
        "query": snapshot.query,
        "chartWindow": plan.window,
        "table": snapshot.table,
        "chart": snapshot.chart,
    }))
}
