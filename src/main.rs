mod telemetry;

use carebook_api::Application;
use carebook_domain::ScheduleRegistry;
use carebook_infra::{setup_context, Config, DriftReport, SchedulerApiClient, SyncAction};
use clap::{Parser, Subcommand};
use telemetry::{get_subscriber, init_subscriber};

#[derive(Parser)]
#[command(
    name = "carebook",
    about = "Carebook scheduling service and its management commands"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server hosting the cron dispatch targets
    Serve,
    /// Sync the schedule registry to the external scheduler
    Schedule,
    /// Print all schedules registered on the external scheduler
    List,
    /// Delete every remote schedule. Destructive, meant for full
    /// re-provisioning
    Cleanup,
    /// Compare the registry against the remote schedules and flag drift
    Stats,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber("carebook".into(), "info".into());
    init_subscriber(subscriber);

    let cli = Cli::parse();
    if let Err(e) = run(cli.command).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
    Ok(())
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Serve => serve().await,
        Command::Schedule => schedule().await,
        Command::List => list().await,
        Command::Cleanup => cleanup().await,
        Command::Stats => stats().await,
    }
}

async fn serve() -> anyhow::Result<()> {
    carebook_infra::run_migration().await?;
    let context = setup_context().await?;
    let app = Application::new(context).await?;
    app.start().await?;
    Ok(())
}

/// Management commands only need the scheduler credentials, not the
/// database or provider credentials
fn management_setup() -> anyhow::Result<(Config, SchedulerApiClient)> {
    let config = Config::from_env()?;
    let client = SchedulerApiClient::new(&config);
    Ok((config, client))
}

async fn schedule() -> anyhow::Result<()> {
    let (_, client) = management_setup()?;
    let registry = ScheduleRegistry::standard();
    let report = client.sync(&registry).await?;

    for result in &report.results {
        match &result.outcome {
            Ok(SyncAction::Created) => println!("{:<28} created", result.name),
            Ok(SyncAction::Updated) => println!("{:<28} updated", result.name),
            Ok(SyncAction::Unchanged) => println!("{:<28} unchanged", result.name),
            Err(e) => println!("{:<28} FAILED: {}", result.name, e),
        }
    }
    if report.deleted_stale > 0 {
        println!(
            "Deleted {} remote schedules no longer in the registry",
            report.deleted_stale
        );
    }
    if report.failed_deletes > 0 {
        println!(
            "Failed to delete {} remote schedules no longer in the registry",
            report.failed_deletes
        );
    }

    if report.has_failures() {
        anyhow::bail!("schedule sync finished with failures");
    }
    Ok(())
}

async fn list() -> anyhow::Result<()> {
    let (_, client) = management_setup()?;
    let schedules = client.list().await?;

    println!("{} remote schedule(s)", schedules.len());
    for s in &schedules {
        println!(
            "{:<24} {:<28} {:<16} retries={} -> {}",
            s.schedule_id,
            s.job_name.as_deref().unwrap_or("(unmanaged)"),
            s.cadence_str().unwrap_or("-"),
            s.retries,
            s.destination
        );
    }
    Ok(())
}

async fn cleanup() -> anyhow::Result<()> {
    let (_, client) = management_setup()?;
    let outcome = client.cleanup().await?;

    println!("Deleted {} remote schedule(s)", outcome.deleted);
    if outcome.failed > 0 {
        anyhow::bail!("failed to delete {} remote schedule(s)", outcome.failed);
    }
    Ok(())
}

async fn stats() -> anyhow::Result<()> {
    let (config, client) = management_setup()?;
    let registry = ScheduleRegistry::standard();
    let remote = client.list().await?;
    let report = DriftReport::compute(&registry, &remote, &config.app_base_url);

    println!("Registry jobs:          {}", report.registry_jobs);
    println!("Managed remote:         {}", report.managed_remote);
    println!("Unmanaged remote:       {}", report.unmanaged_remote);
    if report.in_sync() {
        println!("Registry and remote schedules are in sync");
        return Ok(());
    }
    if !report.missing.is_empty() {
        println!("Missing remote schedule: {}", report.missing.join(", "));
    }
    if !report.drifted.is_empty() {
        println!("Drifted from registry:   {}", report.drifted.join(", "));
    }
    if !report.orphaned.is_empty() {
        println!("No longer in registry:   {}", report.orphaned.join(", "));
    }
    println!("Run the `schedule` command to reconcile");
    Ok(())
}
