use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use tokio::sync::watch;

use armgrab::cli::{Cli, Commands, LaunchArgs};
use armgrab::config::{LaunchSettings, OciProfile};
use armgrab::discover;
use armgrab::domain::LaunchSpec;
use armgrab::oci::{ComputeApi, OciClient};
use armgrab::provisioner::{self, ProvisionerOptions};

fn setup_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

/// Wire Ctrl-C to a shutdown flag the provisioner races its delays against.
fn shutdown_channel() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\n{}", "ctrl-c -- stopping after current attempt".yellow());
            let _ = tx.send(true);
        }
        // Keep the sender alive so the receiver never sees a closed channel.
        tx.closed().await;
    });
    rx
}

fn build_client(profile: &OciProfile, settings: &LaunchSettings) -> Result<OciClient> {
    OciClient::new(profile, Some(std::time::Duration::from_secs(settings.request_timeout_secs)))
        .context("Failed to build OCI client")
}

async fn resolve(cli: &Cli, args: &LaunchArgs) -> Result<(OciProfile, LaunchSettings, LaunchSpec)> {
    let profile =
        OciProfile::load(cli.oci_config.as_ref(), cli.profile.as_deref()).context("Failed to load OCI profile")?;

    let mut settings = LaunchSettings::load(cli.config.as_ref()).context("Failed to load launch settings")?;
    args.apply(&mut settings);
    settings.validate().context("Invalid launch settings")?;

    let client = build_client(&profile, &settings)?;
    let spec = discover::resolve_spec(&client, &profile.tenancy, &settings)
        .await
        .context("Failed to resolve launch spec")?;

    Ok((profile, settings, spec))
}

async fn handle_launch_command(cli: &Cli, args: &LaunchArgs) -> Result<()> {
    let (profile, settings, spec) = resolve(cli, args).await?;
    info!(
        "Launching {} ({}, {} OCPU) in region {}",
        spec.display_name, spec.shape, spec.shape_profile.ocpus, profile.region
    );

    let client = build_client(&profile, &settings)?;
    let options = ProvisionerOptions {
        retry: settings.retry.clone(),
        failure_log: settings.failure_log.clone(),
    };

    println!(
        "{} {} across {} availability domain(s); Ctrl-C to stop",
        "Grabbing:".cyan(),
        spec.shape,
        spec.availability_domains.len()
    );

    let instance = provisioner::run(&spec, &client, &options, shutdown_channel())
        .await
        .context("Provisioning failed")?;

    println!("{} {}", "Launched:".green(), instance.id);
    println!("  availability domain: {}", instance.availability_domain);
    println!("  lifecycle state:     {}", instance.lifecycle_state);
    Ok(())
}

async fn handle_check_command(cli: &Cli, args: &LaunchArgs) -> Result<()> {
    let (profile, settings, spec) = resolve(cli, args).await?;

    println!("{}", "Configuration OK".green());
    println!("  region:               {}", profile.region);
    println!("  compartment:          {}", spec.compartment_id);
    println!(
        "  shape:                {} ({} OCPU / {} GB)",
        spec.shape, spec.shape_profile.ocpus, spec.shape_profile.memory_in_gbs
    );
    println!("  image:                {}", spec.image_id);
    println!("  subnet:               {}", spec.subnet_id);
    println!("  availability domains: {}", spec.availability_domains.join(", "));
    println!("  display name:         {}", spec.display_name);
    println!(
        "  retry interval:       {}s (+/-{}s)",
        settings.retry.interval_secs, settings.retry.jitter_secs
    );
    match settings.retry.max_attempts {
        Some(max) => println!("  max attempts:         {}", max),
        None => println!("  max attempts:         unlimited"),
    }
    Ok(())
}

async fn handle_discover_command(cli: &Cli) -> Result<()> {
    let profile =
        OciProfile::load(cli.oci_config.as_ref(), cli.profile.as_deref()).context("Failed to load OCI profile")?;
    let settings = LaunchSettings::load(cli.config.as_ref()).context("Failed to load launch settings")?;
    let client = build_client(&profile, &settings)?;

    let compartment = settings.compartment_id.clone().unwrap_or_else(|| profile.tenancy.clone());

    let ads = discover::resolve_availability_domains(&client, &compartment).await?;
    println!("{}", "Availability domains:".cyan());
    for ad in &ads {
        println!("  {}", ad);
    }

    let subnet = discover::resolve_subnet(&client, &compartment).await?;
    println!("{} {}", "Subnet:".cyan(), subnet);

    let images = client.list_images(&compartment, &settings.shape).await?;
    match discover::pick_ubuntu_arm_image(&images) {
        Some(image) => println!("{} {} ({})", "Image:".cyan(), image.display_name, image.id),
        None => println!("{} no Ubuntu aarch64 image for {}", "Image:".red(), settings.shape),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.is_verbose());

    match &cli.command {
        // Default invocation starts grabbing
        None => handle_launch_command(&cli, &LaunchArgs::default()).await,
        Some(Commands::Launch(args)) => handle_launch_command(&cli, args).await,
        Some(Commands::Check(args)) => handle_check_command(&cli, args).await,
        Some(Commands::Discover) => handle_discover_command(&cli).await,
    }
}
