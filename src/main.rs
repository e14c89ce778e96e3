mod ui;

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::{Parser, Subcommand};
use egui::Vec2;
use itertools::Itertools;
use log::{error, info, warn};

use ui::WindTunnelApp;
use windtunnel::{
    IdentityProvider, LocalIdentityProvider, TestRun, TickOutcome, Ticker, WING_PROFILES,
    WindTunnelError,
    config::{AppConfig, ConfigOverrides},
    wing_profile,
};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the wind tunnel application
    Run {
        /// JSON Lines file with the accounts users can sign in with
        #[arg(short, long)]
        accounts: Option<PathBuf>,

        /// Treat every account as verified once a verification email is sent
        #[arg(long)]
        auto_verify: bool,
    },
    /// Run one test without a window and print every sample
    Simulate {
        #[arg(short, long, default_value = wing_profile::DEFAULT_PROFILE_ID)]
        wing: String,

        #[arg(short, long, default_value_t = 0)]
        angle: i32,

        #[arg(short, long)]
        interval_ms: Option<u64>,
    },
    /// List the wing profiles that can be tested
    Profiles,
}

fn run(overrides: ConfigOverrides) -> Result<(), WindTunnelError> {
    // the file config is what gets saved on exit, overrides only live for this session
    let (file_config, writable) = match AppConfig::default_path() {
        Some(config_path) => AppConfig::load_for_session(&config_path),
        None => (AppConfig::default(), false),
    };
    let app_config = file_config.with_overrides(&overrides);
    let saved_config = writable.then_some(file_config);

    let provider = match &app_config.accounts_file {
        Some(path) => LocalIdentityProvider::from_accounts_file(path)?,
        None => LocalIdentityProvider::new(),
    }
    .auto_verify(app_config.auto_verify);
    let provider: Arc<dyn IdentityProvider> = Arc::new(provider);

    let window_size = &app_config.window_size;
    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_inner_size(Vec2::new(window_size.width, window_size.height))
        .with_min_inner_size(Vec2::new(360., 480.));

    eframe::run_native(
        "Windtunnel",
        native_options,
        Box::new(|cc| {
            Ok(Box::new(WindTunnelApp::new(
                provider,
                app_config,
                saved_config,
                cc,
            )))
        }),
    )
    .map_err(|e| WindTunnelError::UiStartError {
        reason: e.to_string(),
    })
}

fn simulate(wing: &str, angle: i32, interval_ms: Option<u64>) -> Result<(), WindTunnelError> {
    let app_config = AppConfig::from_local_file().unwrap_or_default();
    let profile = wing_profile::profile(wing)?;
    let interval = Duration::from_millis(interval_ms.unwrap_or(app_config.tick_interval_ms));

    let mut test_run = TestRun::new(profile).with_angle_bound(app_config.angle_upper_bound);
    if !test_run.set_angle(angle) {
        return Err(WindTunnelError::InvalidUserInput {
            field: "angle".to_string(),
            reason: format!("{} is outside the accepted range for {}", angle, profile.name),
        });
    }
    test_run.start_test();
    info!("Simulating {} at {}° every {:?}", profile.name, angle, interval);

    let ticker = Ticker::start(interval);
    while let Some(tick) = ticker.recv() {
        let outcome = test_run.tick();
        if let Some(sample) = test_run.history().back() {
            println!(
                "#{:<3} speed {:>5.1} m/s  lift {:>7.1} N  drag {:>7.1} N",
                tick.tick_no, sample.speed, sample.lift, sample.drag
            );
        }
        if outcome != TickOutcome::Advanced {
            break;
        }
    }
    drop(ticker);

    match test_run.summary() {
        Some(summary) => println!(
            "{}: max speed {:.1} m/s, angle {}°, lift {:.2} N, drag {:.2} N",
            summary.profile_name,
            summary.max_speed,
            summary.angle_of_attack,
            summary.lift,
            summary.drag
        ),
        None => warn!("Simulation stopped before the test completed"),
    }
    Ok(())
}

fn profiles() {
    let lines = WING_PROFILES
        .iter()
        .map(|p| format!("{:<10}{:<12}{:<28}{:.0} m/s", p.id, p.name, p.description, p.max_speed))
        .join("\n");
    println!("{}", lines);
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    }) {
        warn!("Could not set Ctrl-C handler: {}", e);
    }

    let result = match &cli.command {
        Commands::Run {
            accounts,
            auto_verify,
        } => run(ConfigOverrides {
            accounts_file: accounts.clone(),
            auto_verify: *auto_verify,
        }),
        Commands::Simulate {
            wing,
            angle,
            interval_ms,
        } => simulate(wing, *angle, *interval_ms),
        Commands::Profiles => {
            profiles();
            Ok(())
        }
    };

    if let Err(e) = result {
        error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
