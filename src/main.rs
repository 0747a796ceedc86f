//! toneforge - Procedural sound effects for game units

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use std::sync::{Arc, MutexGuard};
use std::time::{Duration, Instant};
use toneforge::config::{self, ToneforgeConfig};
use toneforge::engine::{self, AudioEngine, Player, SharedEngine, RELEASE_MARGIN_SECS};
use toneforge::params::{self, SoundParameters, Validation};
use toneforge::store::{HttpConfigStore, UnitCatalog};

mod cli;

use cli::{Cli, Commands, SoundArgs};

/// Longest we hold a sound back waiting for the stored volume
const RESTORE_WAIT: Duration = Duration::from_secs(1);

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play { config: config_path, sound, volume } => {
            let cfg = config::load_config(&config_path)?;
            let runtime = tokio::runtime::Runtime::new()?;
            let params = resolve_sound(&cfg, &sound, &runtime)?;

            let mut player = Player::open(cfg.audio.device.as_deref())?
                .with_buffer_size(cfg.audio.buffer_size as u32);
            let mut audio = AudioEngine::from_config(&cfg, player.sample_rate() as f64);

            let store = match &cfg.store {
                Some(store_config) => Some(HttpConfigStore::new(store_config, runtime.handle().clone())?),
                None => None,
            };
            if let Some(store) = &store {
                audio = audio.with_store(Arc::new(store.clone()));
            }
            let audio = audio.shared();

            if let Some(store) = &store {
                if !runtime.block_on(store.restore_within(audio.clone(), RESTORE_WAIT)) {
                    log::warn!("stored volume not loaded in time, playing at configured volume");
                }
            }
            if let Some(level) = volume {
                lock(&audio)?.set_volume(level, true);
            }

            player.start(audio.clone())?;
            let volume_now = {
                let mut engine = lock(&audio)?;
                engine.play(&params);
                engine.volume()
            };
            println!(
                "Playing {} at {:.1} Hz for {:.0} ms (volume {:.0}%)",
                params.waveform,
                params.frequency,
                params.duration_ms,
                volume_now * 100.0
            );

            wait_until_idle(&audio, params.duration_secs() + RELEASE_MARGIN_SECS)?;
            player.stop();
        }

        Commands::Record {
            config: config_path,
            sound,
            output,
            seed,
        } => {
            let cfg = config::load_config(&config_path)?;
            let runtime = tokio::runtime::Runtime::new()?;
            let params = resolve_sound(&cfg, &sound, &runtime)?;

            let mut audio = AudioEngine::from_config(&cfg, cfg.audio.sample_rate as f64);
            if let Some(seed) = seed {
                audio = audio.with_seed(seed);
            }

            println!("Recording to {:?}...", output);
            let written = engine::record_sound(&mut audio, &params, &output)?;
            println!(
                "Recorded {} samples ({:.2}s) to {:?}",
                written,
                written as f64 / cfg.audio.sample_rate as f64,
                output
            );
        }

        Commands::Volume { config: config_path, set } => {
            let cfg = config::load_config(&config_path)?;
            let store_config = cfg
                .store
                .as_ref()
                .context("no store configured; add a 'store' section to the config")?;
            let runtime = tokio::runtime::Runtime::new()?;
            let store = HttpConfigStore::new(store_config, runtime.handle().clone())?;

            match set {
                Some(percent) => {
                    runtime.block_on(store.store_volume(percent))?;
                    println!("Stored volume: {}%", percent);
                }
                None => match runtime.block_on(store.fetch_volume())? {
                    Some(percent) => println!("Stored volume: {}%", percent),
                    None => println!(
                        "No stored volume (config default {:.0}%)",
                        cfg.master.volume * 100.0
                    ),
                },
            }
        }

        Commands::Devices => {
            println!("Available audio devices:\n");

            if let Some((name, config)) = engine::default_output_config() {
                println!("Default output: {}", name);
                println!(
                    "  Sample rate: {} Hz, Channels: {}",
                    config.sample_rate.0, config.channels
                );
                println!();
            }

            println!("Output devices:");
            let devices = engine::list_output_devices();
            if devices.is_empty() {
                println!("  (none)");
            }
            for (name, config) in devices {
                println!(
                    "  - {} ({} Hz, {} ch)",
                    name, config.sample_rate.0, config.channels
                );
            }
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
                    println!("  Buffer size: {}", cfg.audio.buffer_size);
                    println!("  Master volume: {:.0}%", cfg.master.volume * 100.0);
                    println!("  Max playbacks: {}", cfg.engine.max_playbacks);
                    match &cfg.store {
                        Some(store) => println!("  Store: {}", store.base_url),
                        None => println!("  Store: (none)"),
                    }

                    println!("  Sounds: {}", cfg.sounds.len());
                    let mut repaired = 0;
                    for (name, value) in &cfg.sounds {
                        let validation = params::validate(value);
                        print_sound(name, &validation);
                        if !validation.is_clean() {
                            repaired += 1;
                        }
                    }
                    if repaired > 0 {
                        println!("\n{} sound(s) will play with defaults substituted.", repaired);
                    }
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let example_config = include_str!("../toneforge.example.yaml");

            let path = "toneforge.yaml";
            if std::path::Path::new(path).exists() {
                println!("toneforge.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, example_config)?;
                println!("Created toneforge.yaml with example configuration.");
            }
        }
    }

    Ok(())
}

/// Pick the sound named on the command line
fn resolve_sound(
    cfg: &ToneforgeConfig,
    args: &SoundArgs,
    runtime: &tokio::runtime::Runtime,
) -> Result<SoundParameters> {
    if let Some(json) = &args.params {
        let value: serde_json::Value =
            serde_json::from_str(json).context("--params is not valid JSON")?;
        return Ok(params::validate(&value).params);
    }

    let Some(name) = &args.sound else {
        bail!("give a sound with --sound NAME or --params JSON");
    };

    if let Some(unit_id) = &args.unit {
        let store_config = cfg
            .store
            .as_ref()
            .context("--unit needs a 'store' section in the config")?;
        let catalog = UnitCatalog::new(store_config)?;
        let unit = runtime.block_on(catalog.fetch_unit(unit_id))?;

        return unit.sound(name).map(|v| v.params).ok_or_else(|| {
            let available: Vec<_> = unit.sound_names().collect();
            anyhow!(
                "unit '{}' has no sound '{}' (available: {})",
                unit_id,
                name,
                available.join(", ")
            )
        });
    }

    cfg.sound(name).map(|v| v.params).ok_or_else(|| {
        let available: Vec<_> = cfg.sounds.keys().map(String::as_str).collect();
        anyhow!("no sound '{}' in config (available: {})", name, available.join(", "))
    })
}

fn print_sound(name: &str, validation: &Validation) {
    let p = &validation.params;
    let status = if validation.is_clean() { "ok" } else { "repaired" };
    println!(
        "    - {} [{}] {} {:.1} Hz, {:.0} ms",
        name, status, p.waveform, p.frequency, p.duration_ms
    );
    for repair in &validation.repairs {
        println!("        {}", repair);
    }
}

fn lock(engine: &SharedEngine) -> Result<MutexGuard<'_, AudioEngine>> {
    engine.lock().map_err(|_| anyhow!("audio engine lock poisoned"))
}

/// Block until every sound has been released, giving up well after `expected` seconds
fn wait_until_idle(engine: &SharedEngine, expected: f64) -> Result<()> {
    let deadline = Instant::now() + Duration::from_secs_f64(expected + 1.0);
    std::thread::sleep(Duration::from_secs_f64(expected));

    while !lock(engine)?.is_idle() {
        if Instant::now() > deadline {
            log::warn!("audio output stalled, stopping");
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    Ok(())
}
