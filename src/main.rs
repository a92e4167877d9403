//! ClassicPrint CLI - Vintage Photo Prints
//!
//! Renders photos through the ClassicPrint pipeline from the command line.

use anyhow::{bail, Context, Result};
use classicprint::io::{render_batch, render_file};
use classicprint::pipeline::defaults;
use classicprint::prelude::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    println!("📷 ClassicPrint - Vintage Photo Prints v{}", classicprint::VERSION);
    println!();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("classicprint");

    if args.len() < 2 {
        print_usage(program);
        return;
    }

    let result = match args[1].as_str() {
        "list" => {
            list_filters();
            Ok(())
        }
        "info" => match args.get(2) {
            Some(name) => filter_info(name),
            None => Err(anyhow::anyhow!("Please specify a filter name")),
        },
        "presets" => parse_options(&args[2..]).and_then(|options| list_presets(&options)),
        "process" => parse_options(&args[2..]).and_then(|options| process_image(&options)),
        "batch" => parse_options(&args[2..]).and_then(|options| process_batch(&options)),
        "init-config" => match args.get(2) {
            Some(path) => init_config(path),
            None => Err(anyhow::anyhow!("Please specify where to write the configuration")),
        },
        "help" | "--help" | "-h" => {
            print_usage(program);
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage(program);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("❌ {:#}", e);
        std::process::exit(1);
    }
}

fn print_usage(program: &str) {
    println!("Usage: {} <command> [options]", program);
    println!();
    println!("Commands:");
    println!("  list                          List all available filters");
    println!("  info <filter>                 Show detailed info about a filter");
    println!("  presets                       List presets, colour profiles and light leaks");
    println!("  process <in> <out> [options]  Render a print of one photo");
    println!("  batch <out-dir> <inputs...>   Render prints of many photos in parallel");
    println!("  init-config <path>            Write a configuration with the starter presets");
    println!("  help                          Show this help message");
    println!();
    println!("Options:");
    println!("  --config <path>       Configuration with presets and current settings");
    println!("  --profiles <path>     Colour profile document");
    println!("  --noise <path>        Grain texture image (default: generated)");
    println!("  --leaks <dir>         Folder of light leak images");
    println!("  --size <WxH>          Fit the photo inside this size first (e.g., 1024x768)");
    println!("  --lens <name>         Lens preset to use");
    println!("  --film <name>         Film preset to use");
    println!("  --processing <name>   Processing preset to use");
    println!();
    println!("Set RUST_LOG=debug for per-stage timings.");
}

/// Command line flags shared by the rendering commands.
#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    profiles: Option<PathBuf>,
    noise: Option<PathBuf>,
    leaks: Option<PathBuf>,
    size: (u32, u32),
    lens: Option<String>,
    film: Option<String>,
    processing: Option<String>,
    positional: Vec<String>,
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut options = Options::default();
    let mut i = 0;
    while i < args.len() {
        let arg = args[i].as_str();
        if !arg.starts_with("--") {
            options.positional.push(args[i].clone());
            i += 1;
            continue;
        }

        let value = args
            .get(i + 1)
            .with_context(|| format!("Option {} needs a value", arg))?
            .clone();
        match arg {
            "--config" => options.config = Some(value.into()),
            "--profiles" => options.profiles = Some(value.into()),
            "--noise" => options.noise = Some(value.into()),
            "--leaks" => options.leaks = Some(value.into()),
            "--size" => {
                options.size = parse_dimensions(&value)
                    .with_context(|| format!("Invalid size '{}', expected WIDTHxHEIGHT", value))?
            }
            "--lens" => options.lens = Some(value),
            "--film" => options.film = Some(value),
            "--processing" => options.processing = Some(value),
            _ => bail!("Unknown option: {}", arg),
        }
        i += 2;
    }
    Ok(options)
}

fn parse_dimensions(s: &str) -> Option<(u32, u32)> {
    let (w, h) = s.split_once('x')?;
    Some((w.parse().ok()?, h.parse().ok()?))
}

fn build_pipeline(options: &Options) -> Result<ClassicPrint> {
    let resources = match &options.noise {
        Some(path) => Resources::from_noise_file(path)
            .with_context(|| format!("Failed to load noise texture {}", path.display()))?,
        None => Resources::generated(),
    };
    let mut pipeline = ClassicPrint::with_defaults_in(FilterRegistry::with_resources(resources));

    if let Some(path) = &options.config {
        let config = ClassicPrintConfig::load(path)
            .with_context(|| format!("Failed to load configuration {}", path.display()))?;
        pipeline.apply_config(config);
    }
    if let Some(path) = &options.profiles {
        let profiles = ColourProfileTable::load(path)
            .with_context(|| format!("Failed to load colour profiles {}", path.display()))?;
        pipeline.set_colour_profiles(profiles);
    }
    if let Some(dir) = &options.leaks {
        pipeline.set_light_leaks(LightLeakCatalog::scan(dir));
    }

    if let Some(name) = &options.lens {
        pipeline.set_current_lens(name)?;
    }
    if let Some(name) = &options.film {
        pipeline.set_current_film(name)?;
    }
    if let Some(name) = &options.processing {
        pipeline.set_current_processing(name)?;
    }
    Ok(pipeline)
}

fn list_filters() {
    let registry = FilterRegistry::with_builtins();

    println!("Available filters ({} total):", registry.len());
    println!();
    for (name, entry) in registry.filters() {
        println!("  • {} - {}", name, entry.metadata.description);
    }
}

fn filter_info(name: &str) -> Result<()> {
    let registry = FilterRegistry::with_builtins();
    let metadata = registry
        .get_metadata(name)
        .with_context(|| format!("Filter not found: {}. Use 'list' to see available filters.", name))?;

    println!("Filter: {}", metadata.name);
    println!("Reports progress: {}", if metadata.supports_progress { "yes" } else { "no" });
    println!();
    println!("Description:");
    println!("  {}", metadata.description);
    println!();

    if !metadata.options.is_empty() {
        println!("Options:");
        for option in &metadata.options {
            println!(
                "  • {} ({}) [{}] = {}",
                option.name, option.key, option.kind, option.default_value
            );
            if !option.description.is_empty() {
                println!("    {}", option.description);
            }
        }
    }
    Ok(())
}

fn list_presets(options: &Options) -> Result<()> {
    let pipeline = build_pipeline(options)?;
    let marker = |current: Option<&str>, name: &str| if current == Some(name) { "▶" } else { " " };

    println!("🔭 Lenses:");
    let current = pipeline.current_lens().map(|s| s.name.as_str());
    for lens in pipeline.lens_presets().iter() {
        println!(
            "  {} {:<14} radius {:>3}%  darkness {:>3}%  dodge {:>3}%{}",
            marker(current, &lens.name),
            lens.name,
            lens.radius_percent,
            lens.darkness_percent,
            lens.dodge_percent,
            if lens.defocus { "  defocus" } else { "" }
        );
    }

    println!("🎞️  Films:");
    let current = pipeline.current_film().map(|s| s.name.as_str());
    for film in pipeline.film_presets().iter() {
        println!(
            "  {} {:<14} temperature {:>3}%  noise {:>3}%",
            marker(current, &film.name),
            film.name,
            film.temperature_percent,
            film.noise_percent
        );
    }

    println!("🧪 Processing:");
    let current = pipeline.current_processing().map(|s| s.name.as_str());
    for process in pipeline.processing_presets().iter() {
        println!(
            "  {} {:<14} contrast {:>3}%  colour {} {:>3}%  frame {}%  leak {}",
            marker(current, &process.name),
            process.name,
            process.contrast_percent,
            if process.colourisation_profile.is_empty() { "-" } else { process.colourisation_profile.as_str() },
            process.colourisation_percent,
            process.frame_size_percent,
            process.light_leak
        );
    }

    println!();
    println!("🎨 Colour profiles: {}", pipeline.colour_profiles().names().collect::<Vec<_>>().join(", "));
    let leaks = pipeline.light_leaks();
    if leaks.is_empty() {
        println!("💡 Light leaks: none (use --leaks <dir>)");
    } else {
        println!("💡 Light leaks: {}", leaks.names().join(", "));
    }
    Ok(())
}

fn process_image(options: &Options) -> Result<()> {
    let [input, output] = options.positional.as_slice() else {
        bail!("Please specify input and output paths");
    };
    let pipeline = build_pipeline(options)?;
    let (width, height) = options.size;

    println!("⚙️  Processing {} -> {}", input, output);
    let started = Instant::now();
    let mut stdout = std::io::stdout();
    render_file(&pipeline, input, output, width, height, &mut |percent| {
        print!("\r   {:>3}%", percent);
        let _ = stdout.flush();
    })
    .with_context(|| format!("Failed to render {}", input))?;
    println!();

    println!("✅ Complete in {}ms", started.elapsed().as_millis());
    println!("🎉 Print saved to: {}", output);
    Ok(())
}

fn process_batch(options: &Options) -> Result<()> {
    let Some((output_dir, inputs)) = options.positional.split_first() else {
        bail!("Please specify an output folder and at least one photo");
    };
    if inputs.is_empty() {
        bail!("Please specify at least one photo");
    }
    let pipeline = build_pipeline(options)?;
    let inputs: Vec<PathBuf> = inputs.iter().map(PathBuf::from).collect();
    let (width, height) = options.size;

    println!("⚙️  Rendering {} photos into {}", inputs.len(), output_dir);
    let started = Instant::now();
    let outcomes = render_batch(&pipeline, &inputs, Path::new(output_dir), width, height);

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(path) => println!("   ✓ {} -> {}", outcome.input.display(), path.display()),
            Err(e) => {
                failed += 1;
                eprintln!("   ✗ {}: {}", outcome.input.display(), e);
            }
        }
    }

    println!(
        "✅ Complete in {}ms ({} rendered, {} failed)",
        started.elapsed().as_millis(),
        outcomes.len() - failed,
        failed
    );
    if failed > 0 {
        bail!("{} of {} photos failed", failed, outcomes.len());
    }
    Ok(())
}

fn init_config(path: &str) -> Result<()> {
    defaults::config()
        .save(path)
        .with_context(|| format!("Failed to write configuration {}", path))?;
    println!("📝 Configuration written to: {}", path);
    Ok(())
}
