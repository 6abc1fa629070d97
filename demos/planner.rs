//! Decompression Planner
//!
//! Plans a square dive with optional deco gases and prints the ascent with
//! its stops, gas switches and the no-decompression limit of the dive.
//!
//! An options file in JSON can be passed as the first argument, missing keys
//! keep their defaults.
//!
//! Run with: `cargo run --example planner -- [options.json]`

use dive_deco_planner::{
    AlgorithmParams, BuhlmannAlgorithm, CalculatedProfile, Gas, GasId, Gases, NoDecoLimit, Options, Segments,
};
use std::io::{self, Write};

fn get_float_input(prompt: &str, default: f64) -> f64 {
    loop {
        print!("{} (default: {}): ", prompt, default);
        io::stdout().flush().unwrap();

        let mut input = String::new();
        io::stdin().read_line(&mut input).unwrap();

        let input = input.trim();
        if input.is_empty() {
            return default;
        }

        match input.parse::<f64>() {
            Ok(value) => return value,
            Err(_) => println!("Invalid input. Please enter a valid number."),
        }
    }
}

fn get_gas_input(prompt: &str, default: &str) -> Option<Gas> {
    loop {
        print!("{} (default: {}, '-' for none): ", prompt, default);
        io::stdout().flush().unwrap();

        let mut input = String::new();
        io::stdin().read_line(&mut input).unwrap();

        let input = match input.trim() {
            "" => default,
            other => other,
        };
        if input == "-" {
            return None;
        }

        match Gas::from_name(input) {
            Some(gas) => return Some(gas),
            None => println!("Unknown gas. Use Air, Oxygen, EAN32 or trimix like 18/45."),
        }
    }
}

fn load_options() -> Options {
    let Some(path) = std::env::args().nth(1) else {
        return Options::default();
    };

    let json = std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("can't read {}: {}", path, e));
    match Options::from_json(&json) {
        Ok(options) => options,
        Err(e) => {
            println!("⚠️  {} ({}), using default options", e, path);
            Options::default()
        }
    }
}

fn main() {
    println!("=== Decompression Planner ===\n");
    let mut options = load_options();

    println!("Enter dive parameters:");
    let gf_low = get_float_input("GF Low (0.0-1.0)", options.gf_low);
    let gf_high = get_float_input("GF High (0.0-1.0)", options.gf_high);
    options = options.with_gradient_factors(gf_low, gf_high);
    if let Err(e) = options.validate() {
        println!("⚠️  {}, using default gradient factors", e);
        let defaults = Options::default();
        options = options.with_gradient_factors(defaults.gf_low, defaults.gf_high);
    }

    let depth = get_float_input("Depth (m)", 40.0);
    let bottom_time = get_float_input("Bottom time (minutes)", 20.0);

    let bottom_gas = get_gas_input("Bottom gas", "Air").unwrap_or_else(Gas::air);
    let (mut gases, bottom) = Gases::with_bottom_gas(bottom_gas);
    for (prompt, default) in [("First deco gas", "EAN50"), ("Second deco gas", "Oxygen")] {
        if let Some(gas) = get_gas_input(prompt, default) {
            gases.add_deco_gas(gas);
        }
    }

    let descent = (depth / options.descent_speed * 60.0).ceil() as u32;
    let mut segments = Segments::new();
    segments.add(0.0, depth, bottom, descent);
    segments.add_flat(depth, bottom, (bottom_time * 60.0).round() as u32);

    println!("\nPlan Parameters:");
    println!("  GF Low: {:.0}%", options.gf_low * 100.0);
    println!("  GF High: {:.0}%", options.gf_high * 100.0);
    println!("  Salinity: {:?}, altitude {} m", options.salinity, options.altitude);
    println!();

    let algorithm = BuhlmannAlgorithm::new();
    let params = AlgorithmParams::new(&segments, &gases, &options);

    match algorithm.no_deco_limit(&params) {
        Ok(NoDecoLimit::Unlimited) => println!("No Decompression Limit: unlimited"),
        Ok(NoDecoLimit::Minutes(minutes)) => println!("No Decompression Limit: {} minutes", minutes),
        Err(e) => println!("No Decompression Limit: {}", e),
    }

    match algorithm.decompression(&params) {
        Ok(profile) if profile.is_valid() => print_profile(&profile, &gases),
        Ok(profile) => {
            for error in profile.errors.iter() {
                println!("⚠️  {}", error);
            }
        }
        Err(e) => println!("⚠️  Planning failed: {}", e),
    }
}

fn gas_name(gases: &Gases, id: GasId) -> String {
    gases.get(id).map_or_else(|| "?".to_string(), |gas| gas.to_string())
}

fn print_profile(profile: &CalculatedProfile, gases: &Gases) {
    println!("\n=== Dive Profile ===");
    println!(" From (m) |  To (m) | Duration (min) | Runtime (min) | Gas");
    println!("----------|---------|----------------|---------------|--------");

    let mut runtime = 0;
    for segment in profile.segments.iter() {
        runtime += segment.duration;
        println!(
            "  {:6.1}  | {:6.1}  |     {:6.1}     |    {:6.1}     | {}",
            segment.start_depth,
            segment.end_depth,
            segment.duration as f64 / 60.0,
            runtime as f64 / 60.0,
            gas_name(gases, segment.gas)
        );
    }

    let stops: Vec<_> = profile.segments[2..].iter().filter(|s| s.is_flat()).collect();
    let deco_time: u32 = stops.iter().map(|s| s.duration).sum();
    println!("\nNumber of stops: {}", stops.len());
    println!("Total stop time: {:.1} minutes", deco_time as f64 / 60.0);
    println!("Total dive time: {:.1} minutes", profile.duration() as f64 / 60.0);
}
