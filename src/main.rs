//! # chatdonate CLI
//!
//! Command-line interface for the chatdonate library.

use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use chatdonate::DonationError;
use chatdonate::archive::FsOpener;
use chatdonate::cli::{Args, CliDriver};
use chatdonate::format::{OutputFormat, write_to_format};
use chatdonate::platforms::{Platform, create_flow};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("chatdonate=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), DonationError> {
    let total_start = Instant::now();
    let args = <Args as ClapParser>::parse();
    let platform: Platform = args.source.into();

    let output_path = adjust_output_extension(&args.output, args.format);

    println!("📦 chatdonate v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📖 Platform: {}", platform);
    println!("📂 Input:    {}", args.input);
    println!("💾 Output:   {}", output_path);
    println!("📄 Format:   {}", args.format);
    println!("🔑 Session:  {}", args.session_id);
    if let Some(ref user) = args.user {
        println!("👤 User:     {}", user);
    }
    if let Some(ref dir) = args.donations_dir {
        println!("📤 Donate:   {}", dir);
    }
    println!();

    println!("⏳ Running {} flow...", platform);
    let flow_start = Instant::now();
    let mut flow = create_flow(platform, args.flow_config(), args.chat_config(), FsOpener);
    let mut driver = CliDriver::new(&args);
    flow.run_with(&mut driver);
    println!("   Finished in {:.2}s", flow_start.elapsed().as_secs_f64());

    if let Some(e) = driver.error.take() {
        return Err(e);
    }

    if driver.retried {
        return Err(DonationError::invalid_format(
            "input",
            format!("{} was not accepted as a {} export", args.input, platform),
        ));
    }

    if driver.reviewed.is_empty() {
        if !driver.members.is_empty() {
            println!();
            println!("👥 Members found, pick yourself with --user:");
            for member in &driver.members {
                println!("   {}", member);
            }
        }
        println!();
        println!("⚠️  Nothing to donate");
        return Ok(());
    }

    let lib_format: OutputFormat = args.format.into();
    println!("💾 Writing {}...", lib_format);
    write_to_format(&driver.reviewed, &output_path, lib_format)?;

    println!();
    println!("✅ Done! Output saved to {}", output_path);

    println!();
    println!("📊 Summary:");
    println!("   Tables:     {}", driver.reviewed.len());
    println!(
        "   Rows:       {}",
        driver.reviewed.iter().map(|t| t.len()).sum::<usize>()
    );
    println!("   Donations:  {}", driver.donated.len());
    for path in &driver.written {
        println!("     → {}", path.display());
    }

    println!();
    println!("⚡ Total time: {:.2}s", total_start.elapsed().as_secs_f64());

    Ok(())
}

/// Adjusts output file extension based on format if using default output.
fn adjust_output_extension(output: &str, format: chatdonate::cli::OutputFormat) -> String {
    if output != "donation.json" {
        return output.to_string();
    }

    let lib_format: OutputFormat = format.into();
    format!("donation.{}", lib_format.extension())
}
