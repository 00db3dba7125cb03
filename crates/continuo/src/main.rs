//! continuo - completes the bass line of a chorale
//!
//! Takes a MusicXML score holding a full soprano part and the opening of a
//! bass part, annotated with the key and the final given chord, and fills the
//! bass part's rest measures with a legal continuation.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[derive(Parser)]
#[command(name = "continuo")]
#[command(about = "Completes the bass line of a chorale")]
#[command(version)]
struct Cli {
    /// Annotated MusicXML score: soprano part first, partial bass part second
    score: PathBuf,

    /// Where to write the completed score
    #[arg(short, long, default_value = "output.musicxml")]
    output: PathBuf,

    /// Seed for the progression search, for reproducible output
    #[arg(long, env = "CONTINUO_SEED")]
    seed: Option<u64>,

    /// Print the chosen chords and bass notes as JSON instead of a score
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let text = fs::read_to_string(&cli.score)
        .with_context(|| format!("failed to read {}", cli.score.display()))?;
    let score = musicxml::parse_score(&text)?;

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let harmonization = harmony::write_bass_line(
        &score.key,
        &score.soprano,
        &score.given_bass,
        score.final_degree,
        &mut rng,
    )?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&harmonization)?);
        return Ok(());
    }

    let completed = musicxml::render_score(&text, &harmonization, score.key.is_major())?;
    fs::write(&cli.output, completed)
        .with_context(|| format!("failed to write {}", cli.output.display()))?;
    println!("wrote {}", cli.output.display());
    Ok(())
}
