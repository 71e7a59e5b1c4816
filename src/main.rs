//! Stick Duel entry point
//!
//! The browser build is driven from JavaScript through `stick_duel::web`.
//! Natively the binary plays a headless AI-vs-AI match and reports the result.
//!
//! Usage: `stick-duel [--seed N] [--tuning FILE] [--settings FILE] [--quality low|medium|high]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use anyhow::{Context, Result, bail};

    use stick_duel::sim::Session;
    use stick_duel::{QualityPreset, Settings, Tuning};

    /// Frame rate the headless loop pretends to render at
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Give up on a match after this many frames (ten minutes)
    const MAX_FRAMES: u32 = 60 * 600;

    #[derive(Debug, Default)]
    struct Args {
        seed: Option<u64>,
        tuning: Option<PathBuf>,
        settings: Option<PathBuf>,
        quality: Option<QualityPreset>,
    }

    impl Args {
        fn parse(mut args: impl Iterator<Item = String>) -> Result<Self> {
            let mut parsed = Args::default();
            while let Some(flag) = args.next() {
                let mut value = || args.next().with_context(|| format!("{flag} needs a value"));
                match flag.as_str() {
                    "--seed" => {
                        let raw = value()?;
                        parsed.seed = Some(raw.parse().with_context(|| format!("bad seed: {raw}"))?);
                    }
                    "--tuning" => parsed.tuning = Some(PathBuf::from(value()?)),
                    "--settings" => parsed.settings = Some(PathBuf::from(value()?)),
                    "--quality" => {
                        let raw = value()?;
                        parsed.quality = Some(
                            QualityPreset::from_str(&raw)
                                .with_context(|| format!("unknown quality: {raw}"))?,
                        );
                    }
                    other => bail!("unknown argument: {other}"),
                }
            }
            Ok(parsed)
        }
    }

    pub fn run() -> Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

        let args = Args::parse(std::env::args().skip(1))?;

        let tuning = match &args.tuning {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                Tuning::from_json(&json).with_context(|| format!("loading {}", path.display()))?
            }
            None => Tuning::default(),
        };
        let mut settings = match &args.settings {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        if let Some(quality) = args.quality {
            settings.quality = quality;
        }
        let seed = args.seed.unwrap_or_else(rand::random);

        log::info!("Stick Duel (native) demo starting...");
        let mut session = Session::demo(seed, tuning, &settings);

        let mut frames = 0;
        while !session.state.is_over() && frames < MAX_FRAMES {
            session.frame(FRAME_DT);
            frames += 1;
        }

        let snapshot = session.snapshot();
        match snapshot.outcome {
            Some(outcome) => println!(
                "seed {seed}: {:?} wins after {:.1}s (player {} / enemy {})",
                outcome.winner(),
                snapshot.time,
                snapshot.player.health,
                snapshot.enemy.health
            ),
            None => println!(
                "seed {seed}: no knockout after {:.1}s (player {} / enemy {})",
                snapshot.time, snapshot.player.health, snapshot.enemy.health
            ),
        }
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is stick_duel::web::start, this is just to satisfy the compiler
}
