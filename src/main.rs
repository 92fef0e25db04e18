use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use parlotte::audio::{AudioCapture, MicSource, PicoSpeaker, Synthesizer};
use parlotte::{Config, ContentStore, Session};

/// parlotte - voice-driven conversational assistant
#[derive(Parser)]
#[command(name = "parlotte", version, about)]
struct Cli {
    /// Assistant root directory (model, sounds, content file)
    #[arg(short, long, env = "PARLOTTE_ROOT")]
    root: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Test microphone input
    TestMic {
        /// Duration in seconds
        #[arg(short, long, default_value = "5")]
        duration: u64,
    },
    /// Test speech synthesis
    Say {
        /// Text to speak
        #[arg(default_value = "Bonjour, je suis prête.")]
        text: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,parlotte=info",
        1 => "info,parlotte=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::future_not_send)]
async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::TestMic { duration } => test_mic(duration).await,
            Command::Say { text } => say(cli.root, &text).await,
        };
    }

    let config = Config::load(cli.root)?;
    tracing::debug!(?config, "loaded configuration");

    let content = ContentStore::load(&config.content_path, &config.wake_word)?;

    let recognizer = build_recognizer(&config)?;
    let mut capture = AudioCapture::new()?;
    let chunks = capture.start()?;
    let source = Box::new(MicSource::new(chunks, recognizer));
    let voice = Box::new(PicoSpeaker::new(config.tts_lang.clone()));

    tracing::info!(
        root = %config.root.display(),
        wake_word = %config.wake_word,
        "starting assistant - say \"{}\"",
        config.wake_word
    );

    let mut session = Session::new(config, content, source, voice);
    let result = session.run().await;

    capture.stop();
    result?;

    tracing::info!("assistant stopped");
    Ok(())
}

/// Build the configured recognizer backend
#[cfg(feature = "vosk")]
fn build_recognizer(config: &Config) -> anyhow::Result<Box<dyn parlotte::Recognizer>> {
    use parlotte::audio::{VoskRecognizer, SAMPLE_RATE};

    let recognizer = VoskRecognizer::new(&config.model_dir, SAMPLE_RATE)?;
    Ok(Box::new(recognizer))
}

#[cfg(not(feature = "vosk"))]
fn build_recognizer(_config: &Config) -> anyhow::Result<Box<dyn parlotte::Recognizer>> {
    anyhow::bail!("no recognizer backend compiled in; rebuild with --features vosk")
}

/// Test microphone input
async fn test_mic(duration: u64) -> anyhow::Result<()> {
    println!("Testing microphone for {duration} seconds...");
    println!("Speak into your microphone!\n");

    let mut capture = AudioCapture::new()?;
    let mut chunks = capture.start()?;

    let sample_rate = capture.sample_rate();
    println!("Sample rate: {sample_rate} Hz");
    println!("---");

    for i in 0..duration {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(1);
        let mut second: Vec<i16> = Vec::new();

        while let Ok(Some(chunk)) = tokio::time::timeout_at(deadline, chunks.recv()).await {
            second.extend(chunk);
        }

        let energy = calculate_rms(&second);
        let peak = second
            .iter()
            .map(|s| f32::from(*s).abs() / 32768.0)
            .fold(0.0f32, f32::max);

        // Visual meter
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let meter_len = (energy * 100.0).min(50.0) as usize;
        let meter: String = "█".repeat(meter_len) + &" ".repeat(50 - meter_len);

        println!(
            "[{:2}s] RMS: {:.4} | Peak: {:.4} | [{}]",
            i + 1,
            energy,
            peak,
            meter
        );
    }

    capture.stop();

    println!("\n---");
    println!("If you saw movement in the meter, your mic is working!");
    println!("If RMS stayed near 0, check:");
    println!("  1. Is your mic plugged in?");
    println!("  2. Run: pactl info | grep 'Default Source'");
    println!("  3. Run: arecord -l (to list devices)");

    Ok(())
}

/// Calculate RMS energy of normalized samples
#[allow(clippy::cast_precision_loss)]
fn calculate_rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples
        .iter()
        .map(|s| {
            let x = f32::from(*s) / 32768.0;
            x * x
        })
        .sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Test speech synthesis
async fn say(root: Option<PathBuf>, text: &str) -> anyhow::Result<()> {
    let config = Config::load(root)?;
    let speaker = PicoSpeaker::new(config.tts_lang);

    println!("Speaking: \"{text}\"");
    speaker.say(text).await?;

    println!("If you heard the speech, TTS is working!");
    Ok(())
}
