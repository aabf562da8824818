use std::future::Future;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use voice_deck::board::{Card, VoiceBoard};
use voice_deck::convert::{AudioOutput, Delivery, MutedOutput};
use voice_deck::text::{char_count_label, estimate_duration, format_time, sample_text};
use voice_deck::{AppError, Config, Session};

#[derive(Parser, Debug)]
#[command(name = "voice-deck")]
#[command(about = "Browse the voices of an edge TTS service and turn text into speech")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Command,
}

/// Flags that take precedence over the VOICE_DECK_* environment.
#[derive(Args, Debug)]
struct Overrides {
    /// Base URL of the TTS service
    #[arg(long)]
    server: Option<String>,

    /// Path of the conversion endpoint ("/convert" or "/")
    #[arg(long)]
    convert_path: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Where speech.mp3 and challenge images are written
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

impl Overrides {
    fn apply(self, config: &mut Config) -> Result<(), AppError> {
        if let Some(server) = self.server {
            config.server = server;
        }
        if let Some(path) = self.convert_path {
            config.convert_path = path;
        }
        if let Some(secs) = self.timeout {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        config.validate()
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the voice cards grouped by language
    Voices {
        /// Language code, "multilingual" or "all"
        #[arg(long, conflicts_with = "search")]
        language: Option<String>,

        /// Case-insensitive match on voice or language name
        #[arg(long)]
        search: Option<String>,

        /// Show the featured voices instead of the full board
        #[arg(long)]
        featured: bool,

        /// Show the preview voices instead of the full board
        #[arg(long, conflicts_with = "featured")]
        preview: bool,
    },

    /// List the values accepted by `voices --language`
    Languages,

    /// Convert text to speech and play or download it
    Speak(SpeakArgs),

    /// Play the sample prompt with a voice
    Sample {
        #[arg(long)]
        voice: String,

        /// Answer to a challenge shown earlier
        #[arg(long)]
        captcha: Option<String>,
    },
}

#[derive(Args, Debug)]
struct SpeakArgs {
    /// Text to speak; read from stdin when omitted
    text: Option<String>,

    /// Voice id, e.g. en-US-AriaNeural
    #[arg(long)]
    voice: Option<String>,

    /// Save speech.mp3 instead of playing it
    #[arg(long)]
    download: bool,

    /// Speak the demo paragraph for the chosen voice's language
    #[arg(long, conflicts_with = "text")]
    sample_text: bool,

    /// Answer to a challenge shown earlier
    #[arg(long)]
    captcha: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        let banner = e.banner();
        eprintln!("error: {}", banner.message);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let mut config = Config::from_env()?;
    cli.overrides.apply(&mut config)?;

    tracing::info!("voice-deck v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("TTS service: {}", config.server);

    let wants_playback = match &cli.command {
        Command::Speak(args) => !args.download,
        Command::Sample { .. } => true,
        _ => false,
    };

    let mut session = Session::new(config, open_output(wants_playback))?;

    match cli.command {
        Command::Voices {
            language,
            search,
            featured,
            preview,
        } => {
            session.refresh_catalog().await?;

            if let Some(language) = language {
                session.filter_by_language(&language);
            }
            if let Some(term) = search {
                session.filter_by_search(&term);
            }

            if featured {
                print_cards(session.featured());
            } else if preview {
                print_cards(session.preview());
            } else {
                print_board(session.board());
            }
        }
        Command::Languages => {
            session.refresh_catalog().await?;
            for option in session.languages() {
                println!("{:<14}{}", option.value, option.label);
            }
        }
        Command::Speak(args) => speak(&mut session, args).await?,
        Command::Sample { voice, captcha } => {
            let delivery = submit(&mut session, &Job::Sample { voice }, captcha).await?;
            report(&session, &delivery);
        }
    }

    Ok(())
}

async fn speak(session: &mut Session, args: SpeakArgs) -> Result<(), AppError> {
    if let Some(voice) = &args.voice {
        session.select_voice(voice)?;
    }

    let text = if args.sample_text {
        sample_text(session.selected_voice()).to_string()
    } else if let Some(text) = args.text {
        text
    } else {
        read_stdin().await?
    };

    eprintln!(
        "{} with {}, estimated duration {}",
        char_count_label(&text),
        session.selected_voice(),
        format_time(estimate_duration(&text))
    );

    let job = Job::Speak {
        text,
        download: args.download,
    };
    let delivery = submit(session, &job, args.captcha).await?;
    report(session, &delivery);
    Ok(())
}

enum Job {
    Speak { text: String, download: bool },
    Sample { voice: String },
}

/// Runs `job`, prompting for the challenge answer and resubmitting for as
/// long as the service asks for one.
async fn submit(
    session: &mut Session,
    job: &Job,
    captcha: Option<String>,
) -> Result<Delivery, AppError> {
    if let Some(answer) = captcha {
        session.answer_challenge(&answer);
    }

    loop {
        let attempt = match job {
            Job::Speak { text, download } => cancellable(session.convert(text, *download)).await,
            Job::Sample { voice } => cancellable(session.play_sample(voice)).await,
        };

        match attempt {
            Err(AppError::ChallengeRequired(message)) => {
                eprintln!("{}", message);
                if let Some(image) = session.challenge_image() {
                    eprintln!("Challenge image saved to {}", image.display());
                }

                let Some(answer) = prompt("Characters shown in the image: ").await? else {
                    return Err(AppError::ChallengeRequired(message));
                };
                session.answer_challenge(&answer);
            }
            other => return other,
        }
    }
}

/// Drops the conversion future on Ctrl-C, which aborts the request.
async fn cancellable<T>(work: impl Future<Output = Result<T, AppError>>) -> Result<T, AppError> {
    tokio::select! {
        result = work => result,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted");
            Err(AppError::Cancelled)
        }
    }
}

fn report(session: &Session, delivery: &Delivery) {
    if let Some(banner) = session.banner() {
        eprintln!("{}", banner.message);
    }

    match delivery {
        Delivery::Downloaded { path } => println!("{}", path.display()),
        Delivery::Played { .. } => {
            tokio::task::block_in_place(|| session.converter().wait_for_playback());
        }
    }
}

#[cfg(feature = "audio-playback")]
fn open_output(wants_playback: bool) -> Box<dyn AudioOutput> {
    if wants_playback {
        match voice_deck::convert::RodioOutput::open() {
            Ok(output) => return Box::new(output),
            Err(e) => tracing::warn!("{}; playback disabled", e),
        }
    }
    Box::new(MutedOutput)
}

#[cfg(not(feature = "audio-playback"))]
fn open_output(_wants_playback: bool) -> Box<dyn AudioOutput> {
    Box::new(MutedOutput)
}

async fn read_stdin() -> Result<String, AppError> {
    if io::stdin().is_terminal() {
        eprintln!("Enter text, then Ctrl-D:");
    }

    tokio::task::spawn_blocking(|| {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map(|_| text)
    })
    .await
    .map_err(|e| AppError::Io(io::Error::other(e)))?
    .map_err(AppError::from)
}

async fn prompt(label: &str) -> Result<Option<String>, AppError> {
    eprint!("{}", label);
    io::stderr().flush()?;

    let line = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).map(|n| (n > 0).then_some(line))
    })
    .await
    .map_err(|e| AppError::Io(io::Error::other(e)))??;

    Ok(line
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty()))
}

fn print_board(board: &VoiceBoard) {
    let mut shown = 0;

    for section in board.sections().iter().filter(|s| s.visible) {
        println!("{}", section.header());
        for row in section.rows.iter().filter(|r| r.visible) {
            for card in row.cards.iter().filter(|c| c.visible) {
                print_card(card);
                shown += 1;
            }
            println!();
        }
    }

    if shown == 0 {
        eprintln!("No voices match the current filter");
    }
}

fn print_cards(cards: &[Card]) {
    for card in cards {
        print_card(card);
    }
}

fn print_card(card: &Card) {
    println!(
        "  {} {:<28}{:<14}{:<34}{}",
        if card.selected { "*" } else { " " },
        card.display_name,
        card.language_name,
        card.voice_id(),
        card.tags.join(", ")
    );
}
