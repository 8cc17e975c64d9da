use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use outline_to_pptx::{generate, image_source_from_key, Outline};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Environment fallback for the image search credential when the positional
/// argument is omitted. Missing both is legal and selects the keyless
/// image strategy.
const ACCESS_KEY_ENV: &str = "UNSPLASH_ACCESS_KEY";

/// Generate PowerPoint decks from JSON outlines
#[derive(Parser)]
#[command(
    name = "outline-to-pptx",
    version,
    about = "Generate PowerPoint decks (.pptx) from JSON outlines and a .potx/.pptx template"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Populate a template with an outline and write the finished deck
    Generate {
        /// Path to the .potx/.pptx template
        template: PathBuf,

        /// Path the finished .pptx is written to
        output: PathBuf,

        /// Path to the JSON outline
        data: PathBuf,

        /// Image search access key (default: $UNSPLASH_ACCESS_KEY)
        image_api_key: Option<String>,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(1);
        }
    };

    match cli.command {
        Commands::Generate {
            template,
            output,
            data,
            image_api_key,
        } => match run(&template, &output, &data, image_api_key) {
            Ok(()) => {
                println!("Presentation saved to {}", output.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::from(1)
            }
        },
    }
}

fn run(
    template: &Path,
    output: &Path,
    data: &Path,
    image_api_key: Option<String>,
) -> outline_to_pptx::Result<()> {
    let raw = std::fs::read(data)?;
    let outline: Outline = serde_json::from_slice(&raw)?;

    let access_key = image_api_key.or_else(|| std::env::var(ACCESS_KEY_ENV).ok());
    let images = image_source_from_key(access_key)?;

    generate(template, output, &outline, images.as_ref())
}
