use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use kindle_highlights::extract::extract_highlights;
use kindle_highlights::loader::load_document;
use kindle_highlights::session::{Frontend, Notification, Session, Severity, APP_TITLE};
use kindle_highlights::RenderConfig;
use log::debug;

/// Converts Kindle notebook exports (HTML) into PDF documents.
///
/// Rendering needs a TrueType font family. Put the Roboto files under
/// `assets/fonts` next to the binary, point `KINDLE_HIGHLIGHTS_FONTS_DIR` or
/// `--fonts-dir` at them, or install Liberation Sans / DejaVu Sans.
#[derive(Parser)]
#[command(author, version, about = APP_TITLE)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the highlights of an export to a PDF file.
    #[command(name = "convert")]
    Convert {
        /// Notebook export to read.
        input: PathBuf,

        /// Where to write the PDF. Defaults to the input name with a `.pdf` extension.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory containing the Roboto font files.
        #[arg(long, value_name = "DIR")]
        fonts_dir: Option<PathBuf>,

        /// Add an outline entry for every highlight (requires the `bookmarks` feature).
        #[arg(long)]
        bookmarks: bool,
    },

    /// Print the extracted title and highlights without rendering.
    #[command(name = "list", aliases = ["ls"])]
    List {
        /// Notebook export to read.
        input: PathBuf,
    },
}

/// Front end fed from command-line arguments instead of dialogs.
struct CommandLineFrontend {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
}

impl Frontend for CommandLineFrontend {
    fn choose_input(&mut self) -> Option<PathBuf> {
        self.input.take()
    }

    fn choose_output(&mut self, suggested: &Path) -> Option<PathBuf> {
        let output = self.output.take().unwrap_or_else(|| suggested.to_path_buf());
        debug!("Writing to {}", output.display());
        Some(output)
    }

    fn notify(&mut self, notification: &Notification) {
        match notification.severity() {
            Severity::Info => println!("{}", notification.message()),
            Severity::Warning | Severity::Error => eprintln!("{notification}"),
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            input,
            output,
            fonts_dir,
            bookmarks,
        } => run_convert(input, output, fonts_dir, bookmarks),
        Commands::List { input } => run_list(&input),
    };

    match result {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {}", err);
            print_error_sources(err.as_ref());
            ExitCode::FAILURE
        }
    }
}

fn run_convert(
    input: PathBuf,
    output: Option<PathBuf>,
    fonts_dir: Option<PathBuf>,
    bookmarks: bool,
) -> Result<ExitCode, Box<dyn Error>> {
    let config = RenderConfig::default()
        .with_font_dir(fonts_dir)
        .with_bookmarks(bookmarks);

    let mut frontend = CommandLineFrontend {
        input: Some(input),
        output,
    };
    let mut session = Session::new(config);
    session.select_input(&mut frontend);

    // The notification has already been printed by the frontend.
    if converted(&session.convert(&mut frontend)) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

fn converted(notification: &Notification) -> bool {
    matches!(notification, Notification::Converted { .. })
}

fn run_list(input: &Path) -> Result<ExitCode, Box<dyn Error>> {
    let document = load_document(input)?;
    let extraction = extract_highlights(&document);

    println!("{}", extraction.title());
    for highlight in extraction.highlights() {
        println!("{}: {}", highlight.identifier(), highlight.text());
    }
    if !extraction.is_balanced() {
        eprintln!(
            "{} headings and {} texts; unmatched entries were skipped",
            extraction.heading_count(),
            extraction.text_count()
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
