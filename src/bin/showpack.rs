//! Showpack command-line tool

use clap::{Parser, Subcommand};
use showpack::exit_codes::{
    EXIT_ARCHIVE_ERROR, EXIT_ERROR, EXIT_FORMAT_ERROR, EXIT_IO_ERROR, EXIT_PANIC,
    EXIT_PROJECT_ERROR, EXIT_SUCCESS,
};
use showpack::{ShowPackError, api};
use std::{panic, path::PathBuf, process};

const VERSION: &str = showpack::version::VERSION;

#[derive(Parser, Debug)]
#[command(name = "showpack", version = VERSION, about = "Show binary and project archive tool")]
struct Args {
    /// Log level (trace, debug, info, warn, error; prefix with json: for JSON logs)
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a show binary and report its contents and warnings
    Inspect {
        /// Show binary file
        file: PathBuf,

        /// Emit the decoded show as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Encode a project JSON file into a show binary
    Encode {
        /// Project JSON file
        project: PathBuf,

        /// Output show binary path
        output: PathBuf,
    },

    /// Pack a project and its audio files into a portable archive
    Pack {
        /// Project JSON file
        project: PathBuf,

        /// Output archive path
        output: PathBuf,

        /// Audio files to include (id taken from the file stem)
        #[arg(long = "audio")]
        audio: Vec<PathBuf>,
    },

    /// Unpack a portable project archive into a directory
    Unpack {
        /// Project archive file
        archive: PathBuf,

        /// Output directory
        out_dir: PathBuf,
    },
}

fn main() {
    // Set up panic handler to return specific exit code
    panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: {}", panic_info);
        process::exit(EXIT_PANIC);
    }));

    let result = panic::catch_unwind(run);

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(_) => {
            eprintln!("Fatal: Unhandled panic in showpack");
            process::exit(EXIT_PANIC);
        }
    }
}

fn run() -> i32 {
    let args = Args::parse();

    if let Some(ref level) = args.log_level {
        showpack::logger::JsonLogger::init_with_level(level, "CLI --log-level");
    } else {
        showpack::logger::JsonLogger::init();
    }

    match args.command {
        Command::Inspect { file, json } => inspect(&file, json),
        Command::Encode { project, output } => match api::encode_show_file(&project, &output) {
            Ok(count) => {
                println!("Encoded {} events to {}", count, output.display());
                EXIT_SUCCESS
            }
            Err(e) => fail(e),
        },
        Command::Pack {
            project,
            output,
            audio,
        } => match api::pack_project_file(&project, &audio, &output) {
            Ok(()) => {
                println!("Packed project to {}", output.display());
                EXIT_SUCCESS
            }
            Err(e) => fail(e),
        },
        Command::Unpack { archive, out_dir } => {
            match api::unpack_project_file(&archive, &out_dir) {
                Ok(written) => {
                    for path in &written {
                        println!("{}", path.display());
                    }
                    EXIT_SUCCESS
                }
                Err(e) => fail(e),
            }
        }
    }
}

fn inspect(file: &PathBuf, json: bool) -> i32 {
    let (show, warnings) = match api::inspect_show_file(file) {
        Ok(result) => result,
        Err(e) => return fail(e),
    };

    if json {
        match serde_json::to_string_pretty(&show) {
            Ok(text) => println!("{text}"),
            Err(e) => return fail(ShowPackError::JsonError(e)),
        }
    } else {
        println!("File:             {}", file.display());
        println!("Format version:   {}", show.version);
        println!(
            "Events:           {} parsed / {} declared",
            show.events.len(),
            show.declared_events
        );
        println!("Max end time:     {} ms", show.summary.max_end_ms);
        println!("Configured props: {}", show.summary.configured_props);
        println!("File size:        {} bytes", show.summary.file_size);
        for (i, event) in show.events.iter().take(16).enumerate() {
            println!(
                "  event {:>3}: {:>8}ms +{:<8}ms effect={:<3} props={:<3} c1=#{} c2=#{}",
                i,
                event.start_ms,
                event.duration_ms,
                event.effect,
                event.prop_count,
                hex::encode(&event.color1.to_be_bytes()[1..]),
                hex::encode(&event.color2.to_be_bytes()[1..]),
            );
        }
        if show.events.len() > 16 {
            println!("  ... {} more events", show.events.len() - 16);
        }
        if let Some(ref cues) = show.cues {
            let labels = ["A", "B", "C", "D"];
            let slots: Vec<String> = cues
                .times
                .iter()
                .zip(labels.iter())
                .map(|(time, label)| match time {
                    Some(t) => format!("{label}={t}ms"),
                    None => format!("{label}=unset"),
                })
                .collect();
            println!("Cues (v{}):        {}", cues.version, slots.join(" "));
        }
    }

    if warnings.is_empty() {
        println!("No warnings.");
    } else {
        println!("{} warning(s):", warnings.len());
        for warning in &warnings {
            println!("  - {warning}");
        }
    }
    EXIT_SUCCESS
}

fn fail(err: ShowPackError) -> i32 {
    eprintln!("Error: {err}");
    match err {
        ShowPackError::IoError(_) => EXIT_IO_ERROR,
        ShowPackError::JsonError(_) | ShowPackError::EncodeError(_) => EXIT_PROJECT_ERROR,
        ShowPackError::ArchiveTooLarge(_)
        | ShowPackError::TooManyEntries(_)
        | ShowPackError::UnsafePath(_)
        | ShowPackError::DuplicatePath(_)
        | ShowPackError::EntryTooLarge(_)
        | ShowPackError::TotalSizeExceeded(_)
        | ShowPackError::UnsupportedMethod(_)
        | ShowPackError::MalformedArchive(_)
        | ShowPackError::MissingProject(_) => EXIT_ARCHIVE_ERROR,
        ShowPackError::Generic(ref msg) if msg.contains("magic") || msg.contains("header") => {
            EXIT_FORMAT_ERROR
        }
        ShowPackError::Generic(_) => EXIT_ERROR,
    }
}
