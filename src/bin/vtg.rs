use std::{path::PathBuf, process::ExitCode, time::Duration};

use clap::Parser;
use colored::Colorize;
use vtg::{FfmpegLogLevel, ImageFormat, ThumbnailError, ThumbnailRequest, Thumbnailer};

const CLI_AFTER_HELP: &str = "Examples:\n  vtg clip.mp4\n  vtg clip.mp4 --timestamp 2.5 --format jpg\n  vtg ~/Movies/clip.mov -o ~/Desktop/poster.jpeg";

#[derive(Debug, Parser)]
#[command(
    name = "vtg",
    version,
    about = "Generate a thumbnail image from a video file",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Path to the input video file.
    #[arg(value_parser = parse_input_path)]
    input: PathBuf,

    /// Timestamp in seconds to extract. Defaults to the middle of the video if omitted.
    #[arg(short, long, value_parser = parse_timestamp, allow_negative_numbers = true)]
    timestamp: Option<Duration>,

    /// Output image format override (png, jpg, jpeg).
    /// If the output path has a supported extension, that extension determines the format.
    /// If omitted, PNG format is used by default.
    #[arg(long, value_name = "png|jpg", value_parser = parse_format)]
    format: Option<ImageFormat>,

    /// Path to the output image file (must include a supported extension).
    #[arg(short, long, value_parser = parse_output_path)]
    output: Option<PathBuf>,

    /// Show diagnostic logging on stderr.
    #[arg(short, long)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, value_parser = parse_log_level)]
    log_level: Option<FfmpegLogLevel>,
}

impl Cli {
    fn request(&self) -> ThumbnailRequest {
        let mut request = ThumbnailRequest::new(&self.input);
        if let Some(timestamp) = self.timestamp {
            request = request.with_timestamp(timestamp);
        }
        if let Some(format) = self.format {
            request = request.with_format(format);
        }
        if let Some(output) = &self.output {
            request = request.with_output(output);
        }
        request
    }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(raw: &str) -> PathBuf {
    let Some(home) = dirs::home_dir() else {
        return PathBuf::from(raw);
    };
    if raw == "~" {
        home
    } else if let Some(rest) = raw.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(raw)
    }
}

fn parse_input_path(value: &str) -> Result<PathBuf, String> {
    if value.is_empty() {
        return Err("input path cannot be empty".to_string());
    }
    Ok(expand_tilde(value))
}

fn parse_timestamp(value: &str) -> Result<Duration, String> {
    let seconds = value
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("'{value}' is not a number of seconds"))?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(format!(
            "'{value}' is not a valid timestamp. Timestamps must be zero or positive."
        ));
    }
    Duration::try_from_secs_f64(seconds).map_err(|error| format!("'{value}': {error}"))
}

fn parse_format(value: &str) -> Result<ImageFormat, String> {
    ImageFormat::from_token(value).map_err(|error| error.to_string())
}

fn parse_output_path(value: &str) -> Result<PathBuf, String> {
    let path = expand_tilde(value);
    vtg::resolve_format(Some(&path), None).map_err(|error| error.to_string())?;
    Ok(path)
}

fn parse_log_level(value: &str) -> Result<FfmpegLogLevel, String> {
    match value.to_ascii_lowercase().as_str() {
        "quiet" => Ok(FfmpegLogLevel::Quiet),
        "panic" => Ok(FfmpegLogLevel::Panic),
        "fatal" => Ok(FfmpegLogLevel::Fatal),
        "error" => Ok(FfmpegLogLevel::Error),
        "warning" | "warn" => Ok(FfmpegLogLevel::Warning),
        "info" => Ok(FfmpegLogLevel::Info),
        "verbose" => Ok(FfmpegLogLevel::Verbose),
        "debug" => Ok(FfmpegLogLevel::Debug),
        "trace" => Ok(FfmpegLogLevel::Trace),
        _ => Err(format!("unsupported FFmpeg log level: {value}")),
    }
}

fn init_logger(verbose: bool) -> Result<(), log::SetLoggerError> {
    let crate_level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };

    fern::Dispatch::new()
        .level(log::LevelFilter::Warn)
        .level_for("vtg", crate_level)
        .format(|out, message, record| {
            let level = match record.level() {
                log::Level::Error => "error".red().bold(),
                log::Level::Warn => "warning".yellow().bold(),
                log::Level::Info => "info".green(),
                log::Level::Debug => "debug".cyan(),
                log::Level::Trace => "trace".dimmed(),
            };
            out.finish(format_args!("{level} [{}] {message}", record.target()))
        })
        .chain(std::io::stderr())
        .apply()
}

fn report_failure(error: &ThumbnailError) {
    if error.is_validation() {
        eprintln!("{} {error}", "error:".red().bold());
        return;
    }

    if let ThumbnailError::WriteFailed { source, .. } = error {
        eprintln!("Failed to write image: {source}");
    } else {
        log::debug!("{error}");
    }
    eprintln!("{}", "Failed to generate thumbnail.".red());
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) if !error.use_stderr() => error.exit(),
        Err(error) => {
            let _ = error.print();
            return ExitCode::FAILURE;
        }
    };

    if let Err(error) = init_logger(cli.verbose) {
        eprintln!("{} {error}", "warning:".yellow().bold());
    }
    if let Some(level) = cli.log_level {
        vtg::set_ffmpeg_log_level(level);
    }

    match Thumbnailer::new().generate(&cli.request()) {
        Ok(output) => {
            println!("Generated thumbnail successfully.");
            println!("output: {}", output.path.display());
            ExitCode::SUCCESS
        }
        Err(error) => {
            report_failure(&error);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, time::Duration};

    use clap::Parser;
    use vtg::ImageFormat;

    use super::{Cli, expand_tilde, parse_format, parse_output_path, parse_timestamp};

    #[test]
    fn expand_tilde_forms() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_tilde("~"), home);
        assert_eq!(expand_tilde("~/Movies/clip.mp4"), home.join("Movies/clip.mp4"));
        assert_eq!(expand_tilde("clip.mp4"), PathBuf::from("clip.mp4"));
        assert_eq!(expand_tilde("~other/clip.mp4"), PathBuf::from("~other/clip.mp4"));
    }

    #[test]
    fn parse_timestamp_values() {
        assert_eq!(parse_timestamp("2.5").unwrap(), Duration::from_millis(2500));
        assert_eq!(parse_timestamp("0").unwrap(), Duration::ZERO);
        assert!(parse_timestamp("-1").is_err());
        assert!(parse_timestamp("NaN").is_err());
        assert!(parse_timestamp("inf").is_err());
        assert!(parse_timestamp("soon").is_err());
    }

    #[test]
    fn parse_format_tokens() {
        assert_eq!(parse_format("png").unwrap(), ImageFormat::Png);
        assert_eq!(parse_format(".jpg").unwrap(), ImageFormat::Jpeg);
        assert_eq!(parse_format("jpeg").unwrap(), ImageFormat::Jpeg);
        let message = parse_format("gif").unwrap_err();
        assert!(message.contains("'gif'"), "{message}");
    }

    #[test]
    fn parse_output_path_requires_supported_extension() {
        assert!(parse_output_path("out.png").is_ok());
        assert!(parse_output_path("out.jpeg").is_ok());
        assert!(parse_output_path("out").is_err());
        assert!(parse_output_path("out.gif").is_err());
        assert!(parse_output_path("out.JPEG").is_err());
    }

    #[test]
    fn cli_builds_request() {
        let cli = Cli::try_parse_from([
            "vtg",
            "clip.mp4",
            "--timestamp",
            "2.5",
            "--format",
            ".jpg",
            "-o",
            "poster.jpeg",
        ])
        .unwrap();
        let request = cli.request();
        assert_eq!(request.input(), PathBuf::from("clip.mp4"));
        assert_eq!(request.timestamp(), Some(Duration::from_millis(2500)));
        assert_eq!(request.format_override(), Some(ImageFormat::Jpeg));
        assert_eq!(request.output(), Some(PathBuf::from("poster.jpeg").as_path()));
    }

    #[test]
    fn cli_defaults_leave_choices_to_the_library() {
        let cli = Cli::try_parse_from(["vtg", "clip.mp4"]).unwrap();
        let request = cli.request();
        assert_eq!(request.timestamp(), None);
        assert_eq!(request.format_override(), None);
        assert_eq!(request.output(), None);
    }

    #[test]
    fn cli_rejects_bad_values() {
        assert!(Cli::try_parse_from(["vtg", "clip.mp4", "--format", "bmp"]).is_err());
        assert!(Cli::try_parse_from(["vtg", "clip.mp4", "-t", "-3"]).is_err());
        assert!(Cli::try_parse_from(["vtg", "clip.mp4", "-o", "out.tiff"]).is_err());
        assert!(Cli::try_parse_from(["vtg"]).is_err());
    }
}
