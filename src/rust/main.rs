use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;
use emotion_classifier::pipeline::{self, Options, PipelineError, MODEL_ENV};
use log::info;

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    long_about = None,
    after_help = "Put `--` before text that looks like an option: `emotion-classifier -- --help`"
)]
struct Args {
    /// Text to classify
    #[arg(allow_hyphen_values = true, required_unless_present = "labels")]
    text: Option<String>,

    /// Print the label set of the artifact instead of classifying
    #[arg(long, conflicts_with = "text")]
    labels: bool,

    /// Path to the classifier artifact
    #[arg(short, long, env = MODEL_ENV)]
    model: Option<PathBuf>,

    /// Expected SHA-256 of the artifact (overrides a .sha256 sidecar)
    #[arg(long, value_name = "HEX")]
    sha256: Option<String>,

    /// Strip user handles and stopwords before predicting
    #[arg(short, long)]
    preprocess: bool,

    /// With --preprocess, only strip user handles
    #[arg(long)]
    keep_stopwords: bool,
}

impl From<Args> for Options {
    fn from(args: Args) -> Self {
        Options {
            model_path: args.model,
            sha256: args.sha256,
            preprocess: args.preprocess,
            keep_stopwords: args.keep_stopwords,
        }
    }
}

fn usage_message(err: &clap::Error) -> String {
    match err.kind() {
        ClapErrorKind::MissingRequiredArgument
        | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            "Please provide text as argument".to_string()
        }
        ClapErrorKind::UnknownArgument => "Please provide exactly one text argument".to_string(),
        _ => err
            .to_string()
            .lines()
            .next()
            .unwrap_or("Invalid arguments")
            .to_string(),
    }
}

fn execute() -> Result<String, PipelineError> {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err)
            if matches!(
                err.kind(),
                ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion
            ) =>
        {
            err.exit()
        }
        Err(err) => return Err(PipelineError::usage(usage_message(&err))),
    };
    let list_labels = args.labels;
    let text = args.text.clone().unwrap_or_default();
    let options = Options::from(args);
    info!("Artifact path: {:?}", options.artifact_path());

    let line = if list_labels {
        pipeline::list_labels(&options)?.to_json_line()
    } else {
        pipeline::run(&text, &options)?.to_json_line()
    };
    line.map_err(|e| PipelineError::new(pipeline::ErrorKind::Prediction, e.to_string()))
}

fn main() -> anyhow::Result<()> {
    emotion_classifier::init_logger();

    let (line, code) = match execute() {
        Ok(line) => (line, 0),
        Err(err) => {
            let line = err.to_response().to_json_line()?;
            (line, err.exit_code())
        }
    };

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", line)?;
    stdout.flush()?;
    drop(stdout);

    if code != 0 {
        process::exit(code);
    }
    Ok(())
}
