use alz_risk::config::{AppConfig, PipelineConfig};
use alz_risk::error::AppError;
use alz_risk::risk::{
    load_pipeline, score_csv, LogisticRegressionModel, RawInputRecord, RiskPipeline,
    RoundingPolicy,
};
use clap::Args;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// JSON object mapping every input field to its value
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Override the configured probability rounding width
    #[arg(long, value_parser = parse_rounding_width)]
    pub(crate) decimals: Option<u32>,
}

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// CSV file whose header row names the input fields
    #[arg(long)]
    pub(crate) input: PathBuf,
    /// Where to write results (defaults to stdout)
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

pub(crate) fn parse_rounding_width(value: &str) -> Result<u32, String> {
    let decimals = value
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("'{value}' is not a rounding width: {err}"))?;
    RoundingPolicy::new(decimals)
        .map(RoundingPolicy::decimals)
        .map_err(|err| err.to_string())
}

fn read_record(path: &Path) -> Result<RawInputRecord, AppError> {
    let file = File::open(path)?;
    serde_json::from_reader(BufReader::new(file)).map_err(AppError::Input)
}

fn pipeline_for(
    mut pipeline_config: PipelineConfig,
    decimals: Option<u32>,
) -> Result<RiskPipeline<LogisticRegressionModel>, AppError> {
    if let Some(decimals) = decimals {
        pipeline_config.probability_decimals = decimals;
    }
    Ok(load_pipeline(&pipeline_config)?)
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let pipeline = pipeline_for(config.pipeline, args.decimals)?;

    let raw = read_record(&args.input)?;

    let assessment = pipeline.assess(&raw)?;
    println!("{}", assessment.message);
    match serde_json::to_string_pretty(&assessment) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("Assessment payload unavailable: {err}"),
    }
    Ok(())
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let pipeline = pipeline_for(config.pipeline, None)?;
    let reader = BufReader::new(File::open(&args.input)?);

    let summary = match args.output {
        Some(path) => score_csv(&pipeline, reader, BufWriter::new(File::create(path)?))?,
        None => score_csv(&pipeline, reader, io::stdout().lock())?,
    };

    eprintln!(
        "Scored {} rows ({} rejected)",
        summary.scored + summary.failed,
        summary.failed
    );
    Ok(())
}
