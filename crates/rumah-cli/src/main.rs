use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;
use std::collections::HashMap;
use std::path::PathBuf;

use rumah_estimator::cleaning::{clean_table, CLEAN_OUTPUT_NAME};
use rumah_estimator::config::{load_config, EstimatorConfig};
use rumah_estimator::error::PredictError;
use rumah_estimator::io::{read_raw_table, validate_csv_extension, write_csv_bytes};
use rumah_estimator::pipeline::train_from_csv;
use rumah_estimator::report::{format_rupiah, write_training_report};

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("RUMAH_LOG", "error,rumah=info"))
        .init();

    let matches = Command::new("rumah")
        .version(clap::crate_version!())
        .about("Rumah CLI - cleaning and stacked price estimation for Jakarta Selatan listings")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("clean")
                .about("Normalize a raw listings export into the canonical CSV layout")
                .arg(
                    Arg::new("input")
                        .help("Path to the raw listings CSV")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("output_file")
                        .short('o')
                        .long("output")
                        .help("Path to write the cleaned CSV. Defaults to the standard cleaned-file name.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                ),
        )
        .subcommand(
            Command::new("train")
                .about("Fit (or load from cache) the stacked ensemble and evaluate it")
                .arg(
                    Arg::new("input")
                        .help("Path to the cleaned listings CSV")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("Path to a JSON estimator configuration. Defaults are used otherwise.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("cache_dir")
                        .long("cache-dir")
                        .help("Directory for cached fitted models. Overrides the configuration file.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("report")
                        .short('r')
                        .long("report")
                        .help("Path for the HTML training report.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("no_report")
                        .long("no-report")
                        .help("Disable HTML report generation.")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Estimate the price of one house from its features")
                .arg(
                    Arg::new("input")
                        .help("Path to the cleaned listings CSV the ensemble is trained on")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("land_area")
                        .long("land-area")
                        .help("Land area in square meters")
                        .required(true)
                        .value_parser(clap::value_parser!(u32).range(10..=10000)),
                )
                .arg(
                    Arg::new("building_area")
                        .long("building-area")
                        .help("Building area in square meters")
                        .required(true)
                        .value_parser(clap::value_parser!(u32).range(10..=10000)),
                )
                .arg(
                    Arg::new("bedrooms")
                        .long("bedrooms")
                        .help("Number of bedrooms")
                        .required(true)
                        .value_parser(clap::value_parser!(u32).range(1..=20)),
                )
                .arg(
                    Arg::new("bathrooms")
                        .long("bathrooms")
                        .help("Number of bathrooms")
                        .required(true)
                        .value_parser(clap::value_parser!(u32).range(1..=20)),
                )
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .help("Path to a JSON estimator configuration. Defaults are used otherwise.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("cache_dir")
                        .long("cache-dir")
                        .help("Directory for cached fitted models. Overrides the configuration file.")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                ),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    let result = match matches.subcommand() {
        Some(("clean", sub_m)) => handle_clean(sub_m),
        Some(("train", sub_m)) => handle_train(sub_m),
        Some(("predict", sub_m)) => handle_predict(sub_m),
        _ => unreachable!("Subcommand is required by CLI configuration"),
    };

    if let Err(e) = result {
        log::error!("{:#}", e);
        std::process::exit(1)
    }
    Ok(())
}

fn handle_clean(matches: &ArgMatches) -> Result<()> {
    let input: &PathBuf = matches.get_one("input").unwrap();
    let output = matches
        .get_one::<PathBuf>("output_file")
        .cloned()
        .unwrap_or_else(|| PathBuf::from(CLEAN_OUTPUT_NAME));

    validate_csv_extension(input)?;
    let raw = read_raw_table(input)?;
    let n_raw = raw.nrows();
    let cleaned = clean_table(raw)?;
    std::fs::write(&output, write_csv_bytes(&cleaned)?)?;

    eprintln!(
        "[Rumah::Clean] {} raw rows -> {} clean rows, written to {:?}",
        n_raw,
        cleaned.nrows(),
        output
    );
    Ok(())
}

fn load_run_config(matches: &ArgMatches) -> Result<EstimatorConfig> {
    let mut config = if let Some(config_path) = matches.get_one::<PathBuf>("config") {
        eprintln!("[Rumah::Train] Using config: {:?}", config_path);
        load_config(config_path)?
    } else {
        EstimatorConfig::default()
    };
    if let Some(cache_dir) = matches.get_one::<PathBuf>("cache_dir") {
        config.cache_dir = cache_dir.clone();
    }
    Ok(config)
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let input: &PathBuf = matches.get_one("input").unwrap();
    let config = load_run_config(matches)?;

    let outcome = train_from_csv(input, &config)?;
    let summary = &outcome.summary;

    eprintln!(
        "[Rumah::Train] {} train rows / {} test rows",
        summary.n_train, summary.n_test
    );
    eprintln!(
        "[Rumah::Train] Held-out RMSE {} (R2 {:.3})",
        format_rupiah(summary.test_rmse),
        summary.test_r2
    );
    eprintln!(
        "[Rumah::Train] Selected hyperparameters: {}",
        serde_json::to_string(&summary.rf.params).unwrap_or_default()
    );
    eprintln!(
        "[Rumah::Train] Selected hyperparameters: {}",
        serde_json::to_string(&summary.gbdt.params).unwrap_or_default()
    );

    if !matches.get_flag("no_report") {
        let report_path = matches
            .get_one::<PathBuf>("report")
            .cloned()
            .unwrap_or_else(|| PathBuf::from("rumah_training_report.html"));
        write_training_report(&report_path, &outcome)?;
        eprintln!("[Rumah::Train] Report written to {:?}", report_path);
    }
    Ok(())
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let input: &PathBuf = matches.get_one("input").unwrap();
    let config = load_run_config(matches)?;

    let outcome = train_from_csv(input, &config)?;

    let mut row = HashMap::new();
    row.insert(
        "LuasTanah".to_string(),
        *matches.get_one::<u32>("land_area").unwrap() as f32,
    );
    row.insert(
        "LuasBangunan".to_string(),
        *matches.get_one::<u32>("building_area").unwrap() as f32,
    );
    row.insert(
        "JumlahKamarTidur".to_string(),
        *matches.get_one::<u32>("bedrooms").unwrap() as f32,
    );
    row.insert(
        "JumlahKamarMandi".to_string(),
        *matches.get_one::<u32>("bathrooms").unwrap() as f32,
    );

    let price = outcome
        .ensemble
        .predict_row(&row)
        .map_err(|e| anyhow::anyhow!(describe_predict_error(&e)))?;

    println!("Estimasi harga rumah: {}", format_rupiah(price));
    Ok(())
}

fn describe_predict_error(err: &PredictError) -> String {
    match err {
        PredictError::ModelNotReady => {
            "the model has not been fitted yet; run training first".to_string()
        }
        PredictError::ShapeMismatch { expected, found } => format!(
            "the input row has {} features but the model expects {}",
            found, expected
        ),
        PredictError::Unexpected(detail) => format!("prediction failed: {}", detail),
    }
}
