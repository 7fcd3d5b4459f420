use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command, ValueHint};
use log::LevelFilter;

use spamsift::{SpamDetector, TrainConfig};

/// File names of the persisted artifact pair inside the model directory.
const VECTORIZER_FILE: &str = "vectorizer.cbor";
const MODEL_FILE: &str = "spam_model.cbor";

fn main() -> Result<()> {
    env_logger::Builder::default()
        .filter_level(LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("SPAMSIFT_LOG", "error,spamsift=info"))
        .init();

    let matches = Command::new("spamsift")
        .version(clap::crate_version!())
        .about("Linear-margin spam/ham text classifier")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("train")
                .about("Train a model from a labeled CSV and save the artifact pair")
                .arg(
                    Arg::new("csv")
                        .help("Path to a CSV with 'text' and 'label' columns")
                        .required(true)
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("model_dir")
                        .short('m')
                        .long("model-dir")
                        .help("Directory the trained artifacts are written to")
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .help("JSON file with training settings; flags override it")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::FilePath),
                )
                .arg(
                    Arg::new("test_fraction")
                        .long("test-fraction")
                        .help("Fraction of examples held out for evaluation")
                        .value_parser(clap::value_parser!(f32)),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .help("RNG seed for the split and the solver")
                        .value_parser(clap::value_parser!(u64)),
                )
                .arg(
                    Arg::new("c")
                        .short('c')
                        .long("c")
                        .help("Soft-margin regularization constant")
                        .value_parser(clap::value_parser!(f64)),
                ),
        )
        .subcommand(
            Command::new("predict")
                .about("Classify a message with a previously trained model")
                .arg(
                    Arg::new("text")
                        .help("The message text to classify")
                        .required(true),
                )
                .arg(
                    Arg::new("model_dir")
                        .short('m')
                        .long("model-dir")
                        .help("Directory holding the trained artifacts")
                        .default_value(".")
                        .value_parser(clap::value_parser!(PathBuf))
                        .value_hint(ValueHint::DirPath),
                )
                .arg(
                    Arg::new("explain")
                        .long("explain")
                        .help("Include ranked per-term contributions")
                        .action(ArgAction::SetTrue),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("train", sub)) => handle_train(sub),
        Some(("predict", sub)) => handle_predict(sub),
        _ => unreachable!("subcommand is required by CLI configuration"),
    }
}

fn handle_train(matches: &ArgMatches) -> Result<()> {
    let csv_path: &PathBuf = matches.get_one("csv").expect("required by clap");
    let model_dir: &PathBuf = matches.get_one("model_dir").expect("has default");

    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("could not read config {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("could not parse config {}", path.display()))?
        }
        None => TrainConfig::default(),
    };
    if let Some(&fraction) = matches.get_one::<f32>("test_fraction") {
        config.test_fraction = fraction;
    }
    if let Some(&seed) = matches.get_one::<u64>("seed") {
        config.seed = seed;
    }
    if let Some(&c) = matches.get_one::<f64>("c") {
        config.c = c;
    }

    let detector = SpamDetector::new();
    let metrics = detector
        .train_from_csv(csv_path, &config)
        .with_context(|| format!("training from {} failed", csv_path.display()))?;

    println!("=== Model metrics ===");
    println!("Accuracy:  {:.4}", metrics.accuracy);
    println!("Precision: {:.4}", metrics.precision);
    println!("Recall:    {:.4}", metrics.recall);
    println!("F1-score:  {:.4}", metrics.f1);
    println!();
    println!("Confusion matrix [spam, ham]:");
    for row in metrics.confusion_matrix {
        println!("  {:?}", row);
    }
    println!();
    println!("{}", metrics.classification_report);

    std::fs::create_dir_all(model_dir)
        .with_context(|| format!("could not create {}", model_dir.display()))?;
    detector.save(
        model_dir.join(VECTORIZER_FILE),
        model_dir.join(MODEL_FILE),
    )?;
    println!("Model saved to {}", model_dir.display());
    Ok(())
}

fn handle_predict(matches: &ArgMatches) -> Result<()> {
    let text: &String = matches.get_one("text").expect("required by clap");
    let model_dir: &PathBuf = matches.get_one("model_dir").expect("has default");

    let detector = SpamDetector::new();
    let loaded = detector.load_artifacts(
        model_dir.join(VECTORIZER_FILE),
        model_dir.join(MODEL_FILE),
    )?;
    if !loaded {
        anyhow::bail!(
            "no trained model in {}; run `spamsift train` first",
            model_dir.display()
        );
    }

    if matches.get_flag("explain") {
        let result =
            detector.predict_with_explanation(text, TrainConfig::default().top_terms)?;
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        let result = detector.predict(text)?;
        println!("{}", serde_json::to_string_pretty(&result)?);
    }
    Ok(())
}
