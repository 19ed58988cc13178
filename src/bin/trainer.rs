// src/bin/trainer.rs
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use wordle_core::dataset::{Dataset, Splits};
use wordle_core::learning::accuracy;
use wordle_core::persistence::save_json;
use wordle_core::{logging, Mlp, PrefixTree, Strategy, Trainer, TrainingConfig};

/// Trains the guess model by playing every training word once per epoch.
#[derive(Parser, Debug)]
#[command(name = "trainer")]
#[command(about = "Train a Wordle guesser with vocabulary-constrained decoding")]
struct Args {
    /// Newline-delimited five letter vocabulary
    #[arg(long, default_value = "data/words.txt")]
    vocab: PathBuf,

    /// JSON training config; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    epochs: Option<usize>,

    /// Learning rate
    #[arg(long)]
    lr: Option<f32>,

    #[arg(long)]
    beam_width: Option<usize>,

    /// `beam` or `greedy`
    #[arg(long)]
    decoder: Option<Strategy>,

    /// Directory for model.bin, history.json and loss.json
    #[arg(short, long, default_value = "out")]
    out: PathBuf,

    /// Also write a debug log file into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log each attempt
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> Result<TrainingConfig> {
        let mut config = match &self.config {
            Some(path) => TrainingConfig::from_file(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => TrainingConfig::default(),
        };
        if let Some(epochs) = self.epochs {
            config.epochs = epochs;
        }
        if let Some(lr) = self.lr {
            config.learning_rate = lr;
        }
        if let Some(width) = self.beam_width {
            config.beam_width = width;
        }
        if let Some(decoder) = self.decoder {
            config.decoder = decoder;
        }
        config.checkpoint = Some(self.out.join("model.bin"));
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let level = if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    logging::init(level, args.log_dir.as_deref())?;

    let config = args.config()?;
    let dataset = Dataset::from_file(&args.vocab)
        .with_context(|| format!("loading vocabulary {}", args.vocab.display()))?;
    let tree = PrefixTree::build(dataset.words());
    log::info!("vocabulary: {} words, {} tree nodes", tree.len(), tree.node_count());

    let splits = Splits::new(&dataset, config.splits, config.split_seed)?;
    log::info!(
        "split: {} train / {} val / {} test",
        splits.train.len(),
        splits.val.len(),
        splits.test.len()
    );

    let mut model = Mlp::new(config.hidden, config.seed);
    let trainer = Trainer::new(&config, &tree)?;
    let report = trainer.train(&mut model, &splits)?;

    save_json(&report.history, &args.out.join("history.json")).context("writing history")?;
    save_json(&report.losses, &args.out.join("loss.json")).context("writing loss curve")?;
    log::info!("best val accuracy {}", report.best_val_accuracy);

    if !splits.test.is_empty() {
        let decoder = config.decoder.decoder(&tree, config.beam_width);
        let eval = accuracy(&model, &splits.test, decoder.as_ref(), config.attempt_cap)?;
        log::info!("test accuracy {} on {} words", eval.accuracy, splits.test.len());
    }
    Ok(())
}
