// src/bin/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{stdin, BufRead};
use std::path::PathBuf;
use wordle_core::display::colored_word;
use wordle_core::persistence::load_model;
use wordle_core::{logging, Episode, Mlp, PrefixTree, Strategy, TrainingConfig, Word};

/// Pick a secret word and watch the model try to find it.
#[derive(Parser, Debug)]
#[command(name = "wordle_engine")]
struct Args {
    #[arg(long, default_value = "data/words.txt")]
    vocab: PathBuf,

    /// Trained checkpoint; a fresh model is used when it cannot be read
    #[arg(long, default_value = "out/model.bin")]
    model: PathBuf,

    #[arg(long, default_value_t = Strategy::Beam)]
    decoder: Strategy,

    #[arg(long, default_value_t = 3)]
    beam_width: usize,

    #[arg(long, default_value_t = 6)]
    attempts: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(log::LevelFilter::Info, None)?;

    let tree = PrefixTree::from_file(&args.vocab)
        .with_context(|| format!("loading vocabulary {}", args.vocab.display()))?;
    let model = match load_model(&args.model) {
        Ok(model) => model,
        Err(e) => {
            log::warn!("no usable checkpoint at {} ({e}), playing untrained", args.model.display());
            let defaults = TrainingConfig::default();
            Mlp::new(defaults.hidden, defaults.seed)
        }
    };
    let decoder = args.decoder.decoder(&tree, args.beam_width.max(1));

    println!("Wordle engine: {} words. Type a secret word, or 'quit'.", tree.len());
    println!("-------------------------------------------------------");

    for line in stdin().lock().lines() {
        let input = line?;
        let input = input.trim();
        if input.eq_ignore_ascii_case("quit") {
            break;
        }
        if input.is_empty() {
            continue;
        }
        let secret = match Word::parse_folded(input) {
            Ok(word) => word,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        if !tree.contains_word(&secret) {
            println!("note: {secret} is not in the vocabulary, the beam decoder can never guess it");
        }

        let mut episode = Episode::new(secret, args.attempts);
        while !episode.is_done() {
            let attempt = episode.step(&mut &model, decoder.as_ref())?;
            println!("  {}: {}", episode.attempts().len(), colored_word(&attempt.guessed_word, &attempt.feedback));
        }
        let trace = episode.into_trace();
        match trace.solved_at() {
            Some(n) => println!("solved {secret} in {n}"),
            None => println!("missed {secret} after {} attempts", trace.len()),
        }
    }
    Ok(())
}
