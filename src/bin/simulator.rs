// src/bin/simulator.rs
use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use wordle_core::display::{colored_trace, history_accuracy};
use wordle_core::learning::TrainingHistory;
use wordle_core::persistence::load_json;
use wordle_core::Word;

/// Replays a saved interaction history.
#[derive(Parser, Debug)]
#[command(name = "simulator")]
struct Args {
    #[arg(long, default_value = "out/history.json")]
    history: PathBuf,

    /// Epochs to report accuracy for; defaults to every epoch
    #[arg(long, value_delimiter = ',')]
    epochs: Vec<usize>,

    /// Print every secret's turns for this epoch; defaults to the last
    #[arg(long)]
    turns: Option<usize>,

    /// Show how this word was played in each epoch
    #[arg(long)]
    word: Option<Word>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let history: TrainingHistory =
        load_json(&args.history).with_context(|| format!("reading {}", args.history.display()))?;
    let Some(&last) = history.keys().next_back() else {
        bail!("{} holds no epochs", args.history.display());
    };

    let epochs: Vec<usize> = if args.epochs.is_empty() { history.keys().copied().collect() } else { args.epochs };
    for epoch in epochs {
        match history.get(&epoch) {
            Some(data) => println!("Epoch {epoch} => accuracy = {:.4}", history_accuracy(data)),
            None => println!("Epoch {epoch} => not recorded"),
        }
    }

    let epoch = args.turns.unwrap_or(last);
    let data = history.get(&epoch).with_context(|| format!("epoch {epoch} not recorded"))?;
    println!("\nEpoch {epoch} turns:");
    for (secret, record) in data {
        println!("{secret} : {}", colored_trace(record));
    }

    if let Some(word) = args.word {
        println!("\n{word} through the epochs:");
        for (epoch, data) in &history {
            if let Some(record) = data.get(&word) {
                println!("{epoch:>4} : {}", colored_trace(record));
            }
        }
    }
    Ok(())
}
