// File: src/learning.rs
use crate::config::TrainingConfig;
use crate::core::decoder::Decoder;
use crate::core::engine::{interactions, play, Interactions, Policy};
use crate::core::features::FeatureMatrix;
use crate::core::trie::PrefixTree;
use crate::core::types::{Logits, Word, WORD_LEN};
use crate::dataset::{Dataset, Splits};
use crate::error::{Result, WordleError};
use crate::model::{cross_entropy, Adam, Mlp, Model};
use crate::persistence::save_model;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::time::Instant;

/// `epoch -> interactions` for a whole run.
pub type TrainingHistory = BTreeMap<usize, Interactions>;

/// Takes one optimizer step per proposal, accumulating the loss.
struct Learner<'m> {
    model: &'m mut Mlp,
    optimizer: &'m mut Adam,
    labels: [usize; WORD_LEN],
    loss: f32,
}

impl Policy for Learner<'_> {
    fn propose(&mut self, features: &FeatureMatrix) -> Result<Logits> {
        let (logits, loss) = self.model.train_step(features, &self.labels, self.optimizer);
        self.loss += loss;
        Ok(logits)
    }
}

/// Inference only, accumulating the loss against the secret.
struct Scorer<'m, M: ?Sized> {
    model: &'m M,
    labels: [usize; WORD_LEN],
    loss: f32,
}

impl<M: Model + ?Sized> Policy for Scorer<'_, M> {
    fn propose(&mut self, features: &FeatureMatrix) -> Result<Logits> {
        let logits = self.model.infer(features);
        self.loss += cross_entropy(&logits, &self.labels);
        Ok(logits)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    /// Percent of secrets solved within the cap, four decimals.
    pub accuracy: f64,
    /// Attempt on which each solved secret was found.
    pub attempts: BTreeMap<Word, usize>,
}

/// Plays every secret of `dataset` in parallel.
pub fn accuracy<M, D>(model: &M, dataset: &Dataset, decoder: &D, cap: usize) -> Result<Evaluation>
where
    M: Model + ?Sized,
    D: Decoder + ?Sized,
{
    if dataset.is_empty() {
        return Ok(Evaluation::default());
    }
    let solved: Vec<(Word, Option<usize>)> = dataset
        .words()
        .par_iter()
        .map(|&secret| -> Result<(Word, Option<usize>)> {
            let mut policy = model;
            let trace = play(secret, &mut policy, decoder, cap)?;
            Ok((secret, trace.solved_at()))
        })
        .collect::<Result<_>>()?;

    let attempts: BTreeMap<Word, usize> = solved
        .into_iter()
        .filter_map(|(w, at)| at.map(|n| (w, n)))
        .collect();
    let pct = 100.0 * attempts.len() as f64 / dataset.len() as f64;
    Ok(Evaluation { accuracy: (pct * 1e4).round() / 1e4, attempts })
}

/// Sum of per-turn losses over every episode of `dataset`, without updates.
pub fn total_loss<M, D>(model: &M, dataset: &Dataset, decoder: &D, cap: usize) -> Result<f32>
where
    M: Model + ?Sized,
    D: Decoder + ?Sized,
{
    let losses: Vec<f32> = dataset
        .iter()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|(secret, labels)| -> Result<f32> {
            let mut scorer = Scorer { model, labels, loss: 0.0 };
            play(secret, &mut scorer, decoder, cap)?;
            Ok(scorer.loss)
        })
        .collect::<Result<_>>()?;
    Ok(losses.iter().sum())
}

/// Per-epoch results of [`Trainer::train`].
#[derive(Debug, Clone, Default)]
pub struct TrainingReport {
    pub losses: Vec<f32>,
    pub val_accuracy: Vec<f64>,
    pub val_loss: Vec<f32>,
    pub best_val_accuracy: f64,
    pub history: TrainingHistory,
}

/// Runs episodes over the training split, one optimizer step per turn.
pub struct Trainer<'a> {
    config: &'a TrainingConfig,
    tree: &'a PrefixTree,
    pool: Option<rayon::ThreadPool>,
}

impl<'a> Trainer<'a> {
    pub fn new(config: &'a TrainingConfig, tree: &'a PrefixTree) -> Result<Self> {
        config.validate()?;
        let pool = match config.threads {
            0 => None,
            n => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| WordleError::Config(e.to_string()))?,
            ),
        };
        Ok(Self { config, tree, pool })
    }

    fn decoder(&self) -> Box<dyn Decoder + 'a> {
        self.config.decoder.decoder(self.tree, self.config.beam_width)
    }

    fn parallel<T: Send>(&self, job: impl FnOnce() -> T + Send) -> T {
        match &self.pool {
            Some(pool) => pool.install(job),
            None => job(),
        }
    }

    /// Evaluates `model` on `dataset` with this run's decoder and cap.
    pub fn evaluate(&self, model: &Mlp, dataset: &Dataset) -> Result<(Evaluation, f32)> {
        let decoder = self.decoder();
        let cap = self.config.attempt_cap;
        self.parallel(|| {
            let eval = accuracy(model, dataset, decoder.as_ref(), cap)?;
            let loss = total_loss(model, dataset, decoder.as_ref(), cap)?;
            Ok((eval, loss))
        })
    }

    pub fn train(&self, model: &mut Mlp, splits: &Splits) -> Result<TrainingReport> {
        let config = self.config;
        let decoder = self.decoder();
        let mut optimizer = Adam::new(model, config.learning_rate);
        let mut report = TrainingReport { best_val_accuracy: f64::NEG_INFINITY, ..Default::default() };

        log::info!(
            "training {} parameters on {} words ({} val) for {} epochs, {} decoder",
            model.parameter_count(),
            splits.train.len(),
            splits.val.len(),
            config.epochs,
            config.decoder
        );

        for epoch in 0..config.epochs {
            let start = Instant::now();
            let mut epoch_loss = 0.0;
            let mut traces = Vec::with_capacity(splits.train.len());

            for (i, (secret, labels)) in splits.train.iter().enumerate() {
                log::trace!("epoch {epoch} word {secret} {}/{}", i + 1, splits.train.len());
                let mut learner = Learner { model: &mut *model, optimizer: &mut optimizer, labels, loss: 0.0 };
                let trace = play(secret, &mut learner, decoder.as_ref(), config.attempt_cap)?;
                epoch_loss += learner.loss;
                traces.push(trace);
            }

            let (eval, val_loss) = self.evaluate(model, &splits.val)?;
            log::info!(
                "epoch {} / {}, loss => {:.4}, val_acc => {}, val_loss => {:.4} ({:.1?})",
                epoch,
                config.epochs,
                epoch_loss,
                eval.accuracy,
                val_loss,
                start.elapsed()
            );

            if eval.accuracy > report.best_val_accuracy {
                report.best_val_accuracy = eval.accuracy;
                if let Some(path) = &config.checkpoint {
                    save_model(model, path)?;
                }
            }

            report.losses.push(epoch_loss);
            report.val_accuracy.push(eval.accuracy);
            report.val_loss.push(val_loss);
            report.history.insert(epoch, interactions(&traces));
        }
        Ok(report)
    }
}
