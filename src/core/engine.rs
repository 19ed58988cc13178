use crate::core::decoder::Decoder;
use crate::core::features::FeatureMatrix;
use crate::core::feedback::score;
use crate::core::types::{Feedback, Logits, Word};
use crate::error::{Result, WordleError};
use crate::model::Model;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Anything that turns the current feature matrix into scores for the next guess.
///
/// Plain inference goes through the blanket impl for `&M where M: Model`; training
/// wraps a model so that every proposal also takes an optimizer step.
pub trait Policy {
    fn propose(&mut self, features: &FeatureMatrix) -> Result<Logits>;
}

impl<M: Model + ?Sized> Policy for &M {
    fn propose(&mut self, features: &FeatureMatrix) -> Result<Logits> {
        Ok(self.infer(features))
    }
}

/// Where an episode is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingGuess,
    /// Between scoring a guess and folding it into the features.
    Scored,
    Done,
}

/// One recorded turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attempt {
    pub feedback: Feedback,
    pub guessed_word: Word,
}

/// `secret -> attempt index -> record`, the shape downstream tooling reads.
pub type Interactions = BTreeMap<Word, BTreeMap<usize, Attempt>>;

/// Every attempt made against one secret, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trace {
    pub secret: Word,
    pub attempts: Vec<Attempt>,
}

impl Trace {
    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn solved(&self) -> bool {
        self.attempts.last().is_some_and(|a| a.guessed_word == self.secret)
    }

    /// 1-based attempt on which the secret was found.
    pub fn solved_at(&self) -> Option<usize> {
        self.solved().then_some(self.attempts.len())
    }

    /// `attempt index -> record`, the shape persisted per secret.
    pub fn to_record(&self) -> BTreeMap<usize, Attempt> {
        self.attempts.iter().copied().enumerate().collect()
    }
}

/// Collects traces into the persisted [`Interactions`] shape.
pub fn interactions<'a, I>(traces: I) -> Interactions
where
    I: IntoIterator<Item = &'a Trace>,
{
    traces.into_iter().map(|t| (t.secret, t.to_record())).collect()
}

/// Turn loop for one secret word.
///
/// Owns its feature matrix. Ends when the guess equals the secret or after `cap`
/// attempts, whichever comes first.
#[derive(Debug, Clone)]
pub struct Episode {
    secret: Word,
    features: FeatureMatrix,
    attempts: Vec<Attempt>,
    cap: usize,
    phase: Phase,
}

impl Episode {
    pub fn new(secret: Word, cap: usize) -> Self {
        Self {
            secret,
            features: FeatureMatrix::default(),
            attempts: Vec::with_capacity(cap),
            cap,
            phase: if cap == 0 { Phase::Done } else { Phase::AwaitingGuess },
        }
    }

    pub fn secret(&self) -> &Word {
        &self.secret
    }

    pub fn features(&self) -> &FeatureMatrix {
        &self.features
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }

    /// Plays one turn: infer, decode, score, update.
    pub fn step<P, D>(&mut self, policy: &mut P, decoder: &D) -> Result<Attempt>
    where
        P: Policy + ?Sized,
        D: Decoder + ?Sized,
    {
        if self.is_done() {
            return Err(WordleError::EpisodeOver { secret: self.secret.to_string() });
        }

        let logits = policy.propose(&self.features)?;
        let guessed_word = decoder.decode(&logits)?;
        let feedback = score(&guessed_word, &self.secret);
        self.phase = Phase::Scored;

        self.features.apply_feedback(&feedback, &guessed_word);
        let attempt = Attempt { feedback, guessed_word };
        self.attempts.push(attempt);
        log::debug!(
            "{} attempt {}: {} {:?}",
            self.secret,
            self.attempts.len(),
            guessed_word,
            feedback.symbols()
        );

        self.phase = if guessed_word == self.secret || self.attempts.len() >= self.cap {
            Phase::Done
        } else {
            Phase::AwaitingGuess
        };
        Ok(attempt)
    }

    /// Plays turns until done.
    pub fn run<P, D>(mut self, policy: &mut P, decoder: &D) -> Result<Trace>
    where
        P: Policy + ?Sized,
        D: Decoder + ?Sized,
    {
        while !self.is_done() {
            self.step(policy, decoder)?;
        }
        Ok(self.into_trace())
    }

    pub fn into_trace(self) -> Trace {
        Trace { secret: self.secret, attempts: self.attempts }
    }
}

/// Shorthand for a fresh [`Episode`] run to completion.
pub fn play<P, D>(secret: Word, policy: &mut P, decoder: &D, cap: usize) -> Result<Trace>
where
    P: Policy + ?Sized,
    D: Decoder + ?Sized,
{
    Episode::new(secret, cap).run(policy, decoder)
}
