// File: src/model.rs
use crate::core::features::{FeatureMatrix, FEATURE_LEN};
use crate::core::types::{Logits, ALPHABET, WORD_LEN};
use ndarray::{Array, Array1, Array2, Axis, Dimension, Ix1, Ix2, ShapeBuilder, Zip};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Output width: five heads of 26 letters.
pub const OUTPUTS: usize = WORD_LEN * ALPHABET;

/// The single capability the game core needs from a player: scores for the next
/// guess given what is known so far. Neural nets, lookup tables or heuristics alike.
pub trait Model: Sync {
    fn infer(&self, features: &FeatureMatrix) -> Logits;
}

/// Mean over the five positions of the softmax cross-entropy against `labels`.
pub fn cross_entropy(logits: &Logits, labels: &[usize; WORD_LEN]) -> f32 {
    let total: f32 = logits
        .log_softmax()
        .rows()
        .iter()
        .zip(labels)
        .map(|(row, &label)| -row[label])
        .sum();
    total / WORD_LEN as f32
}

/// Shallow multi-head classifier: 312 inputs, one ReLU hidden layer, five linear
/// heads of 26 letters sharing that layer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mlp {
    hidden: usize,
    /// hidden x FEATURE_LEN
    w1: Array2<f32>,
    b1: Array1<f32>,
    /// OUTPUTS x hidden
    w2: Array2<f32>,
    b2: Array1<f32>,
}

/// Activations kept from a forward pass for the backward pass.
struct Forward {
    input: Array1<f32>,
    pre: Array1<f32>,
    act: Array1<f32>,
    logits: Logits,
}

/// Same shapes as the parameters of [`Mlp`].
#[derive(Clone, Debug)]
pub struct Gradients {
    w1: Array2<f32>,
    b1: Array1<f32>,
    w2: Array2<f32>,
    b2: Array1<f32>,
}

fn uniform<Sh: ShapeBuilder>(rng: &mut SmallRng, shape: Sh, fan_in: usize) -> Array<f32, Sh::Dim> {
    let bound = 1.0 / (fan_in as f32).sqrt();
    Array::from_shape_fn(shape, |_| rng.random_range(-bound..bound))
}

/// `a b^T`
fn outer(a: &Array1<f32>, b: &Array1<f32>) -> Array2<f32> {
    a.view().insert_axis(Axis(1)).dot(&b.view().insert_axis(Axis(0)))
}

impl Mlp {
    /// Uniform init in +-1/sqrt(fan_in), seeded.
    pub fn new(hidden: usize, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let w1 = uniform(&mut rng, (hidden, FEATURE_LEN), FEATURE_LEN);
        let b1 = uniform(&mut rng, hidden, FEATURE_LEN);
        let w2 = uniform(&mut rng, (OUTPUTS, hidden), hidden);
        let b2 = uniform(&mut rng, OUTPUTS, hidden);
        Self { hidden, w1, b1, w2, b2 }
    }

    pub fn hidden(&self) -> usize {
        self.hidden
    }

    pub fn parameter_count(&self) -> usize {
        self.w1.len() + self.b1.len() + self.w2.len() + self.b2.len()
    }

    fn forward(&self, features: &FeatureMatrix) -> Forward {
        let input = Array1::from(features.to_input());
        let pre = self.w1.dot(&input) + &self.b1;
        let act = pre.mapv(|z| z.max(0.0));
        let out = self.w2.dot(&act) + &self.b2;
        let logits = Logits::from_flat(&out.to_vec()).unwrap_or_else(|_| Logits::zeros());
        Forward { input, pre, act, logits }
    }

    /// Loss and parameter gradients for one example.
    fn backward(&self, fwd: &Forward, labels: &[usize; WORD_LEN]) -> (f32, Gradients) {
        let loss = cross_entropy(&fwd.logits, labels);

        // d loss / d logits = (softmax - onehot) / WORD_LEN
        let log_probs = fwd.logits.log_softmax();
        let d_out = Array1::from_shape_fn(OUTPUTS, |i| {
            let (p, k) = (i / ALPHABET, i % ALPHABET);
            let target = if k == labels[p] { 1.0 } else { 0.0 };
            (log_probs[p][k].exp() - target) / WORD_LEN as f32
        });

        let w2 = outer(&d_out, &fwd.act);
        let d_act = self.w2.t().dot(&d_out);
        let d_pre = Zip::from(&d_act)
            .and(&fwd.pre)
            .map_collect(|&g, &z| if z > 0.0 { g } else { 0.0 });
        let w1 = outer(&d_pre, &fwd.input);

        (loss, Gradients { w1, b1: d_pre, w2, b2: d_out })
    }

    /// Forward, backward and one optimizer update. Returns the logits and loss
    /// computed before the update.
    pub fn train_step(&mut self, features: &FeatureMatrix, labels: &[usize; WORD_LEN], optimizer: &mut Adam) -> (Logits, f32) {
        let fwd = self.forward(features);
        let (loss, grads) = self.backward(&fwd, labels);
        optimizer.step(self, &grads);
        (fwd.logits, loss)
    }
}

impl Model for Mlp {
    fn infer(&self, features: &FeatureMatrix) -> Logits {
        self.forward(features).logits
    }
}

/// Hyperparameters and bias corrections for one update.
#[derive(Clone, Copy)]
struct Update {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    eps: f32,
    c1: f32,
    c2: f32,
}

/// First and second moment estimates for one parameter tensor.
#[derive(Clone, Debug)]
struct Moments<D: Dimension> {
    m: Array<f32, D>,
    v: Array<f32, D>,
}

impl<D: Dimension> Moments<D> {
    fn like(param: &Array<f32, D>) -> Self {
        Self { m: Array::zeros(param.raw_dim()), v: Array::zeros(param.raw_dim()) }
    }

    fn apply(&mut self, param: &mut Array<f32, D>, grad: &Array<f32, D>, u: Update) {
        Zip::from(param)
            .and(grad)
            .and(&mut self.m)
            .and(&mut self.v)
            .for_each(|p, &g, m, v| {
                *m = u.beta1 * *m + (1.0 - u.beta1) * g;
                *v = u.beta2 * *v + (1.0 - u.beta2) * g * g;
                *p -= u.learning_rate * (*m / u.c1) / ((*v / u.c2).sqrt() + u.eps);
            });
    }
}

/// Adam with bias correction.
#[derive(Clone, Debug)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    eps: f32,
    t: i32,
    w1: Moments<Ix2>,
    b1: Moments<Ix1>,
    w2: Moments<Ix2>,
    b2: Moments<Ix1>,
}

impl Adam {
    pub fn new(model: &Mlp, learning_rate: f32) -> Self {
        Self {
            learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
            t: 0,
            w1: Moments::like(&model.w1),
            b1: Moments::like(&model.b1),
            w2: Moments::like(&model.w2),
            b2: Moments::like(&model.b2),
        }
    }

    pub fn steps(&self) -> i32 {
        self.t
    }

    pub fn step(&mut self, model: &mut Mlp, grads: &Gradients) {
        self.t = self.t.saturating_add(1);
        let u = Update {
            learning_rate: self.learning_rate,
            beta1: self.beta1,
            beta2: self.beta2,
            eps: self.eps,
            c1: 1.0 - self.beta1.powi(self.t),
            c2: 1.0 - self.beta2.powi(self.t),
        };
        self.w1.apply(&mut model.w1, &grads.w1, u);
        self.b1.apply(&mut model.b1, &grads.b1, u);
        self.w2.apply(&mut model.w2, &grads.w2, u);
        self.b2.apply(&mut model.b2, &grads.b2, u);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::feedback::score;
    use crate::core::types::Word;

    fn features_after(guess: &str, secret: &str) -> FeatureMatrix {
        let guess = Word::new(guess).unwrap();
        let secret = Word::new(secret).unwrap();
        let mut f = FeatureMatrix::default();
        f.apply_feedback(&score(&guess, &secret), &guess);
        f
    }

    #[test]
    fn shapes_and_determinism() {
        let a = Mlp::new(8, 2002);
        let b = Mlp::new(8, 2002);
        assert_eq!(a.parameter_count(), 8 * FEATURE_LEN + 8 + OUTPUTS * 8 + OUTPUTS);
        let f = FeatureMatrix::default();
        assert_eq!(a.infer(&f), b.infer(&f));
        assert_ne!(Mlp::new(8, 1).infer(&f), a.infer(&f));
    }

    #[test]
    fn cross_entropy_of_uniform_is_ln_alphabet() {
        let loss = cross_entropy(&Logits::zeros(), &[0, 1, 2, 3, 4]);
        assert!((loss - (ALPHABET as f32).ln()).abs() < 1e-5);
    }

    #[test]
    fn gradients_match_finite_differences() {
        let model = Mlp::new(6, 11);
        let f = features_after("slate", "crane");
        let labels = Word::new("crane").unwrap().labels();
        let fwd = model.forward(&f);
        let (_, grads) = model.backward(&fwd, &labels);

        let eps = 1e-3;
        let central_difference = |tweak: &dyn Fn(&mut Mlp, f32)| {
            let mut plus = model.clone();
            tweak(&mut plus, eps);
            let mut minus = model.clone();
            tweak(&mut minus, -eps);
            (cross_entropy(&plus.infer(&f), &labels) - cross_entropy(&minus.infer(&f), &labels)) / (2.0 * eps)
        };

        for o in [0, 57, OUTPUTS - 1] {
            let numeric = central_difference(&|m: &mut Mlp, d: f32| m.b2[o] += d);
            assert!((numeric - grads.b2[o]).abs() < 2e-3, "b2[{o}]");
            let numeric = central_difference(&|m: &mut Mlp, d: f32| m.w2[[o, 2]] += d);
            assert!((numeric - grads.w2[[o, 2]]).abs() < 2e-3, "w2[{o}, 2]");
        }
        // stay clear of the ReLU kink
        let z_not_guessed = 25 * 12;
        for j in (0..6).filter(|&j| fwd.pre[j].abs() > 0.05) {
            let numeric = central_difference(&|m: &mut Mlp, d: f32| m.b1[j] += d);
            assert!((numeric - grads.b1[j]).abs() < 2e-3, "b1[{j}]");
            let numeric = central_difference(&|m: &mut Mlp, d: f32| m.w1[[j, z_not_guessed]] += d);
            assert!((numeric - grads.w1[[j, z_not_guessed]]).abs() < 2e-3, "w1[{j}, z]");
        }
    }

    #[test]
    fn training_reduces_loss_on_one_example() {
        let mut model = Mlp::new(16, 2002);
        let mut adam = Adam::new(&model, 1e-2);
        let f = features_after("slate", "crane");
        let labels = Word::new("crane").unwrap().labels();
        let (_, first) = model.train_step(&f, &labels, &mut adam);
        let mut last = first;
        for _ in 0..50 {
            last = model.train_step(&f, &labels, &mut adam).1;
        }
        assert!(last < first * 0.5, "{last} !< {first}");
        assert_eq!(adam.steps(), 51);
    }

    #[test]
    fn checkpoints_round_trip_through_bincode() {
        let model = Mlp::new(4, 3);
        let bytes = bincode::serialize(&model).unwrap();
        let back: Mlp = bincode::deserialize(&bytes).unwrap();
        let f = FeatureMatrix::default();
        assert_eq!(model.infer(&f), back.infer(&f));
    }
}
