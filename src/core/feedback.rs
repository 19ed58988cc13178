// src/core/feedback.rs
use crate::core::types::{letter_index, Feedback, Mark, Word, ALPHABET, WORD_LEN};
use crate::error::Result;

fn counts(word: &Word) -> [u8; ALPHABET] {
    let mut counts = [0u8; ALPHABET];
    for &b in word.bytes() {
        counts[letter_index(b)] += 1;
    }
    counts
}

/// Scores `guess` against `secret`.
///
/// Each letter of the secret carries a budget of `min(count in secret, count in guess)`
/// marks. Exact positions spend the budget first, then misplaced letters left to right,
/// so a letter repeated in the guess is never marked more often than the secret holds it.
pub fn score(guess: &Word, secret: &Word) -> Feedback {
    let secret_counts = counts(secret);
    let guess_counts = counts(guess);

    let mut budget = [0u8; ALPHABET];
    for k in 0..ALPHABET {
        if secret_counts[k] > 0 {
            budget[k] = if guess_counts[k] > 0 {
                secret_counts[k].min(guess_counts[k])
            } else {
                secret_counts[k]
            };
        }
    }

    let g = guess.bytes();
    let s = secret.bytes();
    let mut marks = [Mark::Absent; WORD_LEN];

    for i in 0..WORD_LEN {
        let k = letter_index(g[i]);
        if g[i] == s[i] && budget[k] > 0 {
            marks[i] = Mark::Correct;
            budget[k] -= 1;
        }
    }

    for i in 0..WORD_LEN {
        let k = letter_index(g[i]);
        if marks[i] == Mark::Absent && secret_counts[k] > 0 && budget[k] > 0 {
            marks[i] = Mark::Present;
            budget[k] -= 1;
        }
    }

    Feedback::new(marks)
}

/// String entry point: validates both words, then [`score`]s.
pub fn feedback(guess: &str, secret: &str) -> Result<Feedback> {
    let guess = Word::new(guess)?;
    let secret = Word::new(secret)?;
    Ok(score(&guess, &secret))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WordleError;
    use Mark::{Absent as A, Correct as C, Present as P};

    fn fb(guess: &str, secret: &str) -> [Mark; WORD_LEN] {
        *feedback(guess, secret).unwrap().marks()
    }

    #[test]
    fn identical_words_are_all_correct() {
        assert_eq!(fb("hello", "hello"), [C; 5]);
        assert!(feedback("hello", "hello").unwrap().is_solved());
    }

    #[test]
    fn repeated_letters_respect_budget() {
        // secret a:3 b:2, guess a:2 b:3, so both budgets are 2
        assert_eq!(fb("aabbb", "ababa"), [C, P, P, C, A]);
        // secret a:2 b:1: the third 'b' and nothing else goes unmarked
        assert_eq!(fb("aabbb", "abaxy"), [C, P, P, A, A]);
    }

    #[test]
    fn single_secret_letter_marks_one_guess_copy() {
        // secret has one 'a'
        assert_eq!(fb("brash", "ctaju"), [A, A, C, A, A]);
        assert_eq!(fb("brsah", "ctaju"), [A, A, A, P, A]);
        assert_eq!(fb("braas", "ctaju"), [A, A, C, A, A]);
        assert_eq!(fb("baars", "ctaju"), [A, A, C, A, A]);
        assert_eq!(fb("baras", "ctaju"), [A, P, A, A, A]);
    }

    #[test]
    fn double_secret_letter() {
        // secret has two 'a's at 2 and 3
        assert_eq!(fb("brash", "ctaau"), [A, A, C, A, A]);
        assert_eq!(fb("barsh", "ctaau"), [A, P, A, A, A]);
        assert_eq!(fb("braah", "ctaau"), [A, A, C, C, A]);
        assert_eq!(fb("barah", "ctaau"), [A, P, A, C, A]);
        assert_eq!(fb("braha", "ctaau"), [A, A, C, A, P]);
        assert_eq!(fb("abrha", "ctaau"), [P, A, A, A, P]);
    }

    #[test]
    fn correct_wins_over_earlier_present() {
        // the only 'e' in the secret sits at position 4
        assert_eq!(fb("eerie", "crane"), [A, A, P, A, C]);
    }

    #[test]
    fn marks_never_exceed_min_count() {
        let words = ["aabbb", "ababa", "sassy", "asses", "llama", "hello", "lolly", "crane", "eerie", "geese"];
        for guess in words {
            for secret in words {
                let result = feedback(guess, secret).unwrap();
                for letter in b'a'..=b'z' {
                    let in_guess = guess.bytes().filter(|&b| b == letter).count();
                    let in_secret = secret.bytes().filter(|&b| b == letter).count();
                    let marked = guess
                        .bytes()
                        .zip(result.marks())
                        .filter(|&(b, &m)| b == letter && m != Mark::Absent)
                        .count();
                    assert_eq!(marked, in_guess.min(in_secret), "{guess} vs {secret}");
                }
            }
        }
    }

    #[test]
    fn malformed_words_are_rejected() {
        assert!(matches!(feedback("abc", "hello"), Err(WordleError::InvalidInput { .. })));
        assert!(matches!(feedback("hello", "he-lo"), Err(WordleError::InvalidInput { .. })));
    }
}
