use log::debug;
use rand::Rng;

use crate::{ChoiceError, WeightedChoice};

/// Pick one schedd with probability proportional to its weight.
///
/// Draws uniformly in `[0, total)` and bisects the cumulative weights, so
/// zero-weight entries are never returned.
pub fn weighted_choice<'a, R>(choices: &'a [WeightedChoice], rng: &mut R) -> Result<&'a str, ChoiceError>
where
    R: Rng + ?Sized,
{
    let mut total = 0.0;
    let mut cumulative = Vec::with_capacity(choices.len());
    for choice in choices {
        if !choice.weight.is_finite() || choice.weight < 0.0 {
            return Err(ChoiceError::InvalidWeight {
                name: choice.name.clone(),
                weight: choice.weight,
            });
        }
        total += choice.weight;
        cumulative.push(total);
    }

    if !total.is_finite() {
        return Err(ChoiceError::WeightOverflow);
    }
    if total <= 0.0 {
        return Err(ChoiceError::EmptyWeightedChoiceSet);
    }

    let x = rng.gen_range(0.0..total);
    let idx = cumulative.partition_point(|&c| c <= x);
    let chosen = choices
        .get(idx)
        .ok_or(ChoiceError::EmptyWeightedChoiceSet)?;

    debug!(
        "Picked {} (weight {:.4} of {:.4})",
        chosen.name, chosen.weight, total
    );
    Ok(&chosen.name)
}

/// [`weighted_choice`] with the thread-local generator.
pub fn pick(choices: &[WeightedChoice]) -> Result<&str, ChoiceError> {
    let mut rng = rand::thread_rng();
    weighted_choice(choices, &mut rng)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn frequencies(choices: &[WeightedChoice], draws: usize, seed: u64) -> HashMap<String, usize> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut counts = HashMap::new();
        for _ in 0..draws {
            let name = weighted_choice(choices, &mut rng).unwrap();
            *counts.entry(name.to_string()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn converges_to_weight_proportions() {
        let choices = vec![
            WeightedChoice::new("a", 1.0),
            WeightedChoice::new("b", 3.0),
            WeightedChoice::new("c", 6.0),
        ];
        let draws = 10_000;
        let counts = frequencies(&choices, draws, 7);

        for (name, expected) in [("a", 0.1), ("b", 0.3), ("c", 0.6)] {
            let observed = counts.get(name).copied().unwrap_or(0) as f64 / draws as f64;
            assert!(
                (observed - expected).abs() < 0.03,
                "{name}: observed {observed}, expected {expected}"
            );
        }
    }

    #[test]
    fn zero_weight_entries_are_never_picked() {
        let choices = vec![
            WeightedChoice::new("never", 0.0),
            WeightedChoice::new("always", 5.0),
            WeightedChoice::new("nope", 0.0),
        ];
        let counts = frequencies(&choices, 1_000, 11);
        assert_eq!(counts.len(), 1);
        assert_eq!(counts["always"], 1_000);
    }

    #[test]
    fn empty_input_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            weighted_choice(&[], &mut rng),
            Err(ChoiceError::EmptyWeightedChoiceSet)
        );
    }

    #[test]
    fn single_zero_weight_fails() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            weighted_choice(&[WeightedChoice::new("A", 0.0)], &mut rng),
            Err(ChoiceError::EmptyWeightedChoiceSet)
        );
    }

    #[test]
    fn negative_or_nan_weight_is_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = weighted_choice(&[WeightedChoice::new("A", -1.0)], &mut rng).unwrap_err();
        assert!(matches!(err, ChoiceError::InvalidWeight { .. }));

        let err = weighted_choice(&[WeightedChoice::new("A", f64::NAN)], &mut rng).unwrap_err();
        assert!(matches!(err, ChoiceError::InvalidWeight { .. }));
    }

    #[test]
    fn weights_summing_past_f64_max_are_rejected() {
        let mut rng = StdRng::seed_from_u64(1);
        let choices = vec![
            WeightedChoice::new("a", f64::MAX),
            WeightedChoice::new("b", f64::MAX),
        ];
        assert_eq!(
            weighted_choice(&choices, &mut rng),
            Err(ChoiceError::WeightOverflow)
        );
    }

    #[test]
    fn pick_uses_thread_rng() {
        let choices = vec![WeightedChoice::new("only", 2.5)];
        assert_eq!(pick(&choices), Ok("only"));
    }
}
