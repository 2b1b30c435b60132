use crate::random::RandomSource;

/// Base62 alphabet: digits, then lowercase, then uppercase.
pub const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

pub const DEFAULT_CODE_LENGTH: usize = 6;

/// Produces short codes, either from a caller-supplied alias or at random.
///
/// No registry of issued codes is kept, so two random codes may collide.
#[derive(Debug, Clone, Copy)]
pub struct CodeGenerator {
    length: usize,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self {
            length: DEFAULT_CODE_LENGTH,
        }
    }

    pub fn with_length(length: usize) -> Self {
        Self { length }
    }

    /// A non-empty alias is returned verbatim (no trimming, no format check).
    /// Otherwise a random code of the configured length is drawn.
    pub fn generate(&self, alias: Option<&str>, rng: &dyn RandomSource) -> String {
        match alias.filter(|a| !a.is_empty()) {
            Some(alias) => alias.to_owned(),
            None => random_code(self.length, rng),
        }
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Each symbol is drawn independently and uniformly from [`ALPHABET`].
fn random_code(len: usize, rng: &dyn RandomSource) -> String {
    (0..len)
        .map(|_| ALPHABET[rng.next_below(ALPHABET.len() as u32) as usize] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{testing::ScriptedRandom, SeededRandom, ThreadRandom};
    use proptest::prelude::*;

    #[test]
    fn default_code_is_six_base62_chars() {
        let generator = CodeGenerator::new();
        let code = generator.generate(None, &ThreadRandom);

        assert_eq!(code.len(), 6);
        assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn custom_length() {
        let generator = CodeGenerator::with_length(10);
        let code = generator.generate(None, &ThreadRandom);

        assert_eq!(code.len(), 10);
    }

    #[test]
    fn empty_alias_falls_back_to_random() {
        let generator = CodeGenerator::new();
        let code = generator.generate(Some(""), &SeededRandom::new(3));
        assert_eq!(code.len(), 6);
    }

    #[test]
    fn alias_is_used_verbatim() {
        let generator = CodeGenerator::new();
        assert_eq!(generator.generate(Some("mylink"), &ThreadRandom), "mylink");
        assert_eq!(generator.generate(Some("  spaced "), &ThreadRandom), "  spaced ");
        assert_eq!(
            generator.generate(Some("much-longer-than-six"), &ThreadRandom),
            "much-longer-than-six"
        );
    }

    #[test]
    fn symbols_map_through_alphabet_order() {
        let rng = ScriptedRandom::new(vec![0, 9, 10, 35, 36, 61]);
        let code = CodeGenerator::new().generate(None, &rng);
        assert_eq!(code, "09azAZ");
    }

    #[test]
    fn symbol_frequencies_are_roughly_uniform() {
        let generator = CodeGenerator::with_length(1);
        let rng = SeededRandom::new(0x5eed);
        let draws = 10_000usize;
        let mut counts = [0usize; 62];

        for _ in 0..draws {
            let code = generator.generate(None, &rng);
            let idx = ALPHABET
                .iter()
                .position(|&b| b == code.as_bytes()[0])
                .expect("symbol from alphabet");
            counts[idx] += 1;
        }

        let expected = draws as f64 / 62.0;
        let chi_square: f64 = counts
            .iter()
            .map(|&observed| {
                let diff = observed as f64 - expected;
                diff * diff / expected
            })
            .sum();

        // 61 degrees of freedom; 99.9th percentile is about 100.9.
        assert!(chi_square < 100.9, "chi-square too large: {chi_square}");
        assert!(counts.iter().all(|&c| c > 0));
    }

    proptest! {
        #[test]
        fn non_empty_alias_is_identity(alias in ".{1,32}") {
            let out = CodeGenerator::new().generate(Some(&alias), &ThreadRandom);
            prop_assert_eq!(out, alias);
        }

        #[test]
        fn random_codes_respect_length_and_alphabet(seed in any::<u64>(), len in 1usize..16) {
            let code = CodeGenerator::with_length(len).generate(None, &SeededRandom::new(seed));
            prop_assert_eq!(code.len(), len);
            prop_assert!(code.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }
}
