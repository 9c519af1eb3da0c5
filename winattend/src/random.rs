use rand::{Rng, distr::Alphabetic};

/// Generate a random string of ASCII letters whose length lies between `min`
/// and `max` (inclusive).
pub fn random_string(min: usize, max: usize) -> String {
    let mut rng = rand::rng();
    let length = rng.random_range(min..=max.max(min));

    rng.sample_iter(&Alphabetic)
        .take(length)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_string_length() {
        for _ in 0..100 {
            let value = random_string(8, 14);
            assert!(value.len() >= 8 && value.len() <= 14, "{value}");
            assert!(value.chars().all(|c| c.is_ascii_alphabetic()));
        }
    }

    #[test]
    fn test_random_string_fixed_length() {
        assert_eq!(random_string(5, 5).len(), 5);
        assert_eq!(random_string(6, 2).len(), 6);
    }
}
