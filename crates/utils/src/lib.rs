use rand::Rng;

/// Creates a random alphanumeric secret of the given length
pub fn create_random_secret(secret_len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&rand::distributions::Alphanumeric)
        .take(secret_len)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_secret_of_requested_length() {
        for len in [1, 16, 64].iter() {
            assert_eq!(create_random_secret(*len).len(), *len);
        }
    }

    #[test]
    fn generates_different_secrets() {
        assert_ne!(create_random_secret(24), create_random_secret(24));
    }
}
