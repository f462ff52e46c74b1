use rand::{distributions::Alphanumeric, thread_rng, Rng};

pub const TOKEN_LENGTH: usize = 30;

pub fn generate_token() -> String {
    thread_rng().sample_iter(&Alphanumeric).take(TOKEN_LENGTH).map(char::from).collect()
}

/// Identifiers end up in file names, so only a conservative alphabet is accepted.
pub fn is_safe_identifier(id: &str) -> bool {
    !id.is_empty() && id.len() <= 128 && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
