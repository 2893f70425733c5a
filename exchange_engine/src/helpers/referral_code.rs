use rand::{distributions::Uniform, Rng};

pub const REFERRAL_CODE_LENGTH: usize = 8;
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a random referral code made of upper-case letters and digits.
pub fn generate_referral_code() -> String {
    let mut rng = rand::thread_rng();
    let dist = Uniform::from(0..ALPHABET.len());
    (0..REFERRAL_CODE_LENGTH).map(|_| ALPHABET[rng.sample(dist)] as char).collect()
}
