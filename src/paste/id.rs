//! Human-friendly paste identifiers: `adjective-noun-NN`.
//!
//! Uniqueness is only best-effort through store collision checking; after a
//! bounded number of attempts the generator falls back to a 12-character
//! random string. The identifier doubles as the password for unprotected
//! pastes, so it is minted before key derivation.

use rand::seq::IndexedRandom;
use rand::Rng;

use crate::store::{self, DbPool};

const ADJECTIVES: &[&str] = &[
    "happy", "fast", "brave", "bright", "calm", "clever", "cool", "eager", "fancy", "gentle",
    "grand", "great", "kind", "lively", "lucky", "mighty", "nice", "noble", "proud", "quick",
    "quiet", "smart", "strong", "sweet", "tough", "wild", "wise", "young", "bold", "crisp",
    "funny", "jolly", "merry", "silly", "sunny", "vivid", "witty", "zesty", "lazy", "busy",
];

const NOUNS: &[&str] = &[
    "ape", "bat", "bee", "bug", "cat", "cow", "crab", "crow", "dog", "dove", "duck", "eel",
    "elk", "fox", "frog", "goat", "hare", "hawk", "jay", "lamb", "lion", "mole", "moose",
    "mouse", "otter", "owl", "panda", "pig", "pony", "rabbit", "rat", "seal", "shark", "sheep",
    "snail", "snake", "swan", "tiger", "toad", "whale", "wolf", "zebra", "apple", "banana",
    "grape", "kiwi", "lemon", "lime", "mango", "melon", "olive", "orange", "book", "cup",
    "door", "bed", "phone", "shoe", "lamp", "clock", "key", "glass", "plate",
];

const MAX_ATTEMPTS: usize = 100;
const FALLBACK_LEN: usize = 12;
const FALLBACK_CHARSET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Mint an identifier that is free in the store at the time of checking.
pub fn mint(db: &DbPool) -> String {
    let mut rng = rand::rng();

    for _ in 0..MAX_ATTEMPTS {
        let adjective = ADJECTIVES.choose(&mut rng).expect("non-empty word list");
        let noun = NOUNS.choose(&mut rng).expect("non-empty word list");
        let digits: u32 = rng.random_range(10..100);
        let id = format!("{adjective}-{noun}-{digits}");

        match store::get(db, &id) {
            Ok(None) => return id,
            // Taken, or the store hiccuped — try another candidate.
            _ => continue,
        }
    }

    fallback(&mut rng)
}

fn fallback(rng: &mut impl Rng) -> String {
    (0..FALLBACK_LEN)
        .map(|_| FALLBACK_CHARSET[rng.random_range(0..FALLBACK_CHARSET.len())] as char)
        .collect()
}
