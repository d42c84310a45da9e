//! Hash and salt heuristics shared by every codec: algorithm identification
//! from shape, and decomposition of modular-crypt-format (MCF) strings into
//! salt + parameters.
//!
//! Both functions are pure and total. Absence of a match is an expected
//! terminal state (`HashType::Unknown`, empty strings), never an error.
use crate::record::{HashType, SaltEncoding};

/// Identify a hash algorithm from the shape of its string form.
///
/// Ordered decision procedure, first match wins. Order matters because some
/// prefixes are substrings of others (`$argon2id$` vs `$argon2i$`).
pub fn detect_hash_type(hash: &str) -> HashType {
    // Modular crypt prefixes
    if hash.starts_with("$2a$") || hash.starts_with("$2b$") || hash.starts_with("$2y$") {
        return HashType::Bcrypt;
    }
    if hash.starts_with("$argon2id$") {
        return HashType::Argon2id;
    }
    if hash.starts_with("$argon2i$") {
        return HashType::Argon2i;
    }
    if hash.starts_with("$scrypt$") {
        return HashType::Scrypt;
    }
    if hash.starts_with("$pbkdf2") {
        return HashType::Pbkdf2;
    }
    if hash.starts_with("$6$") {
        return HashType::Sha512Crypt;
    }
    if hash.starts_with("$5$") {
        return HashType::Sha256Crypt;
    }
    if hash.starts_with("$1$") {
        return HashType::Md5Crypt;
    }
    if hash.starts_with("$apr1$") {
        return HashType::Apr1;
    }
    if hash.starts_with("$sha1$") {
        return HashType::Sha1Crypt;
    }

    // MySQL native password: '*' + 40 hex chars
    if let Some(rest) = hash.strip_prefix('*')
        && rest.len() == 40
        && is_hex(rest)
    {
        return HashType::Mysql;
    }

    // Fixed-length pure-hex hashes
    if is_hex(hash) {
        match hash.len() {
            32 => return HashType::Md5,
            40 => return HashType::Sha1,
            56 => return HashType::Sha224,
            64 => return HashType::Sha256,
            96 => return HashType::Sha384,
            128 => return HashType::Sha512,
            _ => {}
        }
    }

    HashType::Unknown
}

/// Non-empty and all hex characters.
pub fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Extract embedded salt and parameters from a modular-crypt-format string.
/// Returns `(salt, params)` — either may be empty. Unrecognized algorithm
/// tags and malformed segment counts degrade to `("", "")`.
pub fn decompose_mcf(hash: &str) -> (String, String) {
    let Some(rest) = hash.strip_prefix('$') else {
        return (String::new(), String::new());
    };

    let parts: Vec<&str> = rest.split('$').collect();
    if parts.len() < 2 {
        return (String::new(), String::new());
    }

    let algo = parts[0];
    match algo {
        // bcrypt: $2b$rounds$salt+hash, salt is first 22 bytes of parts[2].
        // get() rather than indexing: a salt region holding multi-byte
        // UTF-8 without a char boundary at 22 must degrade, not panic.
        "2a" | "2b" | "2y" => {
            if parts.len() >= 3
                && let Some(salt) = parts[2].get(..22)
            {
                return (salt.to_string(), format!("rounds={}", parts[1]));
            }
        }
        // sha512crypt/sha256crypt/md5crypt: $algo$[rounds=N$]salt$hash
        "6" | "5" | "1" => {
            if parts.len() >= 3 {
                if parts[1].starts_with("rounds=") {
                    if parts.len() >= 4 {
                        return (parts[2].to_string(), parts[1].to_string());
                    }
                } else {
                    return (parts[1].to_string(), String::new());
                }
            }
        }
        // $argon2id$v=19$m=65536,t=3,p=4$salt$hash
        "argon2id" | "argon2i" => {
            if parts.len() >= 5 {
                return (parts[3].to_string(), format!("{},{}", parts[1], parts[2]));
            }
        }
        // $scrypt$params$salt$hash
        "scrypt" => {
            if parts.len() >= 4 {
                return (parts[2].to_string(), parts[1].to_string());
            }
        }
        // $sha1$rounds$salt$hash
        "sha1" => {
            if parts.len() >= 4 {
                return (parts[2].to_string(), format!("rounds={}", parts[1]));
            }
        }
        // $apr1$salt$hash
        "apr1" => {
            if parts.len() >= 3 {
                return (parts[1].to_string(), String::new());
            }
        }
        _ => {
            // $pbkdf2-sha256$rounds$salt$hash (prefix match on the tag)
            if algo.starts_with("pbkdf2") && parts.len() >= 4 {
                return (parts[2].to_string(), format!("rounds={}", parts[1]));
            }
        }
    }

    (String::new(), String::new())
}

/// Guess how a salt string is encoded. All-hex strings are assumed hex,
/// anything else UTF-8.
pub fn guess_salt_encoding(s: &str) -> SaltEncoding {
    if is_hex(s) {
        SaltEncoding::Hex
    } else {
        SaltEncoding::Utf8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_mcf_prefixes() {
        assert_eq!(detect_hash_type("$2b$12$abc"), HashType::Bcrypt);
        assert_eq!(detect_hash_type("$2y$10$abc"), HashType::Bcrypt);
        assert_eq!(
            detect_hash_type("$argon2id$v=19$m=65536,t=3,p=4$c$h"),
            HashType::Argon2id
        );
        assert_eq!(detect_hash_type("$argon2i$v=19$m=16,t=2,p=1$c$h"), HashType::Argon2i);
        assert_eq!(detect_hash_type("$scrypt$ln=16,r=8,p=1$c$h"), HashType::Scrypt);
        assert_eq!(detect_hash_type("$pbkdf2-sha256$29000$s$h"), HashType::Pbkdf2);
        assert_eq!(detect_hash_type("$6$salt$hash"), HashType::Sha512Crypt);
        assert_eq!(detect_hash_type("$5$salt$hash"), HashType::Sha256Crypt);
        assert_eq!(detect_hash_type("$1$salt$hash"), HashType::Md5Crypt);
        assert_eq!(detect_hash_type("$apr1$salt$hash"), HashType::Apr1);
        assert_eq!(detect_hash_type("$sha1$48000$salt$hash"), HashType::Sha1Crypt);
    }

    #[test]
    fn detects_mysql_native() {
        let h = format!("*{}", "A".repeat(40));
        assert_eq!(detect_hash_type(&h), HashType::Mysql);
        // wrong length stays unknown
        let short = format!("*{}", "A".repeat(39));
        assert_eq!(detect_hash_type(&short), HashType::Unknown);
    }

    #[test]
    fn detects_fixed_length_hex() {
        assert_eq!(detect_hash_type(&"a".repeat(32)), HashType::Md5);
        assert_eq!(detect_hash_type(&"a".repeat(40)), HashType::Sha1);
        assert_eq!(detect_hash_type(&"a".repeat(56)), HashType::Sha224);
        assert_eq!(detect_hash_type(&"a".repeat(64)), HashType::Sha256);
        assert_eq!(detect_hash_type(&"a".repeat(96)), HashType::Sha384);
        assert_eq!(detect_hash_type(&"a".repeat(128)), HashType::Sha512);
    }

    #[test]
    fn non_hex_and_odd_lengths_are_unknown() {
        assert_eq!(detect_hash_type(""), HashType::Unknown);
        assert_eq!(detect_hash_type("hello world"), HashType::Unknown);
        assert_eq!(detect_hash_type(&"g".repeat(32)), HashType::Unknown);
        assert_eq!(detect_hash_type(&"a".repeat(33)), HashType::Unknown);
    }

    #[test]
    fn decomposes_bcrypt() {
        let salt = "N9qo8uLOickgx2ZMRZoMye";
        let hash = format!("$2b$12${salt}IjZAgcfl7p92ldGxad68L");
        let (s, p) = decompose_mcf(&hash);
        assert_eq!(s, salt);
        assert_eq!(p, "rounds=12");
    }

    #[test]
    fn decomposes_sha512crypt_with_and_without_rounds() {
        let (s, p) = decompose_mcf("$6$rounds=5000$mysalt$digest");
        assert_eq!(s, "mysalt");
        assert_eq!(p, "rounds=5000");
        let (s, p) = decompose_mcf("$6$mysalt$digest");
        assert_eq!(s, "mysalt");
        assert_eq!(p, "");
    }

    #[test]
    fn decomposes_argon2_scrypt_pbkdf2_apr1() {
        let (s, p) = decompose_mcf("$argon2id$v=19$m=65536,t=3,p=4$c2FsdA$aGFzaA");
        assert_eq!(s, "c2FsdA");
        assert_eq!(p, "v=19,m=65536,t=3,p=4");

        let (s, p) = decompose_mcf("$scrypt$ln=16,r=8,p=1$c2FsdA$aGFzaA");
        assert_eq!(s, "c2FsdA");
        assert_eq!(p, "ln=16,r=8,p=1");

        let (s, p) = decompose_mcf("$pbkdf2-sha256$29000$c2FsdA$aGFzaA");
        assert_eq!(s, "c2FsdA");
        assert_eq!(p, "rounds=29000");

        let (s, p) = decompose_mcf("$apr1$c2FsdA$aGFzaA");
        assert_eq!(s, "c2FsdA");
        assert_eq!(p, "");
    }

    #[test]
    fn bcrypt_salt_without_char_boundary_degrades_to_empty() {
        // 8 three-byte chars: 24 bytes, no boundary at byte 22
        let hash = format!("$2b$12${}", "€".repeat(8));
        assert_eq!(decompose_mcf(&hash), (String::new(), String::new()));
        // too-short salt region degrades the same way
        assert_eq!(decompose_mcf("$2b$12$short"), (String::new(), String::new()));
    }

    #[test]
    fn unknown_tags_and_short_inputs_degrade_to_empty() {
        assert_eq!(decompose_mcf("no-dollar"), (String::new(), String::new()));
        assert_eq!(decompose_mcf("$"), (String::new(), String::new()));
        assert_eq!(decompose_mcf("$md5"), (String::new(), String::new()));
        assert_eq!(decompose_mcf("$weird$a$b$c"), (String::new(), String::new()));
        // pbkdf2 with too few segments
        assert_eq!(decompose_mcf("$pbkdf2$1000"), (String::new(), String::new()));
    }

    #[test]
    fn salt_encoding_guess() {
        assert_eq!(guess_salt_encoding("deadbeef"), SaltEncoding::Hex);
        assert_eq!(guess_salt_encoding("c2FsdA=="), SaltEncoding::Utf8);
        assert_eq!(guess_salt_encoding(""), SaltEncoding::Utf8);
    }
}
