// Tests for the hash algorithm registry

use quickhash::{bytes_to_hex, supported_algorithms, EngineError, HashRegistry, XOF_OUTPUT_LEN};

fn hex_of(algorithm: &str, data: &[u8]) -> String {
    let mut hasher = HashRegistry::get_hasher(algorithm).unwrap();
    hasher.update(data);
    bytes_to_hex(&hasher.finalize())
}

#[test]
fn test_every_supported_algorithm_resolves() {
    for name in supported_algorithms() {
        let hasher = HashRegistry::get_hasher(name)
            .unwrap_or_else(|e| panic!("{} should resolve: {}", name, e));
        assert!(hasher.output_size() > 0);
    }
}

#[test]
fn test_unknown_algorithm_is_rejected() {
    let result = HashRegistry::get_hasher("rot13");
    match result {
        Err(EngineError::UnsupportedAlgorithm { algorithm }) => assert_eq!(algorithm, "rot13"),
        other => panic!("expected UnsupportedAlgorithm, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_algorithm_names_are_case_insensitive() {
    assert!(HashRegistry::get_hasher("SHA256").is_ok());
    assert!(HashRegistry::get_hasher("Blake3").is_ok());
}

#[test]
fn test_sha256_test_vector() {
    assert_eq!(
        hex_of("sha256", b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[test]
fn test_sha1_test_vector() {
    assert_eq!(hex_of("sha1", b"abc"), "a9993e364706816aba3e25717850c26c9cd0d89d");
}

#[test]
fn test_md5_empty_input() {
    assert_eq!(hex_of("md5", b""), "d41d8cd98f00b204e9800998ecf8427e");
}

#[test]
fn test_streaming_matches_single_update() {
    let mut chunked = HashRegistry::get_hasher("sha512").unwrap();
    chunked.update(b"hello ");
    chunked.update(b"world");

    assert_eq!(bytes_to_hex(&chunked.finalize()), hex_of("sha512", b"hello world"));
}

#[test]
fn test_shake_algorithms_use_fixed_output_length() {
    for name in ["shake128", "shake256"] {
        let mut hasher = HashRegistry::get_hasher(name).unwrap();
        hasher.update(b"abc");
        let digest = hasher.finalize();
        assert_eq!(digest.len(), XOF_OUTPUT_LEN);
    }
}

#[test]
fn test_shake256_empty_test_vector() {
    assert_eq!(
        hex_of("shake256", b""),
        "46b9dd2b0ba88d13233b3feb743eeb243fcd52ea62b81b82b50c27646ed5762f"
    );
}

#[test]
fn test_output_sizes() {
    let cases = [
        ("md5", 16),
        ("sha1", 20),
        ("sha256", 32),
        ("sha512", 64),
        ("sha3-256", 32),
        ("blake2b-512", 64),
        ("blake2s-256", 32),
        ("blake3", 32),
        ("xxh3", 8),
        ("xxh128", 16),
    ];
    for (name, bytes) in cases {
        assert_eq!(HashRegistry::get_hasher(name).unwrap().output_size(), bytes, "{}", name);
    }
}

#[test]
fn test_bytes_to_hex_formatting() {
    assert_eq!(bytes_to_hex(&[0x00, 0x0f, 0xff]), "000fff");
    assert_eq!(bytes_to_hex(&[]), "");
}
