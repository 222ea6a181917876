// Hash algorithm registry
// Wraps the RustCrypto digests (plus blake3 and xxh3) behind one object-safe
// trait so workers can stream chunks into any selected algorithm

use crate::error::EngineError;

use blake2::{Blake2b512, Blake2s256};
use blake3::Hasher as Blake3Hasher;
use md5::Md5;
use sha1::Sha1;
use sha2::digest::{ExtendableOutput, XofReader};
use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};
use sha3::{Sha3_224, Sha3_256, Sha3_384, Sha3_512, Shake128, Shake256};
use xxhash_rust::xxh3::Xxh3;

/// Output length for extendable-output algorithms (SHAKE128/SHAKE256)
pub const XOF_OUTPUT_LEN: usize = 32;

/// Trait for streaming hash computation
pub trait Hasher: Send {
    /// Feed one chunk of data into the running digest
    fn update(&mut self, data: &[u8]);

    /// Finalize the digest and return the raw bytes
    fn finalize(self: Box<Self>) -> Vec<u8>;

    /// Output size in bytes
    fn output_size(&self) -> usize;
}

macro_rules! digest_hasher {
    ($wrapper:ident, $inner:ty, $bytes:expr) => {
        struct $wrapper($inner);

        impl Hasher for $wrapper {
            fn update(&mut self, data: &[u8]) {
                Digest::update(&mut self.0, data);
            }

            fn finalize(self: Box<Self>) -> Vec<u8> {
                Digest::finalize(self.0).to_vec()
            }

            fn output_size(&self) -> usize {
                $bytes
            }
        }
    };
}

digest_hasher!(Md5Hasher, Md5, 16);
digest_hasher!(Sha1Hasher, Sha1, 20);
digest_hasher!(Sha224Hasher, Sha224, 28);
digest_hasher!(Sha256Hasher, Sha256, 32);
digest_hasher!(Sha384Hasher, Sha384, 48);
digest_hasher!(Sha512Hasher, Sha512, 64);
digest_hasher!(Sha3_224Hasher, Sha3_224, 28);
digest_hasher!(Sha3_256Hasher, Sha3_256, 32);
digest_hasher!(Sha3_384Hasher, Sha3_384, 48);
digest_hasher!(Sha3_512Hasher, Sha3_512, 64);
digest_hasher!(Blake2bHasher, Blake2b512, 64);
digest_hasher!(Blake2sHasher, Blake2s256, 32);

macro_rules! xof_hasher {
    ($wrapper:ident, $inner:ty) => {
        struct $wrapper($inner);

        impl Hasher for $wrapper {
            fn update(&mut self, data: &[u8]) {
                sha2::digest::Update::update(&mut self.0, data);
            }

            fn finalize(self: Box<Self>) -> Vec<u8> {
                let mut out = vec![0u8; XOF_OUTPUT_LEN];
                self.0.finalize_xof().read(&mut out);
                out
            }

            fn output_size(&self) -> usize {
                XOF_OUTPUT_LEN
            }
        }
    };
}

xof_hasher!(Shake128Hasher, Shake128);
xof_hasher!(Shake256Hasher, Shake256);

// The rayon feature on blake3 lets update_rayon spread large chunks across
// the current thread pool, which stacks with the per-file worker pool
struct Blake3Wrapper(Blake3Hasher);

impl Hasher for Blake3Wrapper {
    fn update(&mut self, data: &[u8]) {
        self.0.update_rayon(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.finalize().as_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        32
    }
}

// XXH3 (64-bit, non-cryptographic)
struct Xxh3Wrapper(Xxh3);

impl Hasher for Xxh3Wrapper {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.digest().to_le_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        8
    }
}

// XXH128 (128-bit, non-cryptographic)
struct Xxh128Wrapper(Xxh3);

impl Hasher for Xxh128Wrapper {
    fn update(&mut self, data: &[u8]) {
        self.0.update(data);
    }

    fn finalize(self: Box<Self>) -> Vec<u8> {
        self.0.digest128().to_le_bytes().to_vec()
    }

    fn output_size(&self) -> usize {
        16
    }
}

/// Registry for hash algorithms
pub struct HashRegistry;

impl HashRegistry {
    /// Get a hasher instance for the specified algorithm name
    pub fn get_hasher(algorithm: &str) -> Result<Box<dyn Hasher>, EngineError> {
        let alg_lower = algorithm.to_lowercase();

        match alg_lower.as_str() {
            "md5" => Ok(Box::new(Md5Hasher(Md5::new()))),
            "sha1" => Ok(Box::new(Sha1Hasher(Sha1::new()))),
            "sha224" | "sha-224" => Ok(Box::new(Sha224Hasher(Sha224::new()))),
            "sha256" | "sha-256" => Ok(Box::new(Sha256Hasher(Sha256::new()))),
            "sha384" | "sha-384" => Ok(Box::new(Sha384Hasher(Sha384::new()))),
            "sha512" | "sha-512" => Ok(Box::new(Sha512Hasher(Sha512::new()))),
            "sha3-224" => Ok(Box::new(Sha3_224Hasher(Sha3_224::new()))),
            "sha3-256" => Ok(Box::new(Sha3_256Hasher(Sha3_256::new()))),
            "sha3-384" => Ok(Box::new(Sha3_384Hasher(Sha3_384::new()))),
            "sha3-512" => Ok(Box::new(Sha3_512Hasher(Sha3_512::new()))),
            "shake128" | "shake-128" => Ok(Box::new(Shake128Hasher(Shake128::default()))),
            "shake256" | "shake-256" => Ok(Box::new(Shake256Hasher(Shake256::default()))),
            "blake2b" | "blake2b-512" => Ok(Box::new(Blake2bHasher(Blake2b512::new()))),
            "blake2s" | "blake2s-256" => Ok(Box::new(Blake2sHasher(Blake2s256::new()))),
            "blake3" => Ok(Box::new(Blake3Wrapper(Blake3Hasher::new()))),
            "xxh3" => Ok(Box::new(Xxh3Wrapper(Xxh3::new()))),
            "xxh128" => Ok(Box::new(Xxh128Wrapper(Xxh3::new()))),
            _ => Err(EngineError::UnsupportedAlgorithm {
                algorithm: algorithm.to_string(),
            }),
        }
    }
}

/// Canonical names of every algorithm the registry resolves, in the order a
/// host drop-down should present them
pub fn supported_algorithms() -> &'static [&'static str] {
    &[
        "md5",
        "sha1",
        "sha224",
        "sha256",
        "sha384",
        "sha512",
        "sha3-224",
        "sha3-256",
        "sha3-384",
        "sha3-512",
        "shake128",
        "shake256",
        "blake2b-512",
        "blake2s-256",
        "blake3",
        "xxh3",
        "xxh128",
    ]
}

/// Convert raw digest bytes to a lowercase hexadecimal string
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
