use {
    hmac::{Hmac, Mac},
    sha2::Sha256,
    subtle::ConstantTimeEq,
};

/// Verifies that an inbound event originated from the gateway: HMAC-SHA256
/// over the exact raw request bytes, hex-encoded, compared in constant time.
/// Verification must run on the untouched byte stream — re-serializing parsed
/// JSON first would change the bytes and break the check.
pub struct SignatureVerifier {
    secret: String,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// A missing header should be passed as `""` — it fails the same way a
    /// mismatched signature does. No side effects.
    pub fn verify(&self, payload: &[u8], claimed_hex: &str) -> bool {
        let Ok(claimed) = hex::decode(claimed_hex) else {
            return false;
        };

        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(payload);
        let expected = mac.finalize().into_bytes();

        claimed.len() == expected.len() && bool::from(expected.as_slice().ct_eq(&claimed))
    }
}
