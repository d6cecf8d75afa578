use sha2::{Digest, Sha256};

use crate::imaging::DerivativeVariant;

/// Compute the lowercase hex SHA-256 digest of a byte buffer.
///
/// Images are content-addressed by this digest throughout the catalog and
/// the blob store.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Storage path for a derivative, sharded by the first two hex characters
/// of the image digest: `derivatives/<sha[0:2]>/<sha>/<variant>.webp`.
pub fn derivative_path(sha256: &str, variant: DerivativeVariant) -> String {
    format!(
        "derivatives/{}/{}/{}.webp",
        &sha256[..2],
        sha256,
        variant.as_str()
    )
}

/// Compose the public URL for an object in the blob store.
pub fn public_url(base_url: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{}/{}",
        base_url.trim_end_matches('/'),
        bucket,
        path
    )
}
