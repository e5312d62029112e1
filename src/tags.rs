/// Prefix for a tag key of a fingerprint hash/identifier produced by the
/// importer of a bank statement. The key and value must be consistent upon
/// each re-import for any given posting that has it, which makes it the
/// preferred transaction identifier for matching.
pub const FINGERPRINT_PREFIX: &str = "fp-";

/// Key for a key-value tag on a transaction carrying an explicit identifier.
pub const ID_KEY: &str = "id";

/// Key for a key-value tag recording which receipt a transaction was scanned
/// from.
pub const RECEIPT_KEY: &str = "receipt";
