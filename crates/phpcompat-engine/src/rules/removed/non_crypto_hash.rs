use crate::feature::TableError;
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::rules::support::hash_algorithm;
use phpcompat_core::Version;
use phpcompat_tokens::TokenKind;

/// Algorithms without a cryptographic guarantee
const NON_CRYPTO_ALGORITHMS: &[&str] = &[
    "adler32", "crc32", "crc32b", "crc32c", "fnv132", "fnv1a32", "fnv164", "fnv1a64", "joaat",
];

/// Functions that reject the algorithms above
const KEYED_HASH_FUNCTIONS: &[&str] = &["hash_hmac", "hash_hmac_file", "hash_init", "hash_pbkdf2"];

/// Non-cryptographic algorithms passed to the HMAC and PBKDF2 functions
#[derive(Debug)]
pub struct RemovedNonCryptoHash;

impl Rule for RemovedNonCryptoHash {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "RemovedNonCryptoHash",
            description: "Detects non-cryptographic hash algorithms passed to functions that require a cryptographic one since PHP 7.2.",
            family: Family::VersionSpecific,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::Identifier]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self)
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if !ctx.gate().includes_at_or_above(Version::new(7, 2)) {
            return;
        }

        let stream = ctx.stream();
        let Some((function, argument, algorithm)) = hash_algorithm(stream, index) else {
            return;
        };
        if !KEYED_HASH_FUNCTIONS.contains(&function.as_str()) {
            return;
        }
        if !NON_CRYPTO_ALGORITHMS.contains(&algorithm.as_str()) {
            return;
        }

        // hash_init() only rejects them in HMAC mode
        if function == "hash_init" {
            let hmac = stream
                .argument_at(index, 2)
                .is_some_and(|options| options.raw.trim_start_matches('\\') == "HASH_HMAC");
            if !hmac {
                return;
            }
        }

        ctx.emit(
            "Non-cryptographic hashes are no longer accepted by function %s() since PHP 7.2. Found: %s",
            argument.start,
            true,
            "Found",
            vec![stream[index].text.clone(), argument.raw],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::findings_for;
    use pretty_assertions::assert_eq;

    #[test]
    fn hmac_with_crc32() {
        let findings = findings_for::<RemovedNonCryptoHash>("<?php hash_hmac('crc32b', $data, $key);", "7.0-");

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "Found");
        assert_eq!(
            findings[0].message(),
            "Non-cryptographic hashes are no longer accepted by function hash_hmac() since PHP 7.2. Found: 'crc32b'"
        );
        assert!(findings[0].is_error);
    }

    #[test]
    fn hash_init_only_in_hmac_mode() {
        let source = "<?php hash_init('joaat'); hash_init('joaat', HASH_HMAC, $key);";
        assert_eq!(findings_for::<RemovedNonCryptoHash>(source, "7.2").len(), 1);
    }

    #[test]
    fn plain_hash_and_older_ranges_are_fine() {
        assert!(findings_for::<RemovedNonCryptoHash>("<?php hash('crc32b', $d);", "7.2").is_empty());
        assert!(findings_for::<RemovedNonCryptoHash>("<?php hash_hmac('crc32b', $d, $k);", "5.6-7.1").is_empty());
        assert!(findings_for::<RemovedNonCryptoHash>("<?php hash_hmac('crc32b', $d, $k);", "").is_empty());
    }
}
