use alloy::primitives::{keccak256, B256, U256};

/// BN254 base field modulus `q`. Proof points are coordinates in this field.
pub const BN254_BASE_MODULUS: U256 = U256::from_limbs([
    0x3c20_8c16_d87c_fd47,
    0x9781_6a91_6871_ca8d,
    0xb850_45b6_8181_585d,
    0x3064_4e72_e131_a029,
]);

/// BN254 scalar field modulus `r`. Public signals live in this field.
pub const BN254_SCALAR_MODULUS: U256 = U256::from_limbs([
    0x43e1_f593_f000_0001,
    0x2833_e848_79b9_7091,
    0xb850_45b6_8181_585d,
    0x3064_4e72_e131_a029,
]);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("value does not fit in 32 bytes")]
    OutOfRange,

    #[error("invalid number: {0:?}")]
    InvalidNumber(String),
}

/// Encode an integer as a 32-byte big-endian word, left-padded with zeros.
///
/// `U256` cannot exceed 32 bytes; oversized text is rejected earlier by
/// [`parse_field`].
pub fn to_fixed_width_bytes(x: U256) -> B256 {
    B256::from(x.to_be_bytes::<32>())
}

/// Parse a field value written as decimal or `0x`-prefixed hex.
pub fn parse_field(text: &str) -> Result<U256, FieldError> {
    let trimmed = text.trim();
    let (digits, radix) = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (trimmed, 10),
    };

    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(FieldError::InvalidNumber(text.to_string()));
    }

    // Digits were validated above, so the only remaining failure is overflow.
    U256::from_str_radix(digits, u64::from(radix)).map_err(|_| FieldError::OutOfRange)
}

/// Semaphore's signal compression: `uint256(keccak256(abi.encodePacked(x))) >> 8`.
///
/// Dropping the top byte keeps the result below 2^248, strictly inside the
/// scalar field.
pub fn field_hash(x: U256) -> U256 {
    let digest = keccak256(to_fixed_width_bytes(x));
    U256::from_be_bytes(digest.0) >> 8
}

/// [`field_hash`] rendered as the 32-byte word the contract emits.
pub fn field_hash_bytes(x: U256) -> B256 {
    to_fixed_width_bytes(field_hash(x))
}

/// Scope derived from a human topic name: `keccak256(utf8(topic))`.
///
/// The full 256-bit value is the scope; the contract reduces it with
/// [`field_hash`] like the message.
pub fn topic_id(topic: &str) -> U256 {
    U256::from_be_bytes(keccak256(topic.as_bytes()).0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::b256;

    #[test]
    fn test_fixed_width_left_pads() {
        let word = to_fixed_width_bytes(U256::from(0x0102));
        assert!(word[..30].iter().all(|&b| b == 0));
        assert_eq!(&word[30..], &[0x01, 0x02]);

        assert_eq!(to_fixed_width_bytes(U256::ZERO), B256::ZERO);
        assert_eq!(to_fixed_width_bytes(U256::MAX), B256::repeat_byte(0xff));
    }

    #[test]
    fn test_field_hash_hashes_fixed_width_word() {
        let x = U256::from(42);
        let expected = U256::from_be_bytes(keccak256(to_fixed_width_bytes(x)).0) >> 8;
        assert_eq!(field_hash(x), expected);
        assert_eq!(field_hash_bytes(x), to_fixed_width_bytes(expected));
    }

    #[test]
    fn test_parse_decimal_and_hex() {
        assert_eq!(parse_field("42").unwrap(), U256::from(42));
        assert_eq!(parse_field("0x2a").unwrap(), U256::from(42));
        assert_eq!(parse_field(" 7 ").unwrap(), U256::from(7));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_field(""), Err(FieldError::InvalidNumber(_))));
        assert!(matches!(parse_field("12a"), Err(FieldError::InvalidNumber(_))));
        assert!(matches!(parse_field("-1"), Err(FieldError::InvalidNumber(_))));
    }

    #[test]
    fn test_parse_rejects_overflow() {
        // 2^256
        let too_big =
            "115792089237316195423570985008687907853269984665640564039457584007913129639936";
        assert!(matches!(parse_field(too_big), Err(FieldError::OutOfRange)));
    }

    #[test]
    fn test_field_hash_known_vector() {
        // keccak256(uint256(7)) = 0xa66cc928...8736c688
        assert_eq!(
            field_hash_bytes(U256::from(7)),
            b256!("0x00a66cc928b5edb82af9bd49922954155ab7b0942694bea4ce44661d9a8736c6")
        );
    }

    #[test]
    fn test_field_hash_deterministic() {
        let x = U256::from(123_456_789u64);
        assert_eq!(field_hash(x), field_hash(x));
    }

    #[test]
    fn test_field_hash_fits_scalar_field() {
        for x in [U256::ZERO, U256::from(11), U256::MAX, BN254_SCALAR_MODULUS] {
            let h = field_hash(x);
            assert!(h < (U256::from(1) << 248));
            assert!(h < BN254_SCALAR_MODULUS);
            assert_eq!(field_hash_bytes(x)[0], 0);
        }
    }

    #[test]
    fn test_field_hash_input_sensitivity() {
        assert_ne!(field_hash(U256::from(7)), field_hash(U256::from(11)));
    }

    #[test]
    fn test_topic_id_is_keccak_of_name() {
        assert_eq!(
            B256::from(topic_id("complaints-v1")),
            b256!("0xa8134260e7d7535999d3ac952cd6093a8b1a680dc9f7bc8ba49a15b96bd10b78")
        );
    }

    #[test]
    fn test_topic_id_reduces_into_scalar_field() {
        let id = topic_id("complaints-v1");
        assert!(id >= BN254_BASE_MODULUS);
        assert!(field_hash(id) < BN254_SCALAR_MODULUS);
    }

    #[test]
    fn test_moduli_ordering() {
        assert!(BN254_SCALAR_MODULUS < BN254_BASE_MODULUS);
    }
}
