#[cfg(test)]
mod totp_tests {
    use test_case::test_case;

    use bimil::totp::{two_factor_code, Totp, TotpAlgorithm};

    const SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    #[test_case(59, "287082")]
    #[test_case(1111111109, "081804")]
    #[test_case(1111111111, "050471")]
    #[test_case(1234567890, "005924")]
    #[test_case(2000000000, "279037")]
    fn test_six_digit_codes(time: u64, exp: &str) {
        let totp = Totp::from_base32(SECRET).unwrap();
        assert_eq!(totp.code_at(time).unwrap(), exp);
    }

    #[test]
    fn test_same_step_same_code() {
        let totp = Totp::from_base32(SECRET).unwrap();
        assert_eq!(totp.code_at(30).unwrap(), totp.code_at(59).unwrap());
        assert_ne!(totp.code_at(59).unwrap(), totp.code_at(60).unwrap());
    }

    #[test]
    fn test_sha256_eight_digits() {
        let secret = b"12345678901234567890123456789012".to_vec();
        let totp = Totp::new(secret).with_algorithm(TotpAlgorithm::Sha256).with_digits(8).unwrap();
        assert_eq!(totp.code_at(59).unwrap(), "46119246");
    }

    #[test]
    fn test_two_factor_code_shape() {
        let code = two_factor_code("gezd gnbv gy3t qojq gezd gnbv gy3t qojq");
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));

        assert_eq!(two_factor_code("not base32!"), "");
    }
}

#[cfg(test)]
mod base32_proptests {
    use proptest::prelude::*;

    use bimil::totp::{from_base32, to_base32, Base32Format};

    proptest! {
        #[test]
        fn proptest_base32_round_trip(
            bytes in prop::collection::vec(any::<u8>(), 1..=64),
            spacing in any::<bool>(),
            padding in any::<bool>(),
            uppercase in any::<bool>(),
        ) {
            let text = to_base32(&bytes, Base32Format { spacing, padding, uppercase });
            prop_assert_eq!(from_base32(&text).unwrap(), bytes);
        }

        #[test]
        fn proptest_from_base32_never_panics(text in "\\PC{0,40}") {
            let _ = from_base32(&text);
        }
    }
}
