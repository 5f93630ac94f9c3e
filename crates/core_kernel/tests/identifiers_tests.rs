//! Unit tests for the identifiers module
//!
//! Covers construction, parsing of route parameters, display formatting,
//! and JSON round-tripping of the integer-keyed identifiers.

use core_kernel::{ClientId, PolicyId, ParseIdError};
use proptest::prelude::*;

mod client_id_tests {
    use super::*;

    #[test]
    fn test_new_accepts_positive() {
        let id = ClientId::new(1).unwrap();
        assert_eq!(id.get(), 1);
    }

    #[test]
    fn test_new_rejects_zero_and_negative() {
        assert_eq!(ClientId::new(0), Err(ParseIdError::NotPositive(0)));
        assert_eq!(ClientId::new(-4), Err(ParseIdError::NotPositive(-4)));
    }

    #[test]
    fn test_from_str_trims_whitespace() {
        let id: ClientId = "  15\n".parse().unwrap();
        assert_eq!(id.get(), 15);
    }

    #[test]
    fn test_from_str_empty() {
        assert_eq!("".parse::<ClientId>(), Err(ParseIdError::Empty));
        assert_eq!("   ".parse::<ClientId>(), Err(ParseIdError::Empty));
    }

    #[test]
    fn test_from_str_not_a_number() {
        assert_eq!(
            "12abc".parse::<ClientId>(),
            Err(ParseIdError::NotANumber("12abc".to_string()))
        );
        assert!(matches!("1.5".parse::<ClientId>(), Err(ParseIdError::NotANumber(_))));
    }

    #[test]
    fn test_entity_name() {
        assert_eq!(ClientId::entity(), "Client");
        assert_eq!(PolicyId::entity(), "Policy");
    }

    #[test]
    fn test_ordering() {
        let a = ClientId::new(3).unwrap();
        let b = ClientId::new(10).unwrap();
        assert!(a < b);
    }
}

mod serde_tests {
    use super::*;

    #[test]
    fn test_serializes_as_bare_number() {
        let id = PolicyId::new(99).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "99");
    }

    #[test]
    fn test_deserialize_rejects_non_positive() {
        let result: Result<ClientId, _> = serde_json::from_str("0");
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_positive() {
        let id: ClientId = serde_json::from_str("12").unwrap();
        assert_eq!(id.get(), 12);
    }
}

proptest! {
    #[test]
    fn prop_positive_values_parse_back(value in 1i64..i64::MAX) {
        let parsed: ClientId = value.to_string().parse().unwrap();
        prop_assert_eq!(parsed.get(), value);
        prop_assert_eq!(i64::from(parsed), value);
    }

    #[test]
    fn prop_non_positive_values_rejected(value in i64::MIN..=0i64) {
        prop_assert!(ClientId::new(value).is_err());
    }
}
