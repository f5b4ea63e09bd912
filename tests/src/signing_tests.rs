//! Request signing tests
//!
//! Parameterized cases with rstest for the known digests, proptest for
//! the properties every signed request must keep.

use kuna_core::prelude::*;
use kuna_exchanges::kuna::{build_query_string, KunaCredentials, KunaSigner};
use kuna_exchanges::prelude::*;
use proptest::prelude::*;
use rstest::*;

const TONCE: u64 = 1_000_000_000_000;

fn make_signer() -> KunaSigner {
    KunaSigner::new(KunaCredentials::new("pub123", "s3cr3t")).expect("valid credentials")
}

#[fixture]
fn signer() -> KunaSigner {
    make_signer()
}

// ============================================================================
// KNOWN VECTORS
// ============================================================================

#[cfg(test)]
mod known_vectors {
    use super::*;

    #[rstest]
    fn test_create_order_vector(signer: KunaSigner) {
        let params = params! {
            "side" => OrderSide::Buy,
            "market" => MARKET_BTCUAH,
            "price" => Fixed::from_i64(15000),
            "volume" => Fixed::from_str_exact("1.0").unwrap(),
        };

        let signed = signer.sign_request_at(HttpMethod::Post, "orders", &params, TONCE).unwrap();

        assert_eq!(
            signed.sign_string,
            "POST|/api/v2/orders|access_key=pub123&market=btcuah&price=15000&side=buy&tonce=1000000000000&volume=1.0"
        );
        assert_eq!(signed.signature, "6dce2bdfb9560a6bf121fbc96a3fd0d0c2eb9c0c3c3277f5ea561c96ea9bab7b");
    }

    #[rstest]
    #[case(HttpMethod::Get, "members/me", "GET|/api/v2/members/me|access_key=pub123&tonce=1000000000000")]
    #[case(HttpMethod::Get, "/members/me/", "GET|/api/v2/members/me|access_key=pub123&tonce=1000000000000")]
    #[case(HttpMethod::Post, "orders", "POST|/api/v2/orders|access_key=pub123&tonce=1000000000000")]
    #[case(HttpMethod::Post, "Order/Delete", "POST|/api/v2/order/delete|access_key=pub123&tonce=1000000000000")]
    fn test_sign_string_layout(
        signer: KunaSigner,
        #[case] method: HttpMethod,
        #[case] path: &str,
        #[case] expected: &str,
    ) {
        let signed = signer.sign_request_at(method, path, &params!(), TONCE).unwrap();
        assert_eq!(signed.sign_string, expected);
    }

    #[rstest]
    fn test_endpoint_requests_sign_as_expected(signer: KunaSigner) {
        let request = KunaEndpoints::me();
        let signed = signer
            .sign_request_at(request.method, &request.path, &request.params, TONCE)
            .unwrap();

        assert_eq!(signed.signature, "74fb86c082f7ad8036eb66829c71847769082bd4ad52fce1aa8ea9febe61bffe");
    }

    #[rstest]
    #[case("a b", "a+b")]
    #[case("x&y=z", "x%26y%3Dz")]
    #[case("-_.*", "-_.%2A")]
    #[case("/~", "%2F%7E")]
    #[case("a*b~c", "a%2Ab%7Ec")]
    #[case("100%", "100%25")]
    fn test_form_encoding(#[case] raw: &str, #[case] encoded: &str) {
        assert_eq!(build_query_string(&[("k", raw)]), format!("k={encoded}"));
    }
}

// ============================================================================
// PROPERTIES
// ============================================================================

fn market_name() -> impl Strategy<Value = String> {
    "[a-z]{3,8}"
}

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_sign_string_matches_sorted_assembly(
            pairs in proptest::collection::btree_map("[a-z_]{1,10}", "[A-Za-z0-9 .&=*~]{0,12}", 0..8)
                .prop_map(|m| m.into_iter().collect::<Vec<_>>())
                .prop_shuffle()
        ) {
            let signer = make_signer();

            let mut params = RequestParams::new();
            for (k, v) in &pairs {
                params.insert(k.clone(), ParamValue::from(v.as_str()));
            }
            let signed = signer.sign_request_at(HttpMethod::Get, "orders", &params, TONCE).unwrap();

            // Assemble the same request by hand: reserved keys added, then a byte-wise sort
            let mut expected: Vec<(String, String)> = pairs
                .iter()
                .filter(|(k, _)| k != "tonce" && k != "access_key" && k != "signature")
                .cloned()
                .collect();
            expected.push(("tonce".to_string(), TONCE.to_string()));
            expected.push(("access_key".to_string(), "pub123".to_string()));
            expected.sort_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));
            let sign_string = format!("GET|/api/v2/orders|{}", build_query_string(&expected));

            prop_assert_eq!(&signed.sign_string, &sign_string);
            prop_assert_eq!(signed.signature, signer.create_signature(&sign_string).unwrap());
        }

        #[test]
        fn test_signing_is_deterministic(market in market_name(), tonce in 1u64..u64::MAX) {
            let signer = make_signer();
            let params = params! { "market" => market.as_str() };

            let a = signer.sign_request_at(HttpMethod::Get, "trades/my", &params, tonce).unwrap();
            let b = signer.sign_request_at(HttpMethod::Get, "trades/my", &params, tonce).unwrap();
            prop_assert_eq!(&a.signature, &b.signature);
            prop_assert!(signer.validate_signature(&a.sign_string, &a.signature));
        }

        #[test]
        fn test_signature_is_lowercase_hex(market in market_name(), id in 0u64..1_000_000) {
            let params = params! { "market" => market.as_str(), "id" => id };
            let signed = make_signer().sign_request_at(HttpMethod::Post, "order/delete", &params, TONCE).unwrap();

            prop_assert_eq!(signed.signature.len(), 64);
            prop_assert!(signed.signature.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        }

        #[test]
        fn test_tampering_changes_signature(market in market_name(), other in market_name()) {
            prop_assume!(market != other);
            let signer = make_signer();

            let original = signer
                .sign_request_at(HttpMethod::Get, "orders", &params! { "market" => market.as_str() }, TONCE)
                .unwrap();
            let tampered = signer
                .sign_request_at(HttpMethod::Get, "orders", &params! { "market" => other.as_str() }, TONCE)
                .unwrap();

            prop_assert_ne!(&original.signature, &tampered.signature);
            prop_assert!(!signer.validate_signature(&tampered.sign_string, &original.signature));
        }

        #[test]
        fn test_method_path_and_secret_are_signed(market in market_name()) {
            let signer = make_signer();
            let params = params! { "market" => market.as_str() };
            let original = signer.sign_request_at(HttpMethod::Get, "orders", &params, TONCE).unwrap();

            let other_method = signer.sign_request_at(HttpMethod::Post, "orders", &params, TONCE).unwrap();
            let other_path = signer.sign_request_at(HttpMethod::Get, "order", &params, TONCE).unwrap();
            let other_secret = KunaSigner::new(KunaCredentials::new("pub123", "s3cr3u"))
                .unwrap()
                .sign_request_at(HttpMethod::Get, "orders", &params, TONCE)
                .unwrap();

            for tampered in [&other_method, &other_path] {
                prop_assert_ne!(&original.signature, &tampered.signature);
                prop_assert!(!signer.validate_signature(&tampered.sign_string, &original.signature));
            }

            prop_assert_eq!(&original.sign_string, &other_secret.sign_string);
            prop_assert_ne!(&original.signature, &other_secret.signature);
            prop_assert!(!signer.validate_signature(&original.sign_string, &other_secret.signature));
        }

        #[test]
        fn test_reserved_keys_always_overwritten(fake_tonce in 0i64..i64::MAX, fake_key in "[a-z]{1,16}") {
            let params = params! {
                "tonce" => fake_tonce,
                "access_key" => fake_key.as_str(),
            };
            let signed = make_signer().sign_request_at(HttpMethod::Get, "members/me", &params, TONCE).unwrap();

            prop_assert_eq!(signed.get("tonce"), Some("1000000000000"));
            prop_assert_eq!(signed.get("access_key"), Some("pub123"));
            prop_assert_eq!(signed.keys().last().copied(), Some("signature"));
        }
    }
}
