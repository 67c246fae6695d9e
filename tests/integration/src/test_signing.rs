//! Signing and verification integration tests.

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use http::Method;
    use rpcsign_auth::verify::parse_query;
    use rpcsign_auth::{
        AuthError, Credential, SignatureMethod, StaticAccessKeyStore, verify_rpc_query,
    };
    use rpcsign_client::{ClientHandle, RpcClient, sign, sign_at};
    use rpcsign_core::ClientName;

    use crate::params;

    fn store() -> StaticAccessKeyStore {
        StaticAccessKeyStore::new(vec![("test-id".to_owned(), "test-secret".to_owned())])
    }

    fn handle(method: SignatureMethod) -> ClientHandle {
        ClientHandle::with_method(
            ClientName::default(),
            Credential::new("test-id", "test-secret"),
            method,
        )
    }

    #[test]
    fn test_should_verify_what_the_signer_produces() {
        for method in [SignatureMethod::HmacSha1, SignatureMethod::HmacSha256] {
            let signed = sign(
                params(&[("Action", "Describe"), ("Name", "a b/c*~")]),
                &Method::POST,
                &handle(method),
            )
            .unwrap();
            let query = RpcClient::to_query_string(&signed);

            let verified =
                verify_rpc_query("POST", &query, &store(), Utc::now(), Duration::minutes(5))
                    .unwrap();

            assert_eq!(verified.access_key_id, "test-id");
            assert_eq!(verified.action.as_deref(), Some("Describe"));
            assert_eq!(verified.params["Name"], "a b/c*~");
            assert_eq!(verified.nonce.as_deref(), Some(signed["SignatureNonce"].as_str()));
        }
    }

    #[test]
    fn test_should_round_trip_query_string() {
        let signed = sign(
            params(&[("Action", "Describe"), ("Tag.1.Value", "x=y&z")]),
            &Method::GET,
            &handle(SignatureMethod::HmacSha1),
        )
        .unwrap();
        assert_eq!(parse_query(&RpcClient::to_query_string(&signed)).unwrap(), signed);
    }

    #[test]
    fn test_should_reject_replayed_query_outside_window() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let signed = sign_at(
            params(&[("Action", "Describe")]),
            &Method::GET,
            &handle(SignatureMethod::HmacSha1),
            "nonce-1",
            at,
        )
        .unwrap();
        let query = RpcClient::to_query_string(&signed);

        let fresh = verify_rpc_query("GET", &query, &store(), at, Duration::minutes(5));
        assert!(fresh.is_ok());

        let late = verify_rpc_query(
            "GET",
            &query,
            &store(),
            at + Duration::minutes(30),
            Duration::minutes(5),
        );
        assert!(matches!(late, Err(AuthError::RequestExpired(_))));
    }

    #[test]
    fn test_should_detect_signature_from_wrong_secret() {
        let wrong = ClientHandle::with_method(
            ClientName::default(),
            Credential::new("test-id", "other-secret"),
            SignatureMethod::HmacSha1,
        );
        let signed = sign(params(&[("Action", "Describe")]), &Method::GET, &wrong).unwrap();
        let query = RpcClient::to_query_string(&signed);

        let result = verify_rpc_query("GET", &query, &store(), Utc::now(), Duration::minutes(5));
        assert!(matches!(result, Err(AuthError::SignatureDoesNotMatch)));
    }

    #[test]
    fn test_should_cover_security_token_in_signature() {
        let handle = ClientHandle::with_method(
            ClientName::default(),
            Credential::new("test-id", "test-secret").with_security_token("sts"),
            SignatureMethod::HmacSha1,
        );
        let signed = sign(params(&[("Action", "Describe")]), &Method::GET, &handle).unwrap();
        let query = RpcClient::to_query_string(&signed)
            .replace("SecurityToken=sts", "SecurityToken=other");

        let result = verify_rpc_query("GET", &query, &store(), Utc::now(), Duration::minutes(5));
        assert!(matches!(result, Err(AuthError::SignatureDoesNotMatch)));
    }
}
