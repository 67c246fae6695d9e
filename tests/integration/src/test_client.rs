//! End-to-end adapter tests.

#[cfg(test)]
mod tests {
    use http::{Method, Response};
    use rpcsign_client::{RpcClient, has_error, sign_at, to_error};
    use rpcsign_core::{RpcClientConfig, RpcError};
    use serde_json::json;

    use crate::{params, registered_resolver};

    #[test]
    fn test_should_fail_fast_without_endpoint() {
        let config = RpcClientConfig::from_lookup(|_: &str| None);
        let err = RpcClient::new(config, registered_resolver()).unwrap_err();
        assert!(matches!(err, RpcError::InvalidArgument(ref m) if m.contains("endpoint")));
    }

    #[test]
    fn test_should_sign_request_end_to_end() {
        let config = RpcClientConfig::from_lookup(|key: &str| {
            (key == "RPC_ENDPOINT").then(|| "example.com".to_owned())
        });
        let client = RpcClient::new(config, registered_resolver()).unwrap();
        assert_eq!(client.endpoint("ecs", "us-1"), "example.com");

        let signed = client
            .query(params(&[("Action", "Describe"), ("RegionId", "us-1")]), &Method::GET)
            .unwrap();
        for key in [
            "Format",
            "SignatureMethod",
            "SignatureVersion",
            "SignatureNonce",
            "Timestamp",
            "AccessKeyId",
            "SignatureType",
            "Signature",
        ] {
            assert!(signed.contains_key(key), "missing {key}");
        }
        assert_eq!(signed["AccessKeyId"], "test-id");

        // Re-signing with the same nonce and timestamp reproduces the signature.
        let handle = client.client().unwrap();
        let timestamp = rpcsign_auth::verify::parse_timestamp(&signed["Timestamp"]).unwrap();
        let again = sign_at(
            params(&[("Action", "Describe"), ("RegionId", "us-1")]),
            &Method::GET,
            &handle,
            &signed["SignatureNonce"],
            timestamp,
        )
        .unwrap();
        assert_eq!(again, signed);
    }

    #[test]
    fn test_should_classify_error_response() {
        let ok = Response::builder().status(200).body(()).unwrap();
        let failed = Response::builder().status(404).body(()).unwrap();
        assert!(!has_error(&ok));
        assert!(has_error(&failed));

        let err = to_error(&json!({"message": "not found", "RequestId": "req-9"})).unwrap();
        assert_eq!(err.message, "not found");
        assert_eq!(err.request_id.as_deref(), Some("req-9"));

        let malformed = to_error(&json!({"code": "NotFound"})).unwrap_err();
        assert!(matches!(malformed, RpcError::MalformedResponse(_)));
    }
}
