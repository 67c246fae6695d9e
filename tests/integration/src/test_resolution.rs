//! Client resolution integration tests.

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rpcsign_auth::credentials::{ENV_ACCESS_KEY_ID, ENV_ACCESS_KEY_SECRET};
    use rpcsign_auth::profile::{ENV_CREDENTIALS_FILE, ENV_PROFILE};
    use rpcsign_auth::{
        Credential, CredentialError, CredentialProvider, ProfileCredentialProvider, ProviderChain,
    };
    use rpcsign_client::ClientHandle;
    use rpcsign_core::{ClientName, ResolverConfig, RpcError};

    use crate::{isolated_resolver, lookup_from};

    #[derive(Debug, Default)]
    struct SlowProvider {
        calls: AtomicUsize,
    }

    impl CredentialProvider for SlowProvider {
        fn name(&self) -> &'static str {
            "slow"
        }

        fn provide(&self, client_name: &str) -> Result<Credential, CredentialError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(std::time::Duration::from_millis(5));
            Ok(Credential::new(format!("{client_name}-id"), "secret"))
        }
    }

    fn credentials_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_should_resolve_default_client_from_environment() {
        let resolver = isolated_resolver(
            &ResolverConfig::default(),
            &[
                (ENV_ACCESS_KEY_ID, "env-id"),
                (ENV_ACCESS_KEY_SECRET, "env-secret"),
            ],
        );

        let handle = resolver.resolve(None).unwrap();
        assert_eq!(handle.name().as_str(), "default");
        assert_eq!(handle.credential().access_key_id(), "env-id");
        assert_eq!(resolver.registry().list_all(), [ClientName::default()]);
    }

    #[test]
    fn test_should_fall_back_to_credentials_file() {
        let file = credentials_file(concat!(
            "[default]\n",
            "type = access_key\n",
            "access_key_id = file-id\n",
            "access_key_secret = file-secret\n",
        ));
        let path = file.path().to_str().unwrap();
        let resolver =
            isolated_resolver(&ResolverConfig::default(), &[(ENV_CREDENTIALS_FILE, path)]);

        let handle = resolver.resolve(None).unwrap();
        assert_eq!(handle.credential().access_key_id(), "file-id");
    }

    #[test]
    fn test_should_prefer_custom_chain_over_default_chain() {
        let file = credentials_file(
            "[ops]\naccess_key_id = ops-file-id\naccess_key_secret = ops-file-secret\n",
        );
        let path = file.path().to_str().unwrap();
        let resolver = isolated_resolver(
            &ResolverConfig {
                default_client_name: ClientName::new("ops"),
                ..ResolverConfig::default()
            },
            &[
                (ENV_ACCESS_KEY_ID, "env-id"),
                (ENV_ACCESS_KEY_SECRET, "env-secret"),
            ],
        );
        resolver.install_custom_chain(ProviderChain::new(vec![Arc::new(
            ProfileCredentialProvider::with_lookup(lookup_from(&[
                (ENV_CREDENTIALS_FILE, path),
                (ENV_PROFILE, ""),
            ])),
        )]));

        let handle = resolver.resolve(None).unwrap();
        assert_eq!(handle.name().as_str(), "ops");
        assert_eq!(handle.credential().access_key_id(), "ops-file-id");
    }

    #[test]
    fn test_should_report_missing_credentials_as_configuration_error() {
        let resolver = isolated_resolver(&ResolverConfig::default(), &[]);
        let err = resolver.resolve(Some("prod")).unwrap_err();
        assert!(matches!(err, RpcError::Configuration(ref m) if m.contains("prod")));
    }

    #[test]
    fn test_should_report_unreadable_credentials_file() {
        let resolver = isolated_resolver(
            &ResolverConfig::default(),
            &[(ENV_CREDENTIALS_FILE, "/nonexistent/rpcsign/credentials")],
        );
        let err = resolver.resolve(None).unwrap_err();
        assert!(matches!(err, RpcError::Configuration(ref m) if m.contains("/nonexistent")));
    }

    #[test]
    fn test_should_run_provider_once_under_concurrent_first_use() {
        let resolver = isolated_resolver(&ResolverConfig::default(), &[]);
        let provider = Arc::new(SlowProvider::default());
        resolver.install_custom_chain(ProviderChain::new(vec![provider.clone()]));

        let handles: Vec<Arc<ClientHandle>> = std::thread::scope(|s| {
            let workers: Vec<_> = (0..16)
                .map(|_| s.spawn(|| resolver.resolve(Some("shared")).unwrap()))
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
        assert_eq!(handles[0].credential().access_key_id(), "shared-id");
    }
}
