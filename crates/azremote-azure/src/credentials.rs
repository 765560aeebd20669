//! Storage account endpoint and credentials.

use azure_storage::{CloudLocation, ConnectionString, StorageCredentials};
use azure_storage_blobs::prelude::ClientBuilder;

use crate::config::ConnectionOptions;
use crate::service::ServiceError;

const DEFAULT_SUFFIX: &str = "core.windows.net";

/// Client builder for the account described by `options`.
///
/// A connection string wins over everything else. Otherwise the account name
/// is required, authenticated by its key, then by a SAS token, and
/// anonymously when neither is set.
pub fn client_builder(options: &ConnectionOptions) -> Result<ClientBuilder, ServiceError> {
    if let Some(conn_str) = options.connection_string.as_deref() {
        return from_connection_string(conn_str);
    }

    let account = options.account_name.as_deref().ok_or_else(|| {
        ServiceError::Credentials(
            "an account name or a connection string is required".to_string(),
        )
    })?;
    let credentials = match (&options.account_key, &options.sas_token) {
        (Some(key), _) => StorageCredentials::access_key(account.to_string(), key.clone()),
        (None, Some(token)) => sas_credentials(token)?,
        (None, None) => StorageCredentials::anonymous(),
    };
    Ok(ClientBuilder::new(account.to_string(), credentials))
}

fn from_connection_string(conn_str: &str) -> Result<ClientBuilder, ServiceError> {
    let parsed = ConnectionString::new(conn_str)
        .map_err(|e| ServiceError::Credentials(format!("invalid connection string: {e}")))?;

    if parsed.use_development_storage == Some(true) {
        return Ok(ClientBuilder::emulator());
    }

    let credentials = match (parsed.account_name, parsed.account_key, parsed.sas) {
        (Some(account), Some(key), _) => {
            StorageCredentials::access_key(account.to_string(), key.to_string())
        }
        (_, _, Some(token)) => sas_credentials(token)?,
        _ => StorageCredentials::anonymous(),
    };

    let location = match (parsed.blob_endpoint, parsed.account_name) {
        (Some(endpoint), account) => CloudLocation::Custom {
            account: account
                .map(str::to_string)
                .unwrap_or_else(|| account_from_endpoint(endpoint)),
            uri: endpoint.trim_end_matches('/').to_string(),
        },
        (None, Some(account)) => match parsed.endpoint_suffix {
            Some(suffix) if suffix != DEFAULT_SUFFIX => CloudLocation::Custom {
                account: account.to_string(),
                uri: format!("https://{account}.blob.{suffix}"),
            },
            _ => CloudLocation::Public {
                account: account.to_string(),
            },
        },
        (None, None) => {
            return Err(ServiceError::Credentials(
                "connection string has neither AccountName nor BlobEndpoint".to_string(),
            ));
        }
    };
    Ok(ClientBuilder::with_location(location, credentials))
}

fn sas_credentials(token: &str) -> Result<StorageCredentials, ServiceError> {
    StorageCredentials::sas_token(token.trim_start_matches('?'))
        .map_err(|e| ServiceError::Credentials(format!("invalid SAS token: {e}")))
}

/// `myacct` out of `https://myacct.blob.core.windows.net/`.
fn account_from_endpoint(endpoint: &str) -> String {
    let host = endpoint
        .split_once("://")
        .map_or(endpoint, |(_, rest)| rest);
    host.split(['.', '/', ':'])
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container_url(builder: ClientBuilder) -> String {
        builder.container_client("data").url().unwrap().to_string()
    }

    fn options(account: &str) -> ConnectionOptions {
        ConnectionOptions {
            account_name: Some(account.into()),
            ..Default::default()
        }
    }

    #[test]
    fn connection_string_with_key() {
        let builder = from_connection_string(
            "DefaultEndpointsProtocol=https;AccountName=myacct;AccountKey=c2VjcmV0;EndpointSuffix=core.windows.net",
        )
        .unwrap();
        assert_eq!(
            container_url(builder),
            "https://myacct.blob.core.windows.net/data"
        );
    }

    #[test]
    fn connection_string_with_sas_and_endpoint() {
        let builder = from_connection_string(
            "BlobEndpoint=https://myacct.blob.core.windows.net/;SharedAccessSignature=?sv=2021-08-06&sig=abc%3D",
        )
        .unwrap();
        assert_eq!(
            container_url(builder),
            "https://myacct.blob.core.windows.net/data"
        );
    }

    #[test]
    fn connection_string_with_sovereign_suffix() {
        let builder = from_connection_string(
            "AccountName=myacct;AccountKey=c2VjcmV0;EndpointSuffix=core.chinacloudapi.cn",
        )
        .unwrap();
        assert_eq!(
            container_url(builder),
            "https://myacct.blob.core.chinacloudapi.cn/data"
        );
    }

    #[test]
    fn development_storage() {
        let builder = from_connection_string("UseDevelopmentStorage=true").unwrap();
        assert_eq!(
            container_url(builder),
            "http://127.0.0.1:10000/devstoreaccount1/data"
        );
    }

    #[test]
    fn connection_string_needs_an_account() {
        assert!(matches!(
            from_connection_string("AccountKey=c2VjcmV0"),
            Err(ServiceError::Credentials(_))
        ));
    }

    #[test]
    fn connection_string_wins_over_account() {
        let options = ConnectionOptions {
            connection_string: Some("UseDevelopmentStorage=true".into()),
            account_key: Some("c2VjcmV0".into()),
            ..options("acct")
        };
        assert_eq!(
            container_url(client_builder(&options).unwrap()),
            "http://127.0.0.1:10000/devstoreaccount1/data"
        );
    }

    #[test]
    fn account_alone_is_anonymous() {
        assert_eq!(
            container_url(client_builder(&options("acct")).unwrap()),
            "https://acct.blob.core.windows.net/data"
        );
    }

    #[test]
    fn account_is_required() {
        assert!(matches!(
            client_builder(&ConnectionOptions::default()),
            Err(ServiceError::Credentials(_))
        ));
    }

    #[test]
    fn account_from_blob_endpoint() {
        assert_eq!(
            account_from_endpoint("https://myacct.blob.core.windows.net/"),
            "myacct"
        );
        assert_eq!(account_from_endpoint("http://localhost:10000/x"), "localhost");
    }
}
