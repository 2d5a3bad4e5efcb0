//! Object store access
//!
//! Published material lives under `<key_prefix>/<resource_id>/<component_id>/...`;
//! anything present in the store is considered published. Transient
//! request failures are retried by the SDK's standard retry policy.

use adit_common::{AditError, Result, StoreConfig};
use aws_sdk_s3::{
    config::{retry::RetryConfig, Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    Client,
};
use tracing::{debug, info, warn};

/// Session handle for the object store
#[derive(Clone)]
pub struct ObjectStore {
    client: Client,
    bucket: String,
    key_prefix: String,
}

impl ObjectStore {
    /// Build a client for the configured bucket.
    pub fn new(config: &StoreConfig) -> Self {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "adit-store",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .retry_config(RetryConfig::standard())
            .force_path_style(config.path_style);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(builder.build());
        info!(bucket = %config.bucket, "object store client initialized");

        Self {
            client,
            bucket: config.bucket.clone(),
            key_prefix: config.key_prefix.trim_matches('/').to_string(),
        }
    }

    fn resource_prefix(&self, resource_id: &str) -> String {
        if self.key_prefix.is_empty() {
            format!("{resource_id}/")
        } else {
            format!("{}/{}/", self.key_prefix, resource_id)
        }
    }

    /// Component ids of the items published under a resource.
    ///
    /// Lists one delimiter level of key prefixes under the resource's
    /// canonical path; each common prefix names one published item.
    pub async fn published_component_ids(&self, resource_id: &str) -> Result<Vec<String>> {
        let prefix = self.resource_prefix(resource_id);
        debug!(bucket = %self.bucket, %prefix, "listing published component prefixes");

        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .delimiter("/")
            .prefix(&prefix)
            .into_paginator()
            .send();

        let mut component_ids = Vec::new();
        while let Some(page) = pages.next().await {
            let page =
                page.map_err(|err| AditError::store(DisplayErrorContext(&err).to_string()))?;
            for common_prefix in page.common_prefixes() {
                if let Some(id) = common_prefix.prefix().and_then(component_id_from_prefix) {
                    component_ids.push(id);
                }
            }
        }

        debug!(resource_id, count = component_ids.len(), "published components listed");
        Ok(component_ids)
    }

    /// Fetch an object's bytes, or `None` when the key is absent.
    pub async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(response) => {
                let data = response
                    .body
                    .collect()
                    .await
                    .map_err(|err| AditError::store(err.to_string()))?
                    .into_bytes()
                    .to_vec();
                Ok(Some(data))
            },
            Err(err) => {
                if err
                    .as_service_error()
                    .is_some_and(|service| service.is_no_such_key())
                {
                    warn!(%key, "object not found");
                    Ok(None)
                } else {
                    Err(AditError::store(DisplayErrorContext(&err).to_string()))
                }
            },
        }
    }

    /// Write an object (empty bodies are allowed, e.g. marker keys).
    pub async fn put_object(&self, key: &str, body: Vec<u8>) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|err| AditError::store(DisplayErrorContext(&err).to_string()))?;

        debug!(bucket = %self.bucket, %key, "object written");
        Ok(())
    }
}

/// Final path segment of a delimiter-listed prefix:
/// `collections/RC0123/item-1/` names component `item-1`.
fn component_id_from_prefix(prefix: &str) -> Option<String> {
    let segment = prefix.trim_end_matches('/').rsplit('/').next()?;
    if segment.is_empty() {
        None
    } else {
        Some(segment.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_component_id_from_prefix() {
        assert_eq!(
            component_id_from_prefix("collections/RC0123/item-1/").as_deref(),
            Some("item-1")
        );
        assert_eq!(
            component_id_from_prefix("RC0123/item-2/").as_deref(),
            Some("item-2")
        );
        assert_eq!(component_id_from_prefix("/").as_deref(), None);
    }

    #[test]
    fn test_resource_prefix() {
        let store = ObjectStore::new(&StoreConfig::for_endpoint(
            "http://localhost:9000",
            "published",
            "/collections/",
        ));
        assert_eq!(store.resource_prefix("RC0123"), "collections/RC0123/");

        let bare = ObjectStore::new(&StoreConfig::for_endpoint(
            "http://localhost:9000",
            "published",
            "",
        ));
        assert_eq!(bare.resource_prefix("RC0123"), "RC0123/");
    }
}
