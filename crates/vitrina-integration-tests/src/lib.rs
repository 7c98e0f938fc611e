//! End-to-end integration tests for the Vitrina kiosk stack
//!
//! These tests wire the session gate, the catalog and the image cache
//! together to verify the full kiosk flow against mock origins.

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use vitrina_cache::{CachingAgent, ImageCacheCoordinator, ImageCacheRequest, ImageStore};
    use vitrina_catalog::{
        HttpClientConfig, ProductTable, SheetClient, SheetConfig, create_client,
    };
    use vitrina_core::geo::{GeoFix, GeoPoint};
    use vitrina_core::location::{LocationProvider, ProbeError, ProbeOptions};
    use vitrina_core::session_store::SessionStore;
    use vitrina_gate::{AccessGate, AccessState, FileSessionStore, GateConfig, spawn_expiry_task};

    struct FixedProvider(GeoFix);

    #[async_trait]
    impl LocationProvider for FixedProvider {
        async fn probe(&self, _options: &ProbeOptions) -> Result<GeoFix, ProbeError> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn test_full_kiosk_flow_from_grant_to_expiry() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let session_file = temp_dir.path().join("session.json");
        let image_dir = temp_dir.path().join("images");

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sheet-1/values/Productos!A2:H"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "range": "Productos!A2:H",
                "values": [[
                    "1",
                    format!("{}/img/widget.jpg", server.uri()),
                    "W-100",
                    "Widget",
                    "",
                    "$ 1.200",
                    "",
                    ""
                ]]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/img/widget.jpg"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/jpeg")
                    .set_body_bytes(vec![0xffu8, 0xd8, 0xff, 0xe0]),
            )
            .mount(&server)
            .await;

        // Grant inside the showroom radius; the session lands on disk
        let store = Arc::new(FileSessionStore::new(&session_file).unwrap());
        let target = GeoPoint::new(-34.5331, -58.5115);
        let provider = Arc::new(FixedProvider(GeoFix {
            point: GeoPoint::new(-34.5340, -58.5115),
            accuracy_m: 8.0,
        }));
        let gate = AccessGate::new(provider, store.clone(), GateConfig::new(target));

        let state = gate.activate().await;
        assert!(matches!(state, AccessState::Granted { .. }));
        assert!(session_file.exists());

        // Load the catalog and answer a search
        let client = create_client(&HttpClientConfig::default()).unwrap();
        let sheet = SheetClient::new(
            client.clone(),
            SheetConfig {
                spreadsheet_id: "sheet-1".to_string(),
                range: "Productos!A2:H".to_string(),
                api_key: "test-key".to_string(),
                base_url: server.uri(),
            },
        );
        let mut table = ProductTable::new();
        table.replace(sheet.fetch_rows().await.unwrap());
        assert_eq!(table.search("widget").len(), 1);

        // Warm the offline image cache from the loaded table
        let image_store = ImageStore::new(&image_dir).unwrap();
        let agent = CachingAgent::spawn(client, image_store.clone());
        let coordinator = ImageCacheCoordinator::new(agent.sender());
        let request = ImageCacheRequest::new(table.image_urls());
        coordinator.cache_images(&request).await.unwrap();

        let image_url = format!("{}/img/widget.jpg", server.uri());
        assert!(image_store.contains(&image_url));

        // The session cap wipes the grant from disk
        let expiry = spawn_expiry_task(store.clone(), Duration::from_millis(50));
        let mut expired = expiry.expired();
        if !*expired.borrow() {
            expired.changed().await.unwrap();
        }
        assert!(*expired.borrow());
        assert!(store.load().await.unwrap().is_none());

        agent.shutdown().await;
    }
}
