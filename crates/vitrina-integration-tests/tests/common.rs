//! Common test utilities for integration tests

use async_trait::async_trait;
use serde_json::json;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vitrina_catalog::SheetConfig;
use vitrina_core::geo::{GeoFix, GeoPoint};
use vitrina_core::location::{LocationProvider, ProbeError, ProbeOptions};

/// Showroom reference point used across the tests
#[allow(dead_code)]
pub const SHOWROOM: GeoPoint = GeoPoint {
    latitude: -34.5331,
    longitude: -58.5115,
};

/// About 100 m from the showroom, inside the default radius
#[allow(dead_code)]
pub fn fix_inside() -> GeoFix {
    GeoFix {
        point: GeoPoint::new(-34.5340, -58.5115),
        accuracy_m: 8.0,
    }
}

/// Downtown Buenos Aires, about 14.25 km away
#[allow(dead_code)]
pub fn fix_downtown() -> GeoFix {
    GeoFix {
        point: GeoPoint::new(-34.6037, -58.3816),
        accuracy_m: 8.0,
    }
}

/// Probe source that counts calls and pops one scripted outcome per probe,
/// repeating the last one
#[allow(dead_code)]
pub struct ScriptedProvider {
    outcomes: Mutex<Vec<Result<GeoFix, ProbeError>>>,
    probes: AtomicUsize,
}

#[allow(dead_code)]
impl ScriptedProvider {
    pub fn new(outcomes: Vec<Result<GeoFix, ProbeError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes),
            probes: AtomicUsize::new(0),
        }
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationProvider for ScriptedProvider {
    async fn probe(&self, _options: &ProbeOptions) -> Result<GeoFix, ProbeError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        let mut outcomes = self.outcomes.lock().unwrap();
        if outcomes.len() > 1 {
            outcomes.remove(0)
        } else {
            outcomes[0]
        }
    }
}

/// Two-row price list pointing its image column at `server_uri`
#[allow(dead_code)]
pub fn sheet_payload(server_uri: &str) -> serde_json::Value {
    json!({
        "range": "Productos!A2:H",
        "values": [
            [
                "1",
                format!("{}/img/widget.jpg", server_uri),
                "W-100",
                "Widget",
                "",
                "$ 1.200",
                "W-ALT",
                "Widget Deluxe"
            ],
            [
                "2",
                format!("{}/img/doodad.jpg", server_uri),
                "D-200",
                "Doodad",
                "",
                "$ 890",
                "",
                ""
            ],
        ]
    })
}

#[allow(dead_code)]
pub async fn mount_sheet(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/sheet-1/values/Productos!A2:H"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sheet_payload(&server.uri())))
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub async fn mount_image(server: &MockServer, name: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/img/{}.jpg", name)))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/jpeg")
                .set_body_bytes(vec![0xffu8, 0xd8, 0xff, 0xe0]),
        )
        .mount(server)
        .await;
}

#[allow(dead_code)]
pub fn sheet_config(base_url: String) -> SheetConfig {
    SheetConfig {
        spreadsheet_id: "sheet-1".to_string(),
        range: "Productos!A2:H".to_string(),
        api_key: "test-key".to_string(),
        base_url,
    }
}
