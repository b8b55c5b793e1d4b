//! Shared utilities for integration tests: an in-process mock ledger.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use reserve_dashboard::config::DashboardConfig;

/// One request as seen by the mock ledger.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone)]
struct Canned {
    status: u16,
    body: Value,
    delay: Duration,
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<(Method, String), Canned>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Programmable ledger bound to an ephemeral local port.
#[derive(Clone)]
pub struct MockLedger {
    pub addr: SocketAddr,
    state: Arc<MockState>,
}

#[allow(dead_code)]
impl MockLedger {
    /// Start serving. Unknown routes answer 404 with a failure envelope.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(MockState::default());

        let app = Router::new().fallback(handle).with_state(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Dashboard config pointing at this ledger.
    pub fn config(&self) -> DashboardConfig {
        let mut config = DashboardConfig::default();
        config.ledger.base_url = self.base_url();
        config.ledger.request_timeout_secs = 2;
        config
    }

    /// Answer `method path` with a raw status and body.
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.respond_after(method, path, status, body, Duration::ZERO);
    }

    pub fn respond_after(&self, method: Method, path: &str, status: u16, body: Value, delay: Duration) {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), Canned { status, body, delay });
    }

    /// Answer with a 200 success envelope around `data`.
    pub fn respond_ok(&self, method: Method, path: &str, data: Value) {
        self.respond(method, path, 200, json!({ "success": true, "data": data }));
    }

    /// Answer with an error status and a failure envelope carrying `message`.
    pub fn respond_error(&self, method: Method, path: &str, status: u16, message: &str) {
        self.respond(
            method,
            path,
            status,
            json!({ "success": false, "data": null, "message": message }),
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Requests received for `method path`.
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.state
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }
}

async fn handle(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: header("authorization"),
        request_id: header("x-request-id"),
        body: serde_json::from_slice(&body).ok(),
    });

    let canned = state
        .routes
        .lock()
        .unwrap()
        .get(&(method, uri.path().to_string()))
        .cloned();

    match canned {
        Some(canned) => {
            if !canned.delay.is_zero() {
                tokio::time::sleep(canned.delay).await;
            }
            let status = StatusCode::from_u16(canned.status).unwrap();
            (status, Json(canned.body)).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "data": null, "message": "no such route" })),
        )
            .into_response(),
    }
}

/// Wire JSON for a wallet.
#[allow(dead_code)]
pub fn wallet_json(address: &str, balance: f64, frozen: bool) -> Value {
    json!({
        "address": address,
        "balance": balance,
        "frozen": frozen,
        "kycStatus": "VERIFIED",
        "createdAt": "2025-01-10T08:00:00Z"
    })
}

/// Wire JSON for the reserve.
#[allow(dead_code)]
pub fn reserve_json(hkd_balance: f64, ratio: f64) -> Value {
    json!({
        "hkdBalance": hkd_balance,
        "assets": { "HKD_Cash": hkd_balance * 0.6, "HK_Govt_Bonds": hkd_balance * 0.4 },
        "lastAudit": "2025-01-15T09:00:00Z",
        "reserveRatio": ratio
    })
}

/// Wire JSON for a completed transaction.
#[allow(dead_code)]
pub fn transaction_json(id: &str, kind: &str, from: &str, to: &str, amount: f64) -> Value {
    json!({
        "id": id,
        "fromAddress": from,
        "toAddress": to,
        "amount": amount,
        "transactionType": kind,
        "status": "COMPLETED",
        "createdAt": "2025-01-16T10:15:00Z"
    })
}
