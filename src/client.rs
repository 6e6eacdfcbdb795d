//! # Composition Client
//!
//! HTTP bridge between a composition and the rendering/printing backend.
//!
//! The client never mutates a store. Loads come back as a buffered
//! [`LoadedComposition`] for the caller to commit; preview, save and print
//! take a [`Snapshot`] and report what the backend said.
//!
//! ## Endpoints
//!
//! | Operation | Method | Path |
//! |-----------|--------|------|
//! | Text entries | GET | `/api/label/input-items` |
//! | Icon entries | GET | `/api/label/icon-items` |
//! | Barcode entries | GET | `/api/label/barcode-items` |
//! | Label settings | GET | `/api/label/label-settings` |
//! | Preview | POST | `/api/label/create-bitmap` |
//! | Save | POST | `/api/label/save-settings` |
//! | Print | POST | `/api/label/print` |
//! | Printer settings | GET/POST | `/api/label/settings` |
//! | Health | GET | `/health` |
//!
//! ## Re-entrancy
//!
//! Each operation has its own in-flight flag. Starting an operation that
//! is already running fails fast with [`EtiketError::Busy`] and sends
//! nothing; different operations never block each other.

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{BackendError, EtiketError};
use crate::model::{BarcodeEntry, IconEntry, LabelSettings, PrinterSettings, TextEntry};
use crate::store::Snapshot;

/// Backend API paths.
pub mod endpoints {
    pub const TEXT_ITEMS: &str = "/api/label/input-items";
    pub const ICON_ITEMS: &str = "/api/label/icon-items";
    pub const BARCODE_ITEMS: &str = "/api/label/barcode-items";
    pub const LABEL_SETTINGS: &str = "/api/label/label-settings";
    pub const CREATE_BITMAP: &str = "/api/label/create-bitmap";
    pub const SAVE_SETTINGS: &str = "/api/label/save-settings";
    pub const PRINT: &str = "/api/label/print";
    pub const PRINTER_SETTINGS: &str = "/api/label/settings";
    pub const HEALTH: &str = "/health";
}

/// Result of a complete load: all four fetches succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedComposition {
    pub snapshot: Snapshot,
    pub settings: LabelSettings,
}

/// Body of a successful bitmap generation.
#[derive(Debug, Deserialize)]
struct PreviewResponse {
    #[serde(default)]
    bitmap: Option<String>,
}

/// Acknowledgement returned by save, print and settings updates.
///
/// The backend's shape is loose; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendAck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_entries: Option<u64>,
}

impl BackendAck {
    /// The failure the backend stated, if any.
    fn rejection(&self) -> Option<String> {
        if let Some(error) = &self.error {
            return Some(error.clone());
        }
        if self.success == Some(false) {
            return Some(
                self.message
                    .clone()
                    .unwrap_or_else(|| "backend reported failure".to_string()),
            );
        }
        None
    }

    /// Message to show the user, falling back to `default`.
    pub fn message_or(&self, default: &str) -> String {
        self.message.clone().unwrap_or_else(|| default.to_string())
    }
}

/// Backend health report.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: NaiveDateTime,
    pub version: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// One in-flight flag per operation.
#[derive(Debug, Default)]
struct InFlight {
    load: AtomicBool,
    preview: AtomicBool,
    persist: AtomicBool,
    print: AtomicBool,
}

/// Holds an operation's flag for the duration of the call.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool, operation: &'static str) -> Result<Self, EtiketError> {
        if flag
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(operation, "re-entrant call refused");
            return Err(EtiketError::Busy(operation));
        }
        Ok(Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// HTTP client for the label backend.
#[derive(Debug)]
pub struct CompositionClient {
    config: ClientConfig,
    http: reqwest::Client,
    in_flight: InFlight,
}

impl CompositionClient {
    /// Create a client. No request is sent until an operation is called.
    pub fn new(config: ClientConfig) -> Result<Self, EtiketError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| EtiketError::Config(format!("HTTP client error: {}", e)))?;
        Ok(Self {
            config,
            http,
            in_flight: InFlight::default(),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The underlying HTTP client, shared with URL image sources.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Whether a preview request is currently outstanding.
    pub fn preview_in_flight(&self) -> bool {
        self.in_flight.preview.load(Ordering::Acquire)
    }

    /// Whether a print request is currently outstanding.
    pub fn print_in_flight(&self) -> bool {
        self.in_flight.print.load(Ordering::Acquire)
    }

    /// Fetch text, icon and barcode entries plus label settings.
    ///
    /// The four requests run concurrently. The result is all-or-nothing:
    /// if any fetch fails, the whole load fails and no partial data is
    /// returned.
    pub async fn load_all(&self) -> Result<LoadedComposition, EtiketError> {
        let _guard = InFlightGuard::acquire(&self.in_flight.load, "load")?;

        let (text_entries, icon_entries, barcode_entries, settings) = tokio::try_join!(
            self.get_json::<Vec<TextEntry>>(endpoints::TEXT_ITEMS),
            self.get_json::<Vec<IconEntry>>(endpoints::ICON_ITEMS),
            self.get_json::<Vec<BarcodeEntry>>(endpoints::BARCODE_ITEMS),
            self.get_json::<LabelSettings>(endpoints::LABEL_SETTINGS),
        )
        .map_err(|e| {
            warn!(error = %e, "load failed");
            EtiketError::Load(e)
        })?;

        info!(
            texts = text_entries.len(),
            icons = icon_entries.len(),
            barcodes = barcode_entries.len(),
            "composition loaded"
        );

        Ok(LoadedComposition {
            snapshot: Snapshot {
                text_entries,
                icon_entries,
                barcode_entries,
            },
            settings,
        })
    }

    /// Render `snapshot` on the backend and return the base64 bitmap.
    pub async fn preview(&self, snapshot: &Snapshot) -> Result<String, EtiketError> {
        let _guard = InFlightGuard::acquire(&self.in_flight.preview, "preview")?;

        let response: PreviewResponse = self
            .post_json(endpoints::CREATE_BITMAP, snapshot)
            .await
            .map_err(|e| {
                warn!(error = %e, "preview failed");
                EtiketError::Preview(e)
            })?;

        match response.bitmap {
            Some(bitmap) if !bitmap.is_empty() => {
                info!(bytes = bitmap.len(), "preview bitmap received");
                Ok(bitmap)
            }
            _ => {
                warn!("preview response had no bitmap");
                Err(EtiketError::Preview(BackendError::Decode(
                    "backend returned no bitmap".to_string(),
                )))
            }
        }
    }

    /// Save `snapshot` on the backend.
    pub async fn persist(&self, snapshot: &Snapshot) -> Result<BackendAck, EtiketError> {
        let _guard = InFlightGuard::acquire(&self.in_flight.persist, "save")?;

        let ack = self
            .post_ack(endpoints::SAVE_SETTINGS, snapshot)
            .await
            .map_err(|e| {
                warn!(error = %e, "save failed");
                EtiketError::Persist(e)
            })?;
        info!(saved = ?ack.saved_entries, "composition saved");
        Ok(ack)
    }

    /// Ask the backend to print `snapshot`.
    ///
    /// Success means the backend acknowledged the job without stating a
    /// failure; the client does not claim anything beyond that.
    pub async fn print(&self, snapshot: &Snapshot) -> Result<BackendAck, EtiketError> {
        let _guard = InFlightGuard::acquire(&self.in_flight.print, "print")?;

        let ack = self.post_ack(endpoints::PRINT, snapshot).await.map_err(|e| {
            warn!(error = %e, "print failed");
            EtiketError::Print(e)
        })?;
        info!(ack = ?ack.message, "print acknowledged");
        Ok(ack)
    }

    /// Backend liveness check.
    pub async fn health(&self) -> Result<HealthStatus, EtiketError> {
        Ok(self.get_json(endpoints::HEALTH).await?)
    }

    /// Current printer driver settings.
    pub async fn printer_settings(&self) -> Result<PrinterSettings, EtiketError> {
        Ok(self.get_json(endpoints::PRINTER_SETTINGS).await?)
    }

    /// Update some printer settings; keys the backend does not know are ignored by it.
    pub async fn update_printer_settings(
        &self,
        changes: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<BackendAck, EtiketError> {
        Ok(self.post_ack(endpoints::PRINTER_SETTINGS, changes).await?)
    }

    // ========================================================================
    // WIRE HELPERS
    // ========================================================================

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, BackendError> {
        debug!(path, "GET");
        let response = self.http.get(self.config.endpoint(path)).send().await?;
        let body = read_success_body(path, response).await?;
        serde_json::from_slice(&body).map_err(|e| BackendError::Decode(format!("{}: {}", path, e)))
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(path, "POST");
        let response = self
            .http
            .post(self.config.endpoint(path))
            .json(body)
            .send()
            .await?;
        let body = read_success_body(path, response).await?;
        serde_json::from_slice(&body).map_err(|e| BackendError::Decode(format!("{}: {}", path, e)))
    }

    /// POST and interpret the body as an acknowledgement.
    ///
    /// A body that is not JSON is kept as the ack message.
    async fn post_ack<B>(&self, path: &str, body: &B) -> Result<BackendAck, BackendError>
    where
        B: Serialize + ?Sized,
    {
        debug!(path, "POST");
        let response = self
            .http
            .post(self.config.endpoint(path))
            .json(body)
            .send()
            .await?;
        let body = read_success_body(path, response).await?;

        let ack = match serde_json::from_slice::<BackendAck>(&body) {
            Ok(ack) => ack,
            Err(_) => {
                let text = String::from_utf8_lossy(&body).trim().to_string();
                if text.is_empty() {
                    warn!(path, "backend sent an empty acknowledgement");
                }
                BackendAck {
                    message: (!text.is_empty()).then_some(text),
                    ..Default::default()
                }
            }
        };

        match ack.rejection() {
            Some(reason) => Err(BackendError::Rejected(reason)),
            None => Ok(ack),
        }
    }
}

/// Return the body of a 2xx response, or a `Status` error carrying the
/// backend's `error` message.
async fn read_success_body(path: &str, response: reqwest::Response) -> Result<Vec<u8>, BackendError> {
    let status = response.status();
    let body = response.bytes().await?;
    if status.is_success() {
        return Ok(body.to_vec());
    }

    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    let message = match serde_json::from_slice::<ErrorBody>(&body) {
        Ok(e) => e.error,
        Err(_) => {
            let text = String::from_utf8_lossy(&body);
            let text = text.trim();
            if text.is_empty() {
                status.canonical_reason().unwrap_or("no body").to_string()
            } else {
                text.chars().take(200).collect()
            }
        }
    };

    Err(BackendError::Status {
        path: path.to_string(),
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_with_error_is_rejection() {
        let ack: BackendAck = serde_json::from_str(r#"{"error": "printer offline"}"#).unwrap();
        assert_eq!(ack.rejection().as_deref(), Some("printer offline"));
    }

    #[test]
    fn ack_with_success_false_is_rejection() {
        let ack: BackendAck =
            serde_json::from_str(r#"{"success": false, "message": "paper out"}"#).unwrap();
        assert_eq!(ack.rejection().as_deref(), Some("paper out"));
    }

    #[test]
    fn plain_ack_is_accepted() {
        let ack: BackendAck = serde_json::from_str(
            r#"{"message": "Settings saved successfully", "saved_entries": 3}"#,
        )
        .unwrap();
        assert_eq!(ack.rejection(), None);
        assert_eq!(ack.saved_entries, Some(3));
        assert_eq!(ack.message_or("saved"), "Settings saved successfully");
    }

    #[test]
    fn guard_refuses_reentry_and_releases() {
        let flag = AtomicBool::new(false);
        {
            let _held = InFlightGuard::acquire(&flag, "print").unwrap();
            assert!(matches!(
                InFlightGuard::acquire(&flag, "print"),
                Err(EtiketError::Busy("print"))
            ));
        }
        assert!(InFlightGuard::acquire(&flag, "print").is_ok());
    }

    #[test]
    fn health_parses_iso_timestamp() {
        let health: HealthStatus = serde_json::from_str(
            r#"{"status": "healthy", "timestamp": "2024-05-01T10:20:30.123456", "version": "1.0.0"}"#,
        )
        .unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.version, "1.0.0");
    }
}
