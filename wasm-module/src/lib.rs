//! QR code WebAssembly module.
//!
//! Browser bindings for the `qr-matrix` encoder. Every export returns a string:
//! SVG markup for [`create_qr_svg`], or a JSON result object of the form
//! `{"success": bool, "qr": EncodedQr | null, "error": string | null}`.
//!
//! Encoding runs entirely client-side and performs no I/O.

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use qr_matrix::{EncodeOptions, EncodedQr, QrError};

/// Log to browser console
#[cfg(target_arch = "wasm32")]
fn console_log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

#[cfg(not(target_arch = "wasm32"))]
fn console_log(msg: &str) {
    log::info!("{}", msg);
}

/// Result of an encode call, serialized for JavaScript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrResult {
    /// Whether the text was encoded.
    pub success: bool,
    /// The module matrix with its module count and cell size.
    pub qr: Option<EncodedQr>,
    /// Error message if encoding failed.
    pub error: Option<String>,
}

impl QrResult {
    fn from_encode(result: Result<EncodedQr, QrError>) -> Self {
        match result {
            Ok(qr) => QrResult {
                success: true,
                qr: Some(qr),
                error: None,
            },
            Err(e) => {
                console_log(&format!("QR encoding failed: {}", e));
                QrResult::failure(e.to_string())
            }
        }
    }

    fn failure(error: String) -> Self {
        QrResult {
            success: false,
            qr: None,
            error: Some(error),
        }
    }

    fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"success":false,"qr":null,"error":"Serialization error: {}"}}"#,
                e.to_string().replace('"', "'")
            )
        })
    }
}

/// Build an SVG QR code for `text`, fitted to `size` pixels.
///
/// Returns an empty string if the text does not fit any QR version.
#[wasm_bindgen]
pub fn create_qr_svg(text: &str, size: u32) -> String {
    match qr_matrix::encode(text, size) {
        Ok(qr) => qr_matrix::render::to_svg(&qr),
        Err(e) => {
            console_log(&format!("QR encoding failed: {}", e));
            String::new()
        }
    }
}

/// Encode `text` at level M, returning the module matrix as JSON.
#[wasm_bindgen]
pub fn encode_qr(text: &str, size: u32) -> String {
    QrResult::from_encode(qr_matrix::encode(text, size)).to_json()
}

/// Encode `text` with options given as JSON.
///
/// Accepted keys are `errorCorrection` (`"L"`, `"M"`, `"Q"` or `"H"`),
/// `targetPixelSize` and `textEncoding` (`"codeUnit"` or `"utf8"`); missing keys
/// take their defaults. An empty string means all defaults.
#[wasm_bindgen]
pub fn encode_qr_with_options(text: &str, options_json: &str) -> String {
    let options = if options_json.trim().is_empty() {
        EncodeOptions::default()
    } else {
        match serde_json::from_str::<EncodeOptions>(options_json) {
            Ok(options) => options,
            Err(e) => {
                console_log(&format!("Invalid QR options: {}", e));
                return QrResult::failure(format!("Invalid options: {}", e)).to_json();
            }
        }
    };

    QrResult::from_encode(qr_matrix::encode_with_options(text, &options)).to_json()
}
