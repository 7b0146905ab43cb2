//! WASM bindings for boleto field extraction and validation.
//!
//! Recognition stays on the host: callers pass text (from a PDF text layer
//! or a browser-side OCR engine) and get fields and outcomes back as JS
//! objects.

use chrono::NaiveDate;
use wasm_bindgen::prelude::*;

use boleto_core::models::config::{ExtractionConfig, ValidationConfig};
use boleto_core::validation::{self, PaymentLine};
use boleto_core::{BoletoExtractor, ExtractedFields, FieldValidator, ValidationMode};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js_error(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Today's date in the host's local time zone.
fn today() -> Result<NaiveDate, JsValue> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
    .ok_or_else(|| JsValue::from_str("host clock returned an invalid date"))
}

/// Parse `YYYY-MM-DD`, or use today.
fn evaluation_date(date_iso: Option<String>) -> Result<NaiveDate, JsValue> {
    match date_iso {
        Some(date) => NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .map_err(|e| JsValue::from_str(&format!("invalid evaluation date {}: {}", date, e))),
        None => today(),
    }
}

/// Extract boleto fields from text.
#[wasm_bindgen]
pub fn extract_fields_from_text(text: &str) -> Result<JsValue, JsValue> {
    let fields = BoletoExtractor::default().extract(text);
    serde_wasm_bindgen::to_value(&fields).map_err(to_js_error)
}

/// Validate fields (as returned by `extract_fields_from_text`) and score them.
#[wasm_bindgen]
pub fn validate_and_score(fields: JsValue, date_iso: Option<String>) -> Result<JsValue, JsValue> {
    let fields: ExtractedFields = serde_wasm_bindgen::from_value(fields).map_err(to_js_error)?;
    let outcome = FieldValidator::default().validate_and_score(&fields, evaluation_date(date_iso)?);
    serde_wasm_bindgen::to_value(&outcome).map_err(to_js_error)
}

/// Extract, validate and return the status JSON string used by HTTP clients.
#[wasm_bindgen]
pub fn process_text(text: &str, date_iso: Option<String>) -> Result<String, JsValue> {
    let fields = BoletoExtractor::default().extract(text);
    let outcome = FieldValidator::default().validate_and_score(&fields, evaluation_date(date_iso)?);
    serde_json::to_string(&outcome.to_wire()).map_err(to_js_error)
}

/// Validate a CNPJ (masked or digits only).
#[wasm_bindgen]
pub fn validate_cnpj(cnpj: &str) -> bool {
    validation::validate_cnpj(cnpj)
}

/// Validate a payment line. `strict` also verifies the check digits.
#[wasm_bindgen]
pub fn validate_payment_line(line: &str, strict: bool) -> bool {
    match PaymentLine::parse(line) {
        Ok(parsed) => !strict || parsed.is_strictly_valid(),
        Err(_) => false,
    }
}

/// Barcode (44 digits) of a payment line.
#[wasm_bindgen]
pub fn payment_line_to_barcode(line: &str) -> Result<String, JsValue> {
    PaymentLine::parse(line).map(|p| p.barcode()).map_err(to_js_error)
}

/// Extractor and validator with settings, for repeated use from JS.
#[wasm_bindgen]
pub struct BoletoAnalyzer {
    extraction: ExtractionConfig,
    validation: ValidationConfig,
}

#[wasm_bindgen]
impl BoletoAnalyzer {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            validation: ValidationConfig::default(),
        }
    }

    /// Verify payment line check digits instead of only counting digits.
    #[wasm_bindgen]
    pub fn set_strict(&mut self, strict: bool) {
        self.validation.payment_line_mode = if strict {
            ValidationMode::Strict
        } else {
            ValidationMode::Lenient
        };
    }

    /// Days ahead of the due date that count as "due soon".
    #[wasm_bindgen]
    pub fn set_due_soon_days(&mut self, days: i64) {
        self.validation.due_soon_days = days;
    }

    /// Repair common OCR confusions in digit contexts before extraction.
    #[wasm_bindgen]
    pub fn set_auto_correct(&mut self, enabled: bool) {
        self.extraction.auto_correct = enabled;
    }

    #[wasm_bindgen]
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        let fields = BoletoExtractor::new(self.extraction.clone()).extract(text);
        serde_wasm_bindgen::to_value(&fields).map_err(to_js_error)
    }

    /// Full report: fields plus outcome.
    #[wasm_bindgen]
    pub fn analyze(&self, text: &str, date_iso: Option<String>) -> Result<JsValue, JsValue> {
        #[derive(serde::Serialize)]
        struct Analysis {
            fields: ExtractedFields,
            outcome: boleto_core::ValidationOutcome,
        }

        let fields = BoletoExtractor::new(self.extraction.clone()).extract(text);
        let outcome = FieldValidator::new(self.validation.clone())
            .validate_and_score(&fields, evaluation_date(date_iso)?);

        serde_wasm_bindgen::to_value(&Analysis { fields, outcome }).map_err(to_js_error)
    }
}

impl Default for BoletoAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}
