use wasm_bindgen::prelude::*;

/// Render an export request given as JSON to PDF bytes.
#[wasm_bindgen]
pub fn render_pdf(json: &str) -> Result<Vec<u8>, JsValue> {
    crate::render_json(json)
        .map(|rendered| rendered.bytes)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// The filename an export request would be saved under.
#[wasm_bindgen]
pub fn export_filename(invoice_number: &str) -> String {
    crate::export::export_filename(invoice_number)
}
