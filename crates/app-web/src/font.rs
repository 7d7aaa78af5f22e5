use js_sys::{ArrayBuffer, Uint8Array};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

// Same bold sans the canvas build used, served from the same CDN.
pub const FONT_URL: &str =
    "https://cdn.jsdelivr.net/npm/dejavu-fonts-ttf@2.37.3/ttf/DejaVuSans-Bold.ttf";

/// Fetch the TTF bytes for the glyph source.
pub async fn fetch_font_bytes(url: &str) -> anyhow::Result<Vec<u8>> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let resp_value = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| anyhow::anyhow!("font fetch failed: {:?}", e))?;
    let resp: web::Response = resp_value
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    if !resp.ok() {
        return Err(anyhow::anyhow!("font fetch returned {}", resp.status()));
    }
    let buf_promise = resp
        .array_buffer()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let buf_value = JsFuture::from(buf_promise)
        .await
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    let buf: ArrayBuffer = buf_value
        .dyn_into()
        .map_err(|e| anyhow::anyhow!("{:?}", e))?;
    Ok(Uint8Array::new(&buf).to_vec())
}
