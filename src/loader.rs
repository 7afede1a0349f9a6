use portal_fx_core::{resolve, AssetError, DeviceProfile, LoadOutcome, TransformSpec};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

/// Fetch, parse and normalize a decorative asset.
///
/// Never fails: any problem along the way yields a procedural fallback and a
/// warning in the console.
pub async fn load_decorative_asset(
    path: &str,
    spec: &TransformSpec,
    profile: &DeviceProfile,
) -> LoadOutcome {
    let fetched = fetch_bytes(path).await;
    let outcome = resolve(fetched, spec, profile);
    match outcome.reason() {
        Some(reason) => log::warn!("[loader] {} unavailable, using fallback: {}", path, reason),
        None => log::info!(
            "[loader] {} loaded ({} triangles)",
            path,
            outcome.object().mesh.triangle_count()
        ),
    }
    outcome
}

pub async fn fetch_bytes(path: &str) -> Result<Vec<u8>, AssetError> {
    let window = web::window().ok_or_else(|| AssetError::Fetch("no window".into()))?;
    let response = JsFuture::from(window.fetch_with_str(path))
        .await
        .map_err(|e| AssetError::Fetch(format!("{:?}", e)))?;
    let response: web::Response = response
        .dyn_into()
        .map_err(|_| AssetError::Fetch("fetch did not return a Response".into()))?;
    if !response.ok() {
        return Err(AssetError::HttpStatus(response.status()));
    }
    let body = response
        .array_buffer()
        .map_err(|e| AssetError::Fetch(format!("{:?}", e)))?;
    let buffer = JsFuture::from(body)
        .await
        .map_err(|e| AssetError::Fetch(format!("{:?}", e)))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}
