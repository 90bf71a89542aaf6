//! Key/value storage
//!
//! LocalStorage in the browser. Native builds have no backing store, so
//! reads miss and writes report failure.

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
}

#[cfg(target_arch = "wasm32")]
pub fn get_item(key: &str) -> Option<String> {
    local_storage()?.get_item(key).ok().flatten()
}

/// Returns false when the write did not happen (quota, private mode)
#[cfg(target_arch = "wasm32")]
pub fn set_item(key: &str, value: &str) -> bool {
    match local_storage() {
        Some(storage) => storage.set_item(key, value).is_ok(),
        None => false,
    }
}

#[cfg(target_arch = "wasm32")]
pub fn remove_item(key: &str) {
    if let Some(storage) = local_storage() {
        let _ = storage.remove_item(key);
    }
}

/// Native stubs
#[cfg(not(target_arch = "wasm32"))]
pub fn get_item(_key: &str) -> Option<String> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
pub fn set_item(_key: &str, _value: &str) -> bool {
    false
}

#[cfg(not(target_arch = "wasm32"))]
pub fn remove_item(_key: &str) {
    // No-op for native
}
