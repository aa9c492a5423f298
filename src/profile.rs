//! Profile picture: icon placeholder when the image fails to load, and an
//! optional upload that is kept in the key/value store.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, FileReader, HtmlImageElement, HtmlInputElement};

use crate::error::{Result, SiteError};
use crate::storage::KeyValueStore;

pub const PROFILE_KEY: &str = "profilePicture";
pub const IMAGE_ID: &str = "profile-image";
pub const UPLOAD_ID: &str = "profile-upload";

const PLACEHOLDER_STYLE: &str = "width: 100%; height: 100%; display: flex; align-items: center; \
    justify-content: center; background: var(--gradient-purple); color: white; font-size: 5rem;";

pub fn is_image_data_url(url: &str) -> bool {
    url.starts_with("data:image/")
}

/// Stored profile picture, as a data URL.
pub struct ProfilePicture<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> ProfilePicture<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Saved picture, ignoring anything that is not an image data URL.
    pub fn load(&self) -> Option<String> {
        self.store
            .get(PROFILE_KEY)
            .filter(|url| is_image_data_url(url))
    }

    pub fn save(&self, data_url: &str) -> Result<()> {
        if !is_image_data_url(data_url) {
            return Err(SiteError::InvalidProfileImage);
        }
        self.store.set(PROFILE_KEY, data_url);
        Ok(())
    }
}

fn profile_image(doc: &Document) -> Result<HtmlImageElement> {
    doc.get_element_by_id(IMAGE_ID)
        .and_then(|el| el.dyn_into().ok())
        .ok_or_else(|| SiteError::MissingElement(format!("#{}", IMAGE_ID)))
}

/// Swap a broken `#profile-image` for an icon placeholder.
pub fn attach_fallback(doc: &Document) -> Result<()> {
    let img = profile_image(doc)?;
    let doc_err = doc.clone();
    let img_err = img.clone();
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
        let _ = img_err.style().set_property("display", "none");
        let Some(parent) = img_err.parent_node() else {
            return;
        };
        let Ok(placeholder) = doc_err.create_element("div") else {
            return;
        };
        placeholder.set_class_name("profile-placeholder");
        placeholder.set_inner_html("<i class=\"fas fa-user-tie\"></i>");
        let _ = placeholder.set_attribute("style", PLACEHOLDER_STYLE);
        let _ = parent.append_child(&placeholder);
        log::warn!("profile image failed to load; showing placeholder");
    }) as Box<dyn FnMut(_)>);
    img.set_onerror(Some(closure.as_ref().unchecked_ref()));
    closure.forget();
    Ok(())
}

/// Restore a saved picture and persist new ones chosen in `#profile-upload`.
pub fn attach_upload(doc: &Document, store: Rc<dyn KeyValueStore>) -> Result<()> {
    let img = profile_image(doc)?;
    let picture = Rc::new(ProfilePicture::new(store));
    if let Some(saved) = picture.load() {
        img.set_src(&saved);
    }

    let input: HtmlInputElement = doc
        .get_element_by_id(UPLOAD_ID)
        .and_then(|el| el.dyn_into().ok())
        .ok_or_else(|| SiteError::MissingElement(format!("#{}", UPLOAD_ID)))?;
    let input_change = input.clone();
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
        let Some(file) = input_change.files().and_then(|f| f.get(0)) else {
            return;
        };
        let Ok(reader) = FileReader::new() else {
            return;
        };
        let reader_load = reader.clone();
        let img_load = img.clone();
        let picture_load = picture.clone();
        let onload = Closure::once_into_js(move || {
            let Some(url) = reader_load.result().ok().and_then(|v| v.as_string()) else {
                return;
            };
            match picture_load.save(&url) {
                Ok(()) => img_load.set_src(&url),
                Err(e) => log::warn!("profile upload rejected: {}", e),
            }
        });
        reader.set_onload(Some(onload.unchecked_ref()));
        if let Err(e) = reader.read_as_data_url(&file) {
            log::warn!("reading profile upload failed: {:?}", e);
        }
    }) as Box<dyn FnMut(_)>);
    input.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
