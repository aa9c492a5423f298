//! Contact form: client-side checks and a simulated send.
//!
//! Nothing leaves the browser. A valid form shows a thank-you message, then
//! resets itself after [`RESET_AFTER_MS`].

use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement,
    ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

use crate::error::{Result, SiteError};

pub const SUCCESS_MESSAGE: &str =
    "Thank you! Your message has been sent successfully. I will get back to you soon.";
pub const RESET_AFTER_MS: i32 = 5000;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    #[error("Please fill in all fields.")]
    MissingFields,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    /// Class list for the `#formMessage` element.
    pub fn class_name(self) -> &'static str {
        match self {
            MessageKind::Success => "form-message success",
            MessageKind::Error => "form-message error",
        }
    }
}

/// Trimmed form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

impl ContactMessage {
    pub fn new(name: &str, email: &str, subject: &str, message: &str) -> Self {
        Self {
            name: name.trim_matches(is_form_space).to_string(),
            email: email.trim_matches(is_form_space).to_string(),
            subject: subject.trim_matches(is_form_space).to_string(),
            message: message.trim_matches(is_form_space).to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        let fields = [&self.name, &self.email, &self.subject, &self.message];
        if fields.iter().any(|f| f.is_empty()) {
            return Err(FormError::MissingFields);
        }
        if !is_valid_email(&self.email) {
            return Err(FormError::InvalidEmail);
        }
        Ok(())
    }

    /// Message to show the visitor for this submission.
    pub fn outcome(&self) -> (MessageKind, String) {
        match self.validate() {
            Ok(()) => (MessageKind::Success, SUCCESS_MESSAGE.to_string()),
            Err(e) => (MessageKind::Error, e.to_string()),
        }
    }
}

/// Whitespace as browsers trim it: Unicode whitespace plus the BOM.
fn is_form_space(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// Shape check equivalent to `^[^\s@]+@[^\s@]+\.[^\s@]+$`: one `@`, no
/// whitespace, and a dot in the domain with text on both sides.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(is_form_space) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let chars: Vec<char> = domain.chars().collect();
    chars
        .iter()
        .enumerate()
        .any(|(i, &c)| c == '.' && i > 0 && i + 1 < chars.len())
}

fn field_value(doc: &Document, id: &str) -> String {
    let Some(el) = doc.get_element_by_id(id) else {
        return String::new();
    };
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        return input.value();
    }
    if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
        return area.value();
    }
    String::new()
}

fn show_message(el: &HtmlElement, kind: MessageKind, text: &str) {
    el.set_text_content(Some(text));
    el.set_class_name(kind.class_name());
    let _ = el.style().set_property("display", "block");
    let opts = ScrollIntoViewOptions::new();
    opts.set_behavior(ScrollBehavior::Smooth);
    opts.set_block(ScrollLogicalPosition::Nearest);
    el.scroll_into_view_with_scroll_into_view_options(&opts);
}

/// Hook the submit handler onto `#contactForm`. Returns `Ok(false)` when the
/// page has no contact form.
pub fn attach(win: &Window, doc: &Document) -> Result<bool> {
    let Some(form) = doc.get_element_by_id("contactForm") else {
        return Ok(false);
    };
    let form: HtmlFormElement = form
        .dyn_into()
        .map_err(|_| SiteError::MissingElement("#contactForm (not a form)".into()))?;
    let message_el: HtmlElement = doc
        .get_element_by_id("formMessage")
        .and_then(|el| el.dyn_into().ok())
        .ok_or_else(|| SiteError::MissingElement("#formMessage".into()))?;

    let doc_submit = doc.clone();
    let win_submit = win.clone();
    let form_submit = form.clone();
    let closure = Closure::wrap(Box::new(move |evt: web_sys::Event| {
        evt.prevent_default();
        let msg = ContactMessage::new(
            &field_value(&doc_submit, "name"),
            &field_value(&doc_submit, "email"),
            &field_value(&doc_submit, "subject"),
            &field_value(&doc_submit, "message"),
        );
        let (kind, text) = msg.outcome();
        show_message(&message_el, kind, &text);
        if kind != MessageKind::Success {
            return;
        }
        log::info!("contact form accepted (simulated send)");

        let form_reset = form_submit.clone();
        let message_reset = message_el.clone();
        let reset = Closure::once_into_js(move || {
            form_reset.reset();
            let _ = message_reset.style().set_property("display", "none");
        });
        if let Err(e) = win_submit.set_timeout_with_callback_and_timeout_and_arguments_0(
            reset.unchecked_ref(),
            RESET_AFTER_MS,
        ) {
            log::warn!("contact form reset timer failed: {:?}", e);
        }
    }) as Box<dyn FnMut(_)>);
    form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(true)
}
