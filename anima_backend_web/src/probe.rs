// Copyright 2026 the Anima Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transition support detection.

use wasm_bindgen::JsCast as _;
use web_sys::{Document, HtmlElement};

use anima_core::capability::{Capabilities, VendorPrefix};

/// Detects which spelling of the transition properties `document` accepts.
///
/// A scratch `<div>` is created (never attached) and each prefix in
/// [`VendorPrefix::ALL`] order gets a `transition-property` write. The first
/// spelling that reads back wins. If none does, the engine has no transition
/// support and [`Capabilities::NONE`] is returned.
#[must_use]
pub fn probe(document: &Document) -> Capabilities {
    let Some(element) = document
        .create_element("div")
        .ok()
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    else {
        return Capabilities::NONE;
    };
    let style = element.style();
    for prefix in VendorPrefix::ALL {
        let caps = Capabilities::prefixed(prefix);
        let key = caps.transition_property();
        if style.set_property(&key, "opacity").is_err() {
            continue;
        }
        if style
            .get_property_value(&key)
            .is_ok_and(|value| !value.is_empty())
        {
            return caps;
        }
    }
    Capabilities::NONE
}
