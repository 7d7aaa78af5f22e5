use web_sys as web;

/// Hide the loading overlay once the font and GPU are up.
#[inline]
pub fn hide_loading(document: &web::Document) {
    if let Some(el) = document.get_element_by_id("loading") {
        let cl = el.class_list();
        _ = cl.add_1("hidden");
        // fallback for environments without CSS class
        _ = el.set_attribute("style", "display:none");
    }
}
