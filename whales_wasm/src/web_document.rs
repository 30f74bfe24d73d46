use wasm_bindgen::JsCast;

use crate::rust_error;
use crate::web_error_handling::JsResult;


pub struct WebDocument(web_sys::Document);

impl WebDocument {
    pub fn get_existing_element_by_id(&self, element_id: &str) -> JsResult<web_sys::Element> {
        let element = self
            .0
            .get_element_by_id(element_id)
            .ok_or_else(|| rust_error!("Cannot find element \"{}\"", element_id))?;
        if !element.is_object() {
            return Err(rust_error!("Element \"{}\" is not an object", element_id));
        }
        Ok(element)
    }

    pub fn query_selector_all(&self, selectors: &str) -> JsResult<Vec<web_sys::Element>> {
        let nodes = self.0.query_selector_all(selectors)?;
        Ok((0..nodes.length())
            .filter_map(|i| nodes.get(i))
            .filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
            .collect())
    }

    pub fn add_class_name(&self, selectors: &str, class_name: &str) -> JsResult<()> {
        for element in self.query_selector_all(selectors)? {
            element.class_list().add_1(class_name)?;
        }
        Ok(())
    }
    pub fn purge_class_name(&self, selectors: &str, class_name: &str) -> JsResult<()> {
        for element in self.query_selector_all(selectors)? {
            element.class_list().remove_1(class_name)?;
        }
        Ok(())
    }
}

pub fn web_window() -> JsResult<web_sys::Window> {
    web_sys::window().ok_or_else(|| rust_error!("Cannot find window"))
}

pub fn web_document() -> JsResult<WebDocument> {
    let document = web_window()?.document().ok_or_else(|| rust_error!("Cannot find document"))?;
    Ok(WebDocument(document))
}
