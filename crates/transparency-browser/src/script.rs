//! JavaScript snippets that resolve locators inside the page.
//!
//! Element scripts evaluate to `{"missing": true}` when the indexed match is
//! gone, or to `{"value": ...}` otherwise.

use serde_json::Value;

use transparency_core::{DriverError, ElementHandle, Locator};

use crate::cdp::Viewport;

pub(crate) const TEXT: &str = "return {value: (el.innerText || el.textContent || '').trim()};";

pub(crate) const CLICKABLE: &str = "const r = el.getBoundingClientRect(); \
    const s = window.getComputedStyle(el); \
    return {value: r.width > 0 && r.height > 0 && s.visibility !== 'hidden' \
        && s.display !== 'none' && !el.disabled};";

pub(crate) const CLICK_POINT: &str = "el.scrollIntoView({block: 'center', inline: 'center'}); \
    const r = el.getBoundingClientRect(); \
    return {value: {x: r.left + r.width / 2, y: r.top + r.height / 2}};";

pub(crate) const FOCUS_AND_CLEAR: &str = "el.focus(); \
    if ('value' in el) { el.value = ''; el.dispatchEvent(new Event('input', {bubbles: true})); } \
    return {value: true};";

pub(crate) const DOCUMENT_RECT: &str = "el.scrollIntoView({block: 'center'}); \
    const r = el.getBoundingClientRect(); \
    return {value: {x: r.left + window.scrollX, y: r.top + window.scrollY, \
        width: r.width, height: r.height, scale: 1}};";

/// Expression evaluating to an array of every match of `locator`.
pub(crate) fn collect(locator: Locator) -> String {
    let expression = quote(locator.expression());
    match locator {
        Locator::XPath(_) => format!(
            "(function() {{ \
                const r = document.evaluate({expression}, document, null, \
                    XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); \
                const out = []; \
                for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i)); \
                return out; \
            }})()"
        ),
        Locator::Css(_) => format!("Array.from(document.querySelectorAll({expression}))"),
    }
}

pub(crate) fn count(locator: Locator) -> String {
    format!("{}.length", collect(locator))
}

/// Run `body` with `el` bound to the element behind `handle`.
pub(crate) fn on_element(handle: &ElementHandle, body: &str) -> String {
    format!(
        "(function() {{ const el = {}[{}]; if (!el) return {{missing: true}}; {} }})()",
        collect(handle.locator),
        handle.index,
        body
    )
}

pub(crate) fn attribute(name: &str) -> String {
    format!("return {{value: el.getAttribute({})}};", quote(name))
}

/// Unwrap the result of an [`on_element`] script.
pub(crate) fn element_value(handle: &ElementHandle, result: Value) -> Result<Value, DriverError> {
    if result["missing"].as_bool() == Some(true) {
        return Err(DriverError::Stale(format!("{}[{}]", handle.locator, handle.index)));
    }
    match result {
        Value::Object(mut map) => Ok(map.remove("value").unwrap_or(Value::Null)),
        other => Err(DriverError::Script(format!(
            "Unexpected element script result: {}",
            other
        ))),
    }
}

/// Viewport point to click, from a [`CLICK_POINT`] value.
pub(crate) fn point(value: &Value) -> Result<(f64, f64), DriverError> {
    match (value["x"].as_f64(), value["y"].as_f64()) {
        (Some(x), Some(y)) => Ok((x, y)),
        _ => Err(DriverError::Script(format!("Invalid click point: {}", value))),
    }
}

/// Capture region from a [`DOCUMENT_RECT`] value.
pub(crate) fn clip(value: Value) -> Result<Viewport, DriverError> {
    serde_json::from_value(value)
        .map_err(|e| DriverError::Script(format!("Invalid element rect: {}", e)))
}

/// `localStorage.setItem` calls for each entry.
pub(crate) fn set_local_storage<'a>(entries: impl IntoIterator<Item = (&'a String, &'a String)>) -> String {
    entries
        .into_iter()
        .map(|(key, value)| format!("localStorage.setItem({}, {});", quote(key), quote(value)))
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) const DUMP_LOCAL_STORAGE: &str = "JSON.stringify(localStorage)";

/// JavaScript string literal for `s`.
fn quote(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_xpath_collects_snapshot() {
        let script = collect(Locator::XPath("//*[@id=\"termo\"]"));
        assert!(script.contains("ORDERED_NODE_SNAPSHOT_TYPE"));
        assert!(script.contains(r#""//*[@id=\"termo\"]""#));
    }

    #[test]
    fn test_css_uses_query_selector_all() {
        assert_eq!(
            count(Locator::Css("a.link")),
            r#"Array.from(document.querySelectorAll("a.link")).length"#
        );
    }

    #[test]
    fn test_on_element_indexes_matches() {
        let handle = ElementHandle::new(Locator::Css("td"), 3);
        let script = on_element(&handle, TEXT);
        assert!(script.contains("[3]"));
        assert!(script.contains("missing: true"));
        assert!(script.ends_with("})()"));
    }

    #[test]
    fn test_attribute_name_is_quoted() {
        assert_eq!(attribute("class"), r#"return {value: el.getAttribute("class")};"#);
    }

    #[test]
    fn test_missing_element_is_stale() {
        let handle = ElementHandle::new(Locator::Css("td"), 1);
        let err = element_value(&handle, json!({"missing": true})).unwrap_err();
        assert!(matches!(err, DriverError::Stale(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_element_value_unwraps() {
        let handle = ElementHandle::new(Locator::Css("td"), 0);
        assert_eq!(element_value(&handle, json!({"value": "12"})).unwrap(), json!("12"));
        assert_eq!(element_value(&handle, json!({"value": null})).unwrap(), Value::Null);
        assert!(matches!(
            element_value(&handle, json!(5)),
            Err(DriverError::Script(_))
        ));
    }

    #[test]
    fn test_point_and_clip() {
        assert_eq!(point(&json!({"x": 10.5, "y": 4})).unwrap(), (10.5, 4.0));
        assert!(point(&json!({"x": 1})).is_err());

        let rect = clip(json!({"x": 0, "y": 120, "width": 800, "height": 600, "scale": 1})).unwrap();
        assert_eq!(rect.y, 120.0);
        assert!(rect.is_visible());
    }

    #[test]
    fn test_local_storage_values_are_escaped() {
        let key = "user's".to_string();
        let value = "{\"theme\":\"dark\"}".to_string();
        let script = set_local_storage([(&key, &value)]);
        assert_eq!(
            script,
            r#"localStorage.setItem("user's", "{\"theme\":\"dark\"}");"#
        );
    }
}
