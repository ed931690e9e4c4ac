//! Transform: JSON array resource → item collection.

use vigil_core::error::{Result, VigilError};
use vigil_core::state::{Item, Payload, State};
use vigil_core::traits::Filter;

/// Parses a fetched resource body as a JSON array of objects and extracts
/// one item per element, reading configurable field names. The name field is
/// required on every element; uri and link are optional even when mapped.
pub struct JsonItemsFilter {
    name_field: String,
    uri_field: Option<String>,
    link_field: Option<String>,
}

impl JsonItemsFilter {
    pub fn new(
        name_field: impl Into<String>,
        uri_field: Option<String>,
        link_field: Option<String>,
    ) -> Self {
        Self {
            name_field: name_field.into(),
            uri_field,
            link_field,
        }
    }

    fn extract(&self, index: usize, element: &serde_json::Value) -> Result<Item> {
        let name = element
            .get(&self.name_field)
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                VigilError::filter(format!(
                    "Element {index} has no string field '{}'",
                    self.name_field
                ))
            })?;
        let mut item = Item::new(name);
        if let Some(field) = &self.uri_field {
            if let Some(uri) = element.get(field).and_then(|v| v.as_str()) {
                item = item.with_uri(uri);
            }
        }
        if let Some(field) = &self.link_field {
            if let Some(link) = element.get(field).and_then(|v| v.as_str()) {
                item = item.with_link(link);
            }
        }
        Ok(item)
    }
}

impl Filter for JsonItemsFilter {
    fn filter(&self, state: &State) -> Result<State> {
        let Payload::Resource { body, .. } = &state.payload else {
            return Err(VigilError::FilterPayload {
                expected: "resource",
                actual: state.payload.kind(),
            });
        };
        let parsed: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| VigilError::filter(format!("Body is not valid JSON: {e}")))?;
        let elements = parsed
            .as_array()
            .ok_or_else(|| VigilError::filter("Body is not a JSON array"))?;

        let items = elements
            .iter()
            .enumerate()
            .map(|(i, element)| self.extract(i, element))
            .collect::<Result<Vec<_>>>()?;
        Ok(State::ok(Payload::Items { items }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(body: &str) -> State {
        State::ok(Payload::Resource {
            url: "http://example.com/feed".into(),
            content_type: "application/json".into(),
            body: body.into(),
        })
    }

    #[test]
    fn extracts_items_with_mapped_fields() {
        let filter = JsonItemsFilter::new("title", Some("magnet".into()), Some("page".into()));
        let state = filter
            .filter(&resource(
                r#"[
                    {"title": "First", "magnet": "magnet:?xt=urn:btih:aaa", "page": "http://t/1"},
                    {"title": "Second"}
                ]"#,
            ))
            .unwrap();

        match state.payload {
            Payload::Items { items } => {
                assert_eq!(items.len(), 2);
                assert_eq!(items[0].name, "First");
                assert_eq!(items[0].identity(), "urn:btih:aaa");
                assert_eq!(items[1].name, "Second");
                assert!(items[1].uri.is_none());
            }
            other => panic!("wrong payload: {}", other.kind()),
        }
    }

    #[test]
    fn element_without_the_name_field_is_an_error() {
        let filter = JsonItemsFilter::new("title", None, None);
        let err = filter
            .filter(&resource(r#"[{"title": "ok"}, {"label": "nope"}]"#))
            .unwrap_err();
        assert!(err.to_string().contains("Element 1"));
    }

    #[test]
    fn non_array_body_is_an_error() {
        let filter = JsonItemsFilter::new("title", None, None);
        assert!(filter.filter(&resource(r#"{"title": "x"}"#)).is_err());
        assert!(filter.filter(&resource("not json")).is_err());
    }

    #[test]
    fn wrong_payload_shape_is_reported_as_such() {
        let filter = JsonItemsFilter::new("title", None, None);
        let err = filter
            .filter(&State::ok(Payload::Text { content: "x".into() }))
            .unwrap_err();
        assert!(matches!(
            err,
            VigilError::FilterPayload {
                expected: "resource",
                actual: "text"
            }
        ));
    }
}
