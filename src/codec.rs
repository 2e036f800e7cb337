//! The save-file codec: events to and from key-value documents.
//!
//! Decoding is partial and silent: any missing key, wrong type, or empty
//! driver list yields `None` with no diagnostics. Callers that need to know
//! *which* field was bad must wrap the decode and probe the document
//! themselves. Encoding is total, and `decode(encode(e)) == e` for every
//! valid event.

use serde_json::{Map, Value, json};

use crate::model::{Driver, Event};

/// Decodes one driver document.
///
/// Requires `label`, `action`, and `id`, all string-typed. Empty strings
/// are valid; `action == ""` is the wire form of "no action".
pub fn decode_driver(doc: &Value) -> Option<Driver> {
    Some(Driver::new(
        doc.get("label")?.as_str()?,
        doc.get("action")?.as_str()?,
        doc.get("id")?.as_str()?,
    ))
}

/// Decodes one event document.
///
/// A document with zero drivers never becomes an event: the driver list is
/// funneled through [`Event::new`], which refuses an empty collection. A
/// missing `pendingEffectEdit` key decodes the same as `""`: absent.
pub fn decode_event(doc: &Value) -> Option<Event> {
    let drivers = doc
        .get("drivers")?
        .as_array()?
        .iter()
        .map(decode_driver)
        .collect::<Option<Vec<_>>>()?;
    let cause = decode_driver(doc.get("cause")?)?;
    let effect = doc.get("effect")?.as_str()?;
    let context = doc.get("context")?.as_str()?;
    let pending_effect_edit = match doc.get("pendingEffectEdit") {
        None => "",
        Some(value) => value.as_str()?,
    };
    Event::new(drivers, cause, effect, context, pending_effect_edit)
}

pub fn encode_driver(driver: &Driver) -> Value {
    json!({
        "label": driver.label,
        "action": driver.action,
        "id": driver.id,
    })
}

/// Encodes an event. An absent pending edit encodes to `""`; drivers keep
/// their original order; `cause` and the list entries share
/// [`encode_driver`].
pub fn encode_event(event: &Event) -> Value {
    let mut doc = Map::new();
    doc.insert(
        "drivers".into(),
        Value::Array(event.drivers.iter().map(encode_driver).collect()),
    );
    doc.insert("cause".into(), encode_driver(&event.cause));
    doc.insert("effect".into(), Value::String(event.effect.clone()));
    doc.insert("context".into(), Value::String(event.context.clone()));
    doc.insert(
        "pendingEffectEdit".into(),
        Value::String(
            event
                .pending_effect_edit
                .clone()
                .unwrap_or_default(),
        ),
    );
    Value::Object(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver_with(id: &str, action: bool) -> Driver {
        Driver::new(
            format!("{id}-label"),
            if action { format!("{id}-action") } else { String::new() },
            format!("{id}-id"),
        )
    }

    fn driver_doc(id: &str, action: bool) -> Value {
        json!({
            "label": format!("{id}-label"),
            "action": if action { format!("{id}-action") } else { String::new() },
            "id": format!("{id}-id"),
        })
    }

    fn save_file() -> Value {
        json!({
            "drivers": [driver_doc("a", true), driver_doc("b", false), driver_doc("c", false)],
            "cause": driver_doc("a", true),
            "effect": "effect",
            "context": "context",
            "pendingEffectEdit": "pendingEffectEdit",
        })
    }

    fn sample_event() -> Event {
        Event::new(
            vec![
                driver_with("a", true),
                driver_with("b", false),
                driver_with("c", false),
            ],
            driver_with("a", true),
            "effect",
            "context",
            "pendingEffectEdit",
        )
        .unwrap()
    }

    #[test]
    fn decodes_valid_event() {
        let event = decode_event(&save_file()).unwrap();
        assert_eq!(event.drivers.len(), 3);
        assert_eq!(event.cause, driver_with("a", true));
        assert_eq!(event.effect, "effect");
        assert_eq!(event.context, "context");
        assert_eq!(
            event.pending_effect_edit.as_deref(),
            Some("pendingEffectEdit")
        );
    }

    #[test]
    fn decodes_single_driver_event() {
        let doc = json!({
            "drivers": [driver_doc("a", true)],
            "cause": driver_doc("a", true),
            "effect": "effect",
            "context": "context",
            "pendingEffectEdit": "pendingEffectEdit",
        });
        let event = decode_event(&doc).unwrap();
        assert_eq!(event.drivers.len(), 1);
    }

    #[test]
    fn decodes_valid_driver() {
        assert_eq!(
            decode_driver(&driver_doc("a", true)),
            Some(driver_with("a", true))
        );
    }

    #[test]
    fn rejects_empty_driver_list() {
        let mut doc = save_file();
        doc["drivers"] = json!([]);
        assert_eq!(decode_event(&doc), None);
    }

    #[test]
    fn rejects_missing_required_key() {
        for key in ["drivers", "cause", "effect", "context"] {
            let mut doc = save_file();
            doc.as_object_mut().unwrap().remove(key);
            assert_eq!(decode_event(&doc), None, "missing {key} should fail");
        }
    }

    #[test]
    fn rejects_mistyped_field() {
        let mut doc = save_file();
        doc["effect"] = json!(42);
        assert_eq!(decode_event(&doc), None);

        let mut doc = save_file();
        doc["pendingEffectEdit"] = json!(false);
        assert_eq!(decode_event(&doc), None);
    }

    #[test]
    fn rejects_malformed_driver_in_list() {
        let mut doc = save_file();
        doc["drivers"][1] = json!({"label": "b-label", "id": "b-id"});
        assert_eq!(decode_event(&doc), None);
    }

    #[test]
    fn driver_missing_action_key_is_an_error() {
        assert_eq!(
            decode_driver(&json!({"label": "a-label", "id": "a-id"})),
            None
        );
    }

    #[test]
    fn empty_pending_edit_decodes_absent() {
        let mut doc = save_file();
        doc["pendingEffectEdit"] = json!("");
        let event = decode_event(&doc).unwrap();
        assert_eq!(event.pending_effect_edit, None);
    }

    #[test]
    fn missing_pending_edit_decodes_absent() {
        let mut doc = save_file();
        doc.as_object_mut().unwrap().remove("pendingEffectEdit");
        let event = decode_event(&doc).unwrap();
        assert_eq!(event.pending_effect_edit, None);
    }

    #[test]
    fn absent_pending_edit_encodes_to_empty_string() {
        let event = Event::new(
            vec![driver_with("a", true)],
            driver_with("a", true),
            "effect",
            "context",
            "",
        )
        .unwrap();
        assert_eq!(encode_event(&event)["pendingEffectEdit"], json!(""));
    }

    #[test]
    fn encodes_event_to_save_file_shape() {
        assert_eq!(encode_event(&sample_event()), save_file());
    }

    #[test]
    fn encodes_driver() {
        assert_eq!(encode_driver(&driver_with("a", false)), driver_doc("a", false));
    }

    #[test]
    fn round_trips() {
        let event = sample_event();
        assert_eq!(decode_event(&encode_event(&event)), Some(event));

        let no_edit = Event::new(
            vec![driver_with("a", false)],
            driver_with("b", true),
            "",
            "",
            "",
        )
        .unwrap();
        assert_eq!(decode_event(&encode_event(&no_edit)), Some(no_edit));
    }
}
