//! Builtin capabilities for `AddComponent`.

use scenebridge_object::{
    convert, expect_args, impl_accessible, AccessError, AccessorTable, Color, Method, Property, ToWire, Value,
};
use serde_json::Map;

// ── Tags ────────────────────────────────────────────────────────────

/// A set of string tags, kept in insertion order.
#[derive(Debug, Default)]
pub struct Tags {
    pub tags: Vec<String>,
}

static TAGS_TABLE: AccessorTable<Tags> = AccessorTable {
    type_name: "Tags",
    properties: &[Property {
        name: "tags",
        get: |t: &Tags| t.tags.to_wire(),
        set: Some(|t: &mut Tags, v: &Value| {
            t.tags = convert("tags", v)?;
            Ok(())
        }),
    }],
    methods: &[
        Method {
            name: "Add",
            call: |t: &mut Tags, args: &[Value]| {
                expect_args("Add", args, 1)?;
                let tag: String = convert("tag", &args[0])?;
                if !t.tags.contains(&tag) {
                    t.tags.push(tag);
                }
                Ok(t.tags.len().to_wire())
            },
        },
        Method {
            name: "Remove",
            call: |t: &mut Tags, args: &[Value]| {
                expect_args("Remove", args, 1)?;
                let tag: String = convert("tag", &args[0])?;
                let before = t.tags.len();
                t.tags.retain(|existing| existing != &tag);
                Ok((t.tags.len() != before).to_wire())
            },
        },
        Method {
            name: "Has",
            call: |t: &mut Tags, args: &[Value]| {
                expect_args("Has", args, 1)?;
                let tag: String = convert("tag", &args[0])?;
                Ok(t.tags.contains(&tag).to_wire())
            },
        },
    ],
};

impl_accessible!(Tags, TAGS_TABLE);

// ── Metadata ────────────────────────────────────────────────────────

/// Free-form key/value storage.
#[derive(Debug, Default)]
pub struct Metadata {
    pub entries: Map<String, Value>,
}

static METADATA_TABLE: AccessorTable<Metadata> = AccessorTable {
    type_name: "Metadata",
    properties: &[Property {
        name: "entries",
        get: |m: &Metadata| m.entries.to_wire(),
        set: Some(|m: &mut Metadata, v: &Value| {
            m.entries = convert("entries", v)?;
            Ok(())
        }),
    }],
    methods: &[
        Method {
            name: "Set",
            call: |m: &mut Metadata, args: &[Value]| {
                expect_args("Set", args, 2)?;
                let key: String = convert("key", &args[0])?;
                Ok(m.entries.insert(key, args[1].clone()).unwrap_or(Value::Null))
            },
        },
        Method {
            name: "Get",
            call: |m: &mut Metadata, args: &[Value]| {
                expect_args("Get", args, 1)?;
                let key: String = convert("key", &args[0])?;
                m.entries
                    .get(&key)
                    .cloned()
                    .ok_or_else(|| AccessError::Failed {
                        method: "Get".into(),
                        message: format!("no entry `{key}`"),
                    })
            },
        },
    ],
};

impl_accessible!(Metadata, METADATA_TABLE);

// ── Highlight ───────────────────────────────────────────────────────

/// Render hint for selection feedback.
#[derive(Debug)]
pub struct Highlight {
    pub enabled: bool,
    pub color: Color,
    pub intensity: f64,
}

impl Default for Highlight {
    fn default() -> Self {
        Self {
            enabled: false,
            color: Color::rgb(1.0, 0.92, 0.016),
            intensity: 1.0,
        }
    }
}

static HIGHLIGHT_TABLE: AccessorTable<Highlight> = AccessorTable {
    type_name: "Highlight",
    properties: &[
        Property {
            name: "enabled",
            get: |h: &Highlight| h.enabled.to_wire(),
            set: Some(|h: &mut Highlight, v: &Value| {
                h.enabled = convert("enabled", v)?;
                Ok(())
            }),
        },
        Property {
            name: "color",
            get: |h: &Highlight| h.color.to_wire(),
            set: Some(|h: &mut Highlight, v: &Value| {
                h.color = convert("color", v)?;
                Ok(())
            }),
        },
        Property {
            name: "intensity",
            get: |h: &Highlight| h.intensity.to_wire(),
            set: Some(|h: &mut Highlight, v: &Value| {
                let intensity: f64 = convert("intensity", v)?;
                h.intensity = intensity.clamp(0.0, 1.0);
                Ok(())
            }),
        },
    ],
    methods: &[Method {
        name: "Toggle",
        call: |h: &mut Highlight, _args: &[Value]| {
            h.enabled = !h.enabled;
            Ok(h.enabled.to_wire())
        },
    }],
};

impl_accessible!(Highlight, HIGHLIGHT_TABLE);

#[cfg(test)]
mod tests {
    use super::*;
    use scenebridge_object::Accessible;
    use serde_json::json;

    #[test]
    fn tags_are_a_set() {
        let mut tags = Tags::default();
        tags.call("Add", &[json!("a")]).expect("add");
        tags.call("Add", &[json!("a")]).expect("add again");
        assert_eq!(tags.get("tags"), Some(json!(["a"])));
        assert_eq!(tags.call("Has", &[json!("a")]), Ok(json!(true)));
        assert_eq!(tags.call("Remove", &[json!("a")]), Ok(json!(true)));
        assert_eq!(tags.call("Remove", &[json!("a")]), Ok(json!(false)));
    }

    #[test]
    fn metadata_get_fails_for_missing_keys() {
        let mut meta = Metadata::default();
        assert_eq!(meta.call("Set", &[json!("k"), json!(1)]), Ok(Value::Null));
        assert_eq!(meta.call("Get", &[json!("k")]), Ok(json!(1)));
        assert!(matches!(
            meta.call("Get", &[json!("nope")]),
            Err(AccessError::Failed { .. })
        ));
    }

    #[test]
    fn highlight_clamps_intensity() {
        let mut highlight = Highlight::default();
        highlight.set("intensity", &json!(3.5)).expect("number");
        assert_eq!(highlight.get("intensity"), Some(json!(1)));
        assert_eq!(highlight.call("Toggle", &[]), Ok(json!(true)));
    }
}
