use std::collections::{HashMap, HashSet};

use crate::{
    plain_enum, plain_fields, serialize, serialize_object, Bytes, Func, Handlers, Options, Profile,
    Reflect, SerializeError, Shape, ToPlain, Value,
};

fn hex(bytes: &Bytes) -> Value {
    let hex: String = bytes
        .as_slice()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect();
    Value::String(hex)
}

fn object(value: &Value) -> &HashMap<String, Value> {
    value.as_object().expect("expected Value::Object")
}

#[test]
fn test_primitive_identity() {
    let handlers = Handlers::new();
    let options = Options::new();

    let xyz = String::from("xyz");
    let cases: Vec<(&dyn Reflect, Value)> = vec![
        (&true, Value::Bool(true)),
        (&false, Value::Bool(false)),
        (&7i32, Value::Int(7)),
        (&-3i64, Value::Int(-3)),
        (&22u8, Value::Int(22)),
        (&1.5f64, Value::Float(1.5)),
        (&"abc", Value::String("abc".into())),
        (&xyz, Value::String("xyz".into())),
        (&(), Value::Null),
        (&None::<i64>, Value::Null),
        (&Some(11i64), Value::Int(11)),
    ];

    for (value, expected) in cases {
        assert_eq!(serialize(value, &handlers, &options).unwrap(), expected);
    }
}

#[test]
fn test_enum_underlying_value() {
    #[derive(Clone, Copy)]
    enum Priority {
        Low = 10,
        High = 20,
    }

    plain_enum!(Priority as i64);

    enum Color {
        Red,
        Green,
    }

    plain_enum!(Color {
        Red => "red",
        Green => "green",
    });

    let handlers = Handlers::new();
    let options = Options::new();

    assert_eq!(
        serialize(&Priority::Low, &handlers, &options).unwrap(),
        Value::Int(10)
    );
    assert_eq!(
        serialize(&Priority::High, &handlers, &options).unwrap(),
        Value::Int(20)
    );
    assert_eq!(
        serialize(&Color::Red, &handlers, &options).unwrap(),
        Value::String("red".into())
    );
    assert_eq!(
        serialize(&Color::Green, &handlers, &options).unwrap(),
        Value::String("green".into())
    );
}

#[cfg(feature = "chrono")]
#[test]
fn test_datetime_iso8601() {
    let handlers = Handlers::new();
    let options = Options::new();

    let datetime = chrono::DateTime::parse_from_rfc3339("2020-01-02T03:04:05+00:00")
        .unwrap()
        .with_timezone(&chrono::Utc);
    assert_eq!(
        serialize(&datetime, &handlers, &options).unwrap(),
        Value::String("2020-01-02T03:04:05+00:00".into())
    );

    let date = chrono::NaiveDate::from_ymd_opt(2020, 5, 17).unwrap();
    assert_eq!(
        serialize(&date, &handlers, &options).unwrap(),
        Value::String("2020-05-17".into())
    );
}

#[test]
fn test_mapping_recursion() {
    let handlers = Handlers::new();
    let options = Options::new();

    let mut map = HashMap::new();
    map.insert("a".to_string(), vec![1i64, 2]);
    map.insert("b".to_string(), vec![]);

    let value = serialize(&map, &handlers, &options).unwrap();
    let object = object(&value);
    assert_eq!(object.len(), 2);
    assert_eq!(
        object["a"],
        Value::Array(vec![Value::Int(1), Value::Int(2)])
    );
    assert_eq!(object["b"], Value::Array(vec![]));
}

#[test]
fn test_sequence_order_and_length() {
    let handlers = Handlers::new();
    let options = Options::new();

    let items = vec!["x", "y", "z"];
    let value = serialize(&items, &handlers, &options).unwrap();
    assert_eq!(
        value,
        Value::Array(vec![
            Value::String("x".into()),
            Value::String("y".into()),
            Value::String("z".into()),
        ])
    );

    // Tuples serialize as fixed-size sequences.
    let pair = (1i64, "two");
    assert_eq!(
        serialize(&pair, &handlers, &options).unwrap(),
        Value::Array(vec![Value::Int(1), Value::String("two".into())])
    );
}

#[test]
fn test_unordered_container() {
    let handlers = Handlers::new();
    let options = Options::new();

    let mut set = HashSet::new();
    set.insert("a".to_string());
    set.insert("b".to_string());
    set.insert("c".to_string());

    // Element order is whatever the set yields; only the element multiset is
    // guaranteed.
    let value = serialize(&set, &handlers, &options).unwrap();
    let mut strings: Vec<String> = match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| item.into_string().unwrap())
            .collect(),
        other => panic!("expected Value::Array, got {:?}", other),
    };
    strings.sort();
    assert_eq!(strings, vec!["a", "b", "c"]);
}

#[test]
fn test_nested_container_field() {
    struct Doc {
        tags: Vec<String>,
    }

    plain_fields!(Doc { tags });

    let doc = Doc {
        tags: vec!["a".to_string(), "b".to_string()],
    };

    let value = serialize_object(&doc, &Handlers::new(), &Options::new()).unwrap();
    assert_eq!(
        object(&value)["tags"],
        Value::Array(vec![Value::String("a".into()), Value::String("b".into())])
    );
}

struct Mystery {
    _pad: u8,
}

impl Reflect for Mystery {
    fn shape(&self) -> Shape<'_> {
        Shape::Opaque
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn type_name(&self) -> &'static str {
        "Mystery"
    }
}

#[test]
fn test_unknown_type_substitutes_null() {
    struct Holder {
        label: String,
        payload: Mystery,
    }

    plain_fields!(Holder { label, payload });

    let holder = Holder {
        label: "x".into(),
        payload: Mystery { _pad: 0 },
    };

    let value = serialize_object(&holder, &Handlers::new(), &Options::new()).unwrap();
    let object = object(&value);
    assert_eq!(object["label"], Value::String("x".into()));
    assert_eq!(object["payload"], Value::Null);
}

#[test]
fn test_strict_mode_fails_loudly() {
    let options = Options::new().strict(true);
    let err = serialize(&Mystery { _pad: 0 }, &Handlers::new(), &options).unwrap_err();
    assert_eq!(err, SerializeError::UnsupportedType("Mystery"));
}

#[test]
fn test_callable_fallback() {
    let handlers = Handlers::new();
    let func = Func::new(|| 1i64);

    // Default: callables without a handler degrade to null.
    let value = serialize(&func, &handlers, &Options::new()).unwrap();
    assert_eq!(value, Value::Null);

    // With serialize_callables the repr-style description is used.
    let options = Options::new().serialize_callables(true);
    let value = serialize(&func, &handlers, &options).unwrap();
    let repr = value.into_string().unwrap();
    assert!(repr.starts_with("<callable "));
}

#[test]
fn test_callable_handler_precedence() {
    // A registered handler wins over both the repr and the null fallback.
    let handlers = Handlers::new().with_fallible(|f: &Func| {
        f.invoke(Vec::new()).map_err(|e| e.to_string())?
    });
    let options = Options::new().serialize_callables(true);

    let func = Func::new(|| "invoked".to_string());
    let value = serialize(&func, &handlers, &options).unwrap();
    assert_eq!(value, Value::String("invoked".into()));
}

#[test]
fn test_handler_registration_order() {
    let handlers = Handlers::new()
        .with(|_: &Bytes| Value::String("first".into()))
        .with(|_: &Bytes| Value::String("second".into()));

    let value = serialize(&Bytes::new(vec![1]), &handlers, &Options::new()).unwrap();
    assert_eq!(value, Value::String("first".into()));
}

#[test]
fn test_handler_error_aborts() {
    struct Holder {
        payload: Bytes,
    }

    plain_fields!(Holder { payload });

    let handlers = Handlers::new().with_fallible(|_: &Bytes| Err("broken".to_string()));
    let holder = Holder {
        payload: Bytes::new(vec![1]),
    };

    let err = serialize_object(&holder, &handlers, &Options::new()).unwrap_err();
    match err {
        SerializeError::Handler { message, .. } => assert_eq!(message, "broken"),
        other => panic!("unexpected error: {:?}", other),
    }
}

struct FileResource {
    name: String,
    content: Bytes,
    run: Func,
}

plain_fields!(FileResource { name, content, run });

impl ToPlain for FileResource {}

fn file_resource() -> FileResource {
    FileResource {
        name: "file.txt".to_string(),
        content: Bytes::new(vec![0x01, 0x02, 0x03, 0x04, 0x05, 0x06]),
        run: Func::new(|| "called".to_string()),
    }
}

fn file_handlers() -> Handlers {
    Handlers::new()
        .with(hex)
        .with_fallible(|f: &Func| f.invoke(Vec::new()).map_err(|e| e.to_string())?)
}

fn expected_file_resource() -> Value {
    let mut expected = HashMap::new();
    expected.insert("name".to_string(), Value::String("file.txt".into()));
    expected.insert(
        "content".to_string(),
        Value::String("010203040506".into()),
    );
    expected.insert("run".to_string(), Value::String("called".into()));
    Value::Object(expected)
}

// The three entry styles are interface variants over the same routine and
// must agree on the output for identical values and configuration.
#[test]
fn test_entry_modes_agree() {
    let options = Options::new().serialize_callables(true);

    // Base-type style.
    let inherited = file_resource().to_plain(&file_handlers(), &options).unwrap();

    // Attachment style: the configuration is captured once, up front.
    let profile = Profile::new(file_handlers(), options.clone());
    let bound = profile.bind(file_resource());
    let attached = bound.to_plain().unwrap();

    // Pass-through style.
    let passed = serialize_object(&file_resource(), &file_handlers(), &options).unwrap();

    let expected = expected_file_resource();
    assert_eq!(inherited, expected);
    assert_eq!(attached, expected);
    assert_eq!(passed, expected);
}

#[test]
fn test_bound_keeps_captured_configuration() {
    let profile = Profile::new(file_handlers(), Options::new());
    let bound = profile.bind(file_resource());

    // The outer call has no handlers at all, but the nested bound value
    // serializes with the configuration captured at bind time.
    let outer = vec![bound];
    let value = serialize(&outer, &Handlers::new(), &Options::new()).unwrap();

    assert_eq!(value, Value::Array(vec![expected_file_resource()]));
}

#[test]
fn test_bound_deref() {
    let profile = Profile::new(Handlers::new(), Options::new());
    let bound = profile.bind(file_resource());

    assert_eq!(bound.name, "file.txt");
    assert_eq!(bound.get().content.as_slice().len(), 6);
    assert_eq!(bound.into_inner().name, "file.txt");
}

#[test]
fn test_idempotence() {
    struct Inner {
        flag: bool,
    }

    plain_fields!(Inner { flag });

    struct Outer {
        label: String,
        items: Vec<i64>,
        inner: Inner,
    }

    plain_fields!(Outer { label, items, inner });

    let outer = Outer {
        label: "outer".into(),
        items: vec![1, 2, 3],
        inner: Inner { flag: true },
    };

    let handlers = Handlers::new();
    let options = Options::new();

    let once = serialize_object(&outer, &handlers, &options).unwrap();
    let twice = serialize(&once, &handlers, &options).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_u64_overflow_degrades_to_float() {
    let value = serialize(&u64::MAX, &Handlers::new(), &Options::new()).unwrap();
    if let Value::Float(f) = value {
        assert!(f > i64::MAX as f64);
    } else {
        panic!("Expected Value::Float");
    }
}

struct Loopy {
    _pad: u8,
}

impl Reflect for Loopy {
    // A value that contains itself.
    fn shape(&self) -> Shape<'_> {
        Shape::Seq(vec![self as &dyn Reflect])
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn type_name(&self) -> &'static str {
        "Loopy"
    }
}

#[test]
fn test_cycle_detection() {
    let options = Options::new().detect_cycles(true);
    let err = serialize(&Loopy { _pad: 0 }, &Handlers::new(), &options).unwrap_err();
    assert_eq!(err, SerializeError::CyclicReference);
}

#[test]
fn test_cycle_detection_allows_sibling_sharing() {
    // The same value appearing twice side by side is a diamond, not a cycle.
    struct Diamond {
        left: &'static i64,
        right: &'static i64,
    }

    impl Reflect for Diamond {
        fn shape(&self) -> Shape<'_> {
            Shape::Seq(vec![self.left as &dyn Reflect, self.right as &dyn Reflect])
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn type_name(&self) -> &'static str {
            "Diamond"
        }
    }

    let shared: &'static i64 = Box::leak(Box::new(5i64));
    let diamond = Diamond {
        left: shared,
        right: shared,
    };

    let options = Options::new().detect_cycles(true);
    let value = serialize(&diamond, &Handlers::new(), &options).unwrap();
    assert_eq!(value, Value::Array(vec![Value::Int(5), Value::Int(5)]));
}

#[test]
fn test_handlers_do_not_override_builtin_categories() {
    // Built-in categories win over handlers for non-callable values; a
    // handler for a sequence type never fires.
    let handlers = Handlers::new().with(|_: &Vec<i64>| Value::String("handled".into()));

    let items = vec![1i64, 2];
    let value = serialize(&items, &handlers, &Options::new()).unwrap();
    assert_eq!(value, Value::Array(vec![Value::Int(1), Value::Int(2)]));
}
