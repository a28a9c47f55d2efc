use std::collections::{BTreeMap, HashMap};

use plaintree::{serialize, Handlers, Options, Value};
use plaintree_serde::{to_value, Reflected, SerializationError};
use serde::Serialize;

fn run<T>(value: &T) -> String
where
    T: Serialize,
{
    let value = to_value(value).unwrap();

    serde_json::to_string(&value).unwrap()
}

fn run_error<T>(value: &T) -> SerializationError
where
    T: Serialize,
{
    to_value(value).expect_err("serialization should fail")
}

#[test]
fn u8() {
    assert_eq!(run(&5u8), "5");
}

#[test]
fn u16() {
    assert_eq!(run(&5u16), "5");
}

#[test]
fn u32() {
    assert_eq!(run(&5u32), "5");
}

#[test]
fn u64() {
    assert_eq!(run(&5u64), "5");
}

#[test]
fn u64_too_large() {
    assert_eq!(run_error(&u64::MAX), SerializationError::IntTooLarge);
}

#[test]
fn u128() {
    assert_eq!(run(&5u128), "5");
}

#[test]
fn i8() {
    assert_eq!(run(&-5i8), "-5");
}

#[test]
fn i64() {
    assert_eq!(run(&-5i64), "-5");
}

#[test]
fn i128_too_large() {
    assert_eq!(run_error(&i128::MAX), SerializationError::IntTooLarge);
}

#[test]
fn f64() {
    assert_eq!(run(&2.5f64), "2.5");
}

#[test]
fn bool() {
    assert_eq!(run(&true), "true");
}

#[test]
fn char() {
    assert_eq!(run(&'a'), "\"a\"");
}

#[test]
fn str() {
    assert_eq!(run(&"abc"), "\"abc\"");
}

#[test]
fn unit() {
    assert_eq!(run(&()), "null");
}

#[test]
fn none() {
    assert_eq!(run(&None::<i32>), "null");
}

#[test]
fn some() {
    assert_eq!(run(&Some(3)), "3");
}

#[test]
fn seq() {
    assert_eq!(run(&vec![1, 2, 3]), "[1,2,3]");
}

#[test]
fn tuple() {
    assert_eq!(run(&(1, "two")), "[1,\"two\"]");
}

#[test]
fn map_int_keys_are_stringified() {
    let mut map = BTreeMap::new();
    map.insert(5, "five");

    assert_eq!(run(&map), "{\"5\":\"five\"}");
}

#[test]
fn map_invalid_key() {
    let mut map = BTreeMap::new();
    map.insert(true, 1);

    assert_eq!(run_error(&map), SerializationError::InvalidKey);
}

#[test]
fn test_ser_struct() {
    #[derive(Serialize)]
    struct Test {
        int: u32,
        seq: Vec<&'static str>,
    }

    let test = Test {
        int: 1,
        seq: vec!["a", "b"],
    };
    let mut map = HashMap::new();
    map.insert("int".into(), Value::Int(1));
    map.insert(
        "seq".into(),
        Value::Array(vec![Value::String("a".into()), Value::String("b".into())]),
    );
    let expected = Value::Object(map);
    assert_eq!(to_value(&test).unwrap(), expected);
}

#[test]
fn test_ser_enum() {
    #[derive(Serialize)]
    enum E {
        Unit,
        Newtype(u32),
        Tuple(u32, u32),
        Struct { a: u32 },
    }

    let u = E::Unit;
    let expected = Value::String("Unit".into());
    assert_eq!(to_value(&u).unwrap(), expected);

    let n = E::Newtype(1);
    let mut map = HashMap::new();
    map.insert("Newtype".into(), Value::Int(1));
    let expected = Value::Object(map);
    assert_eq!(to_value(&n).unwrap(), expected);

    let t = E::Tuple(1, 2);
    let mut map = HashMap::new();
    map.insert(
        "Tuple".into(),
        Value::Array(vec![Value::Int(1), Value::Int(2)]),
    );
    let expected = Value::Object(map);
    assert_eq!(to_value(&t).unwrap(), expected);

    let s = E::Struct { a: 1 };
    let mut inner_map = HashMap::new();
    inner_map.insert("a".into(), Value::Int(1));
    let mut map = HashMap::new();
    map.insert("Struct".into(), Value::Object(inner_map));
    let expected = Value::Object(map);
    assert_eq!(to_value(&s).unwrap(), expected);
}

#[test]
fn test_ser_bytes() {
    #[derive(Serialize)]
    struct Blob {
        #[serde(with = "serde_bytes_shim")]
        data: Vec<u8>,
    }

    mod serde_bytes_shim {
        pub fn serialize<S: serde::Serializer>(
            data: &[u8],
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            serializer.serialize_bytes(data)
        }
    }

    let blob = Blob {
        data: vec![1, 2, 3],
    };
    let mut map = HashMap::new();
    map.insert(
        "data".into(),
        Value::Array(vec![Value::Int(1), Value::Int(2), Value::Int(3)]),
    );
    assert_eq!(to_value(&blob).unwrap(), Value::Object(map));
}

#[test]
fn test_ser_nested() {
    #[derive(Serialize)]
    struct Inner {
        b: u8,
    }

    #[derive(Serialize)]
    struct Example {
        a: Vec<Inner>,
    }

    let example = Example {
        a: vec![Inner { b: 5 }, Inner { b: 6 }],
    };

    let value = to_value(&example).unwrap();
    let object = value.as_object().unwrap();
    match &object["a"] {
        Value::Array(items) => {
            assert_eq!(items.len(), 2);
            assert_eq!(items[0].as_object().unwrap()["b"], Value::Int(5));
        }
        other => panic!("expected Value::Array, got {:?}", other),
    }
}

#[test]
fn test_reflected_roundtrip() {
    #[derive(Serialize)]
    struct Inner {
        b: u8,
    }

    let wrapped = Reflected(Inner { b: 5 });
    let value = serialize(&wrapped, &Handlers::new(), &Options::new()).unwrap();
    assert_eq!(value.as_object().unwrap()["b"], Value::Int(5));
}

#[test]
fn test_reflected_nested_in_sequence() {
    #[derive(Serialize)]
    struct Inner {
        b: u8,
    }

    let items = vec![Reflected(Inner { b: 1 }), Reflected(Inner { b: 2 })];
    let value = serialize(&items, &Handlers::new(), &Options::new()).unwrap();
    match value {
        Value::Array(items) => {
            assert_eq!(items[1].as_object().unwrap()["b"], Value::Int(2));
        }
        other => panic!("expected Value::Array, got {:?}", other),
    }
}
