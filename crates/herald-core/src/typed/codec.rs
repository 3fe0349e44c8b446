//! PayloadCodec - `{name, args}` と文字列の相互変換
//!
//! Wire format is a JSON object:
//!
//! ```text
//! {"name":"log.error","args":["boom",42]}
//! ```

use serde::Serialize;
use serde_json::Value;

use super::shape::{Shape, shape_of};
use crate::domain::{Args, EventName, Payload};

pub use crate::domain::CodecError;

/// PayloadCodec encodes payloads for transport through a queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadCodec;

impl PayloadCodec {
    pub fn new() -> Self {
        Self
    }

    /// Encode an event name and its arguments.
    ///
    /// - tuple (or fixed-size array): one argument per element
    /// - `()`: no arguments
    /// - anything else, sequences and `None` included: a single argument
    pub fn encode<A>(&self, name: &EventName, args: &A) -> Result<String, CodecError>
    where
        A: Serialize + ?Sized,
    {
        let value = serde_json::to_value(args)?;
        let args = match (shape_of(args), value) {
            (Shape::Unit, _) => Args::default(),
            (Shape::Tuple, Value::Array(values)) => Args::new(values),
            (_, value) => Args::new(vec![value]),
        };
        self.encode_payload(&Payload::new(name.clone(), args))
    }

    pub fn encode_payload(&self, payload: &Payload) -> Result<String, CodecError> {
        Ok(serde_json::to_string(payload)?)
    }

    pub fn decode(&self, data: &str) -> Result<Payload, CodecError> {
        Ok(serde_json::from_str(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde::Serializer;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn heterogeneous_args_survive_transport() {
        let codec = PayloadCodec::new();
        let name = EventName::new("log.error");

        let data = codec
            .encode(&name, &("boom", 42, 1.5, true, vec!["a", "b"]))
            .unwrap();
        let payload = codec.decode(&data).unwrap();

        assert_eq!(payload.name(), &name);
        assert_eq!(
            payload.args().as_slice(),
            &[json!("boom"), json!(42), json!(1.5), json!(true), json!(["a", "b"])]
        );
    }

    #[test]
    fn unit_args_encode_to_empty_list() {
        let codec = PayloadCodec::new();
        let data = codec.encode(&EventName::new("ping"), &()).unwrap();
        assert_eq!(data, r#"{"name":"ping","args":[]}"#);
    }

    #[test]
    fn single_value_is_one_argument() {
        let codec = PayloadCodec::new();
        let data = codec.encode(&EventName::new("log.error"), "boom").unwrap();
        let payload = codec.decode(&data).unwrap();
        assert_eq!(payload.args().get::<String>(0).unwrap(), "boom");
        assert_eq!(payload.args().len(), 1);
    }

    fn arg_count<A: Serialize + ?Sized>(args: &A) -> usize {
        let codec = PayloadCodec::new();
        let data = codec.encode(&EventName::new("x"), args).unwrap();
        codec.decode(&data).unwrap().args().len()
    }

    #[test]
    fn only_tuples_are_spread() {
        assert_eq!(arg_count(&(1, "a", true)), 3);
        assert_eq!(arg_count(&[1, 2]), 2);
        assert_eq!(arg_count(&()), 0);

        assert_eq!(arg_count(&vec![1, 2, 3]), 1);
        assert_eq!(arg_count(&((1, 2),)), 1);
        assert_eq!(arg_count(&None::<i32>), 1);
        assert_eq!(arg_count(&f64::NAN), 1);
    }

    #[test]
    fn sequence_and_none_keep_their_value() {
        let codec = PayloadCodec::new();

        let data = codec.encode(&EventName::new("batch"), &vec![1, 2, 3]).unwrap();
        let args = codec.decode(&data).unwrap().into_parts().1;
        assert_eq!(args.get::<Vec<i32>>(0).unwrap(), vec![1, 2, 3]);

        let data = codec.encode(&EventName::new("maybe"), &None::<i32>).unwrap();
        assert_eq!(data, r#"{"name":"maybe","args":[null]}"#);
        let args = codec.decode(&data).unwrap().into_parts().1;
        assert_eq!(args.get::<Option<i32>>(0).unwrap(), None);
    }

    #[test]
    fn missing_args_field_decodes_as_empty() {
        let payload = PayloadCodec::new().decode(r#"{"name":"ping"}"#).unwrap();
        assert!(payload.args().is_empty());
    }

    #[test]
    fn garbage_fails_to_decode() {
        let err = PayloadCodec::new().decode("not json").unwrap_err();
        assert!(matches!(err, CodecError::Json(_)));
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cannot serialize"))
        }
    }

    #[test]
    fn serialize_failure_is_codec_error() {
        let err = PayloadCodec::new()
            .encode(&EventName::new("x"), &(1, Unserializable))
            .unwrap_err();
        assert!(err.to_string().contains("cannot serialize"));
    }

    #[test]
    fn non_string_map_keys_fail() {
        let mut map = HashMap::new();
        map.insert((1, 2), "pair");
        assert!(PayloadCodec::new().encode(&EventName::new("x"), &map).is_err());
    }
}
