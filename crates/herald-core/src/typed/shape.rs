//! Top-level shape of a `Serialize` value, without producing any output.
//!
//! Decides how trigger arguments are spread: only a tuple (serde's tuple,
//! which also covers fixed-size arrays) is one argument per element.

use serde::Serialize;
use serde::ser::{self, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape {
    /// `()`
    Unit,
    /// `(a, b, ..)` or `[T; N]`
    Tuple,
    Other,
}

pub(crate) fn shape_of<T: Serialize + ?Sized>(value: &T) -> Shape {
    value.serialize(ShapeOnly).unwrap_or(Shape::Other)
}

struct ShapeOnly;

/// Compound serializer that ignores its elements and reports `Shape`.
struct Ignore(Shape);

macro_rules! other {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method(self, _v: $ty) -> Result<Shape, Self::Error> {
                Ok(Shape::Other)
            }
        )*
    };
}

impl Serializer for ShapeOnly {
    type Ok = Shape;
    type Error = serde_json::Error;
    type SerializeSeq = Ignore;
    type SerializeTuple = Ignore;
    type SerializeTupleStruct = Ignore;
    type SerializeTupleVariant = Ignore;
    type SerializeMap = Ignore;
    type SerializeStruct = Ignore;
    type SerializeStructVariant = Ignore;

    other!(
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
        serialize_unit_struct(&'static str),
    );

    fn serialize_none(self) -> Result<Shape, Self::Error> {
        Ok(Shape::Other)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, _value: &T) -> Result<Shape, Self::Error> {
        Ok(Shape::Other)
    }

    fn serialize_unit(self) -> Result<Shape, Self::Error> {
        Ok(Shape::Unit)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> Result<Shape, Self::Error> {
        Ok(Shape::Other)
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _value: &T,
    ) -> Result<Shape, Self::Error> {
        Ok(Shape::Other)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _value: &T,
    ) -> Result<Shape, Self::Error> {
        Ok(Shape::Other)
    }

    fn serialize_seq(self, _len: Option<usize>) -> Result<Ignore, Self::Error> {
        Ok(Ignore(Shape::Other))
    }

    fn serialize_tuple(self, _len: usize) -> Result<Ignore, Self::Error> {
        Ok(Ignore(Shape::Tuple))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> Result<Ignore, Self::Error> {
        Ok(Ignore(Shape::Other))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Ignore, Self::Error> {
        Ok(Ignore(Shape::Other))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<Ignore, Self::Error> {
        Ok(Ignore(Shape::Other))
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<Ignore, Self::Error> {
        Ok(Ignore(Shape::Other))
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> Result<Ignore, Self::Error> {
        Ok(Ignore(Shape::Other))
    }
}

impl ser::SerializeSeq for Ignore {
    type Ok = Shape;
    type Error = serde_json::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), Self::Error> {
        Ok(())
    }

    fn end(self) -> Result<Shape, Self::Error> {
        Ok(self.0)
    }
}

impl ser::SerializeTuple for Ignore {
    type Ok = Shape;
    type Error = serde_json::Error;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), Self::Error> {
        Ok(())
    }

    fn end(self) -> Result<Shape, Self::Error> {
        Ok(self.0)
    }
}

impl ser::SerializeTupleStruct for Ignore {
    type Ok = Shape;
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), Self::Error> {
        Ok(())
    }

    fn end(self) -> Result<Shape, Self::Error> {
        Ok(self.0)
    }
}

impl ser::SerializeTupleVariant for Ignore {
    type Ok = Shape;
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), Self::Error> {
        Ok(())
    }

    fn end(self) -> Result<Shape, Self::Error> {
        Ok(self.0)
    }
}

impl ser::SerializeMap for Ignore {
    type Ok = Shape;
    type Error = serde_json::Error;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, _key: &T) -> Result<(), Self::Error> {
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, _value: &T) -> Result<(), Self::Error> {
        Ok(())
    }

    fn end(self) -> Result<Shape, Self::Error> {
        Ok(self.0)
    }
}

impl ser::SerializeStruct for Ignore {
    type Ok = Shape;
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        _value: &T,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn end(self) -> Result<Shape, Self::Error> {
        Ok(self.0)
    }
}

impl ser::SerializeStructVariant for Ignore {
    type Ok = Shape;
    type Error = serde_json::Error;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        _key: &'static str,
        _value: &T,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn end(self) -> Result<Shape, Self::Error> {
        Ok(self.0)
    }
}
