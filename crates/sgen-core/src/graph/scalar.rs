use crate::error::ResolveError;

/// Primitive `type` keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    String,
    Integer,
    Number,
    Boolean,
}

impl Primitive {
    pub fn as_str(&self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Integer => "integer",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
        }
    }
}

/// A primitive refined by its `format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    Int,
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    String,
    Date,
    DateTime,
    Bytes,
    /// Raw JSON passthrough (`format: json`).
    RawJson,
}

/// Refine a primitive by its format. Integer, number and boolean formats are
/// checked strictly; unknown string formats fall back to a plain string.
pub fn classify_scalar(
    primitive: Primitive,
    format: &str,
    path: &[String],
) -> Result<Scalar, ResolveError> {
    let invalid = || ResolveError::InvalidFormat {
        kind: primitive.as_str().to_string(),
        format: format.to_string(),
        path: path.join("."),
    };
    match primitive {
        Primitive::Integer => match format {
            "" => Ok(Scalar::Int),
            "int32" => Ok(Scalar::Int32),
            "int64" => Ok(Scalar::Int64),
            _ => Err(invalid()),
        },
        Primitive::Number => match format {
            "" | "float" => Ok(Scalar::Float32),
            "double" => Ok(Scalar::Float64),
            _ => Err(invalid()),
        },
        Primitive::Boolean => match format {
            "" => Ok(Scalar::Bool),
            _ => Err(invalid()),
        },
        Primitive::String => Ok(match format {
            "byte" => Scalar::Bytes,
            "date" => Scalar::Date,
            "date-time" => Scalar::DateTime,
            "json" => Scalar::RawJson,
            _ => Scalar::String,
        }),
    }
}
