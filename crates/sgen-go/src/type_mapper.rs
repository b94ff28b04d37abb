use sgen_core::graph::Scalar;

/// Generic fallback for values of unknown shape.
pub const ANY_TYPE: &str = "interface{}";

/// Object without declared properties.
pub const OPEN_MAP_TYPE: &str = "map[string]interface{}";

/// Map a classified scalar to its Go type.
pub fn scalar_to_go(scalar: Scalar) -> &'static str {
    match scalar {
        Scalar::Int => "int",
        Scalar::Int32 => "int32",
        Scalar::Int64 => "int64",
        Scalar::Float32 => "float32",
        Scalar::Float64 => "float64",
        Scalar::Bool => "bool",
        Scalar::String => "string",
        Scalar::Date => "openapi_types.Date",
        Scalar::DateTime => "time.Time",
        Scalar::Bytes => "[]byte",
        Scalar::RawJson => "json.RawMessage",
    }
}

/// Go map type holding the extra keys of an open object.
pub fn additional_map_type(value_decl: &str) -> String {
    format!("map[string]{value_decl}")
}

/// Render free text as `//` comment lines with the given indentation.
pub fn go_comment(text: &str, indent: &str) -> String {
    text.trim_end()
        .lines()
        .map(|line| {
            let line = line.trim_end();
            if line.is_empty() {
                format!("{indent}//")
            } else {
                format!("{indent}// {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(scalar_to_go(Scalar::Int), "int");
        assert_eq!(scalar_to_go(Scalar::Int64), "int64");
        assert_eq!(scalar_to_go(Scalar::Float32), "float32");
        assert_eq!(scalar_to_go(Scalar::Float64), "float64");
        assert_eq!(scalar_to_go(Scalar::Bool), "bool");
        assert_eq!(scalar_to_go(Scalar::Date), "openapi_types.Date");
        assert_eq!(scalar_to_go(Scalar::DateTime), "time.Time");
        assert_eq!(scalar_to_go(Scalar::Bytes), "[]byte");
        assert_eq!(scalar_to_go(Scalar::RawJson), "json.RawMessage");
    }

    #[test]
    fn test_additional_map_type() {
        assert_eq!(additional_map_type("string"), "map[string]string");
        assert_eq!(additional_map_type(ANY_TYPE), OPEN_MAP_TYPE);
    }

    #[test]
    fn test_go_comment_multiline() {
        assert_eq!(go_comment("A pet.\n\nOwned by a user.\n", ""), "// A pet.\n//\n// Owned by a user.");
        assert_eq!(go_comment("Name", "    "), "    // Name");
    }
}
