//! Project-specific utilities live here.

use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Collect the OpenAPI schema of `T` and every schema it references.
pub fn collect_schemas<T: ToSchema>(into: &mut Map<String, Value>) {
    let mut schemas = vec![(T::name().into_owned(), T::schema())];
    T::schemas(&mut schemas);

    for (name, schema) in schemas {
        match serde_json::to_value(schema) {
            Ok(value) => {
                into.insert(name, value);
            }
            Err(err) => tracing::warn!(schema = %name, error = %err, "schema not serializable"),
        }
    }
}

/// Standard JSON error response entry for an OpenAPI operation.
pub fn error_response(description: &str) -> Value {
    serde_json::json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/ErrorResponse" }
            }
        }
    })
}

/// JSON body/response content referencing a named schema.
pub fn json_content(schema: &str) -> Value {
    serde_json::json!({
        "application/json": {
            "schema": { "$ref": format!("#/components/schemas/{schema}") }
        }
    })
}
