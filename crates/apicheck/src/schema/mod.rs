//! Response schema validation.
//!
//! The five response schemas ship inside the binary (`schemas/*.json`) and
//! are compiled once by [`SchemaValidator::new`] with format checking on.
//! Validation reports every violation, one per line, in the form
//! `  - <instance path> <message>`; the document root is shown as `response`.

use std::collections::HashMap;
use std::fmt;

use apicheck_harness::{ApiResponse, ConfigurationError, SchemaValidationError};
use serde_json::Value;

/// The embedded response schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaName {
    ProductsList,
    BrandsList,
    UserDetail,
    SearchProduct,
    GeneralSuccess,
}

impl SchemaName {
    pub const ALL: [SchemaName; 5] = [
        SchemaName::ProductsList,
        SchemaName::BrandsList,
        SchemaName::UserDetail,
        SchemaName::SearchProduct,
        SchemaName::GeneralSuccess,
    ];

    /// Human-readable name used when the schema has no `title`.
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaName::ProductsList => "Products List",
            SchemaName::BrandsList => "Brands List",
            SchemaName::UserDetail => "User Detail",
            SchemaName::SearchProduct => "Search Product",
            SchemaName::GeneralSuccess => "General Success",
        }
    }

    fn source(&self) -> &'static str {
        match self {
            SchemaName::ProductsList => include_str!("../../schemas/products_list.json"),
            SchemaName::BrandsList => include_str!("../../schemas/brands_list.json"),
            SchemaName::UserDetail => include_str!("../../schemas/user_detail.json"),
            SchemaName::SearchProduct => include_str!("../../schemas/search_product.json"),
            SchemaName::GeneralSuccess => include_str!("../../schemas/general_success.json"),
        }
    }
}

impl fmt::Display for SchemaName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validates response bodies against the embedded schemas.
///
/// Immutable after construction; share it across tests behind an `Arc`.
#[derive(Debug)]
pub struct SchemaValidator {
    schemas: HashMap<SchemaName, CompiledSchema>,
}

#[derive(Debug)]
struct CompiledSchema {
    title: String,
    validator: jsonschema::Validator,
}

impl CompiledSchema {
    fn compile(name: SchemaName) -> Result<Self, ConfigurationError> {
        let invalid = |reason: String| {
            ConfigurationError::Invalid(vec![format!("schema '{}' {}", name, reason)])
        };

        let schema: Value = serde_json::from_str(name.source())
            .map_err(|e| invalid(format!("is not valid JSON: {}", e)))?;
        let validator = jsonschema::options()
            .should_validate_formats(true)
            .build(&schema)
            .map_err(|e| invalid(format!("does not compile: {}", e)))?;
        let title = schema
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or(name.as_str())
            .to_string();

        Ok(Self { title, validator })
    }

    fn violations(&self, value: &Value) -> Vec<String> {
        self.validator
            .iter_errors(value)
            .map(|error| {
                let path = error.instance_path.to_string();
                let path = if path.is_empty() { "response" } else { path.as_str() };
                format!("  - {} {}", path, error)
            })
            .collect()
    }
}

impl SchemaValidator {
    /// Compiles every embedded schema.
    pub fn new() -> Result<Self, ConfigurationError> {
        let mut schemas = HashMap::new();
        for name in SchemaName::ALL {
            schemas.insert(name, CompiledSchema::compile(name)?);
        }
        Ok(Self { schemas })
    }

    /// The schema's `title`, falling back to its name.
    pub fn title(&self, name: SchemaName) -> String {
        self.schemas
            .get(&name)
            .map(|s| s.title.clone())
            .unwrap_or_else(|| name.as_str().to_string())
    }

    /// Validates a response body. Non-JSON bodies always fail.
    pub fn validate(
        &self,
        name: SchemaName,
        response: &ApiResponse,
    ) -> Result<(), SchemaValidationError> {
        match response.body.as_json() {
            Some(body) => self.validate_value(name, body),
            None => Err(SchemaValidationError {
                schema: self.title(name),
                errors: vec!["  - response body is missing".to_string()],
            }),
        }
    }

    /// Validates an arbitrary JSON value.
    pub fn validate_value(&self, name: SchemaName, value: &Value) -> Result<(), SchemaValidationError> {
        let Some(schema) = self.schemas.get(&name) else {
            return Ok(());
        };

        let errors = schema.violations(value);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(SchemaValidationError {
                schema: schema.title.clone(),
                errors,
            })
        }
    }
}
