//! Inline program model
//!
//! An [`InlineProgram`] is a declarative description of the resources a stack
//! manages and the values it exports. The engine has no Rust language host, so
//! the program is handed over as a Pulumi YAML project document.

use crate::error::{AutomationError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Runtime used for rendered project documents
const YAML_RUNTIME: &str = "yaml";

/// A single resource declared by a program
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDeclaration {
    /// Logical name of the resource inside the stack (e.g., "resourceGroup")
    pub name: String,

    /// Pulumi type token (e.g., "azure:core/resourceGroup:ResourceGroup")
    pub type_token: String,

    /// Resource input properties
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl ResourceDeclaration {
    pub fn new(name: impl Into<String>, type_token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_token: type_token.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Set an input property
    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

/// Exported value referencing a property of a declared resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRef {
    pub resource: String,
    pub property: String,
}

impl OutputRef {
    /// Interpolation expression understood by the YAML runtime
    pub fn expression(&self) -> String {
        format!("${{{}.{}}}", self.resource, self.property)
    }
}

/// Declarative description of a stack's resources and outputs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineProgram {
    resources: Vec<ResourceDeclaration>,
    outputs: BTreeMap<String, OutputRef>,
}

impl InlineProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a resource
    pub fn with_resource(mut self, resource: ResourceDeclaration) -> Self {
        self.resources.push(resource);
        self
    }

    /// Export `resource.property` under `name`
    pub fn with_output(
        mut self,
        name: impl Into<String>,
        resource: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        self.outputs.insert(
            name.into(),
            OutputRef {
                resource: resource.into(),
                property: property.into(),
            },
        );
        self
    }

    pub fn resources(&self) -> &[ResourceDeclaration] {
        &self.resources
    }

    pub fn outputs(&self) -> &BTreeMap<String, OutputRef> {
        &self.outputs
    }

    /// Check that names are well formed and every output references a
    /// declared resource
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for resource in &self.resources {
            if resource.name.is_empty() {
                return Err(AutomationError::InvalidProgram(
                    "resource name must not be empty".to_string(),
                ));
            }
            if resource.type_token.is_empty() {
                return Err(AutomationError::InvalidProgram(format!(
                    "resource '{}' has no type token",
                    resource.name
                )));
            }
            if !seen.insert(resource.name.as_str()) {
                return Err(AutomationError::InvalidProgram(format!(
                    "duplicate resource name '{}'",
                    resource.name
                )));
            }
        }

        for (name, output) in &self.outputs {
            if name.is_empty() {
                return Err(AutomationError::InvalidProgram(
                    "output name must not be empty".to_string(),
                ));
            }
            if !seen.contains(output.resource.as_str()) {
                return Err(AutomationError::InvalidProgram(format!(
                    "output '{}' references undeclared resource '{}'",
                    name, output.resource
                )));
            }
        }

        Ok(())
    }

    /// Render the program as a `Pulumi.yaml` project document
    pub fn to_project_yaml(&self, project_name: &str) -> Result<String> {
        self.validate()?;

        let document = ProjectDocument {
            name: project_name.to_string(),
            runtime: YAML_RUNTIME.to_string(),
            resources: self
                .resources
                .iter()
                .map(|r| {
                    (
                        r.name.clone(),
                        ResourceDocument {
                            type_token: r.type_token.clone(),
                            properties: r.properties.clone(),
                        },
                    )
                })
                .collect(),
            outputs: self
                .outputs
                .iter()
                .map(|(name, output)| (name.clone(), output.expression()))
                .collect(),
        };

        Ok(serde_yaml::to_string(&document)?)
    }
}

#[derive(Debug, Serialize)]
struct ProjectDocument {
    name: String,
    runtime: String,
    resources: BTreeMap<String, ResourceDocument>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    outputs: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct ResourceDocument {
    #[serde(rename = "type")]
    type_token: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, serde_json::Value>,
}

/// Identity of an inline program stack: project, stack and program
#[derive(Debug, Clone)]
pub struct InlineProgramArgs {
    pub project_name: String,
    pub stack_name: String,
    pub program: InlineProgram,
}

impl InlineProgramArgs {
    pub fn new(
        project_name: impl Into<String>,
        stack_name: impl Into<String>,
        program: InlineProgram,
    ) -> Self {
        Self {
            project_name: project_name.into(),
            stack_name: stack_name.into(),
            program,
        }
    }
}
