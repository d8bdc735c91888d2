//! The inline program and the fixed identities it is deployed under

use inline_azure_automation::{InlineProgram, ResourceDeclaration};

pub const PROJECT_NAME: &str = "inline_azure_project";
pub const STACK_NAME: &str = "dev";

pub const PLUGIN_NAME: &str = "azure";
pub const PLUGIN_VERSION: &str = "v5.25.0";

pub const LOCATION_KEY: &str = "azure:location";
pub const LOCATION: &str = "uksouth";

pub const RESOURCE_GROUP_OUTPUT: &str = "resourcegroup_name";

const RESOURCE_GROUP: &str = "resourceGroup";
const RESOURCE_GROUP_TYPE: &str = "azure:core/resourceGroup:ResourceGroup";

/// One resource group, exporting its generated name
pub fn resource_group_program() -> InlineProgram {
    InlineProgram::new()
        .with_resource(ResourceDeclaration::new(RESOURCE_GROUP, RESOURCE_GROUP_TYPE))
        .with_output(RESOURCE_GROUP_OUTPUT, RESOURCE_GROUP, "name")
}
