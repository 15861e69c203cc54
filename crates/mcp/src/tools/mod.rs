pub mod observations;
mod registry;

pub use observations::{SeriesObservationsTool, TOOL_NAME};
pub use registry::{
    json_schema_enum, json_schema_integer, json_schema_object, json_schema_string, Tool,
    ToolRegistry,
};
