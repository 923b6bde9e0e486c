// Route path constants - single source of truth for all API paths

pub const HEALTH: &str = "/health";
pub const NOTES: &str = "/api/notes";
pub const NOTE_ITEM: &str = "/api/notes/{id}";
pub const SWAGGER_UI: &str = "/swagger-ui";
pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";
