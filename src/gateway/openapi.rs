//! OpenAPI documentation for the gateway API.

use utoipa::OpenApi;

use crate::gateway::types::{
    GetMessagesResponse, MessageBody, SendMessageRequest, SendMessageResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SMS Gateway API",
        version = "1.0.0",
        description = "Message intake with balance charging and asynchronous, outbox-driven delivery.",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health_check,
        crate::gateway::handlers::create_message,
        crate::gateway::handlers::get_messages,
    ),
    components(
        schemas(
            SendMessageRequest,
            SendMessageResponse,
            GetMessagesResponse,
            MessageBody,
        )
    ),
    tags(
        (name = "Messages", description = "Message submission and listing"),
        (name = "System", description = "Health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_spec_generates() {
        let spec = ApiDoc::openapi();
        assert_eq!(spec.info.title, "SMS Gateway API");
    }

    #[test]
    fn test_endpoints_registered() {
        let spec = ApiDoc::openapi();
        assert!(spec.paths.paths.contains_key("/v1/message"));
        assert!(spec.paths.paths.contains_key("/v1/messages"));
        assert!(spec.paths.paths.contains_key("/health"));
    }
}
