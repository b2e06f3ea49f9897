//! Deterministic naming rules
//!
//! Every remote object the engine looks up by identity is named by one of
//! these functions, so re-running an operation finds what the previous
//! run created.

use crate::ids::{ApiId, AuthorizerId, DurableId};

/// Default route selection expression for new APIs
pub const DEFAULT_ROUTE_SELECTION_EXPRESSION: &str = "$request.body.action";

/// Host suffix of the public execute endpoint
pub const GATEWAY_HOST: &str = "execute-api";

/// Provider domain of the public execute endpoint
pub const PROVIDER_DOMAIN: &str = "amazonaws.com";

/// Principal granted invoke permission on target functions
pub const GATEWAY_PRINCIPAL: &str = "apigateway.amazonaws.com";

/// Action granted to the gateway principal
pub const INVOKE_ACTION: &str = "lambda:InvokeFunction";

/// Permission resource covering every stage and route of an API
pub const WILDCARD_RESOURCE: &str = "/*/*";

/// Route key that admits new connections
pub const CONNECT_ROUTE_KEY: &str = "$connect";

/// Route response key created for routes with a response selection expression
pub const DEFAULT_ROUTE_RESPONSE_KEY: &str = "$default";

/// Name of the API for a service and stage, honoring a non-empty override
pub fn api_name(service: &str, stage: &str, override_name: Option<&str>) -> String {
    match override_name.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => format!("{}-{}-websockets-api", service, stage),
    }
}

/// Route selection expression, honoring a non-empty override
pub fn route_selection_expression(override_expression: Option<&str>) -> String {
    override_expression
        .map(str::trim)
        .filter(|expr| !expr.is_empty())
        .unwrap_or(DEFAULT_ROUTE_SELECTION_EXPRESSION)
        .to_string()
}

/// Name of the deployment stack holding function outputs
pub fn stack_name(service: &str, stage: &str) -> String {
    format!("{}-{}", service, stage)
}

/// Normalize a function name into the alphanumeric form used for output keys
///
/// `send-message` becomes `SendDashmessage`, `my_fn` becomes `MyUnderscorefn`.
pub fn normalize_name(name: &str) -> String {
    let mut chars = name.chars();
    let upper_first = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    upper_first.replace('-', "Dash").replace('_', "Underscore")
}

/// Stack output key carrying the qualified ARN of a function
pub fn output_key_for(function_name: &str) -> String {
    format!("{}LambdaFunctionQualifiedArn", normalize_name(function_name))
}

/// Invocation URI the gateway calls for a function target
pub fn invocation_uri(region: &str, durable_id: &DurableId) -> String {
    format!(
        "arn:aws:apigateway:{}:lambda:path/2015-03-31/functions/{}/invocations",
        region, durable_id
    )
}

/// Source ARN scoping an invoke permission to an API resource
pub fn source_arn(durable_id: &DurableId, api_id: &ApiId, resource: &str) -> String {
    format!(
        "arn:aws:execute-api:{}:{}:{}{}",
        durable_id.region(),
        durable_id.account_id(),
        api_id,
        resource
    )
}

/// Permission resource scoped to a single authorizer
pub fn authorizer_resource(authorizer_id: &AuthorizerId) -> String {
    format!("/authorizers/{}", authorizer_id)
}

/// Statement id of the invoke permission granted for a function
pub fn permission_statement_id(durable_id: &DurableId) -> String {
    format!("{}-websocket", durable_id.function_name())
}

/// Name given to the next authorizer created on an API
pub fn authorizer_name(existing_count: usize) -> String {
    format!("authorizer{}", existing_count + 1)
}

/// Public connection URL of an API stage
pub fn websocket_url(api_id: &ApiId, region: &str, stage: &str) -> String {
    format!(
        "wss://{}.{}.{}.{}/{}/",
        api_id, GATEWAY_HOST, region, PROVIDER_DOMAIN, stage
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat_arn() -> DurableId {
        DurableId::parse("arn:aws:lambda:us-east-1:123456789012:function:chat:3").unwrap()
    }

    #[test]
    fn test_api_name_default_and_override() {
        assert_eq!(api_name("svc", "dev", None), "svc-dev-websockets-api");
        assert_eq!(api_name("svc", "dev", Some("")), "svc-dev-websockets-api");
        assert_eq!(api_name("svc", "dev", Some("custom")), "custom");
    }

    #[test]
    fn test_route_selection_expression() {
        assert_eq!(route_selection_expression(None), "$request.body.action");
        assert_eq!(
            route_selection_expression(Some("$request.body.type")),
            "$request.body.type"
        );
    }

    #[test]
    fn test_output_keys() {
        assert_eq!(output_key_for("chat"), "ChatLambdaFunctionQualifiedArn");
        assert_eq!(
            output_key_for("send-message"),
            "SendDashmessageLambdaFunctionQualifiedArn"
        );
        assert_eq!(
            output_key_for("on_connect"),
            "OnUnderscoreconnectLambdaFunctionQualifiedArn"
        );
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_invocation_uri() {
        assert_eq!(
            invocation_uri("us-east-1", &chat_arn()),
            "arn:aws:apigateway:us-east-1:lambda:path/2015-03-31/functions/\
             arn:aws:lambda:us-east-1:123456789012:function:chat:3/invocations"
        );
    }

    #[test]
    fn test_permission_naming() {
        let arn = chat_arn();
        let api = ApiId::new("a1b2c3");
        assert_eq!(permission_statement_id(&arn), "chat-websocket");
        assert_eq!(
            source_arn(&arn, &api, WILDCARD_RESOURCE),
            "arn:aws:execute-api:us-east-1:123456789012:a1b2c3/*/*"
        );
        assert_eq!(
            source_arn(&arn, &api, &authorizer_resource(&AuthorizerId::new("z9"))),
            "arn:aws:execute-api:us-east-1:123456789012:a1b2c3/authorizers/z9"
        );
    }

    #[test]
    fn test_websocket_url() {
        assert_eq!(
            websocket_url(&ApiId::new("abc"), "eu-west-1", "prod"),
            "wss://abc.execute-api.eu-west-1.amazonaws.com/prod/"
        );
    }

    #[test]
    fn test_authorizer_name() {
        assert_eq!(authorizer_name(0), "authorizer1");
        assert_eq!(authorizer_name(2), "authorizer3");
    }
}
