//! Unary GET/POST client
//!
//! ```ignore
//! let factory = HttpClientFactory::new("http://localhost:9090/api", codec, registry);
//! let client = factory.post_client();
//! let user: User = client.send("users/get", Some(&GetUser { id: 7 })).await?;
//! ```

use crate::query::build_query;
use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use async_trait::async_trait;
use freighter_core::{
    ClientConfig, Context, ErrorPayload, ErrorRegistry, Finalizer, FreighterError,
    FreighterResult, Middleware, MiddlewareCollector,
};
use freighter_transport::{Codec, CodecExt, codec_for, validate};
use parking_lot::Mutex;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::sync::Arc;

/// Protocol name seen by middleware on unary calls
pub const PROTOCOL_HTTP: &str = "http";

const CONTENT_TYPE: &str = "Content-Type";

/// Builds unary clients that share a codec, registry, transport and middleware
#[derive(Clone)]
pub struct HttpClientFactory {
    endpoint: String,
    codec: Arc<dyn Codec>,
    registry: Arc<ErrorRegistry>,
    transport: Arc<dyn HttpTransport>,
    middleware: MiddlewareCollector,
}

impl HttpClientFactory {
    /// Create a factory for `endpoint` using the `reqwest` transport
    pub fn new(
        endpoint: impl Into<String>,
        codec: Arc<dyn Codec>,
        registry: Arc<ErrorRegistry>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            codec,
            registry,
            transport: Arc::new(ReqwestTransport::new()),
            middleware: MiddlewareCollector::new(),
        }
    }

    /// Create a factory from configuration
    pub fn from_config(config: &ClientConfig, registry: Arc<ErrorRegistry>) -> FreighterResult<Self> {
        let codec = codec_for(&config.content_type).ok_or_else(|| {
            FreighterError::Config(format!("unsupported content type: {}", config.content_type))
        })?;

        let mut transport = ReqwestTransport::new();
        if let Some(timeout) = config.request_timeout() {
            transport = transport.with_timeout(timeout);
        }

        Ok(Self::new(config.http_endpoint(), codec, registry).with_transport(Arc::new(transport)))
    }

    /// Replace the HTTP primitive
    pub fn with_transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = transport;
        self
    }

    /// Add middleware to every client built after this call
    pub fn use_middleware(&mut self, middleware: impl Middleware + 'static) {
        self.middleware.use_middleware(middleware);
    }

    /// Base address of every call
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build a client that sends requests in the query string
    pub fn get_client(&self) -> HttpClient {
        self.client(HttpMethod::Get)
    }

    /// Build a client that sends requests in the body
    pub fn post_client(&self) -> HttpClient {
        self.client(HttpMethod::Post)
    }

    fn client(&self, method: HttpMethod) -> HttpClient {
        HttpClient {
            method,
            endpoint: self.endpoint.trim_end_matches('/').to_string(),
            codec: self.codec.clone(),
            registry: self.registry.clone(),
            transport: self.transport.clone(),
            middleware: self.middleware.clone(),
        }
    }
}

impl std::fmt::Debug for HttpClientFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClientFactory")
            .field("endpoint", &self.endpoint)
            .field("content_type", &self.codec.content_type())
            .field("middleware", &self.middleware)
            .finish()
    }
}

/// Client for one-shot request/response calls
#[derive(Clone)]
pub struct HttpClient {
    method: HttpMethod,
    endpoint: String,
    codec: Arc<dyn Codec>,
    registry: Arc<ErrorRegistry>,
    transport: Arc<dyn HttpTransport>,
    middleware: MiddlewareCollector,
}

impl HttpClient {
    /// Request method this client uses
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Full address of `target`
    pub fn url(&self, target: &str) -> String {
        format!("{}/{}", self.endpoint, target.trim_start_matches('/'))
    }

    /// Send one request and decode the response
    ///
    /// Every failure is returned: middleware errors, transport failures,
    /// error payloads sent by the server and responses that do not decode
    /// as `RS`. A 2xx response with an empty body decodes as `null`, which
    /// suits `()` and `Option<_>` response types.
    ///
    /// The response is decoded inside the chain, so middleware that calls
    /// `next` sees the server's error, and the response headers are in the
    /// context params when `next` returns.
    pub async fn send<RQ, RS>(&self, target: &str, request: Option<&RQ>) -> FreighterResult<RS>
    where
        RQ: Serialize + ?Sized,
        RS: DeserializeOwned + Send,
    {
        let mut prepared = HttpRequest::new(self.method, self.url(target));
        match (self.method, request) {
            (HttpMethod::Get, Some(request)) => {
                prepared.query = build_query(request, self.codec.key_case())?;
            }
            (HttpMethod::Post, Some(request)) => {
                prepared.body = Some(self.codec.encode(request)?);
            }
            (_, None) => {}
        }

        let dispatch = Dispatch {
            transport: self.transport.as_ref(),
            codec: self.codec.as_ref(),
            registry: self.registry.as_ref(),
            request: Mutex::new(Some(prepared)),
            response: Mutex::new(None),
        };
        let mut ctx = Context::new(self.url(target), PROTOCOL_HTTP);
        self.middleware.execute(&mut ctx, &dispatch).await?;

        dispatch.response.lock().take().ok_or_else(|| {
            FreighterError::Protocol("middleware completed without sending the request".into())
        })
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("method", &self.method)
            .field("endpoint", &self.endpoint)
            .field("content_type", &self.codec.content_type())
            .finish()
    }
}

/// Terminal operation of a unary call
struct Dispatch<'a, RS> {
    transport: &'a dyn HttpTransport,
    codec: &'a dyn Codec,
    registry: &'a ErrorRegistry,
    request: Mutex<Option<HttpRequest>>,
    response: Mutex<Option<RS>>,
}

impl<RS: DeserializeOwned> Dispatch<'_, RS> {
    fn read_response(&self, response: &HttpResponse) -> FreighterResult<RS> {
        if response.is_success() {
            if response.body.is_empty() {
                return Ok(validate(Value::Null)?);
            }
            return Ok(self.codec.decode(&response.body)?);
        }

        let payload: ErrorPayload = self.codec.decode(&response.body).map_err(|e| {
            FreighterError::Serialization(format!(
                "status {} with unreadable error payload: {}",
                response.status, e
            ))
        })?;

        match self.registry.decode(&payload)? {
            Some(error) => Err(error),
            None => Err(FreighterError::Protocol(format!(
                "status {} without an error",
                response.status
            ))),
        }
    }
}

#[async_trait]
impl<RS: DeserializeOwned + Send> Finalizer for Dispatch<'_, RS> {
    async fn finalize(&self, ctx: &mut Context) -> FreighterResult<()> {
        let Some(mut request) = self.request.lock().take() else {
            return Err(FreighterError::Protocol("request already sent".into()));
        };

        request.url = ctx.target.clone();
        for (name, value) in &ctx.params {
            request.headers.insert(name.clone(), value.clone());
        }
        request
            .headers
            .retain(|name, _| !name.eq_ignore_ascii_case(CONTENT_TYPE));
        request
            .headers
            .insert(CONTENT_TYPE.to_string(), self.codec.content_type().to_string());

        let method = request.method;
        let response = self.transport.fetch(request).await?;
        tracing::debug!(
            %method,
            url = %ctx.target,
            status = response.status,
            bytes = response.body.len(),
            "unary response"
        );

        for (name, value) in &response.headers {
            ctx.set_param(name.clone(), value.clone());
        }
        let value = self.read_response(&response)?;
        *self.response.lock() = Some(value);
        Ok(())
    }
}
