//! Midway demo - resolves a small pipeline by name and runs sample requests.

use midway::prelude::*;
use midway::registry::StreamFactory;
use serde_json::Value;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const APP_NAMESPACE: &str = "app::middleware::";

const CONFIG: &str = r#"{ "namespaces": ["app::middleware::", "midway::middleware::"], "include_default": true }"#;

const PIPELINE: &str = r#"[
    { "name": "poweredBy" },
    { "name": "cacheControl", "args": ["public", 3600] }
]"#;

#[middleware_fn(name = "poweredBy", description = "Adds an X-Powered-By header")]
async fn powered_by(req: Request, res: Response, next: Next) -> Result<Response, MiddlewareError> {
    let res = next.run(req, res).await?;
    Ok(res.header("X-Powered-By", "midway"))
}

/// Sets `Cache-Control` from a visibility and a max-age.
struct CacheControl {
    directive: String,
}

impl CacheControl {
    fn from_args(args: Vec<Value>) -> Result<SharedMiddleware, MiddlewareError> {
        let visibility = args.first().and_then(Value::as_str).unwrap_or("private");
        let max_age = args.get(1).and_then(Value::as_u64).unwrap_or(0);
        Ok(Arc::new(Self {
            directive: format!("{}, max-age={}", visibility, max_age),
        }))
    }
}

#[async_trait]
impl Middleware for CacheControl {
    async fn handle(
        &self,
        request: Request,
        response: Response,
        next: Next,
    ) -> Result<Response, MiddlewareError> {
        let response = next.run(request, response).await?;
        Ok(response.header("Cache-Control", self.directive.clone()))
    }

    fn name(&self) -> &str {
        "cacheControl"
    }
}

/// Application-level override of the built-in `poweredBy`.
struct AppPoweredBy;

#[async_trait]
impl Middleware for AppPoweredBy {
    async fn handle(
        &self,
        request: Request,
        response: Response,
        next: Next,
    ) -> Result<Response, MiddlewareError> {
        let response = next.run(request, response).await?;
        Ok(response.header("X-Powered-By", "demo-app"))
    }

    fn name(&self) -> &str {
        "poweredBy"
    }
}

fn build_registry() -> Result<MiddlewareRegistry, MiddlewareError> {
    let config = RegistryConfig::from_json(CONFIG)?;
    let mut registry = MiddlewareRegistry::from_config(&config)?;

    registry.define_manifest(
        DEFAULT_NAMESPACE,
        PoweredByMiddleware::manifest(),
        PoweredByMiddleware::constructor(),
    );
    registry.define(
        format!("{}CacheControl", DEFAULT_NAMESPACE),
        Constructor::variadic(CacheControl::from_args),
    );
    registry.define(
        format!("{}PoweredBy", APP_NAMESPACE),
        Constructor::nullary(|| Ok(Arc::new(AppPoweredBy) as SharedMiddleware)),
    );
    let stream_factory: StreamFactory =
        Arc::new(|content: &[u8]| bytes::Bytes::copy_from_slice(content));
    registry.set_stream_factory(Some(stream_factory));

    Ok(registry)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting midway demo...");

    let registry = Arc::new(build_registry()?);
    tracing::info!("Registry: {:?}", registry);

    let specs: Vec<MiddlewareSpec> = serde_json::from_str(PIPELINE)?;
    let mut pipeline = registry.resolve_all(&specs)?;

    // Negotiated per request: only JSON clients get the JSON marker.
    let stream_factory = registry.stream_factory();
    pipeline.push(Arc::new(
        create_proxy(move |req: &Request, _res: &Response| {
            if req.get_header("accept") != Some("application/json") {
                return Resolution::Skip;
            }
            let factory = stream_factory.clone();
            Resolution::Delegate(from_fn("jsonBody", move |req, res, next: Next| {
                let factory = factory.clone();
                async move {
                    let res = next.run(req, res).await?;
                    let body = match &factory {
                        Some(make) => make(br#"{"ok":true}"#),
                        None => bytes::Bytes::from_static(br#"{"ok":true}"#),
                    };
                    Ok(res.header("Content-Type", "application/json").body(body))
                }
            }))
        })
        .named("negotiate"),
    ));

    let chain = pipeline
        .into_iter()
        .rev()
        .fold(Next::terminal(), |next, middleware| Next::through(middleware, next));

    let requests = [
        Request::new(Method::Get, "/index.html"),
        Request::new(Method::Get, "/api/status").header("Accept", "application/json"),
    ];
    for request in requests {
        let url = request.url.clone();
        let response = chain.run(request, Response::text("hello")).await?;
        tracing::info!(
            "{} -> {} headers={:?} body={:?}",
            url,
            response.status.0,
            response.headers,
            response.text_body()
        );
    }

    Ok(())
}
