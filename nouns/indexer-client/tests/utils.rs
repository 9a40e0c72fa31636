use {
    axum::{extract::State, http::StatusCode, routing::post, Json, Router},
    serde_json::Value,
    std::{sync::Arc, time::Duration},
};

type Handler = Arc<dyn Fn(Value) -> Value + Send + Sync>;

#[derive(Clone)]
struct MockIndexer {
    status: StatusCode,
    delay: Duration,
    handler: Handler,
}

/// Start a GraphQL endpoint on a random local port that answers every request
/// with `handler(request_body)`. Returns the endpoint URL.
pub async fn serve<F>(handler: F) -> anyhow::Result<String>
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    serve_with(StatusCode::OK, Duration::ZERO, handler).await
}

pub async fn serve_with<F>(status: StatusCode, delay: Duration, handler: F) -> anyhow::Result<String>
where
    F: Fn(Value) -> Value + Send + Sync + 'static,
{
    let state = MockIndexer {
        status,
        delay,
        handler: Arc::new(handler),
    };

    let app = Router::new().route("/", post(answer)).with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    Ok(format!("http://{addr}/"))
}

async fn answer(State(mock): State<MockIndexer>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    if !mock.delay.is_zero() {
        tokio::time::sleep(mock.delay).await;
    }

    (mock.status, Json((mock.handler)(body)))
}
