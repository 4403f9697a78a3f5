//! Handler resolution, invocation and failure containment.
//!
//! # Responsibilities
//! - Assemble the request descriptor from request parts and body text
//! - Resolve the handler through the route table
//! - Run the handler in its own task and wait for its single response
//! - Turn panics, errors, silence and timeouts into a response
//!
//! # Design Decisions
//! - The handler runs inside a spawned task, so a panic before or after
//!   its first `.await` is caught at the same boundary
//! - Failure details go to the log, never to the client
//! - A response already delivered stands even if the handler fails later
//! - The handler timeout bounds the whole task, not just the wait for a
//!   response; a task still running at the deadline is aborted

use std::sync::Arc;
use std::time::Duration;

use axum::http::request::Parts;
use tokio::sync::oneshot;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::Instant;

use crate::http::handler::{HandlerError, Responder};
use crate::http::request::RequestDescriptor;
use crate::http::response::HandlerResult;
use crate::routing::RouteTable;

type HandlerTask = JoinHandle<Result<(), HandlerError>>;

/// Dispatches normalized requests to handlers.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    routes: Arc<RouteTable>,
    handler_timeout: Duration,
}

impl Dispatcher {
    pub fn new(routes: RouteTable, handler_timeout: Duration) -> Self {
        Self {
            routes: Arc::new(routes),
            handler_timeout,
        }
    }

    /// Decode the body, build the descriptor and invoke the resolved handler.
    pub async fn dispatch(&self, parts: &Parts, body: &str, request_id: &str) -> HandlerResult {
        let request = RequestDescriptor::from_parts(parts, body);
        self.invoke(request, request_id).await
    }

    /// Invoke the handler resolved for `request.path`.
    ///
    /// Always yields exactly one result.
    pub async fn invoke(&self, request: RequestDescriptor, request_id: &str) -> HandlerResult {
        let route = self.routes.resolve(&request.path);
        let route_name = route.name().to_string();
        let handler = route.handler();

        tracing::debug!(
            request_id = %request_id,
            route = %route_name,
            method = %request.method,
            path = %request.path,
            "Dispatching request"
        );

        let (responder, reply) = Responder::channel();
        let task: HandlerTask = tokio::spawn(async move { handler.call(request, responder).await });

        self.await_reply(task, reply, &route_name, request_id).await
    }

    async fn await_reply(
        &self,
        task: HandlerTask,
        reply: oneshot::Receiver<HandlerResult>,
        route: &str,
        request_id: &str,
    ) -> HandlerResult {
        let deadline = Instant::now() + self.handler_timeout;

        match tokio::time::timeout_at(deadline, reply).await {
            Ok(Ok(result)) => {
                supervise(task, deadline, Reply::Sent, route, request_id);
                result
            }
            Ok(Err(_)) => {
                // Responder dropped: the outcome is 500 whatever the task does next.
                supervise(task, deadline, Reply::Dropped, route, request_id);
                HandlerResult::unknown_error()
            }
            Err(_) => {
                task.abort();
                tracing::warn!(
                    request_id = %request_id,
                    route = %route,
                    timeout_ms = self.handler_timeout.as_millis() as u64,
                    "Handler timed out"
                );
                HandlerResult::timed_out()
            }
        }
    }
}

/// Whether the handler answered before its task was handed off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reply {
    Sent,
    Dropped,
}

/// Log how a handler task ends, aborting it at the invocation deadline.
fn supervise(mut task: HandlerTask, deadline: Instant, reply: Reply, route: &str, request_id: &str) {
    let route = route.to_string();
    let request_id = request_id.to_string();

    tokio::spawn(async move {
        match tokio::time::timeout_at(deadline, &mut task).await {
            Ok(Ok(Ok(()))) => {
                if reply == Reply::Dropped {
                    tracing::error!(
                        request_id = %request_id,
                        route = %route,
                        "Handler finished without responding"
                    );
                }
            }
            Ok(Ok(Err(e))) => match reply {
                Reply::Sent => tracing::warn!(
                    request_id = %request_id,
                    route = %route,
                    error = %e,
                    "Handler failed after responding"
                ),
                Reply::Dropped => tracing::error!(
                    request_id = %request_id,
                    route = %route,
                    error = %e,
                    "Handler failed"
                ),
            },
            Ok(Err(e)) => log_join_error(&e, &route, &request_id),
            Err(_) => {
                task.abort();
                tracing::warn!(
                    request_id = %request_id,
                    route = %route,
                    "Handler still running at deadline, aborted"
                );
            }
        }
    });
}

fn log_join_error(err: &JoinError, route: &str, request_id: &str) {
    if err.is_panic() {
        tracing::error!(
            request_id = %request_id,
            route = %route,
            error = %err,
            "Handler panicked"
        );
    } else {
        tracing::warn!(request_id = %request_id, route = %route, "Handler task cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::request::JsonMap;
    use crate::http::response::ResponseBody;
    use axum::http::{Request, StatusCode};
    use serde_json::json;
    use tokio::sync::Notify;

    /// Notifies when the handler future holding it is dropped.
    struct DropSignal(Arc<Notify>);

    impl Drop for DropSignal {
        fn drop(&mut self) {
            self.0.notify_one();
        }
    }

    /// Table with one route whose handler answers (or not) and then hangs
    /// while holding a [`DropSignal`].
    fn lingering(responds: bool, timeout: Duration) -> (Dispatcher, Arc<Notify>) {
        let released = Arc::new(Notify::new());
        let signal = Arc::clone(&released);
        let routes = RouteTable::builder(not_found)
            .route("linger", move |_req: RequestDescriptor, respond: Responder| {
                let guard = DropSignal(Arc::clone(&signal));
                async move {
                    let _guard = guard;
                    if responds {
                        respond.status(StatusCode::OK);
                    } else {
                        drop(respond);
                    }
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok::<_, HandlerError>(())
                }
            })
            .build();
        (Dispatcher::new(routes, timeout), released)
    }

    async fn ping(_req: RequestDescriptor, respond: Responder) -> Result<(), HandlerError> {
        respond.status(StatusCode::OK);
        Ok(())
    }

    async fn not_found(_req: RequestDescriptor, respond: Responder) -> Result<(), HandlerError> {
        respond.status(StatusCode::NOT_FOUND);
        Ok(())
    }

    async fn echo(req: RequestDescriptor, respond: Responder) -> Result<(), HandlerError> {
        respond.json(StatusCode::OK, req.payload);
        Ok(())
    }

    fn boom(_req: RequestDescriptor, _respond: Responder) -> crate::http::handler::HandlerFuture {
        panic!("synchronous failure");
    }

    async fn panics_after_await(_req: RequestDescriptor, _respond: Responder) -> Result<(), HandlerError> {
        tokio::task::yield_now().await;
        panic!("asynchronous failure");
    }

    async fn returns_error(_req: RequestDescriptor, _respond: Responder) -> Result<(), HandlerError> {
        Err("database unavailable".into())
    }

    async fn silent(_req: RequestDescriptor, _respond: Responder) -> Result<(), HandlerError> {
        Ok(())
    }

    async fn hangs(_req: RequestDescriptor, respond: Responder) -> Result<(), HandlerError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        respond.status(StatusCode::OK);
        Ok(())
    }

    async fn fails_after_responding(_req: RequestDescriptor, respond: Responder) -> Result<(), HandlerError> {
        respond.status(StatusCode::ACCEPTED);
        Err("cleanup failed".into())
    }

    fn dispatcher(timeout: Duration) -> Dispatcher {
        let routes = RouteTable::builder(not_found)
            .route("ping", ping)
            .route("echo", echo)
            .route("error", boom)
            .route("async-error", panics_after_await)
            .route("err", returns_error)
            .route("silent", silent)
            .route("hang", hangs)
            .route("late", fails_after_responding)
            .build();
        Dispatcher::new(routes, timeout)
    }

    async fn run(dispatcher: &Dispatcher, method: &str, uri: &str, body: &str) -> HandlerResult {
        let (parts, _) = Request::builder()
            .method(method)
            .uri(uri)
            .body(())
            .unwrap()
            .into_parts();
        dispatcher.dispatch(&parts, body, "test").await
    }

    #[tokio::test]
    async fn ping_gets_empty_json() {
        let d = dispatcher(Duration::from_secs(5));
        let result = run(&d, "GET", "/ping", "").await;
        assert_eq!(result, HandlerResult::empty(StatusCode::OK));
    }

    #[tokio::test]
    async fn body_round_trips_into_payload() {
        let d = dispatcher(Duration::from_secs(5));
        let result = run(&d, "POST", "/echo/", r#"{"a":1}"#).await;
        let expected = match json!({"a": 1}) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        };
        assert_eq!(result.body, ResponseBody::Json(expected));

        let result = run(&d, "POST", "/echo", "not-json").await;
        assert_eq!(result.body, ResponseBody::Json(JsonMap::new()));
    }

    #[tokio::test]
    async fn unknown_route_uses_not_found() {
        let d = dispatcher(Duration::from_secs(5));
        let result = run(&d, "GET", "/nope", "").await;
        assert_eq!(result.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn synchronous_panic_is_contained() {
        let d = dispatcher(Duration::from_secs(5));
        assert_eq!(run(&d, "GET", "/error", "").await, HandlerResult::unknown_error());
    }

    #[tokio::test]
    async fn panic_after_suspending_is_contained() {
        let d = dispatcher(Duration::from_secs(5));
        assert_eq!(run(&d, "GET", "/async-error", "").await, HandlerResult::unknown_error());
    }

    #[tokio::test]
    async fn returned_error_is_contained() {
        let d = dispatcher(Duration::from_secs(5));
        assert_eq!(run(&d, "GET", "/err", "").await, HandlerResult::unknown_error());
    }

    #[tokio::test]
    async fn missing_response_is_contained() {
        let d = dispatcher(Duration::from_secs(5));
        assert_eq!(run(&d, "GET", "/silent", "").await, HandlerResult::unknown_error());
    }

    #[tokio::test]
    async fn slow_handler_times_out() {
        let d = dispatcher(Duration::from_millis(50));
        let result = run(&d, "GET", "/hang", "").await;
        assert_eq!(result, HandlerResult::timed_out());
        assert_eq!(result.status, StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn response_stands_when_handler_fails_later() {
        let d = dispatcher(Duration::from_secs(5));
        let result = run(&d, "PUT", "/late", "").await;
        assert_eq!(result.status, StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn dropped_responder_does_not_wait_for_handler() {
        let (d, released) = lingering(false, Duration::from_millis(50));

        let result = tokio::time::timeout(Duration::from_secs(2), run(&d, "GET", "/linger", ""))
            .await
            .expect("dispatch must not wait for the handler task");
        assert_eq!(result, HandlerResult::unknown_error());

        // The task itself is aborted once the deadline passes.
        tokio::time::timeout(Duration::from_secs(2), released.notified())
            .await
            .expect("handler task should be aborted at the deadline");
    }

    #[tokio::test]
    async fn handler_lingering_after_response_is_aborted() {
        let (d, released) = lingering(true, Duration::from_millis(50));

        let result = run(&d, "GET", "/linger", "").await;
        assert_eq!(result, HandlerResult::empty(StatusCode::OK));

        tokio::time::timeout(Duration::from_secs(2), released.notified())
            .await
            .expect("handler task should be aborted at the deadline");
    }
}
