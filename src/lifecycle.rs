//! Listener lifecycle: bind, serve in the background, and drain on a termination signal.
//!
//! [`serve_until`] runs the server on its own task while the caller's path waits for the
//! shutdown future. Once it resolves the listener stops accepting connections and in-flight
//! requests get a bounded grace window. Failing to drain within that window is fatal.

// crates.io
use axum::Router;
use tokio::{net::TcpListener, sync::oneshot, time};
// self
use crate::{_prelude::*, error::LifecycleError};

/// Binds the relay listener.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, LifecycleError> {
	TcpListener::bind(addr).await.map_err(|source| LifecycleError::Bind { addr, source })
}

/// Serves `app` on `listener` until `shutdown` resolves, then drains for at most `grace`.
///
/// Returns an error if the server stops on its own, if its task panics, or if in-flight
/// requests are still running when the grace period elapses.
pub async fn serve_until<F>(
	listener: TcpListener,
	app: Router,
	shutdown: F,
	grace: Duration,
) -> Result<(), LifecycleError>
where
	F: Future<Output = ()>,
{
	let addr = listener.local_addr().map_err(LifecycleError::Serve)?;
	let (trigger, triggered) = oneshot::channel::<()>();
	let mut server = tokio::spawn(async move {
		axum::serve(listener, app)
			.with_graceful_shutdown(async move {
				let _ = triggered.await;
			})
			.await
	});

	tracing::info!(%addr, "Token relay listening.");

	tokio::select! {
		joined = &mut server => {
			joined?.map_err(LifecycleError::Serve)?;
			tracing::warn!("Token relay stopped before a shutdown signal.");

			return Ok(());
		},
		_ = shutdown => {},
	}

	tracing::info!(?grace, "Shutting down token relay.");

	let _ = trigger.send(());

	match time::timeout(grace, &mut server).await {
		Ok(joined) => {
			joined?.map_err(LifecycleError::Serve)?;
			tracing::info!("Token relay stopped.");

			Ok(())
		},
		Err(_) => {
			server.abort();
			tracing::error!(?grace, "In-flight requests outlived the shutdown grace period.");

			Err(LifecycleError::ShutdownTimeout { grace })
		},
	}
}

/// Installs SIGINT/SIGTERM handlers and returns a future resolving on the first signal.
///
/// Handlers are installed eagerly so a signal delivered before the future is polled is not
/// lost.
pub fn shutdown_signal() -> Result<impl Future<Output = ()> + Send, LifecycleError> {
	#[cfg(unix)]
	{
		use tokio::signal::unix::{SignalKind, signal};

		let mut interrupt = signal(SignalKind::interrupt()).map_err(LifecycleError::Signal)?;
		let mut terminate = signal(SignalKind::terminate()).map_err(LifecycleError::Signal)?;

		Ok(async move {
			tokio::select! {
				_ = interrupt.recv() => tracing::info!("Received SIGINT."),
				_ = terminate.recv() => tracing::info!("Received SIGTERM."),
			}
		})
	}
	#[cfg(not(unix))]
	{
		Ok(async {
			if let Err(e) = tokio::signal::ctrl_c().await {
				tracing::error!(error = %e, "Failed to listen for Ctrl-C.");
				std::future::pending::<()>().await;
			}
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::net::{Ipv4Addr, SocketAddrV4};
	// crates.io
	use axum::routing::get;
	use tokio::{net::TcpStream, sync::Notify};
	// self
	use super::*;

	fn loopback() -> SocketAddr {
		SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0))
	}

	#[tokio::test]
	async fn idle_server_stops_cleanly_and_refuses_new_connections() {
		let listener = bind(loopback()).await.expect("Failed to bind loopback listener.");
		let addr = listener.local_addr().expect("Listener should expose its address.");
		let app = Router::new().route("/", get(|| async { "ok" }));

		serve_until(listener, app, async {}, Duration::from_secs(5))
			.await
			.expect("Idle server should shut down cleanly.");

		assert!(TcpStream::connect(addr).await.is_err(), "Stopped listener must refuse connections.");
	}

	#[tokio::test]
	async fn in_flight_request_completes_within_grace() {
		let listener = bind(loopback()).await.expect("Failed to bind loopback listener.");
		let addr = listener.local_addr().expect("Listener should expose its address.");
		let started = Arc::new(Notify::new());
		let handler_started = Arc::clone(&started);
		let app = Router::new().route(
			"/slow",
			get(move || {
				let handler_started = Arc::clone(&handler_started);

				async move {
					handler_started.notify_one();
					time::sleep(Duration::from_millis(200)).await;

					"done"
				}
			}),
		);
		let request = tokio::spawn(async move {
			ReqwestClient::new()
				.get(format!("http://{addr}/slow"))
				.send()
				.await?
				.text()
				.await
		});
		let shutdown = async move { started.notified().await };

		serve_until(listener, app, shutdown, Duration::from_secs(5))
			.await
			.expect("Server should drain within the grace period.");

		let body = request
			.await
			.expect("Request task should not panic.")
			.expect("In-flight request should complete.");

		assert_eq!(body, "done");
	}

	#[tokio::test]
	async fn grace_period_elapsing_is_an_error() {
		let listener = bind(loopback()).await.expect("Failed to bind loopback listener.");
		let addr = listener.local_addr().expect("Listener should expose its address.");
		let started = Arc::new(Notify::new());
		let handler_started = Arc::clone(&started);
		let app = Router::new().route(
			"/stuck",
			get(move || {
				let handler_started = Arc::clone(&handler_started);

				async move {
					handler_started.notify_one();
					time::sleep(Duration::from_secs(30)).await;

					"late"
				}
			}),
		);
		let _request = tokio::spawn(async move {
			ReqwestClient::new().get(format!("http://{addr}/stuck")).send().await
		});
		let shutdown = async move { started.notified().await };
		let err = serve_until(listener, app, shutdown, Duration::from_millis(100))
			.await
			.expect_err("A stuck request should exhaust the grace period.");

		assert!(matches!(err, LifecycleError::ShutdownTimeout { .. }));
	}

	#[tokio::test]
	async fn bind_failure_names_the_address() {
		let first = bind(loopback()).await.expect("Failed to bind loopback listener.");
		let taken = first.local_addr().expect("Listener should expose its address.");
		let err = bind(taken).await.expect_err("Binding a taken port should fail.");

		assert!(matches!(err, LifecycleError::Bind { addr, .. } if addr == taken));
	}
}
