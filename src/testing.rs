//! in-process alert receiver recording what it was sent
use std::{
	net::SocketAddr,
	sync::{Arc, Mutex},
};

use axum::{
	extract::{Extension, Json},
	http::{
		header::{AUTHORIZATION, CONTENT_TYPE},
		HeaderMap, HeaderName, StatusCode,
	},
	routing::post,
	Router,
};
use url::Url;

use crate::alert::Alert;

/// a single received request
#[derive(Debug, Clone)]
pub struct Received {
	pub authorization: Option<String>,
	pub content_type: Option<String>,
	pub alert: Alert,
}

struct State {
	status: StatusCode,
	requests: Mutex<Vec<Received>>,
}

pub struct Receiver {
	addr: SocketAddr,
	state: Arc<State>,
}

impl Receiver {
	/// Binds to an ephemeral port and answers every posted alert with `status`.
	pub async fn spawn(status: StatusCode) -> Self {
		let state = Arc::new(State { status, requests: Mutex::new(Vec::new()) });

		let app = Router::new()
			.route("/api/v1/alerts", post(receive))
			.layer(Extension(state.clone()));

		let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
			.serve(app.into_make_service());
		let addr = server.local_addr();

		tokio::spawn(server);

		Self { addr, state }
	}

	pub fn url(&self) -> Url {
		Url::parse(&format!("http://{}/api/v1/alerts", self.addr)).unwrap()
	}

	pub fn requests(&self) -> Vec<Received> {
		self.state.requests.lock().unwrap().clone()
	}
}

async fn receive(
	Extension(state): Extension<Arc<State>>,
	headers: HeaderMap,
	Json(alert): Json<Alert>,
) -> StatusCode {
	let header = |name: HeaderName| {
		headers
			.get(name)
			.and_then(|value| value.to_str().ok())
			.map(String::from)
	};

	state.requests.lock().unwrap().push(Received {
		authorization: header(AUTHORIZATION),
		content_type: header(CONTENT_TYPE),
		alert,
	});

	state.status
}
