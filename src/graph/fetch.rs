use log::{debug, info};
use reqwest::{StatusCode, Url};

use super::types::GraphPayload;
use crate::error::GraphError;

/// Issue one `GET` against the graph endpoint and parse the body.
///
/// There is no retry and no caching; the first failure is returned.
pub async fn fetch_graph(url: &Url) -> Result<GraphPayload, GraphError> {
	info!("Fetching graph from {url}");
	let network = |e: reqwest::Error| GraphError::Network {
		url: url.to_string(),
		message: e.to_string(),
	};

	let response = reqwest::get(url.clone()).await.map_err(network)?;
	let status = response.status();
	let body = response.text().await.map_err(network)?;
	debug!("{url} answered {status} with {} bytes", body.len());

	decode_response(url, status, &body)
}

/// Turn a status and body into a payload, or the reason it is unusable.
pub fn decode_response(
	url: &Url,
	status: StatusCode,
	body: &str,
) -> Result<GraphPayload, GraphError> {
	if !status.is_success() {
		return Err(GraphError::Status {
			status: status.as_u16(),
			url: url.to_string(),
		});
	}
	Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn url() -> Url {
		Url::parse("http://localhost/api/get_graph").unwrap()
	}

	#[test]
	fn ok_body_is_parsed() {
		let body = r#"{"graph": [{"source": "A", "target": "B", "relationship": "knows"}]}"#;
		let payload = decode_response(&url(), StatusCode::OK, body).unwrap();
		assert_eq!(payload.graph.len(), 1);
		assert_eq!(payload.graph[0].relationship, "knows");
	}

	#[test]
	fn error_status_wins_over_body() {
		let body = r#"{"graph": []}"#;
		let err = decode_response(&url(), StatusCode::INTERNAL_SERVER_ERROR, body).unwrap_err();
		assert_eq!(
			err,
			GraphError::Status {
				status: 500,
				url: "http://localhost/api/get_graph".into(),
			}
		);
	}

	#[test]
	fn html_body_is_malformed() {
		let err = decode_response(&url(), StatusCode::OK, "<html></html>").unwrap_err();
		assert!(matches!(err, GraphError::MalformedPayload { line: 1, .. }));
	}

	#[test]
	fn missing_graph_key_is_malformed() {
		let err = decode_response(&url(), StatusCode::OK, r#"{"edges": []}"#).unwrap_err();
		assert!(matches!(err, GraphError::MalformedPayload { .. }));
	}
}
