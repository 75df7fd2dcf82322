// HTTP change feed - newline-delimited JSON change documents over a long-lived response
use crate::application::change_feed::{ChangeFeed, ChangeStream, FeedError, FeedFilter};
use crate::domain::flight::ChangeEvent;
use async_trait::async_trait;
use bytes::{Buf, BytesMut};
use futures::StreamExt;
use reqwest::header;

#[derive(Debug, Clone)]
pub struct HttpChangeFeed {
    client: reqwest::Client,
    base_url: String,
    database: String,
    table: String,
}

impl HttpChangeFeed {
    pub fn new(base_url: String, database: String, table: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            database,
            table,
        }
    }

    fn changes_url(&self, filter: &FeedFilter) -> String {
        format!(
            "{}/db/{}/table/{}/changes?field={}&value={}",
            self.base_url,
            urlencoding::encode(&self.database),
            urlencoding::encode(&self.table),
            urlencoding::encode(&filter.field),
            urlencoding::encode(&filter.value)
        )
    }
}

/// Longest change document accepted before the feed is considered broken
const MAX_LINE_BYTES: usize = 1024 * 1024;

/// Newline framing over arbitrary chunks. Bytes already scanned are never scanned again.
#[derive(Debug, Default)]
struct LineBuffer {
    buffer: BytesMut,
    scanned: usize,
}

impl LineBuffer {
    fn extend(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Split the next complete line off the front, without its terminator
    fn next_line(&mut self) -> Option<BytesMut> {
        let Some(offset) = self.buffer[self.scanned..].iter().position(|&b| b == b'\n') else {
            self.scanned = self.buffer.len();
            return None;
        };
        let mut line = self.buffer.split_to(self.scanned + offset);
        self.buffer.advance(1);
        self.scanned = 0;
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }
        Some(line)
    }

    /// Length of the unterminated tail
    fn pending(&self) -> usize {
        self.buffer.len()
    }

    fn remainder(&self) -> &[u8] {
        &self.buffer
    }
}

fn decode_line(line: &[u8]) -> Result<ChangeEvent, FeedError> {
    serde_json::from_slice(line).map_err(|source| FeedError::Decode {
        line: String::from_utf8_lossy(line).into_owned(),
        source,
    })
}

fn is_blank(line: &[u8]) -> bool {
    line.iter().all(u8::is_ascii_whitespace)
}

#[async_trait]
impl ChangeFeed for HttpChangeFeed {
    async fn subscribe(&self, filter: &FeedFilter) -> Result<ChangeStream, FeedError> {
        let url = self.changes_url(filter);
        tracing::debug!("Opening change feed: {}", url);

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/x-ndjson")
            .send()
            .await
            .map_err(|e| FeedError::Connect(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::Rejected { status, body });
        }

        let mut bytes = response.bytes_stream();
        let stream = async_stream::stream! {
            let mut lines = LineBuffer::default();

            while let Some(chunk) = bytes.next().await {
                match chunk {
                    Ok(chunk) => {
                        lines.extend(&chunk);
                        while let Some(line) = lines.next_line() {
                            if !is_blank(&line) {
                                yield decode_line(&line);
                            }
                        }
                        if lines.pending() > MAX_LINE_BYTES {
                            yield Err(FeedError::LineTooLong(lines.pending()));
                            return;
                        }
                    }
                    Err(e) => {
                        yield Err(FeedError::Transport(e.to_string()));
                        return;
                    }
                }
            }

            // Last document may arrive without a trailing newline
            if !is_blank(lines.remainder()) {
                yield decode_line(lines.remainder());
            }
        };

        Ok(stream.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::{Path, Query};
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::Router;
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn changes(
        Path((db, table)): Path<(String, String)>,
        Query(query): Query<HashMap<String, String>>,
    ) -> Result<String, StatusCode> {
        if db != "data" || table != "Europe" {
            return Err(StatusCode::NOT_FOUND);
        }
        if query.get("field").map(String::as_str) != Some("OpIcao")
            || query.get("value").map(String::as_str) != Some("IBE")
        {
            return Err(StatusCode::BAD_REQUEST);
        }
        Ok(concat!(
            "{\"new_val\":{\"Icao\":\"IBE1\",\"Lat\":40.0,\"Long\":-3.0},\"old_val\":null}\r\n",
            "\n",
            "not json\n",
            "{\"new_val\":{\"Icao\":\"IBE2\",\"Lat\":41.0,\"Long\":-4.0}}"
        )
        .to_string())
    }

    #[test]
    fn test_next_line_splits_and_strips_cr() {
        let mut lines = LineBuffer::default();
        lines.extend(b"one\r\ntwo\nrest");
        assert_eq!(&lines.next_line().unwrap()[..], b"one");
        assert_eq!(&lines.next_line().unwrap()[..], b"two");
        assert!(lines.next_line().is_none());
        assert_eq!(lines.remainder(), b"rest");
    }

    #[test]
    fn test_line_split_across_chunks() {
        let mut lines = LineBuffer::default();
        for chunk in [&b"{\"new_"[..], b"val\"", b":null}", b"\n{}"] {
            lines.extend(chunk);
            if let Some(line) = lines.next_line() {
                assert_eq!(&line[..], br#"{"new_val":null}"#);
                assert!(lines.next_line().is_none());
                assert_eq!(lines.remainder(), b"{}");
                return;
            }
            // Tail without a newline has been scanned once and is not revisited
            assert_eq!(lines.scanned, lines.pending());
        }
        panic!("line never completed");
    }

    #[test]
    fn test_changes_url_encodes_filter() {
        let feed = HttpChangeFeed::new("http://db:8080/".into(), "data".into(), "Europe".into());
        assert_eq!(
            feed.changes_url(&FeedFilter::new("OpIcao", "IBE & co")),
            "http://db:8080/db/data/table/Europe/changes?field=OpIcao&value=IBE%20%26%20co"
        );
    }

    #[tokio::test]
    async fn test_streams_documents_from_server() {
        let base = serve(Router::new().route("/db/:db/table/:table/changes", get(changes))).await;
        let feed = HttpChangeFeed::new(base, "data".into(), "Europe".into());

        let items: Vec<_> = feed
            .subscribe(&FeedFilter::new("OpIcao", "IBE"))
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(items.len(), 3);
        let first = items[0].as_ref().unwrap();
        assert_eq!(first.new_val.as_ref().unwrap().icao.as_deref(), Some("IBE1"));
        assert!(matches!(&items[1], Err(FeedError::Decode { line, .. }) if line == "not json"));
        let last = items[2].as_ref().unwrap();
        assert_eq!(last.new_val.as_ref().unwrap().long, Some(-4.0));
    }

    #[tokio::test]
    async fn test_rejected_subscription() {
        let base = serve(Router::new().route("/db/:db/table/:table/changes", get(changes))).await;
        let feed = HttpChangeFeed::new(base, "data".into(), "Asia".into());

        match feed.subscribe(&FeedFilter::new("OpIcao", "IBE")).await {
            Err(FeedError::Rejected { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected rejection, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_unreachable_feed() {
        let feed = HttpChangeFeed::new("http://127.0.0.1:1".into(), "data".into(), "Europe".into());
        let result = feed.subscribe(&FeedFilter::new("OpIcao", "IBE")).await;
        assert!(matches!(result, Err(FeedError::Connect(_))));
    }

    async fn endless_line() -> String {
        "x".repeat(MAX_LINE_BYTES + 1)
    }

    #[tokio::test]
    async fn test_oversized_line_ends_stream() {
        let base = serve(Router::new().route("/db/:db/table/:table/changes", get(endless_line))).await;
        let feed = HttpChangeFeed::new(base, "data".into(), "Europe".into());

        let items: Vec<_> = feed
            .subscribe(&FeedFilter::new("OpIcao", "IBE"))
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(items.len(), 1);
        assert!(matches!(items[0], Err(FeedError::LineTooLong(n)) if n > MAX_LINE_BYTES));
    }
}
