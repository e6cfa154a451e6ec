use crate::{
    error::ClientError,
    search::{IndexWriter, SearchClient},
    solr::{
        classify::reclassify,
        response::{SelectResponse, error_message},
        settings::SolrSettings,
    },
};
use model::{
    core::document::Document,
    pagination::{
        cursor::CursorMark,
        page::{Page, PagePosition, PageRequest, ProbeResult},
    },
    search::query::Query,
};
use reqwest::{
    Url,
    blocking::{Client, Response},
};
use tracing::debug;

/// Blocking HTTP adapter for a Solr collection.
#[derive(Clone)]
pub struct SolrClient {
    http: Client,
    settings: SolrSettings,
}

impl SolrClient {
    pub fn new(settings: SolrSettings) -> Result<Self, ClientError> {
        Url::parse(&settings.base_url).map_err(|err| ClientError::InvalidUrl {
            url: settings.base_url.clone(),
            reason: err.to_string(),
        })?;

        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("docshift/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(SolrClient { http, settings })
    }

    pub fn settings(&self) -> &SolrSettings {
        &self.settings
    }

    fn select(&self, params: &[(String, String)]) -> Result<SelectResponse, ClientError> {
        let url = self.settings.select_url();
        debug!(url = %url, ?params, "Issuing select request");

        let response = self.http.get(&url).query(params).send()?;
        let body = checked_body(response)?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Parameters shared by the probe and every page request.
fn base_params(query: &Query, rows: usize) -> Vec<(String, String)> {
    let mut params = vec![
        ("q".to_string(), query.q.clone()),
        ("rows".to_string(), rows.to_string()),
        ("wt".to_string(), "json".to_string()),
    ];
    params.extend(query.params.iter().cloned());
    params
}

fn page_params(query: &Query, request: &PageRequest) -> Vec<(String, String)> {
    let mut params = base_params(query, request.rows);

    if let Some(sort) = &query.sort {
        params.push(("sort".to_string(), sort.clone()));
    }
    if !query.fields.is_empty() {
        params.push(("fl".to_string(), query.fields.join(",")));
    }

    match &request.position {
        PagePosition::Cursor(mark) => {
            params.push(("cursorMark".to_string(), mark.as_str().to_string()))
        }
        PagePosition::Offset(start) => params.push(("start".to_string(), start.to_string())),
    }
    params
}

/// Returns the body of a successful response, or the server's complaint as an error.
fn checked_body(response: Response) -> Result<String, ClientError> {
    let status = response.status();
    let body = response.text()?;
    if status.is_success() {
        Ok(body)
    } else {
        Err(ClientError::server(status, error_message(&body)))
    }
}

impl SearchClient for SolrClient {
    fn probe(&self, query: &Query) -> Result<ProbeResult, ClientError> {
        let parsed = self.select(&base_params(query, 0))?;
        Ok(ProbeResult {
            num_found: parsed.response.and_then(|block| block.num_found),
        })
    }

    fn fetch(&self, query: &Query, request: &PageRequest) -> Result<Page, ClientError> {
        let parsed = self
            .select(&page_params(query, request))
            .map_err(|err| reclassify(err, &request.position))?;
        let block = parsed.response.ok_or(ClientError::MissingField("response"))?;

        Ok(Page {
            docs: block.docs,
            next_cursor_mark: parsed.next_cursor_mark.map(CursorMark::new),
        })
    }
}

impl IndexWriter for SolrClient {
    fn add(&self, docs: &[Document], commit: bool) -> Result<(), ClientError> {
        let url = self.settings.update_url();
        debug!(url = %url, docs = docs.len(), commit, "Posting update request");

        let response = self
            .http
            .post(&url)
            .query(&[("commit", commit.to_string()), ("wt", "json".to_string())])
            .json(docs)
            .send()?;
        checked_body(response)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use serde_json::json;
    use std::{
        io::{BufRead, BufReader, Read, Write},
        net::{TcpListener, TcpStream},
        sync::mpsc::{self, Receiver},
        thread,
    };

    /// Serves the canned (status, body) replies in order, one per connection,
    /// and hands back each request's head and body.
    fn stub_server(replies: Vec<(u16, &'static str)>) -> (SolrClient, Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            for (status, body) in replies {
                let (mut stream, _) = listener.accept().unwrap();
                tx.send(read_request(&mut stream)).unwrap();
                let reply = format!(
                    "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(reply.as_bytes()).unwrap();
            }
        });

        let client = SolrClient::new(SolrSettings::new(format!("http://{addr}/solr/books"))).unwrap();
        (client, rx)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request = String::new();
        let mut content_length = 0;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line.trim_end().is_empty() {
                break;
            }
            if let Some(len) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = len.trim().parse().unwrap();
            }
            request.push_str(&line);
        }
        let mut body = vec![0; content_length];
        reader.read_exact(&mut body).unwrap();
        request + &String::from_utf8(body).unwrap()
    }

    fn cursor_request() -> PageRequest {
        PageRequest::cursor(2, CursorMark::start())
    }

    fn sorted() -> Query {
        Query::match_all(2).with_sort("id desc")
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_rejects_unparseable_base_url() {
        let err = SolrClient::new(SolrSettings::new("not a url")).err().unwrap();
        assert!(matches!(err, ClientError::InvalidUrl { .. }));
    }

    #[test]
    fn test_cursor_page_params() {
        let query = Query::new("type:article", 100)
            .with_sort("id desc")
            .with_fields(["id", "title"])
            .with_param("fq", "year:2014");
        let params = page_params(&query, &PageRequest::cursor(100, CursorMark::start()));

        assert_eq!(param(&params, "q"), Some("type:article"));
        assert_eq!(param(&params, "rows"), Some("100"));
        assert_eq!(param(&params, "sort"), Some("id desc"));
        assert_eq!(param(&params, "fl"), Some("id,title"));
        assert_eq!(param(&params, "fq"), Some("year:2014"));
        assert_eq!(param(&params, "cursorMark"), Some("*"));
        assert_eq!(param(&params, "start"), None);
    }

    #[test]
    fn test_offset_page_params() {
        let query = Query::match_all(25);
        let params = page_params(&query, &PageRequest::offset(25, 50));

        assert_eq!(param(&params, "start"), Some("50"));
        assert_eq!(param(&params, "cursorMark"), None);
        assert_eq!(param(&params, "sort"), None);
        assert_eq!(param(&params, "fl"), None);
    }

    #[test]
    fn test_probe_params_request_zero_rows() {
        let params = base_params(&Query::match_all(500), 0);
        assert_eq!(param(&params, "rows"), Some("0"));
    }

    #[test]
    fn test_probe_reads_hit_count() {
        let (client, requests) =
            stub_server(vec![(200, r#"{"response":{"numFound":5,"docs":[]}}"#)]);

        let probe = client.probe(&Query::match_all(100)).unwrap();
        let request = requests.recv().unwrap();

        assert_eq!(probe.num_found, Some(5));
        assert!(request.starts_with("GET /solr/books/select?"));
        assert!(request.contains("rows=0"));
        assert!(request.contains("wt=json"));
    }

    #[test]
    fn test_fetch_returns_docs_and_next_mark() {
        let (client, requests) = stub_server(vec![(
            200,
            r#"{"response":{"numFound":5,"docs":[{"id":"b"},{"id":"a"}]},"nextCursorMark":"AoE="}"#,
        )]);

        let page = client.fetch(&sorted(), &cursor_request()).unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page.docs[0].get("id"), Some(&json!("b")));
        assert_eq!(page.next_cursor_mark, Some(CursorMark::new("AoE=")));
        assert!(requests.recv().unwrap().contains("cursorMark=*"));
    }

    #[test]
    fn test_page_without_result_block_is_malformed() {
        let (client, _requests) = stub_server(vec![(200, r#"{"responseHeader":{"status":0}}"#)]);

        let err = client.fetch(&sorted(), &cursor_request()).unwrap_err();

        assert!(matches!(err, ClientError::MissingField("response")));
        assert_eq!(err.kind(), FailureKind::MalformedResponse);
    }

    #[test]
    fn test_undecodable_body_is_malformed() {
        let (client, _requests) = stub_server(vec![(200, "<html>proxy error</html>")]);

        let err = client.fetch(&sorted(), &PageRequest::offset(2, 0)).unwrap_err();

        assert_eq!(err.kind(), FailureKind::MalformedResponse);
    }

    #[test]
    fn test_cursor_rejection_is_invalid_paging() {
        let (client, _requests) = stub_server(vec![(
            400,
            r#"{"error":{"msg":"Cursor functionality requires a sort containing a uniqueKey field tie breaker","code":400}}"#,
        )]);

        let err = client
            .fetch(&Query::match_all(2).with_sort("title asc"), &cursor_request())
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::InvalidPagingConfig);
        assert!(err.detail().starts_with("Cursor functionality"));
    }

    #[test]
    fn test_other_server_errors_stay_transport() {
        let (client, _requests) = stub_server(vec![
            (400, r#"{"error":{"msg":"undefined field cursor_pos","code":400}}"#),
            (500, r#"{"error":{"msg":"Cursor functionality hit an internal error","code":500}}"#),
        ]);

        let err = client.fetch(&sorted(), &cursor_request()).unwrap_err();
        assert!(matches!(err, ClientError::Server { .. }));
        assert_eq!(err.kind(), FailureKind::Transport);

        let err = client.fetch(&sorted(), &PageRequest::offset(2, 0)).unwrap_err();
        assert_eq!(err.kind(), FailureKind::Transport);
    }

    #[test]
    fn test_add_posts_documents_with_commit() {
        let (client, requests) = stub_server(vec![(200, r#"{"responseHeader":{"status":0}}"#)]);
        let docs: Vec<Document> = vec![[("id", json!("a"))].into_iter().collect()];

        client.add(&docs, true).unwrap();
        let request = requests.recv().unwrap();

        assert!(request.starts_with("POST /solr/books/update?"));
        assert!(request.contains("commit=true"));
        assert!(request.ends_with(r#"[{"id":"a"}]"#));
    }

    #[test]
    fn test_failed_add_surfaces_server_message() {
        let (client, _requests) = stub_server(vec![(
            400,
            r#"{"error":{"msg":"Document is missing mandatory uniqueKey field: id","code":400}}"#,
        )]);

        let err = client.add(&[Document::new()], false).unwrap_err();

        assert_eq!(err.detail(), "Document is missing mandatory uniqueKey field: id");
        assert_eq!(err.kind(), FailureKind::Transport);
    }
}
