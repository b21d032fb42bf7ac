//! Request signing, dispatch and response classification.
//!
//! # Design
//! `ResourceClient` holds the parsed base URL, the credentials, a shared
//! `RateLimiter` and a `Transport`, all behind `Arc` so clones are cheap and
//! every clone paces against the same limiter. Each typed operation is split
//! into a `build_*` method that produces an unsigned `ApiRequest` (pure, no
//! I/O) and a thin wrapper that sends it. All requests, typed or generic,
//! pass through `sign`, the single place credentials are attached.
//!
//! Outcomes are classified once, in `dispatch`: 2xx and 404 are results,
//! anything else is `ApiError::Rejected`.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::{Config, Credentials};
use crate::error::ApiError;
use crate::http::{ApiResponse, HttpRequest, HttpResponse};
use crate::rate_limit::RateLimiter;
use crate::request::ApiRequest;
use crate::transport::{Transport, UreqTransport};
use crate::types::{format_timestamp, Board, Card, CardPatch, CardUpdate, List, NewCard};

const KEY_PARAM: &str = "key";
const TOKEN_PARAM: &str = "token";

/// Blocking client for the board/list/card API.
#[derive(Clone)]
pub struct ResourceClient {
    base_url: Url,
    credentials: Arc<Credentials>,
    limiter: Arc<RateLimiter>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ResourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceClient")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .field("limiter", &self.limiter)
            .finish_non_exhaustive()
    }
}

impl ResourceClient {
    /// Client over the default blocking transport.
    pub fn new(credentials: Arc<Credentials>, limiter: Arc<RateLimiter>) -> Result<Self, ApiError> {
        Self::with_transport(credentials, limiter, Arc::new(UreqTransport::default()))
    }

    /// Client using the credentials and timeout from `config`. The limiter
    /// is passed separately so that every client built for the same
    /// credentials shares it.
    pub fn from_config(config: &Config, limiter: Arc<RateLimiter>) -> Result<Self, ApiError> {
        Self::with_transport(
            Arc::new(config.credentials.clone()),
            limiter,
            Arc::new(UreqTransport::new(config.timeout)),
        )
    }

    pub fn with_transport(
        credentials: Arc<Credentials>,
        limiter: Arc<RateLimiter>,
        transport: Arc<dyn Transport>,
    ) -> Result<Self, ApiError> {
        let base_url = parse_base_url(&credentials.base_url)?;
        Ok(Self {
            base_url,
            credentials,
            limiter,
            transport,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    // ------------------------------------------------------------------
    // Generic path
    // ------------------------------------------------------------------

    /// Send a request without decoding the body.
    pub fn send(&self, request: &ApiRequest) -> Result<ApiResponse<()>, ApiError> {
        let response = self.dispatch(request)?;
        Ok(ApiResponse {
            status: response.status,
            data: None,
            body: response.body,
        })
    }

    /// Send a request and decode a 2xx body into `T`.
    pub fn send_as<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<ApiResponse<T>, ApiError> {
        let response = self.dispatch(request)?;
        let data = if response.is_success() && !response.body.trim().is_empty() {
            Some(decode(response.status, &response.body)?)
        } else {
            None
        };
        Ok(ApiResponse {
            status: response.status,
            data,
            body: response.body,
        })
    }

    /// Decode the raw body of any response into `T`.
    pub fn deserialize<T: DeserializeOwned, U>(&self, response: &ApiResponse<U>) -> Result<T, ApiError> {
        decode(response.status, &response.body)
    }

    /// Attach credentials and resolve the resource against the base URL.
    pub fn sign(&self, request: &ApiRequest) -> Result<HttpRequest, ApiError> {
        if let Some(name) = request.params.names().find(|n| *n == KEY_PARAM || *n == TOKEN_PARAM) {
            return Err(ApiError::ReservedParameter(name.to_string()));
        }

        let mut url = self.base_url.join(request.resource.trim_start_matches('/'))?;
        if !request.segments.is_empty() {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ApiError::InvalidUrl(format!("{} cannot take path segments", self.base_url)))?;
            path.pop_if_empty();
            // `push` percent-encodes `/`, `?` and `#`, so a segment stays one segment.
            for segment in &request.segments {
                path.push(segment);
            }
        }
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in request.params.wire_pairs() {
                query.append_pair(name, value);
            }
            query.append_pair(KEY_PARAM, &self.credentials.key);
            query.append_pair(TOKEN_PARAM, &self.credentials.token);
        }

        Ok(HttpRequest {
            method: request.method,
            url: url.into(),
            headers: vec![("accept".to_string(), "application/json".to_string())],
        })
    }

    fn dispatch(&self, request: &ApiRequest) -> Result<HttpResponse, ApiError> {
        let signed = self.sign(request)?;
        if request.method.is_mutating() {
            self.limiter.acquire();
        }

        debug!(
            method = %request.method,
            resource = %request.resource,
            segments = ?request.segments,
            "dispatching request"
        );
        let response = self.transport.execute(&signed)?;

        if response.is_success() || response.is_not_found() {
            return Ok(response);
        }
        debug!(
            method = %request.method,
            resource = %request.resource,
            status = response.status,
            "request rejected"
        );
        Err(ApiError::Rejected {
            status: response.status,
            body: response.body,
        })
    }

    // ------------------------------------------------------------------
    // Boards
    // ------------------------------------------------------------------

    pub fn build_create_board(&self, name: Option<&str>) -> ApiRequest {
        ApiRequest::post("boards").optional("name", name)
    }

    pub fn build_get_board(&self, board_id: &str) -> Result<ApiRequest, ApiError> {
        let id = require(board_id, "board_id")?;
        Ok(ApiRequest::get("boards").segment(id))
    }

    pub fn build_delete_board(&self, board_id: &str) -> Result<ApiRequest, ApiError> {
        let id = require(board_id, "board_id")?;
        Ok(ApiRequest::delete("boards").segment(id))
    }

    pub fn create_board(&self, name: Option<&str>) -> Result<ApiResponse<Board>, ApiError> {
        self.send_as(&self.build_create_board(name))
    }

    pub fn get_board(&self, board_id: &str) -> Result<ApiResponse<Board>, ApiError> {
        self.send_as(&self.build_get_board(board_id)?)
    }

    pub fn delete_board(&self, board_id: &str) -> Result<ApiResponse<()>, ApiError> {
        self.send(&self.build_delete_board(board_id)?)
    }

    // ------------------------------------------------------------------
    // Lists
    // ------------------------------------------------------------------

    pub fn build_create_list(&self, name: Option<&str>, board_id: &str) -> Result<ApiRequest, ApiError> {
        let board_id = require(board_id, "board_id")?;
        Ok(ApiRequest::post("lists").optional("name", name).set("idBoard", board_id))
    }

    pub fn build_get_list(&self, list_id: &str) -> Result<ApiRequest, ApiError> {
        let id = require(list_id, "list_id")?;
        Ok(ApiRequest::get("lists").segment(id))
    }

    pub fn build_delete_list(&self, list_id: &str) -> Result<ApiRequest, ApiError> {
        let id = require(list_id, "list_id")?;
        Ok(ApiRequest::delete("lists").segment(id))
    }

    pub fn create_list(&self, name: Option<&str>, board_id: &str) -> Result<ApiResponse<List>, ApiError> {
        self.send_as(&self.build_create_list(name, board_id)?)
    }

    pub fn get_list(&self, list_id: &str) -> Result<ApiResponse<List>, ApiError> {
        self.send_as(&self.build_get_list(list_id)?)
    }

    pub fn delete_list(&self, list_id: &str) -> Result<ApiResponse<()>, ApiError> {
        self.send(&self.build_delete_list(list_id)?)
    }

    // ------------------------------------------------------------------
    // Cards
    // ------------------------------------------------------------------

    pub fn build_create_card(&self, list_id: &str, card: &NewCard) -> Result<ApiRequest, ApiError> {
        let list_id = require(list_id, "list_id")?;
        Ok(ApiRequest::post("cards")
            .optional("name", card.name.as_deref())
            .set("idList", list_id)
            .set("desc", card.description.as_deref().unwrap_or_default())
            .field("due", card.due.as_ref().map(format_timestamp).into()))
    }

    pub fn build_get_card(&self, card_id: &str) -> Result<ApiRequest, ApiError> {
        let id = require(card_id, "card_id")?;
        Ok(ApiRequest::get("cards").segment(id))
    }

    /// Overwrites name, description and due date; `None` clears the field.
    pub fn build_update_card(&self, card_id: &str, update: &CardUpdate) -> Result<ApiRequest, ApiError> {
        let id = require(card_id, "card_id")?;
        Ok(ApiRequest::put("cards").segment(id)
            .set("name", update.name.as_deref().unwrap_or_default())
            .set("desc", update.description.as_deref().unwrap_or_default())
            .set("due", update.due.as_ref().map(format_timestamp).unwrap_or_default()))
    }

    /// Sends only the fields of `patch` that are not `Field::Unchanged`.
    pub fn build_patch_card(&self, card_id: &str, patch: &CardPatch) -> Result<ApiRequest, ApiError> {
        let id = require(card_id, "card_id")?;
        Ok(ApiRequest::put("cards").segment(id)
            .field("name", patch.name.clone())
            .field("desc", patch.description.clone())
            .field("due", patch.due.as_ref().map(format_timestamp)))
    }

    pub fn build_delete_card(&self, card_id: &str) -> Result<ApiRequest, ApiError> {
        let id = require(card_id, "card_id")?;
        Ok(ApiRequest::delete("cards").segment(id))
    }

    pub fn create_card(&self, list_id: &str, card: &NewCard) -> Result<ApiResponse<Card>, ApiError> {
        self.send_as(&self.build_create_card(list_id, card)?)
    }

    pub fn get_card(&self, card_id: &str) -> Result<ApiResponse<Card>, ApiError> {
        self.send_as(&self.build_get_card(card_id)?)
    }

    pub fn update_card(&self, card_id: &str, update: &CardUpdate) -> Result<ApiResponse<Card>, ApiError> {
        self.send_as(&self.build_update_card(card_id, update)?)
    }

    pub fn patch_card(&self, card_id: &str, patch: &CardPatch) -> Result<ApiResponse<Card>, ApiError> {
        self.send_as(&self.build_patch_card(card_id, patch)?)
    }

    pub fn delete_card(&self, card_id: &str) -> Result<ApiResponse<()>, ApiError> {
        self.send(&self.build_delete_card(card_id)?)
    }
}

fn require<'a>(value: &'a str, name: &'static str) -> Result<&'a str, ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::MissingArgument(name));
    }
    // Dot segments cannot be encoded and would be dropped from the path.
    if value == "." || value == ".." {
        return Err(ApiError::InvalidArgument(name));
    }
    Ok(value)
}

fn decode<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode {
        status,
        message: e.to_string(),
    })
}

/// Parse the base URL so that resource paths join beneath it.
fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(raw)?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl(format!("{raw} cannot be used as a base url")));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::thread;
    use std::time::{Duration, Instant};

    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::http::HttpMethod;
    use crate::request::Field;

    /// Records every request and replays scripted responses, falling back to
    /// a minimal 200 payload once the script runs out.
    #[derive(Default)]
    struct Recorder {
        requests: Mutex<Vec<HttpRequest>>,
        sent_at: Mutex<Vec<Instant>>,
        responses: Mutex<VecDeque<HttpResponse>>,
    }

    impl Recorder {
        fn replying(responses: Vec<HttpResponse>) -> Arc<Self> {
            Arc::new(Self {
                requests: Mutex::new(Vec::new()),
                sent_at: Mutex::new(Vec::new()),
                responses: Mutex::new(responses.into()),
            })
        }

        fn requests(&self) -> Vec<HttpRequest> {
            self.requests.lock().unwrap().clone()
        }

        /// Dispatch instants in ascending order.
        fn sent_at(&self) -> Vec<Instant> {
            let mut stamps = self.sent_at.lock().unwrap().clone();
            stamps.sort();
            stamps
        }
    }

    impl Transport for Recorder {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
            self.sent_at.lock().unwrap().push(Instant::now());
            self.requests.lock().unwrap().push(request.clone());
            Ok(self.responses.lock().unwrap().pop_front().unwrap_or(HttpResponse {
                status: 200,
                body: r#"{"id":"x"}"#.to_string(),
            }))
        }
    }

    fn reply(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            body: body.to_string(),
        }
    }

    fn client_with(recorder: Arc<Recorder>, interval: Duration) -> ResourceClient {
        let credentials = Arc::new(Credentials::new("k3y", "t0ken").with_base_url("https://api.example.com/1"));
        ResourceClient::with_transport(credentials, Arc::new(RateLimiter::new(interval)), recorder).unwrap()
    }

    fn client(recorder: Arc<Recorder>) -> ResourceClient {
        client_with(recorder, Duration::ZERO)
    }

    fn query(req: &HttpRequest) -> HashMap<String, String> {
        Url::parse(&req.url).unwrap().query_pairs().into_owned().collect()
    }

    fn path(req: &HttpRequest) -> String {
        Url::parse(&req.url).unwrap().path().to_string()
    }

    #[test]
    fn every_request_carries_credentials() {
        let recorder = Recorder::replying(Vec::new());
        let c = client(recorder.clone());
        c.create_board(Some("b")).unwrap();
        c.get_card("abc").unwrap();
        c.delete_card("abc").unwrap();
        c.send(&ApiRequest::get("members/me")).unwrap();

        let requests = recorder.requests();
        assert_eq!(requests.len(), 4);
        for req in &requests {
            let q = query(req);
            assert_eq!(q["key"], "k3y");
            assert_eq!(q["token"], "t0ken");
        }
    }

    #[test]
    fn resources_join_below_base_path() {
        let recorder = Recorder::replying(Vec::new());
        let c = client(recorder.clone());
        assert_eq!(c.base_url().as_str(), "https://api.example.com/1/");
        c.get_card("abc").unwrap();
        c.send(&ApiRequest::get("/boards/b1")).unwrap();
        let requests = recorder.requests();
        assert_eq!(path(&requests[0]), "/1/cards/abc");
        assert_eq!(path(&requests[1]), "/1/boards/b1");
        assert_eq!(requests[0].method, HttpMethod::Get);
    }

    #[test]
    fn create_board_without_name_omits_it() {
        let c = client(Recorder::replying(Vec::new()));
        let req = c.build_create_board(None);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.resource, "boards");
        assert_eq!(req.params.wire_pairs().count(), 0);

        let req = c.build_create_board(Some(""));
        assert_eq!(req.params.wire_pairs().collect::<Vec<_>>(), vec![("name", "")]);
    }

    #[test]
    fn create_list_sends_parent() {
        let c = client(Recorder::replying(Vec::new()));
        let req = c.build_create_list(Some("Todo"), "b1").unwrap();
        let pairs: HashMap<_, _> = req.params.wire_pairs().collect();
        assert_eq!(pairs["name"], "Todo");
        assert_eq!(pairs["idBoard"], "b1");
    }

    #[test]
    fn create_card_defaults() {
        let c = client(Recorder::replying(Vec::new()));
        let req = c.build_create_card("l1", &NewCard::named("Card")).unwrap();
        let pairs: HashMap<_, _> = req.params.wire_pairs().collect();
        assert_eq!(pairs["name"], "Card");
        assert_eq!(pairs["idList"], "l1");
        assert_eq!(pairs["desc"], "");
        assert!(!pairs.contains_key("due"));
    }

    #[test]
    fn create_card_with_due_and_description() {
        let c = client(Recorder::replying(Vec::new()));
        let card = NewCard {
            name: None,
            description: Some("details".to_string()),
            due: Some(Utc.with_ymd_and_hms(2030, 6, 1, 8, 30, 0).unwrap()),
        };
        let req = c.build_create_card("l1", &card).unwrap();
        let pairs: HashMap<_, _> = req.params.wire_pairs().collect();
        assert!(!pairs.contains_key("name"));
        assert_eq!(pairs["desc"], "details");
        assert_eq!(pairs["due"], "2030-06-01T08:30:00.000Z");
    }

    #[test]
    fn full_update_sends_every_field() {
        let c = client(Recorder::replying(Vec::new()));
        let update = CardUpdate {
            name: Some("New".to_string()),
            ..CardUpdate::default()
        };
        let req = c.build_update_card("c1", &update).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.resource, "cards");
        assert_eq!(req.segments, vec!["c1".to_string()]);
        let pairs: HashMap<_, _> = req.params.wire_pairs().collect();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs["name"], "New");
        assert_eq!(pairs["desc"], "");
        assert_eq!(pairs["due"], "");
    }

    #[test]
    fn patch_sends_only_supplied_fields() {
        let c = client(Recorder::replying(Vec::new()));

        let name_only = CardPatch {
            name: Field::Set("Renamed".to_string()),
            ..CardPatch::default()
        };
        let req = c.build_patch_card("c1", &name_only).unwrap();
        assert_eq!(req.params.wire_pairs().collect::<Vec<_>>(), vec![("name", "Renamed")]);

        let clear_desc = CardPatch {
            description: Field::Clear,
            ..CardPatch::default()
        };
        let req = c.build_patch_card("c1", &clear_desc).unwrap();
        assert_eq!(req.params.wire_pairs().collect::<Vec<_>>(), vec![("desc", "")]);

        let set_due = CardPatch {
            due: Field::Set(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap()),
            ..CardPatch::default()
        };
        let req = c.build_patch_card("c1", &set_due).unwrap();
        assert_eq!(
            req.params.wire_pairs().collect::<Vec<_>>(),
            vec![("due", "2030-01-01T00:00:00.000Z")]
        );
    }

    #[test]
    fn empty_ids_fail_without_network() {
        let recorder = Recorder::replying(Vec::new());
        let c = client(recorder.clone());

        assert!(matches!(c.delete_card(""), Err(ApiError::MissingArgument("card_id"))));
        assert!(matches!(
            c.update_card("  ", &CardUpdate::default()),
            Err(ApiError::MissingArgument("card_id"))
        ));
        assert!(matches!(
            c.patch_card("", &CardPatch::default()),
            Err(ApiError::MissingArgument("card_id"))
        ));
        assert!(matches!(
            c.create_card("", &NewCard::default()),
            Err(ApiError::MissingArgument("list_id"))
        ));
        assert!(matches!(c.create_list(Some("l"), ""), Err(ApiError::MissingArgument("board_id"))));
        assert!(matches!(c.delete_list(""), Err(ApiError::MissingArgument("list_id"))));
        assert!(recorder.requests().is_empty());
    }

    #[test]
    fn not_found_is_a_result() {
        let c = client(Recorder::replying(vec![reply(404, "The requested resource was not found.")]));
        let response = c.get_card("gone").unwrap();
        assert!(response.is_not_found());
        assert!(response.data.is_none());
        assert_eq!(response.body, "The requested resource was not found.");
    }

    #[test]
    fn bad_request_is_rejected_with_status_and_body() {
        let c = client(Recorder::replying(vec![reply(400, "invalid value for name")]));
        let err = c.create_board(Some("")).unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.body(), Some("invalid value for name"));
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("invalid value for name"));
    }

    #[test]
    fn generic_send_classifies_the_same_way() {
        let c = client(Recorder::replying(vec![reply(404, ""), reply(401, "invalid token")]));
        let missing = c.send(&ApiRequest::get("boards/x")).unwrap();
        assert_eq!(missing.status, 404);
        let err = c.send(&ApiRequest::delete("boards/x")).unwrap_err();
        assert!(matches!(err, ApiError::Rejected { status: 401, .. }));
    }

    #[test]
    fn schema_mismatch_is_a_decode_error() {
        let c = client(Recorder::replying(vec![reply(200, r#"{"name":"no id"}"#)]));
        let err = c.create_board(Some("b")).unwrap_err();
        assert!(matches!(err, ApiError::Decode { status: 200, .. }));
    }

    #[test]
    fn empty_success_body_has_no_payload() {
        let c = client(Recorder::replying(vec![reply(200, "")]));
        let response = c.get_board("b1").unwrap();
        assert!(response.is_success());
        assert!(response.data.is_none());
    }

    #[test]
    fn typed_payload_and_deserialize_helper() {
        let body = r#"{"id":"c1","name":"Card","desc":"d","idList":"l1","badges":{"description":true}}"#;
        let c = client(Recorder::replying(vec![reply(200, body)]));
        let response = c.get_card("c1").unwrap();
        let card = response.data.clone().unwrap();
        assert_eq!(card.id, "c1");
        assert_eq!(card.list_id.as_deref(), Some("l1"));

        let again: Card = c.deserialize(&response).unwrap();
        assert_eq!(again, card);
        let raw: serde_json::Value = c.deserialize(&response).unwrap();
        assert_eq!(raw["badges"]["description"], true);
    }

    #[test]
    fn credentials_cannot_be_overridden() {
        let recorder = Recorder::replying(Vec::new());
        let c = client(recorder.clone());
        let err = c.send(&ApiRequest::get("boards/b").set("token", "other")).unwrap_err();
        assert!(matches!(err, ApiError::ReservedParameter(ref name) if name == "token"));
        assert!(recorder.requests().is_empty());
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let credentials = Arc::new(Credentials::new("k", "t").with_base_url("not a url"));
        let err = ResourceClient::with_transport(credentials, Arc::default(), Recorder::replying(Vec::new()))
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl(_)));
    }

    #[test]
    fn query_values_are_percent_encoded() {
        let recorder = Recorder::replying(Vec::new());
        let c = client(recorder.clone());
        c.create_board(Some("Board_№1 & co")).unwrap();
        let req = &recorder.requests()[0];
        assert!(!req.url.contains(' '));
        assert_eq!(query(req)["name"], "Board_№1 & co");
    }

    #[test]
    fn lookups_are_not_rate_limited() {
        let c = client_with(Recorder::replying(Vec::new()), Duration::from_secs(2));
        let start = Instant::now();
        c.get_card("a").unwrap();
        c.get_card("b").unwrap();
        c.get_board("c").unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn mutations_are_spaced_across_clones() {
        let interval = Duration::from_millis(20);
        let c = client_with(Recorder::replying(Vec::new()), interval);
        let other = c.clone();
        let start = Instant::now();
        c.create_board(Some("a")).unwrap();
        other.delete_card("x").unwrap();
        c.patch_card("y", &CardPatch::default()).unwrap();
        assert!(start.elapsed() >= interval * 2);
    }

    #[test]
    fn concurrent_mutations_all_complete() {
        let interval = Duration::from_millis(25);
        let recorder = Recorder::replying(Vec::new());
        let c = client_with(recorder.clone(), interval);

        let handles: Vec<_> = (0..6)
            .map(|i| {
                let c = c.clone();
                thread::spawn(move || c.create_card("l1", &NewCard::named(format!("card {i}"))))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        assert_eq!(recorder.requests().len(), 6);
        let sent_at = recorder.sent_at();
        for pair in sent_at.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(gap >= interval, "dispatch gap {gap:?} below interval");
        }
    }

    #[test]
    fn ids_stay_within_their_resource() {
        let c = client(Recorder::replying(Vec::new()));

        let req = c.sign(&c.build_delete_card("../boards/b1").unwrap()).unwrap();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(path(&req), "/1/cards/..%2Fboards%2Fb1");

        let req = c.sign(&c.build_get_card("abc?idList=x#frag").unwrap()).unwrap();
        assert_eq!(path(&req), "/1/cards/abc%3FidList=x%23frag");
        let q = query(&req);
        assert_eq!(q.len(), 2);
        assert!(!q.contains_key("idList"));
    }

    #[test]
    fn smuggled_token_stays_in_the_path() {
        let recorder = Recorder::replying(Vec::new());
        let c = client(recorder.clone());
        c.get_board("b1?token=other").unwrap();
        let req = &recorder.requests()[0];
        assert_eq!(path(req), "/1/boards/b1%3Ftoken=other");
        assert_eq!(query(req)["token"], "t0ken");
        let tokens = Url::parse(&req.url).unwrap().query_pairs().filter(|(k, _)| k == "token").count();
        assert_eq!(tokens, 1);
    }

    #[test]
    fn dot_segment_ids_are_refused() {
        let recorder = Recorder::replying(Vec::new());
        let c = client(recorder.clone());
        assert!(matches!(
            c.patch_card("..", &CardPatch::default()),
            Err(ApiError::InvalidArgument("card_id"))
        ));
        assert!(matches!(c.delete_list("."), Err(ApiError::InvalidArgument("list_id"))));
        assert!(recorder.requests().is_empty());
    }
}
