use crate::types::{HttpRequest, HttpResponse};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT_RANGES, AGE, AUTHORIZATION, CACHE_CONTROL,
    CONNECTION, DATE, ETAG, EXPIRES, IF_MATCH, IF_MODIFIED_SINCE, IF_NONE_MATCH, IF_RANGE,
    IF_UNMODIFIED_SINCE, LAST_MODIFIED, PRAGMA, SET_COOKIE, VARY,
};
use reqwest::{Method, StatusCode, Url};
use std::collections::BTreeMap;
use std::time::{Duration, SystemTime};
use time::format_description::well_known::Rfc2822;
use time::macros::format_description;
use time::PrimitiveDateTime;

/// Statuses whose semantics a cache understands.
const UNDERSTOOD_STATUSES: [u16; 14] = [
    200, 203, 204, 300, 301, 302, 303, 307, 308, 404, 405, 410, 414, 501,
];

/// Statuses that are cacheable without explicit freshness information (RFC 7231 §6.1).
const CACHEABLE_BY_DEFAULT: [u16; 12] = [
    200, 203, 204, 206, 300, 301, 308, 404, 405, 410, 414, 501,
];

/// Headers that only apply to a single connection.
const HOP_BY_HOP: [&str; 9] = [
    "date",
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Headers of a `304` that must not replace the stored ones.
const EXCLUDED_FROM_REVALIDATION_UPDATE: [&str; 4] = [
    "content-length",
    "content-encoding",
    "transfer-encoding",
    "content-range",
];

/// Upper bound of the heuristic freshness lifetime.
const MAX_HEURISTIC_FRESHNESS: Duration = Duration::from_secs(24 * 60 * 60);

type Directives = BTreeMap<String, Option<String>>;

/// Decides whether and how long a response may be served from a shared cache (RFC 7234).
#[derive(Clone, Debug, PartialEq)]
pub struct CachePolicy {
    method: Method,
    /// The request URL without fragment.
    url: Url,
    request_headers: HeaderMap,
    status: StatusCode,
    response_headers: HeaderMap,
    response_time: SystemTime,
    request_cache_control: Directives,
    response_cache_control: Directives,
}

/// The outcome of [CachePolicy::revalidated_policy].
#[derive(Clone, Debug, PartialEq)]
pub struct Revalidated {
    /// The policy that should be stored from now on.
    pub policy: CachePolicy,
    /// Whether the new response must replace the stored one.
    pub modified: bool,
    /// Whether the new response confirmed the validators of the stored one.
    pub matches: bool,
}

impl CachePolicy {
    /// Creates the policy for `response`, which has been received just now.
    pub fn new(request: &HttpRequest, response: &HttpResponse) -> Self {
        Self::new_at(request, response, SystemTime::now())
    }

    /// Creates the policy for `response`, which has been received at `response_time`.
    pub fn new_at(
        request: &HttpRequest,
        response: &HttpResponse,
        response_time: SystemTime,
    ) -> Self {
        Self::from_parts(
            request,
            response.status,
            response.headers.clone(),
            response_time,
        )
    }

    fn from_parts(
        request: &HttpRequest,
        status: StatusCode,
        response_headers: HeaderMap,
        response_time: SystemTime,
    ) -> Self {
        let mut response_cache_control = parse_cache_control(&response_headers);
        // HTTP/1.0 servers announce no-cache through Pragma.
        if !response_headers.contains_key(CACHE_CONTROL) && has_pragma_no_cache(&response_headers)
        {
            response_cache_control.insert("no-cache".to_owned(), None);
        }

        Self {
            method: request.method.clone(),
            url: without_fragment(&request.url),
            request_cache_control: parse_cache_control(&request.headers),
            request_headers: request.headers.clone(),
            status,
            response_headers,
            response_time,
            response_cache_control,
        }
    }

    /// Returns the stored response headers.
    pub fn response_headers(&self) -> &HeaderMap {
        &self.response_headers
    }

    /// Returns whether the response may be stored in a shared cache.
    pub fn storable(&self) -> bool {
        let explicit_freshness = self.response_headers.contains_key(EXPIRES)
            || self.response_cache_control.contains_key("max-age")
            || self.response_cache_control.contains_key("s-maxage")
            || self.response_cache_control.contains_key("public");

        !self.request_cache_control.contains_key("no-store")
            && (self.method == Method::GET || self.method == Method::HEAD)
            && UNDERSTOOD_STATUSES.contains(&self.status.as_u16())
            && !self.response_cache_control.contains_key("no-store")
            && !self.response_cache_control.contains_key("private")
            && (!self.request_headers.contains_key(AUTHORIZATION) || self.allows_authorized())
            && (explicit_freshness || CACHEABLE_BY_DEFAULT.contains(&self.status.as_u16()))
            && !self.varies_on_everything()
    }

    /// Responses to authorized requests may only be shared if the server allows it.
    fn allows_authorized(&self) -> bool {
        self.response_cache_control.contains_key("must-revalidate")
            || self.response_cache_control.contains_key("public")
            || self.response_cache_control.contains_key("s-maxage")
    }

    fn varies_on_everything(&self) -> bool {
        vary_fields(&self.response_headers).any(|field| field == "*")
    }

    /// Returns the value of the `Date` header, or the time the response was received.
    pub fn date(&self) -> SystemTime {
        header_date(&self.response_headers, &DATE).unwrap_or(self.response_time)
    }

    /// Returns the freshness lifetime of the response.
    pub fn max_age(&self) -> Duration {
        if !self.storable() || self.response_cache_control.contains_key("no-cache") {
            return Duration::ZERO;
        }
        // Cookies are private to a user unless the server says otherwise.
        if self.response_headers.contains_key(SET_COOKIE)
            && !self.response_cache_control.contains_key("public")
        {
            return Duration::ZERO;
        }
        if self.response_cache_control.contains_key("proxy-revalidate") {
            return Duration::ZERO;
        }
        if let Some(s_maxage) = seconds(&self.response_cache_control, "s-maxage") {
            return s_maxage;
        }
        if let Some(max_age) = seconds(&self.response_cache_control, "max-age") {
            return max_age;
        }

        let server_date = self.date();
        if self.response_headers.contains_key(EXPIRES) {
            // An invalid Expires header means the response is already expired.
            return header_date(&self.response_headers, &EXPIRES)
                .and_then(|expires| expires.duration_since(server_date).ok())
                .unwrap_or(Duration::ZERO);
        }
        if let Some(last_modified) = header_date(&self.response_headers, &LAST_MODIFIED) {
            if let Ok(unmodified) = server_date.duration_since(last_modified) {
                return (unmodified / 10).min(MAX_HEURISTIC_FRESHNESS);
            }
        }
        Duration::ZERO
    }

    /// Returns the current age of the response.
    pub fn age(&self) -> Duration {
        self.age_at(SystemTime::now())
    }

    /// Returns the age of the response at `now`: the `Age` header plus the time it has been
    /// resident in the cache.
    pub fn age_at(&self, now: SystemTime) -> Duration {
        let age = self
            .response_headers
            .get(AGE)
            .and_then(|age| age.to_str().ok())
            .and_then(|age| age.trim().parse::<u64>().ok())
            .map_or(Duration::ZERO, Duration::from_secs);
        let resident = now
            .duration_since(self.response_time)
            .unwrap_or(Duration::ZERO);
        age.saturating_add(resident)
    }

    /// Returns how long the response stays fresh from now.
    pub fn time_to_live(&self) -> Duration {
        self.time_to_live_at(SystemTime::now())
    }

    /// Returns how long the response stays fresh from `now`.
    pub fn time_to_live_at(&self, now: SystemTime) -> Duration {
        self.max_age().saturating_sub(self.age_at(now))
    }

    /// Returns whether the response is stale now.
    pub fn is_stale(&self) -> bool {
        self.is_stale_at(SystemTime::now())
    }

    /// Returns whether the response is stale at `now`.
    pub fn is_stale_at(&self, now: SystemTime) -> bool {
        self.max_age() <= self.age_at(now)
    }

    /// Returns whether the stored response can be served for `request` without contacting the
    /// origin server.
    pub fn satisfies_without_revalidation(&self, request: &HttpRequest) -> bool {
        self.satisfies_without_revalidation_at(request, SystemTime::now())
    }

    /// Like [CachePolicy::satisfies_without_revalidation], evaluated at `now`.
    pub fn satisfies_without_revalidation_at(
        &self,
        request: &HttpRequest,
        now: SystemTime,
    ) -> bool {
        let request_cache_control = parse_cache_control(&request.headers);
        if request_cache_control.contains_key("no-cache") || has_pragma_no_cache(&request.headers)
        {
            return false;
        }

        let age = self.age_at(now);
        let max_age = self.max_age();
        if seconds(&request_cache_control, "max-age").is_some_and(|limit| age > limit) {
            return false;
        }
        if let Some(min_fresh) = seconds(&request_cache_control, "min-fresh") {
            if max_age < age.saturating_add(min_fresh) {
                return false;
            }
        }

        if max_age <= age {
            let max_stale = match request_cache_control.get("max-stale") {
                None => false,
                Some(None) => true,
                Some(Some(_)) => seconds(&request_cache_control, "max-stale")
                    .is_some_and(|max_stale| max_stale > age.saturating_sub(max_age)),
            };
            let allows_stale =
                max_stale && !self.response_cache_control.contains_key("must-revalidate");
            if !allows_stale {
                return false;
            }
        }

        self.request_matches(request, false)
    }

    fn request_matches(&self, request: &HttpRequest, allow_head: bool) -> bool {
        self.url == without_fragment(&request.url)
            && (self.method == request.method || (allow_head && request.method == Method::HEAD))
            && self.vary_matches(request)
    }

    fn vary_matches(&self, request: &HttpRequest) -> bool {
        vary_fields(&self.response_headers).all(|field| {
            field != "*"
                && self
                    .request_headers
                    .get_all(field.as_str())
                    .iter()
                    .eq(request.headers.get_all(field.as_str()).iter())
        })
    }

    /// Returns the headers of a conditional request that revalidates the stored response for
    /// `request`.
    pub fn revalidation_headers(&self, request: &HttpRequest) -> HeaderMap {
        let mut headers = without_hop_by_hop(&request.headers);
        headers.remove(IF_RANGE);

        if !self.request_matches(request, true) || !self.storable() {
            // The stored response can not answer the conditions of the incoming request.
            headers.remove(IF_NONE_MATCH);
            headers.remove(IF_MODIFIED_SINCE);
            return headers;
        }

        if let Some(etag) = self.response_headers.get(ETAG) {
            let if_none_match = match headers.get(IF_NONE_MATCH) {
                Some(existing) => join_values([existing, etag]),
                None => Some(etag.clone()),
            };
            if let Some(if_none_match) = if_none_match {
                headers.insert(IF_NONE_MATCH, if_none_match);
            }
        }

        let forbids_weak_validators = headers.contains_key(ACCEPT_RANGES)
            || headers.contains_key(IF_MATCH)
            || headers.contains_key(IF_UNMODIFIED_SINCE)
            || self.method != Method::GET;
        if forbids_weak_validators {
            headers.remove(IF_MODIFIED_SINCE);
            if let Some(if_none_match) = headers.remove(IF_NONE_MATCH) {
                let strong = if_none_match
                    .to_str()
                    .unwrap_or_default()
                    .split(',')
                    .map(str::trim)
                    .filter(|etag| !etag.is_empty() && !etag.starts_with("W/"))
                    .collect::<Vec<_>>()
                    .join(", ");
                if let Ok(strong) = HeaderValue::try_from(strong) {
                    if !strong.is_empty() {
                        headers.insert(IF_NONE_MATCH, strong);
                    }
                }
            }
        } else if !headers.contains_key(IF_MODIFIED_SINCE) {
            if let Some(last_modified) = self.response_headers.get(LAST_MODIFIED) {
                headers.insert(IF_MODIFIED_SINCE, last_modified.clone());
            }
        }

        headers
    }

    /// Computes the policy after a conditional `request` was answered with `response`.
    pub fn revalidated_policy(
        &self,
        request: &HttpRequest,
        response: &HttpResponse,
    ) -> Revalidated {
        self.revalidated_policy_at(request, response, SystemTime::now())
    }

    /// Like [CachePolicy::revalidated_policy] for a response received at `now`.
    pub fn revalidated_policy_at(
        &self,
        request: &HttpRequest,
        response: &HttpResponse,
        now: SystemTime,
    ) -> Revalidated {
        let stored_etag = header_str(&self.response_headers, &ETAG);
        let new_etag = header_str(&response.headers, &ETAG);
        let stored_last_modified = header_str(&self.response_headers, &LAST_MODIFIED);

        let matches = if response.status != StatusCode::NOT_MODIFIED {
            false
        } else if let Some(new_etag) = new_etag.filter(|etag| !is_weak(etag)) {
            stored_etag.is_some_and(|stored| strip_weak(stored) == new_etag)
        } else if let (Some(stored), Some(new)) = (stored_etag, new_etag) {
            strip_weak(stored) == strip_weak(new)
        } else if let Some(stored) = stored_last_modified {
            header_str(&response.headers, &LAST_MODIFIED) == Some(stored)
        } else {
            // Without any validators the 304 can only refer to the stored response.
            stored_etag.is_none()
                && new_etag.is_none()
                && !response.headers.contains_key(LAST_MODIFIED)
        };

        if !matches {
            return Revalidated {
                policy: Self::new_at(request, response, now),
                modified: response.status != StatusCode::NOT_MODIFIED,
                matches: false,
            };
        }

        let mut headers = HeaderMap::with_capacity(self.response_headers.keys_len());
        for name in self.response_headers.keys() {
            let source = if response.headers.contains_key(name)
                && !EXCLUDED_FROM_REVALIDATION_UPDATE.contains(&name.as_str())
            {
                &response.headers
            } else {
                &self.response_headers
            };
            for value in source.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }

        Revalidated {
            policy: Self::from_parts(request, self.status, headers, now),
            modified: false,
            matches: true,
        }
    }
}

fn parse_cache_control(headers: &HeaderMap) -> Directives {
    let mut directives = Directives::new();
    for value in headers.get_all(CACHE_CONTROL) {
        let Ok(value) = value.to_str() else {
            continue;
        };
        for directive in value.split(',').map(str::trim) {
            if directive.is_empty() {
                continue;
            }
            let (name, argument) = match directive.split_once('=') {
                Some((name, argument)) => (name, Some(argument.trim().trim_matches('"'))),
                None => (directive, None),
            };
            directives.insert(
                name.trim().to_ascii_lowercase(),
                argument.map(str::to_owned),
            );
        }
    }
    directives
}

/// Returns the duration of a delta-seconds directive. Malformed arguments count as zero.
fn seconds(directives: &Directives, name: &str) -> Option<Duration> {
    directives.get(name).map(|argument| {
        Duration::from_secs(
            argument
                .as_deref()
                .and_then(|argument| argument.parse().ok())
                .unwrap_or(0),
        )
    })
}

fn has_pragma_no_cache(headers: &HeaderMap) -> bool {
    headers
        .get_all(PRAGMA)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.to_ascii_lowercase().contains("no-cache"))
}

fn vary_fields(headers: &HeaderMap) -> impl Iterator<Item = String> + '_ {
    headers
        .get_all(VARY)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|field| field.trim().to_ascii_lowercase())
        .filter(|field| !field.is_empty())
}

fn without_fragment(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

fn without_hop_by_hop(headers: &HeaderMap) -> HeaderMap {
    let connection_fields = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .map(|field| field.trim().to_ascii_lowercase())
        .collect::<Vec<_>>();

    let mut result = HeaderMap::with_capacity(headers.keys_len());
    for (name, value) in headers {
        let name_str = name.as_str();
        if !HOP_BY_HOP.contains(&name_str) && !connection_fields.iter().any(|f| f == name_str) {
            result.append(name.clone(), value.clone());
        }
    }
    result
}

fn join_values<'a>(values: impl IntoIterator<Item = &'a HeaderValue>) -> Option<HeaderValue> {
    let mut joined = Vec::new();
    for value in values {
        if !joined.is_empty() {
            joined.extend_from_slice(b", ");
        }
        joined.extend_from_slice(value.as_bytes());
    }
    HeaderValue::from_bytes(&joined).ok()
}

fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

fn is_weak(etag: &str) -> bool {
    etag.trim_start().starts_with("W/")
}

fn strip_weak(etag: &str) -> &str {
    let trimmed = etag.trim_start();
    trimmed.strip_prefix("W/").unwrap_or(trimmed)
}

fn header_date(headers: &HeaderMap, name: &HeaderName) -> Option<SystemTime> {
    header_str(headers, name).and_then(parse_http_date)
}

/// Parses an HTTP-date (RFC 7231 §7.1.1.1). The preferred IMF-fixdate format is tried first,
/// followed by the more lenient RFC 2822 grammar.
fn parse_http_date(value: &str) -> Option<SystemTime> {
    let value = value.trim();
    let imf_fixdate = format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    let date = match PrimitiveDateTime::parse(value, imf_fixdate) {
        Ok(date) => date.assume_utc(),
        Err(_) => time::OffsetDateTime::parse(value, &Rfc2822).ok()?,
    };
    Some(SystemTime::from(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::CONTENT_LENGTH;

    /// Sun, 06 Nov 1994 08:49:37 GMT
    fn epoch() -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_secs(784_111_777)
    }

    fn at(seconds: u64) -> SystemTime {
        epoch() + Duration::from_secs(seconds)
    }

    fn header_map(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        pairs
            .iter()
            .map(|(name, value)| {
                (
                    HeaderName::from_static(name),
                    HeaderValue::from_static(value),
                )
            })
            .collect()
    }

    fn request(pairs: &[(&'static str, &'static str)]) -> HttpRequest {
        let mut request = HttpRequest::get("http://example.com/data#fragment").unwrap();
        request.headers = header_map(pairs);
        request
    }

    fn response(status: u16, pairs: &[(&'static str, &'static str)]) -> HttpResponse {
        HttpResponse::new(
            Url::parse("http://example.com/data").unwrap(),
            StatusCode::from_u16(status).unwrap(),
            header_map(pairs),
            "body",
        )
    }

    fn policy(
        request_headers: &[(&'static str, &'static str)],
        status: u16,
        response_headers: &[(&'static str, &'static str)],
    ) -> CachePolicy {
        CachePolicy::new_at(
            &request(request_headers),
            &response(status, response_headers),
            epoch(),
        )
    }

    #[test]
    fn storable_with_max_age() {
        let policy = policy(&[], 200, &[("cache-control", "max-age=60")]);

        assert!(policy.storable());
        assert_eq!(policy.max_age(), Duration::from_secs(60));
        assert_eq!(policy.time_to_live_at(at(20)), Duration::from_secs(40));
    }

    #[test]
    fn not_storable() {
        let cases = [
            policy(&[("cache-control", "no-store")], 200, &[]),
            policy(&[], 200, &[("cache-control", "no-store, max-age=60")]),
            policy(&[], 200, &[("cache-control", "private, max-age=60")]),
            policy(&[("authorization", "Basic x")], 200, &[("cache-control", "max-age=60")]),
            policy(&[], 200, &[("cache-control", "max-age=60"), ("vary", "*")]),
            policy(&[], 500, &[("cache-control", "max-age=60")]),
            policy(&[], 302, &[]),
        ];

        for (i, case) in cases.iter().enumerate() {
            assert!(!case.storable(), "case {i} must not be storable");
            assert_eq!(case.max_age(), Duration::ZERO);
        }
    }

    #[test]
    fn storable_by_default_or_when_authorized_publicly() {
        assert!(policy(&[], 404, &[]).storable());
        assert!(policy(&[], 302, &[("cache-control", "max-age=5")]).storable());
        assert!(policy(
            &[("authorization", "Basic x")],
            200,
            &[("cache-control", "public, max-age=60")]
        )
        .storable());
    }

    #[test]
    fn post_is_not_storable() {
        let mut post = request(&[]);
        post.method = Method::POST;
        let policy = CachePolicy::new_at(
            &post,
            &response(200, &[("cache-control", "max-age=60")]),
            epoch(),
        );

        assert!(!policy.storable());
    }

    #[test]
    fn s_maxage_overrides_max_age() {
        let policy = policy(&[], 200, &[("cache-control", "max-age=60, s-maxage=10")]);

        assert_eq!(policy.max_age(), Duration::from_secs(10));
    }

    #[test]
    fn no_cache_and_cookies_have_no_freshness() {
        assert_eq!(
            policy(&[], 200, &[("cache-control", "no-cache, max-age=60")]).max_age(),
            Duration::ZERO
        );
        assert_eq!(
            policy(
                &[],
                200,
                &[("pragma", "no-cache"), ("expires", "Sun, 06 Nov 1994 09:49:37 GMT")]
            )
            .max_age(),
            Duration::ZERO
        );
        assert_eq!(
            policy(
                &[],
                200,
                &[("cache-control", "max-age=60"), ("set-cookie", "a=b")]
            )
            .max_age(),
            Duration::ZERO
        );
    }

    #[test]
    fn expires_relative_to_date() {
        let policy = policy(
            &[],
            200,
            &[
                ("date", "Sun, 06 Nov 1994 08:49:37 GMT"),
                ("expires", "Sun, 06 Nov 1994 09:49:37 GMT"),
            ],
        );

        assert_eq!(policy.date(), epoch());
        assert_eq!(policy.max_age(), Duration::from_secs(3600));
    }

    #[test]
    fn invalid_or_past_expires_is_stale() {
        let invalid = policy(&[], 200, &[("expires", "0")]);
        let past = policy(
            &[],
            200,
            &[
                ("date", "Sun, 06 Nov 1994 08:49:37 GMT"),
                ("expires", "Sun, 06 Nov 1994 07:49:37 GMT"),
            ],
        );

        assert_eq!(invalid.max_age(), Duration::ZERO);
        assert_eq!(past.max_age(), Duration::ZERO);
        assert!(past.is_stale_at(epoch()));
    }

    #[test]
    fn heuristic_freshness() {
        let policy = policy(
            &[],
            200,
            &[
                ("date", "Sun, 06 Nov 1994 08:49:37 GMT"),
                ("last-modified", "Wed, 02 Nov 1994 04:49:37 GMT"),
            ],
        );

        assert_eq!(policy.max_age(), Duration::from_secs(10 * 60 * 60));
    }

    #[test]
    fn heuristic_freshness_is_capped() {
        let policy = policy(
            &[],
            200,
            &[
                ("date", "Sun, 06 Nov 1994 08:49:37 GMT"),
                ("last-modified", "Sat, 01 Jan 1994 00:00:00 GMT"),
            ],
        );

        assert_eq!(policy.max_age(), MAX_HEURISTIC_FRESHNESS);
    }

    #[test]
    fn age_includes_age_header_and_resident_time() {
        let policy = policy(&[], 200, &[("cache-control", "max-age=100"), ("age", "30")]);

        assert_eq!(policy.age_at(at(20)), Duration::from_secs(50));
        assert_eq!(policy.time_to_live_at(at(20)), Duration::from_secs(50));
        assert!(!policy.is_stale_at(at(20)));
        assert!(policy.is_stale_at(at(70)));
        assert_eq!(policy.time_to_live_at(at(80)), Duration::ZERO);
    }

    #[test]
    fn fresh_response_satisfies_request() {
        let policy = policy(&[], 200, &[("cache-control", "max-age=60")]);

        assert!(policy.satisfies_without_revalidation_at(&request(&[]), at(10)));
        assert!(!policy.satisfies_without_revalidation_at(&request(&[]), at(60)));
    }

    #[test]
    fn request_directives_are_honoured() {
        let policy = policy(&[], 200, &[("cache-control", "max-age=60")]);

        let no_cache = request(&[("cache-control", "no-cache")]);
        let pragma = request(&[("pragma", "no-cache")]);
        let max_age = request(&[("cache-control", "max-age=5")]);
        let min_fresh = request(&[("cache-control", "min-fresh=30")]);
        let max_stale = request(&[("cache-control", "max-stale=20")]);
        let any_stale = request(&[("cache-control", "max-stale")]);

        assert!(!policy.satisfies_without_revalidation_at(&no_cache, at(1)));
        assert!(!policy.satisfies_without_revalidation_at(&pragma, at(1)));
        assert!(!policy.satisfies_without_revalidation_at(&max_age, at(10)));
        assert!(policy.satisfies_without_revalidation_at(&min_fresh, at(10)));
        assert!(!policy.satisfies_without_revalidation_at(&min_fresh, at(40)));
        assert!(policy.satisfies_without_revalidation_at(&max_stale, at(70)));
        assert!(!policy.satisfies_without_revalidation_at(&max_stale, at(90)));
        assert!(policy.satisfies_without_revalidation_at(&any_stale, at(1000)));
    }

    #[test]
    fn must_revalidate_forbids_stale() {
        let policy = policy(&[], 200, &[("cache-control", "max-age=60, must-revalidate")]);

        let max_stale = request(&[("cache-control", "max-stale")]);
        assert!(!policy.satisfies_without_revalidation_at(&max_stale, at(70)));
    }

    #[test]
    fn vary_and_url_must_match() {
        let policy = policy(
            &[("accept", "text/turtle")],
            200,
            &[("cache-control", "max-age=60"), ("vary", "Accept")],
        );

        let turtle = request(&[("accept", "text/turtle")]);
        let html = request(&[("accept", "text/html")]);
        assert!(policy.satisfies_without_revalidation_at(&turtle, at(1)));
        assert!(!policy.satisfies_without_revalidation_at(&html, at(1)));
        assert!(!policy.satisfies_without_revalidation_at(&request(&[]), at(1)));

        let mut other = request(&[("accept", "text/turtle")]);
        other.url = Url::parse("http://example.com/other").unwrap();
        assert!(!policy.satisfies_without_revalidation_at(&other, at(1)));
    }

    #[test]
    fn revalidation_headers_add_validators() {
        let policy = policy(
            &[],
            200,
            &[
                ("cache-control", "max-age=60"),
                ("etag", "\"v1\""),
                ("last-modified", "Sun, 06 Nov 1994 08:00:00 GMT"),
            ],
        );
        let incoming = request(&[
            ("accept", "text/turtle"),
            ("connection", "x-trace"),
            ("x-trace", "1"),
            ("keep-alive", "timeout=5"),
        ]);

        let headers = policy.revalidation_headers(&incoming);

        assert_eq!(headers.get(IF_NONE_MATCH).unwrap(), "\"v1\"");
        assert_eq!(
            headers.get(IF_MODIFIED_SINCE).unwrap(),
            "Sun, 06 Nov 1994 08:00:00 GMT"
        );
        assert_eq!(headers.get("accept").unwrap(), "text/turtle");
        assert!(!headers.contains_key("connection"));
        assert!(!headers.contains_key("x-trace"));
        assert!(!headers.contains_key("keep-alive"));
    }

    #[test]
    fn revalidation_headers_drop_weak_validators_for_ranges() {
        let policy = policy(
            &[],
            200,
            &[
                ("cache-control", "max-age=60"),
                ("etag", "W/\"v1\""),
                ("last-modified", "Sun, 06 Nov 1994 08:00:00 GMT"),
            ],
        );

        let headers = policy.revalidation_headers(&request(&[("if-match", "\"v0\"")]));

        assert!(!headers.contains_key(IF_NONE_MATCH));
        assert!(!headers.contains_key(IF_MODIFIED_SINCE));
    }

    #[test]
    fn revalidation_headers_for_other_resource_have_no_conditions() {
        let policy = policy(&[], 200, &[("cache-control", "max-age=60"), ("etag", "\"v1\"")]);
        let mut other = request(&[("if-none-match", "\"x\"")]);
        other.url = Url::parse("http://example.com/other").unwrap();

        let headers = policy.revalidation_headers(&other);

        assert!(!headers.contains_key(IF_NONE_MATCH));
    }

    #[test]
    fn not_modified_keeps_stored_response() {
        let stored = policy(
            &[],
            200,
            &[
                ("cache-control", "max-age=60"),
                ("etag", "\"v1\""),
                ("content-length", "4"),
            ],
        );
        let not_modified = response(
            304,
            &[
                ("cache-control", "max-age=120"),
                ("etag", "\"v1\""),
                ("content-length", "0"),
                ("x-extra", "ignored"),
            ],
        );

        let revalidated = stored.revalidated_policy_at(&request(&[]), &not_modified, at(100));

        assert!(!revalidated.modified);
        assert!(revalidated.matches);
        let headers = revalidated.policy.response_headers();
        assert_eq!(headers.get(CACHE_CONTROL).unwrap(), "max-age=120");
        assert_eq!(headers.get(CONTENT_LENGTH).unwrap(), "4");
        assert!(!headers.contains_key("x-extra"));
        assert_eq!(revalidated.policy.max_age(), Duration::from_secs(120));
        assert!(revalidated.policy.storable(), "the stored status is kept");
        assert_eq!(
            revalidated.policy.time_to_live_at(at(100)),
            Duration::from_secs(120)
        );
    }

    #[test]
    fn not_modified_without_validators_matches() {
        let stored = policy(&[], 200, &[("cache-control", "max-age=60")]);

        let revalidated =
            stored.revalidated_policy_at(&request(&[]), &response(304, &[]), at(100));

        assert!(revalidated.matches);
        assert!(!revalidated.modified);
    }

    #[test]
    fn weak_etags_match_weakly() {
        let stored = policy(&[], 200, &[("cache-control", "max-age=60"), ("etag", "W/\"v1\"")]);

        let revalidated = stored.revalidated_policy_at(
            &request(&[]),
            &response(304, &[("etag", "W/\"v1\"")]),
            at(100),
        );

        assert!(revalidated.matches);
    }

    #[test]
    fn new_response_is_modified() {
        let stored = policy(&[], 200, &[("cache-control", "max-age=60"), ("etag", "\"v1\"")]);
        let fresh = response(200, &[("cache-control", "max-age=30"), ("etag", "\"v2\"")]);

        let revalidated = stored.revalidated_policy_at(&request(&[]), &fresh, at(100));

        assert!(revalidated.modified);
        assert!(!revalidated.matches);
        assert_eq!(revalidated.policy.max_age(), Duration::from_secs(30));
    }

    #[test]
    fn parses_http_dates() {
        assert_eq!(
            parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT"),
            Some(epoch())
        );
        assert_eq!(
            parse_http_date("Sun, 06 Nov 1994 08:49:37 +0000"),
            Some(epoch())
        );
        assert_eq!(
            parse_http_date("Thu, 01 Jan 1970 00:00:00 GMT"),
            Some(SystemTime::UNIX_EPOCH)
        );
        assert_eq!(parse_http_date("yesterday"), None);
    }
}
