//! Search surfaces and page accumulation.
//!
//! # Design
//! A search result is a JSON object carrying `numFound` and one named list
//! (`locations`, `events` or `venues`). The first page body becomes the
//! accumulator; each later page only contributes its list, appended in
//! request order.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::http::{join_url, HttpRequest};
use crate::params::{SearchParams, START};

/// One search response body, or the accumulation of several.
pub type Page = Map<String, Value>;

pub const NUM_FOUND: &str = "numFound";

const LOCATION_PARAMS: &[&str] = &[
    "q", "city", "state", "country", "postalCode", "point", "radius", "units", "sort",
    "fieldList", "start", "rows",
];

const EVENT_PARAMS: &[&str] = &[
    "q",
    "name",
    "city",
    "state",
    "country",
    "postalCode",
    "point",
    "radius",
    "units",
    "venue",
    "venueId",
    "performerId",
    "categoryId",
    "groupingId",
    "dateLocal",
    "minAvailableTickets",
    "parking",
    "status",
    "sort",
    "fieldList",
    "start",
    "rows",
];

const VENUE_PARAMS: &[&str] = &[
    "q", "name", "city", "state", "country", "postalCode", "point", "radius", "units", "sort",
    "fieldList", "start", "rows",
];

/// A paginated search endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSurface {
    Locations,
    Events,
    Venues,
}

impl SearchSurface {
    pub const ALL: [SearchSurface; 3] = [
        SearchSurface::Locations,
        SearchSurface::Events,
        SearchSurface::Venues,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            SearchSurface::Locations => "/sellers/search/locations/v3",
            SearchSurface::Events => "/sellers/search/events/v3",
            SearchSurface::Venues => "/sellers/search/venues/v3",
        }
    }

    /// Name of the result list in each page body.
    pub fn list_field(&self) -> &'static str {
        match self {
            SearchSurface::Locations => "locations",
            SearchSurface::Events => "events",
            SearchSurface::Venues => "venues",
        }
    }

    pub fn allowed_params(&self) -> &'static [&'static str] {
        match self {
            SearchSurface::Locations => LOCATION_PARAMS,
            SearchSurface::Events => EVENT_PARAMS,
            SearchSurface::Venues => VENUE_PARAMS,
        }
    }
}

impl fmt::Display for SearchSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.list_field())
    }
}

impl FromStr for SearchSurface {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SearchSurface::ALL
            .into_iter()
            .find(|surface| surface.list_field().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown search surface: {s}"))
    }
}

/// Build a GET for `surface`. `start` overrides any caller-supplied offset.
pub fn build_search_request(
    base_url: &str,
    surface: SearchSurface,
    params: &SearchParams,
    start: Option<u64>,
    headers: &[(String, String)],
) -> HttpRequest {
    let mut request = HttpRequest::get(join_url(base_url, surface.path()));
    request.query = params.to_query();
    if let Some(start) = start {
        request.query.retain(|(k, _)| k != START);
        request.query.push((START.to_string(), start.to_string()));
    }
    request.headers = headers.to_vec();
    request
}

pub fn parse_page(body: &str) -> Result<Page, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

pub fn num_found(page: &Page) -> Result<u64, ApiError> {
    page.get(NUM_FOUND)
        .and_then(Value::as_u64)
        .ok_or_else(|| ApiError::DeserializationError(format!("page has no `{NUM_FOUND}` count")))
}

/// Number of pages needed for `num_found` results, never less than one.
pub fn page_count(num_found: u64, rows: u64) -> u64 {
    if rows == 0 {
        return 1;
    }
    num_found.div_ceil(rows).max(1)
}

/// Offsets of the pages after the first, i.e. `i * rows` for
/// `i in 1..ceil(num_found / rows)`. Lazy, so a huge `num_found` costs
/// nothing until pages are actually requested.
pub fn page_offsets(num_found: u64, rows: u64) -> impl Iterator<Item = u64> {
    (1..page_count(num_found, rows)).map(move |i| i * rows)
}

/// Append `page`'s `list_field` onto the accumulator's list.
pub fn merge_page(acc: &mut Page, page: Page, list_field: &str) -> Result<(), ApiError> {
    let mut page = page;
    let items = match page.remove(list_field) {
        Some(Value::Array(items)) => items,
        _ => {
            return Err(ApiError::DeserializationError(format!(
                "page has no `{list_field}` list"
            )))
        }
    };

    match acc.get_mut(list_field) {
        Some(Value::Array(existing)) => existing.extend(items),
        _ => {
            return Err(ApiError::DeserializationError(format!(
                "first page has no `{list_field}` list"
            )))
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(value: Value) -> Page {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    #[test]
    fn offsets_for_1200_results_at_500_rows() {
        assert_eq!(page_offsets(1200, 500).collect::<Vec<_>>(), vec![500, 1000]);
    }

    #[test]
    fn single_page_needs_no_offsets() {
        assert_eq!(page_offsets(0, 500).count(), 0);
        assert_eq!(page_offsets(500, 500).count(), 0);
        assert_eq!(page_offsets(501, 500).collect::<Vec<_>>(), vec![500]);
        assert_eq!(page_count(0, 500), 1);
    }

    #[test]
    fn huge_num_found_yields_offsets_lazily() {
        let first: Vec<u64> = page_offsets(u64::MAX, 1).take(3).collect();
        assert_eq!(first, vec![1, 2, 3]);
        assert_eq!(page_count(u64::MAX, 1), u64::MAX);
    }

    #[test]
    fn request_count_is_ceil_of_num_found_over_rows() {
        for (num_found, rows) in [(1, 1), (10, 3), (999, 100), (1000, 100), (1001, 100)] {
            let requests = 1 + page_offsets(num_found, rows).count() as u64;
            assert_eq!(requests, num_found.div_ceil(rows), "{num_found}/{rows}");
            assert_eq!(requests, page_count(num_found, rows), "{num_found}/{rows}");
        }
    }

    #[test]
    fn merge_appends_list_in_order() {
        let mut acc = page(json!({"numFound": 5, "locations": [1, 2]}));
        let second = page(json!({"numFound": 5, "locations": [3, 4]}));
        merge_page(&mut acc, second, "locations").unwrap();
        let third = page(json!({"numFound": 5, "locations": [5]}));
        merge_page(&mut acc, third, "locations").unwrap();
        assert_eq!(acc["locations"], json!([1, 2, 3, 4, 5]));
        assert_eq!(acc["numFound"], json!(5));
    }

    #[test]
    fn merge_rejects_page_without_list() {
        let mut acc = page(json!({"numFound": 2, "events": [1]}));
        let err = merge_page(&mut acc, page(json!({"numFound": 2})), "events").unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn num_found_must_be_present() {
        assert_eq!(num_found(&page(json!({"numFound": 7}))).unwrap(), 7);
        assert!(num_found(&page(json!({"venues": []}))).is_err());
    }

    #[test]
    fn search_request_carries_params_and_offset() {
        let params = SearchParams::new()
            .with("q", "London")
            .with("rows", "500")
            .with("start", "3");
        let headers = vec![("Authorization".to_string(), "Bearer t".to_string())];

        let first =
            build_search_request("http://h", SearchSurface::Events, &params, None, &headers);
        assert_eq!(first.url, "http://h/sellers/search/events/v3");
        assert_eq!(first.query_param("start"), Some("3"));
        assert_eq!(first.header("authorization"), Some("Bearer t"));

        let next =
            build_search_request("http://h", SearchSurface::Events, &params, Some(500), &headers);
        assert_eq!(next.query_param("start"), Some("500"));
        assert_eq!(next.query.iter().filter(|(k, _)| k == "start").count(), 1);
    }

    #[test]
    fn surface_parses_from_list_name() {
        assert_eq!("venues".parse::<SearchSurface>(), Ok(SearchSurface::Venues));
        assert_eq!("Events".parse::<SearchSurface>(), Ok(SearchSurface::Events));
        assert!("tickets".parse::<SearchSurface>().is_err());
    }

    #[test]
    fn every_allow_list_accepts_paging_params() {
        for surface in SearchSurface::ALL {
            assert!(surface.allowed_params().contains(&"start"), "{surface}");
            assert!(surface.allowed_params().contains(&"rows"), "{surface}");
        }
    }
}
