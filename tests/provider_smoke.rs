mod fixtures;

use std::cell::RefCell;
use std::fmt;

use route_facts::{Error, ExtractOptions, ProviderResponse, RouteProvider, RouteRequest, fetch_route_facts};

use fixtures::*;

struct MockProvider {
    response: ProviderResponse,
    requests: RefCell<Vec<RouteRequest>>,
}

impl RouteProvider for MockProvider {
    type Error = MockError;

    fn route(&self, request: &RouteRequest) -> Result<ProviderResponse, Self::Error> {
        self.requests.borrow_mut().push(request.clone());
        Ok(self.response.clone())
    }
}

#[derive(Debug)]
struct MockError;

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upstream unavailable")
    }
}

impl std::error::Error for MockError {}

struct FailingProvider;

impl RouteProvider for FailingProvider {
    type Error = MockError;

    fn route(&self, _request: &RouteRequest) -> Result<ProviderResponse, Self::Error> {
        Err(MockError)
    }
}

#[test]
fn facts_fetched_through_provider() {
    let provider = MockProvider {
        response: paris_turin_via_frejus(),
        requests: RefCell::new(Vec::new()),
    };
    let request = RouteRequest::new(PARIS, TURIN);

    let facts = fetch_route_facts(&provider, &request, &ExtractOptions::default()).unwrap();

    assert_eq!(provider.requests.borrow().as_slice(), &[request]);
    assert!(facts.risk_flags.crosses_alps);
    assert_eq!(facts.route.distance_km, 782.0);
    assert_eq!(facts.route.duration_hours, Some(8.5));
}

#[test]
fn provider_failure_is_reported() {
    let request = RouteRequest::new(PARIS, TURIN);
    let err = fetch_route_facts(&FailingProvider, &request, &ExtractOptions::default()).unwrap_err();

    assert!(matches!(err, Error::Provider(_)));
    assert_eq!(err.to_string(), "route provider failed: upstream unavailable");
}
