//! Navigation module - route table, matching and gated render decisions

pub mod router;

pub use router::{
    default_routes, match_route, LocationSink, NullLocation, RenderDecision, Route, RouteMatch,
    Router, View,
};
