#![doc(html_root_url = "https://docs.rs/behave-route/0.1.0")]
#![warn(clippy::pedantic)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod auto_resize;
pub mod behavior;
pub mod config;
pub mod directive;
pub mod router;
pub mod web;

pub use behavior::{AttachError, BehaviorRegistry, CleanupAction, ElementId, Identified};
pub use directive::{Behavior, Directive};
pub use router::{NoRoute, Params, RouteMatch, RouteTable};
