#![cfg(target_arch = "wasm32")]

use behave_route::{auto_resize::AutoResize, web::DomBehaviorRegistry};
use std::sync::Once;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, Document, Event, HtmlInputElement};

wasm_bindgen_test_configure!(run_in_browser);

static LOG_INITIALIZED: Once = Once::new();

fn document() -> Document {
	LOG_INITIALIZED.call_once(tracing_wasm::set_as_global_default);
	window().unwrap().document().unwrap()
}

fn new_input(document: &Document, value: &str) -> HtmlInputElement {
	let input: HtmlInputElement = document.create_element("input").unwrap().dyn_into().unwrap();
	input.set_value(value);
	document.body().unwrap().append_child(&input).unwrap();
	input
}

fn type_text(input: &HtmlInputElement, value: &str) {
	input.set_value(value);
	input.dispatch_event(&Event::new("input").unwrap()).unwrap();
}

fn width(input: &HtmlInputElement) -> String {
	input.style().get_property_value("width").unwrap()
}

#[wasm_bindgen_test]
fn width_follows_typing() {
	let document = document();
	let input = new_input(&document, "hi");

	let registry = DomBehaviorRegistry::new();
	registry.attach(&input, |input| AutoResize::new().mount(input)).unwrap();
	assert_eq!(width(&input), "4ch");

	type_text(&input, "hello");
	assert_eq!(width(&input), "7ch");

	assert!(registry.detach(&input));
	assert!(!registry.is_attached(&input));
	type_text(&input, "no longer tracked");
	assert_eq!(width(&input), "7ch");

	assert!(!registry.detach(&input));
	input.remove();
}

#[wasm_bindgen_test]
fn double_attach_is_refused() {
	let document = document();
	let input = new_input(&document, "");

	let registry = DomBehaviorRegistry::new();
	registry.attach(&input, |input| AutoResize::new().mount(input)).unwrap();
	assert!(registry.attach(&input, |input| AutoResize::new().mount(input)).is_err());
	assert_eq!(width(&input), "2ch");

	registry.reattach(&input, |input| AutoResize::with_margin(5).mount(input)).unwrap();
	assert_eq!(width(&input), "5ch");

	assert!(registry.detach(&input));
	input.remove();
}

#[wasm_bindgen_test]
fn detach_works_after_the_input_left_the_document() {
	let document = document();
	let input = new_input(&document, "abc");

	let registry = DomBehaviorRegistry::new();
	registry.attach(&input, |input| AutoResize::new().mount(input)).unwrap();
	assert_eq!(width(&input), "5ch");

	input.remove();
	type_text(&input, "still tracked");
	assert_eq!(width(&input), "15ch");

	assert!(registry.detach(&input));
	type_text(&input, "no longer tracked");
	assert_eq!(width(&input), "15ch");
}
