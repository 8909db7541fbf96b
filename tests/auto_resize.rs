use behave_route::{
	auto_resize::{AutoResize, InputListener, TextInput, DEFAULT_MARGIN},
	BehaviorRegistry, Directive, ElementId, Identified,
};
use std::{
	cell::{Cell, RefCell},
	rc::{Rc, Weak},
};

fn init_logging() {
	let _ = tracing_subscriber::fmt().with_test_writer().with_env_filter("trace").try_init();
}

/// A headless text field. Handles are cheap to clone and share one field.
#[derive(Clone)]
struct Input(Rc<Field>);

struct Field {
	id: ElementId,
	value: RefCell<String>,
	width: Cell<Option<usize>>,
	listeners: RefCell<Vec<(usize, Rc<dyn Fn(&Input)>)>>,
	next_listener: Cell<usize>,
}

impl Input {
	fn new(value: &str) -> Self {
		Self(Rc::new(Field {
			id: ElementId::fresh(),
			value: RefCell::new(value.to_owned()),
			width: Cell::new(None),
			listeners: RefCell::new(Vec::new()),
			next_listener: Cell::new(0),
		}))
	}

	/// Replaces the content and fires the input listeners, like typing would.
	fn type_text(&self, value: &str) {
		*self.0.value.borrow_mut() = value.to_owned();
		let listeners: Vec<_> = self.0.listeners.borrow().iter().map(|(_, listener)| Rc::clone(listener)).collect();
		for listener in listeners {
			listener(self);
		}
	}

	fn width(&self) -> Option<usize> {
		self.0.width.get()
	}

	fn listener_count(&self) -> usize {
		self.0.listeners.borrow().len()
	}
}

impl Identified for Input {
	type Identity = ElementId;

	fn identity(&self) -> ElementId {
		self.0.id
	}
}

struct FieldListener {
	field: Weak<Field>,
	key: usize,
}
impl InputListener for FieldListener {
	fn remove(self) {
		if let Some(field) = self.field.upgrade() {
			field.listeners.borrow_mut().retain(|(key, _)| *key != self.key);
		}
	}
}

impl TextInput for Input {
	type Listener = FieldListener;

	fn text_len(&self) -> usize {
		self.0.value.borrow().chars().count()
	}

	fn set_width_ch(&self, width: usize) {
		self.0.width.set(Some(width));
	}

	fn add_input_listener(&self, handler: Box<dyn Fn(&Self)>) -> FieldListener {
		let key = self.0.next_listener.get();
		self.0.next_listener.set(key + 1);
		self.0.listeners.borrow_mut().push((key, Rc::from(handler)));
		FieldListener { field: Rc::downgrade(&self.0), key }
	}
}

#[test]
fn width_follows_content() {
	init_logging();

	let registry = BehaviorRegistry::new();
	let input = Input::new("hi");
	registry.attach(&input, |input| AutoResize::new().mount(input)).unwrap();
	assert_eq!(input.width(), Some(4));

	input.type_text("hello");
	assert_eq!(input.width(), Some(7));

	input.type_text("");
	assert_eq!(input.width(), Some(DEFAULT_MARGIN));
}

#[test]
fn detaching_removes_the_listener() {
	init_logging();

	let registry = BehaviorRegistry::new();
	let input = Input::new("hi");
	registry.attach(&input, |input| AutoResize::new().mount(input)).unwrap();
	assert_eq!(input.listener_count(), 1);

	assert!(registry.detach(&input));
	assert_eq!(input.listener_count(), 0);

	input.type_text("no longer tracked");
	assert_eq!(input.width(), Some(4));
}

#[test]
fn counts_characters_not_bytes() {
	init_logging();

	let input = Input::new("héllo");
	AutoResize::with_margin(1).adjust(&input);
	assert_eq!(input.width(), Some(6));
}

#[test]
fn margin_saturates() {
	assert_eq!(AutoResize::with_margin(usize::MAX).width_for(3), usize::MAX);
	assert_eq!(AutoResize::new().margin(), 2);
}

#[test]
fn registry_does_not_keep_dropped_elements_alive() {
	init_logging();

	let registry = BehaviorRegistry::new();
	let input = Input::new("hi");
	registry.attach(&input, |input| AutoResize::new().mount(input)).unwrap();

	let field = Rc::downgrade(&input.0);
	drop(input);
	assert!(field.upgrade().is_none());

	// Cleaning up after an already dropped element is harmless.
	assert_eq!(registry.detach_all(), 1);
}

#[test]
fn works_as_a_directive() {
	init_logging();

	let directive = Directive::new(AutoResize::new());
	let inputs = [Input::new("a"), Input::new("abc")];
	for input in &inputs {
		directive.on_element_created(input).unwrap();
	}
	assert_eq!(inputs.iter().map(Input::width).collect::<Vec<_>>(), [Some(3), Some(5)]);

	inputs[0].type_text("abcd");
	assert_eq!(inputs[0].width(), Some(6));
	assert_eq!(inputs[1].width(), Some(5));

	for input in &inputs {
		assert!(directive.on_element_destroyed(input));
		assert_eq!(input.listener_count(), 0);
	}
}
